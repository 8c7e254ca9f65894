//! Qualified names: the identity of every assembly, type and member.
//!
//! A qualified name is (assembly, optional type path, optional member signature).
//! Two names are equal iff all three parts are equal, regardless of how the
//! definition was reached.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity of a definition.
///
/// Ordering is lexicographic on (assembly, type, member), which keeps dumps stable.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QualifiedName {
    pub assembly: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member: Option<String>,
}

/// Shape of a qualified name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NameKind {
    Assembly,
    Type,
    Member,
}

/// Kind of definition a name refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefKind {
    Assembly,
    Type,
    Field,
    Event,
    Property,
    Method,
}

impl QualifiedName {
    pub fn assembly(assembly: impl Into<String>) -> Self {
        Self {
            assembly: assembly.into(),
            type_path: None,
            member: None,
        }
    }

    pub fn of_type(assembly: impl Into<String>, type_path: impl Into<String>) -> Self {
        Self {
            assembly: assembly.into(),
            type_path: Some(type_path.into()),
            member: None,
        }
    }

    pub fn of_member(
        assembly: impl Into<String>,
        type_path: impl Into<String>,
        member: impl Into<String>,
    ) -> Self {
        Self {
            assembly: assembly.into(),
            type_path: Some(type_path.into()),
            member: Some(member.into()),
        }
    }

    pub fn kind(&self) -> NameKind {
        match (&self.type_path, &self.member) {
            (None, _) => NameKind::Assembly,
            (Some(_), None) => NameKind::Type,
            (Some(_), Some(_)) => NameKind::Member,
        }
    }

    /// The type that declares this member, or `None` for assembly and type names.
    pub fn declaring_type(&self) -> Option<QualifiedName> {
        self.member.as_ref()?;
        let type_path = self.type_path.as_ref()?;
        Some(Self::of_type(self.assembly.clone(), type_path.clone()))
    }

    /// The assembly this name belongs to, as a name of its own.
    pub fn assembly_name(&self) -> QualifiedName {
        Self::assembly(self.assembly.clone())
    }

    /// Name of a member declared on this type.
    ///
    /// Returns `None` when `self` is not a type name.
    pub fn member(&self, member: impl Into<String>) -> Option<QualifiedName> {
        if self.kind() != NameKind::Type {
            return None;
        }
        let mut name = self.clone();
        name.member = Some(member.into());
        Some(name)
    }
}

/// Canonical reflective rendering: `[Assembly]Type::Member`.
impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.assembly)?;
        if let Some(type_path) = &self.type_path {
            f.write_str(type_path)?;
        }
        if let Some(member) = &self.member {
            write!(f, "::{member}")?;
        }
        Ok(())
    }
}

impl fmt::Display for DefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Assembly => "assembly",
            Self::Type => "type",
            Self::Field => "field",
            Self::Event => "event",
            Self::Property => "property",
            Self::Method => "method",
        })
    }
}
