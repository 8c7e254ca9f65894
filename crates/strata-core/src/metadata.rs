//! Analysis layer: validated, name-indexed program model.
//!
//! All collections preserve the definition order chosen upstream. Downstream
//! passes (slot allocation in particular) rely on that order being stable.

use std::collections::HashSet;

use indexmap::IndexMap;

use crate::raw::{Attribute, MethodBody, MethodFlag, RawMember, RawMethod, RawProgram, RawType};
use crate::{DefKind, QualifiedName};

/// Errors found while decoding or indexing a program description.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("invalid program description: {0}")]
    Json(#[from] serde_json::Error),

    #[error("assembly `{0}` is defined more than once")]
    DuplicateAssembly(String),

    #[error("type `{0}` is defined more than once")]
    DuplicateType(QualifiedName),

    #[error("method `{0}` is defined more than once")]
    DuplicateMethod(QualifiedName),

    #[error("assembly `{assembly}` references unknown assembly `{reference}`")]
    UnknownReference { assembly: String, reference: String },

    #[error("type `{ty}` extends unknown type `{base}`")]
    UnknownBase { ty: QualifiedName, base: QualifiedName },

    #[error("type `{0}` is part of an inheritance cycle")]
    InheritanceCycle(QualifiedName),

    #[error("method `{method}` overrides unknown method `{target}`")]
    UnknownOverride {
        method: QualifiedName,
        target: QualifiedName,
    },

    #[error("method `{method}` overrides `{target}`, which no ancestor of its type declares")]
    OverrideOutsideAncestry {
        method: QualifiedName,
        target: QualifiedName,
    },

    #[error("entry point `{0}` does not exist")]
    UnknownEntryPoint(QualifiedName),
}

/// The closed set of assemblies being compiled.
#[derive(Debug, Clone)]
pub struct Program {
    assemblies: IndexMap<String, Assembly>,
    entry_point: Option<QualifiedName>,
}

#[derive(Debug, Clone)]
pub struct Assembly {
    pub name: String,
    pub references: Vec<String>,
    pub defines_metadata: bool,
    /// Hash of the assembly's description, for up-to-date checks.
    pub content_hash: u32,
    types: IndexMap<String, TypeDef>,
}

#[derive(Debug, Clone)]
pub struct TypeDef {
    pub name: QualifiedName,
    pub base: Option<QualifiedName>,
    pub is_interface: bool,
    pub generic_arity: u32,
    pub used: bool,
    pub fields: Vec<MemberDef>,
    pub events: Vec<MemberDef>,
    pub properties: Vec<MemberDef>,
    methods: IndexMap<String, MethodDef>,
}

/// Field, event or property.
#[derive(Debug, Clone)]
pub struct MemberDef {
    pub name: QualifiedName,
    pub short_name: String,
    pub kind: DefKind,
    pub is_static: bool,
    pub used: bool,
}

#[derive(Debug, Clone)]
pub struct MethodDef {
    pub name: QualifiedName,
    pub short_name: String,
    pub is_static: bool,
    pub flags: MethodFlags,
    pub params: u32,
    pub used: bool,
    pub overrides: Option<QualifiedName>,
    pub attributes: Vec<Attribute>,
    pub body: Option<MethodBody>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MethodFlags {
    pub is_virtual: bool,
    pub is_abstract: bool,
    pub is_constructor: bool,
    pub is_static_constructor: bool,
    pub is_runtime_special: bool,
    pub is_extern: bool,
}

impl MethodFlags {
    fn from_raw(flags: &[MethodFlag]) -> Self {
        let mut out = Self::default();
        for flag in flags {
            match flag {
                MethodFlag::Virtual => out.is_virtual = true,
                MethodFlag::Abstract => out.is_abstract = true,
                MethodFlag::Constructor => out.is_constructor = true,
                MethodFlag::StaticConstructor => out.is_static_constructor = true,
                MethodFlag::RuntimeSpecial => out.is_runtime_special = true,
                MethodFlag::Extern => out.is_extern = true,
            }
        }
        out
    }
}

impl Program {
    /// Parse and index a program description.
    pub fn from_json(json: &str) -> Result<Self, MetadataError> {
        let raw: RawProgram = serde_json::from_str(json)?;
        Self::from_raw(raw)
    }

    /// Index and validate a raw program.
    pub fn from_raw(raw: RawProgram) -> Result<Self, MetadataError> {
        let mut assemblies = IndexMap::new();

        for raw_asm in raw.assemblies {
            let content_hash = crc32fast::hash(&serde_json::to_vec(&raw_asm)?);
            let mut types = IndexMap::new();
            for raw_type in raw_asm.types {
                let ty = TypeDef::from_raw(&raw_asm.name, raw_type)?;
                let key = ty.reflection_name().to_owned();
                if types.contains_key(&key) {
                    return Err(MetadataError::DuplicateType(ty.name));
                }
                types.insert(key, ty);
            }

            let asm = Assembly {
                name: raw_asm.name,
                references: raw_asm.references,
                defines_metadata: raw_asm.defines_metadata,
                content_hash,
                types,
            };
            if assemblies.contains_key(&asm.name) {
                return Err(MetadataError::DuplicateAssembly(asm.name));
            }
            assemblies.insert(asm.name.clone(), asm);
        }

        let mut program = Self {
            assemblies,
            entry_point: raw.entry_point,
        };
        program.validate()?;
        program.resolve_overrides();
        Ok(program)
    }

    fn validate(&self) -> Result<(), MetadataError> {
        for asm in self.assemblies.values() {
            for reference in &asm.references {
                if !self.assemblies.contains_key(reference) {
                    return Err(MetadataError::UnknownReference {
                        assembly: asm.name.clone(),
                        reference: reference.clone(),
                    });
                }
            }

            for ty in asm.types() {
                if let Some(base) = &ty.base
                    && self.type_def(base).is_none()
                {
                    return Err(MetadataError::UnknownBase {
                        ty: ty.name.clone(),
                        base: base.clone(),
                    });
                }
                self.check_acyclic(ty)?;

                for method in ty.methods() {
                    let Some(target) = &method.overrides else {
                        continue;
                    };
                    if self.method(target).is_none() {
                        return Err(MetadataError::UnknownOverride {
                            method: method.name.clone(),
                            target: target.clone(),
                        });
                    }
                    let inherited = target.declaring_type().is_some_and(|declaring| {
                        self.ancestors(ty).iter().any(|a| a.name == declaring)
                    });
                    if !inherited {
                        return Err(MetadataError::OverrideOutsideAncestry {
                            method: method.name.clone(),
                            target: target.clone(),
                        });
                    }
                }
            }
        }

        if let Some(entry) = &self.entry_point
            && self.method(entry).is_none()
        {
            return Err(MetadataError::UnknownEntryPoint(entry.clone()));
        }

        Ok(())
    }

    /// Point every override at the method that introduced the slot.
    ///
    /// Terminates because each hop moves strictly up an acyclic base chain.
    fn resolve_overrides(&mut self) {
        let mut roots = Vec::new();
        for asm in self.assemblies.values() {
            for ty in asm.types() {
                for method in ty.methods() {
                    let Some(mut root) = method.overrides.clone() else {
                        continue;
                    };
                    while let Some(next) = self.method(&root).and_then(|m| m.overrides.clone()) {
                        root = next;
                    }
                    if method.overrides.as_ref() != Some(&root) {
                        roots.push((method.name.clone(), root));
                    }
                }
            }
        }

        for (name, root) in roots {
            if let Some(method) = self.method_mut(&name) {
                method.overrides = Some(root);
            }
        }
    }

    fn method_mut(&mut self, name: &QualifiedName) -> Option<&mut MethodDef> {
        let type_path = name.type_path.as_deref()?;
        let signature = name.member.as_deref()?;
        self.assemblies
            .get_mut(&name.assembly)?
            .types
            .get_mut(type_path)?
            .methods
            .get_mut(signature)
    }

    fn check_acyclic(&self, ty: &TypeDef) -> Result<(), MetadataError> {
        let mut seen = HashSet::new();
        let mut current = Some(ty);
        while let Some(t) = current {
            if !seen.insert(&t.name) {
                return Err(MetadataError::InheritanceCycle(ty.name.clone()));
            }
            current = t.base.as_ref().and_then(|b| self.type_def(b));
        }
        Ok(())
    }

    pub fn assemblies(&self) -> impl Iterator<Item = &Assembly> {
        self.assemblies.values()
    }

    pub fn assembly(&self, name: &str) -> Option<&Assembly> {
        self.assemblies.get(name)
    }

    pub fn entry_point(&self) -> Option<&QualifiedName> {
        self.entry_point.as_ref()
    }

    /// Look up a type by its qualified name (member part is ignored).
    pub fn type_def(&self, name: &QualifiedName) -> Option<&TypeDef> {
        let type_path = name.type_path.as_deref()?;
        self.assemblies.get(&name.assembly)?.type_def(type_path)
    }

    pub fn method(&self, name: &QualifiedName) -> Option<&MethodDef> {
        let signature = name.member.as_deref()?;
        self.type_def(name)?.method(signature)
    }

    /// Ancestors of `ty`, root first, excluding `ty` itself.
    pub fn ancestors(&self, ty: &TypeDef) -> Vec<&TypeDef> {
        let mut chain = Vec::new();
        let mut current = ty.base.as_ref().and_then(|b| self.type_def(b));
        while let Some(t) = current {
            if chain.len() > self.type_count() {
                break;
            }
            chain.push(t);
            current = t.base.as_ref().and_then(|b| self.type_def(b));
        }
        chain.reverse();
        chain
    }

    pub fn is_interface_method(&self, name: &QualifiedName) -> bool {
        self.type_def(name).is_some_and(|t| t.is_interface)
    }

    /// Every assembly reachable through references from `assembly`, in discovery order.
    pub fn transitive_references(&self, assembly: &str) -> Vec<&str> {
        let mut seen: HashSet<&str> = HashSet::from([assembly]);
        let mut out = Vec::new();
        let mut stack: Vec<&str> = match self.assemblies.get(assembly) {
            Some(asm) => asm.references.iter().rev().map(String::as_str).collect(),
            None => return out,
        };

        while let Some(name) = stack.pop() {
            if !seen.insert(name) {
                continue;
            }
            out.push(name);
            if let Some(asm) = self.assemblies.get(name) {
                stack.extend(asm.references.iter().rev().map(String::as_str));
            }
        }
        out
    }

    /// Assemblies ordered so that every assembly follows the ones it references.
    ///
    /// Reference cycles are broken at the back edge; ties keep program order.
    pub fn dependency_order(&self) -> Vec<&Assembly> {
        fn visit<'a>(
            program: &'a Program,
            asm: &'a Assembly,
            visited: &mut HashSet<&'a str>,
            out: &mut Vec<&'a Assembly>,
        ) {
            if !visited.insert(asm.name.as_str()) {
                return;
            }
            for reference in &asm.references {
                if let Some(dep) = program.assemblies.get(reference) {
                    visit(program, dep, visited, out);
                }
            }
            out.push(asm);
        }

        let mut visited = HashSet::new();
        let mut out = Vec::with_capacity(self.assemblies.len());
        for asm in self.assemblies.values() {
            visit(self, asm, &mut visited, &mut out);
        }
        out
    }

    fn type_count(&self) -> usize {
        self.assemblies.values().map(|a| a.types.len()).sum()
    }
}

impl Assembly {
    pub fn types(&self) -> impl Iterator<Item = &TypeDef> {
        self.types.values()
    }

    /// Types marked reachable, in definition order.
    pub fn used_types(&self) -> impl Iterator<Item = &TypeDef> {
        self.types.values().filter(|t| t.used)
    }

    pub fn type_def(&self, reflection_name: &str) -> Option<&TypeDef> {
        self.types.get(reflection_name)
    }

    pub fn qualified_name(&self) -> QualifiedName {
        QualifiedName::assembly(self.name.clone())
    }
}

impl TypeDef {
    fn from_raw(assembly: &str, raw: RawType) -> Result<Self, MetadataError> {
        let name = QualifiedName::of_type(assembly, raw.name.clone());
        let base = raw
            .base
            .map(|b| QualifiedName::of_type(b.assembly, b.type_name));

        let members = |list: Vec<RawMember>, kind: DefKind| -> Vec<MemberDef> {
            list.into_iter()
                .map(|m| MemberDef {
                    name: QualifiedName::of_member(assembly, raw.name.clone(), m.name.clone()),
                    short_name: m.name,
                    kind,
                    is_static: m.is_static,
                    used: m.used,
                })
                .collect()
        };

        let fields = members(raw.fields, DefKind::Field);
        let events = members(raw.events, DefKind::Event);
        let properties = members(raw.properties, DefKind::Property);

        let mut methods = IndexMap::new();
        for raw_method in raw.methods {
            let method = MethodDef::from_raw(&name, raw_method);
            let key = method.signature().to_owned();
            if methods.contains_key(&key) {
                return Err(MetadataError::DuplicateMethod(method.name));
            }
            methods.insert(key, method);
        }

        Ok(Self {
            name,
            base,
            is_interface: raw.interface,
            generic_arity: raw.generic_arity,
            used: raw.used,
            fields,
            events,
            properties,
            methods,
        })
    }

    /// Reflection name of the type (the type path of its qualified name).
    pub fn reflection_name(&self) -> &str {
        self.name.type_path.as_deref().unwrap_or_default()
    }

    pub fn methods(&self) -> impl Iterator<Item = &MethodDef> {
        self.methods.values()
    }

    pub fn used_methods(&self) -> impl Iterator<Item = &MethodDef> {
        self.methods.values().filter(|m| m.used)
    }

    pub fn method(&self, signature: &str) -> Option<&MethodDef> {
        self.methods.get(signature)
    }

    /// Used fields, events and properties, in that order.
    pub fn used_members(&self) -> impl Iterator<Item = &MemberDef> {
        self.fields
            .iter()
            .chain(&self.events)
            .chain(&self.properties)
            .filter(|m| m.used)
    }

    pub fn is_generic(&self) -> bool {
        self.generic_arity > 0
    }
}

impl MethodDef {
    fn from_raw(declaring: &QualifiedName, raw: RawMethod) -> Self {
        let name = QualifiedName {
            member: Some(raw.signature),
            ..declaring.clone()
        };
        Self {
            name,
            short_name: raw.name,
            is_static: raw.is_static,
            flags: MethodFlags::from_raw(&raw.flags),
            params: raw.params,
            used: raw.used,
            overrides: raw.overrides,
            attributes: raw.attributes,
            body: raw.body,
        }
    }

    pub fn signature(&self) -> &str {
        self.name.member.as_deref().unwrap_or_default()
    }

    /// Identity of the virtual slot this method occupies.
    ///
    /// Overrides share the identity of the method that introduced the slot,
    /// however many levels up it sits.
    pub fn slot_identity(&self) -> &QualifiedName {
        self.overrides.as_ref().unwrap_or(&self.name)
    }

    pub fn is_any_constructor(&self) -> bool {
        self.flags.is_constructor || self.flags.is_static_constructor
    }

    pub fn weight(&self) -> u32 {
        self.body.as_ref().map_or(0, |b| b.weight)
    }

    pub fn calls(&self) -> &[QualifiedName] {
        match &self.body {
            Some(body) => &body.calls,
            None => &[],
        }
    }
}
