//! Deserialization layer: 1:1 mapping to the program JSON.
//!
//! The front end has already decided reachability (`used`), definition order,
//! per-body instruction weights and call sets. Nothing here is validated;
//! see [`Program::from_raw`](crate::Program::from_raw).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::QualifiedName;

fn yes() -> bool {
    true
}

fn one() -> u32 {
    1
}

/// Whole closed program: every assembly that takes part in the build.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawProgram {
    #[serde(default)]
    pub entry_point: Option<QualifiedName>,
    pub assemblies: Vec<RawAssembly>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawAssembly {
    pub name: String,
    #[serde(default)]
    pub references: Vec<String>,
    /// Set for the one assembly that defines the runtime metadata types.
    #[serde(default)]
    pub defines_metadata: bool,
    #[serde(default)]
    pub types: Vec<RawType>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawType {
    /// Reflection name, e.g. `System.Collections.Generic.List`1`.
    pub name: String,
    #[serde(default)]
    pub base: Option<RawTypeRef>,
    #[serde(default)]
    pub interface: bool,
    #[serde(default)]
    pub generic_arity: u32,
    #[serde(default = "yes")]
    pub used: bool,
    #[serde(default)]
    pub fields: Vec<RawMember>,
    #[serde(default)]
    pub events: Vec<RawMember>,
    #[serde(default)]
    pub properties: Vec<RawMember>,
    #[serde(default)]
    pub methods: Vec<RawMethod>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTypeRef {
    pub assembly: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

/// Field, event or property.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawMember {
    pub name: String,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default = "yes")]
    pub used: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawMethod {
    /// Signature text, unique within the declaring type (e.g. `Int32 Add(Int32, Int32)`).
    pub signature: String,
    /// Plain method name (e.g. `Add`).
    pub name: String,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default)]
    pub flags: Vec<MethodFlag>,
    #[serde(default)]
    pub params: u32,
    #[serde(default = "yes")]
    pub used: bool,
    /// Introducing method of the virtual slot this method overrides.
    #[serde(default)]
    pub overrides: Option<QualifiedName>,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub body: Option<MethodBody>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodFlag {
    Virtual,
    Abstract,
    Constructor,
    StaticConstructor,
    /// Implemented by the runtime (delegate `Invoke`, multi-dimensional array accessors).
    RuntimeSpecial,
    Extern,
}

/// Custom attribute as written in metadata: positional and named arguments, all textual.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub named: IndexMap<String, String>,
}

/// Facts about a method body computed by the front end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodBody {
    /// Local instruction-size estimate.
    pub weight: u32,
    /// One entry per call instruction, in instruction order (duplicates kept).
    #[serde(default)]
    pub calls: Vec<QualifiedName>,
    /// Return paths in the source instruction stream.
    #[serde(default = "one")]
    pub source_returns: u32,
    /// Return paths after translation to the target form.
    #[serde(default = "one")]
    pub target_returns: u32,
    /// String literals referenced by the body, in first-use order.
    #[serde(default)]
    pub strings: Vec<String>,
    /// Translated target-script statements.
    #[serde(default)]
    pub script: String,
}

impl Default for MethodBody {
    fn default() -> Self {
        Self {
            weight: 0,
            calls: Vec::new(),
            source_returns: 1,
            target_returns: 1,
            strings: Vec::new(),
            script: String::new(),
        }
    }
}
