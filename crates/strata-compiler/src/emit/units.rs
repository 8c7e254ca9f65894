//! Per-assembly unit reports, used by drivers to skip up-to-date assemblies.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use strata_core::Program;

use crate::config::CompileOptions;

/// What one compiled assembly produced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitReport {
    pub assembly: String,
    /// Changes whenever the assembly, anything it references, or the options change.
    pub fingerprint: u32,
    /// Primary artifact, relative to the output directory.
    pub artifact: String,
    pub types: Vec<TypeReport>,
    /// Traces owning definitions of this assembly; empty outside traced builds.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub traces: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inlined: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeReport {
    pub name: String,
    pub slot: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,
}

/// Fingerprint of every assembly, in program order.
///
/// Referenced assemblies are hashed first so a change propagates to every dependent.
pub fn fingerprints(program: &Program, options: &CompileOptions) -> IndexMap<String, u32> {
    let digest = options.digest();
    let mut done: IndexMap<&str, u32> = IndexMap::new();

    for asm in program.dependency_order() {
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&digest.to_le_bytes());
        hasher.update(&asm.content_hash.to_le_bytes());
        for reference in &asm.references {
            let upstream = done.get(reference.as_str()).copied().unwrap_or_default();
            hasher.update(reference.as_bytes());
            hasher.update(&upstream.to_le_bytes());
        }
        done.insert(&asm.name, hasher.finalize());
    }

    program
        .assemblies()
        .map(|asm| {
            let fingerprint = done.get(asm.name.as_str()).copied().unwrap_or_default();
            (asm.name.clone(), fingerprint)
        })
        .collect()
}
