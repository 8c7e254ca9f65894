//! Trace-based code splitting.
//!
//! Manifests claim assemblies, types and methods for named traces; the
//! registry turns the claims into a total, single-owner partition.

pub mod lexer;
mod manifest;
mod registry;

#[cfg(test)]
mod manifest_tests;

pub use manifest::{Claim, Directive, parse_manifest};
pub use registry::{REMAINDER, artifact_path, Trace, TraceFlavor, TraceId, TraceRegistry, TypeTrace};
