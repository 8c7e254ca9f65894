#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core data structures for strata: definition identity and the program model.
//!
//! Two layers:
//! - **Deserialization layer** (`Raw*`): 1:1 mapping to the program JSON produced by the front end
//! - **Analysis layer** (`Program`): name-indexed, validated, ordered structures
//!
//! Qualified names are the only keys shared between compiler subsystems.

mod identity;
mod metadata;
mod raw;
pub mod utils;

#[cfg(test)]
mod metadata_tests;
#[cfg(test)]
mod utils_tests;

pub use identity::{DefKind, NameKind, QualifiedName};
pub use metadata::{Assembly, MemberDef, MetadataError, MethodDef, MethodFlags, Program, TypeDef};
pub use raw::{
    Attribute, MethodBody, MethodFlag, RawAssembly, RawMember, RawMethod, RawProgram, RawType,
    RawTypeRef,
};
