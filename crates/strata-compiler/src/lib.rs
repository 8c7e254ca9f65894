//! strata compiler: the bundle back end.
//!
//! - `slots` - collision-free short names per assembly and per type scope
//! - `traces` - manifest parsing and the definition-to-bundle partition
//! - `inline` - inlining eligibility and memoized cost analysis
//! - `emit` - placement strategies, the orchestrator and output artifacts
//! - `session` - the compilation session threading all of the above
//! - `diagnostics` - non-fatal reporting

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod attributes;
pub mod config;
pub mod diagnostics;
pub mod emit;
pub mod inline;
pub mod session;
pub mod slots;
pub mod source;
pub mod traces;

#[cfg(test)]
pub mod test_utils;

#[cfg(test)]
mod attributes_tests;

use strata_core::{MetadataError, QualifiedName};

pub use config::{CompileMode, CompileOptions};
pub use diagnostics::{DiagnosticKind, Diagnostics, DiagnosticsPrinter, Severity};
pub use emit::{Artifact, BuildOutput, UnitReport};
pub use session::Session;
pub use source::{SourceId, SourceMap, Span};

/// Result type for passes that produce both output and diagnostics.
///
/// Diagnostics never abort; fatal conditions use the outer `Result`.
pub type PassResult<T> = std::result::Result<(T, Diagnostics), Error>;

/// Where in a manifest a fatal error was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestLocation {
    pub manifest: String,
    pub line: usize,
    pub span: Span,
}

impl std::fmt::Display for ManifestLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.manifest, self.line)
    }
}

/// Fatal errors: user configuration errors and internal invariant violations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{at}: {message}")]
    ManifestSyntax {
        at: ManifestLocation,
        message: String,
    },

    #[error("{at}: unknown assembly `{name}`")]
    UnknownAssembly { at: ManifestLocation, name: String },

    #[error("{at}: unknown type `{name}`")]
    UnknownType {
        at: ManifestLocation,
        name: QualifiedName,
    },

    #[error("{at}: unknown method `{name}`")]
    UnknownMethod {
        at: ManifestLocation,
        name: QualifiedName,
    },

    #[error("trace `{0}` is defined more than once")]
    DuplicateTrace(String),

    #[error("traces `{first}` and `{second}` would both be written to `{path}`")]
    TraceArtifactCollision {
        first: String,
        second: String,
        path: String,
    },

    #[error("invalid entry point `{name}`: {reason}")]
    InvalidEntryPoint {
        name: QualifiedName,
        reason: &'static str,
    },

    #[error(transparent)]
    Metadata(#[from] MetadataError),

    /// Invariant violation inside the compiler, never caused by input.
    #[error("{0}")]
    Internal(String),
}

impl Error {
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }

    /// Manifest location, for errors raised while loading traces.
    pub fn location(&self) -> Option<&ManifestLocation> {
        match self {
            Self::ManifestSyntax { at, .. }
            | Self::UnknownAssembly { at, .. }
            | Self::UnknownType { at, .. }
            | Self::UnknownMethod { at, .. } => Some(at),
            _ => None,
        }
    }
}

impl From<slots::UnregisteredSlot> for Error {
    fn from(err: slots::UnregisteredSlot) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Result type for compiler operations.
pub type Result<T> = std::result::Result<T, Error>;
