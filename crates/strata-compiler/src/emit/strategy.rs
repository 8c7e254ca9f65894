//! Where each definition goes, per compilation mode.
//!
//! The orchestrator walks assemblies, types and methods the same way in every
//! mode; a [`PlacementStrategy`] answers the one question that differs.

use strata_core::QualifiedName;

use crate::Error;
use crate::traces::{TraceId, TraceRegistry};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Definition<'a> {
    Type(&'a QualifiedName),
    Method(&'a QualifiedName),
}

impl Definition<'_> {
    pub fn name(&self) -> &QualifiedName {
        match self {
            Self::Type(name) | Self::Method(name) => name,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Placement {
    /// Bound directly under its slot.
    Inline,
    /// Built on first use through a lazily bound builder.
    Cache,
    /// Owned by another bundle; bound to a redirector into that trace.
    Redirect(String),
}

pub trait PlacementStrategy {
    fn place(&self, definition: Definition<'_>) -> Result<Placement, Error>;
}

pub struct Monolithic;

impl PlacementStrategy for Monolithic {
    fn place(&self, _: Definition<'_>) -> Result<Placement, Error> {
        Ok(Placement::Inline)
    }
}

pub struct OnDemand;

impl PlacementStrategy for OnDemand {
    fn place(&self, _: Definition<'_>) -> Result<Placement, Error> {
        Ok(Placement::Cache)
    }
}

/// The bundle currently being written.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bundle {
    /// Initial traces and the anonymous remainder.
    Bootstrap,
    Trace(TraceId),
}

pub struct Traced<'r> {
    registry: &'r TraceRegistry,
    bundle: Bundle,
}

impl<'r> Traced<'r> {
    pub fn new(registry: &'r TraceRegistry, bundle: Bundle) -> Self {
        Self { registry, bundle }
    }
}

impl PlacementStrategy for Traced<'_> {
    fn place(&self, definition: Definition<'_>) -> Result<Placement, Error> {
        let name = definition.name();
        let Some(owner) = self.registry.assignment_of(name) else {
            return Err(Error::Internal(format!("`{name}` is not assigned to any trace")));
        };

        let local = match self.bundle {
            Bundle::Bootstrap => owner.is_bootstrap(),
            Bundle::Trace(id) => owner.id == id,
        };
        if local {
            Ok(Placement::Inline)
        } else {
            Ok(Placement::Redirect(owner.name.clone()))
        }
    }
}
