//! Emission: placement strategies, the orchestrator and output artifacts.

mod artifacts;
mod orchestrator;
mod strategy;
mod units;

#[cfg(test)]
mod strategy_tests;

pub use artifacts::{
    Artifact, BuildOutput, INITIAL_PATH, LOAD_ORDER_PATH, RUNTIME_PATH, STARTUP_PATH,
};
pub use strategy::{Bundle, Definition, Monolithic, OnDemand, Placement, PlacementStrategy, Traced};
pub use units::{TypeReport, UnitReport, fingerprints};

pub(crate) use orchestrator::emit;
