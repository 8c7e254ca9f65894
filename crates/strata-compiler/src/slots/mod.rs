//! Symbol slot compaction.
//!
//! Two scope kinds share one allocator:
//! - assembly scope: type slots, referenced-assembly slots, intrinsic slots
//! - type scope: member slots seeded with every ancestor's members, plus a
//!   lazily created nested scope for promoted string literals

mod allocator;
mod scope;

#[cfg(test)]
mod scope_tests;

pub use allocator::{Intrinsic, SlotAllocator, SlotKey, SlotStyle, UnregisteredSlot};
pub use scope::{AssemblyScope, TypeScope};
