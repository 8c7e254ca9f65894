#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Target-script emission for strata.
//!
//! - `ast` - the small syntax tree generated bundles are built from
//! - `printer` - deterministic rendering to script text

pub mod ast;
pub mod printer;


pub use ast::{Expr, Function, Script, Stmt};
pub use printer::{print_expr, print_script, quote};
