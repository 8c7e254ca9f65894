//! Inlining eligibility and memoized cost analysis.

mod cost;
mod gate;

#[cfg(test)]
mod cost_tests;

pub use cost::{Decision, InlineAnalyzer};
pub use gate::{CallGraph, Rejection, check};

use strata_core::Program;

use crate::diagnostics::{DiagnosticKind, Diagnostics};

/// Warn about call targets missing from the program.
///
/// Such calls stay calls: the missing target is never inlinable.
pub fn report_unresolved_calls(program: &Program, diags: &mut Diagnostics) {
    for asm in program.assemblies() {
        for ty in asm.used_types() {
            for method in ty.used_methods() {
                for callee in method.calls() {
                    if program.method(callee).is_none() {
                        diags
                            .report(DiagnosticKind::UnresolvedCall)
                            .message(callee.to_string())
                            .emit();
                    }
                }
            }
        }
    }
}
