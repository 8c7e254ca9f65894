use std::cell::Cell;

use strata_core::{MethodDef, Program, QualifiedName};

use super::{CallGraph, Decision, InlineAnalyzer, Rejection};
use crate::test_utils::{ProgramBuilder, method};

/// Counts how often a method's own weight is read.
struct Counting<'p> {
    program: &'p Program,
    weights: Cell<usize>,
}

impl CallGraph for Counting<'_> {
    fn method(&self, name: &QualifiedName) -> Option<&MethodDef> {
        self.program.method(name)
    }

    fn is_interface_method(&self, name: &QualifiedName) -> bool {
        self.program.is_interface_method(name)
    }

    fn is_entry_point(&self, name: &QualifiedName) -> bool {
        self.program.entry_point() == Some(name)
    }

    fn weight(&self, method: &MethodDef) -> u32 {
        self.weights.set(self.weights.get() + 1);
        method.weight()
    }
}

/// `a` calls `b` calls `c`.
fn chain() -> Program {
    ProgramBuilder::new()
        .assembly("App", |a| {
            a.ty("App.Chain", |t| {
                t.method("Void a()", |m| m.weight(2).calls("App", "App.Chain", "Void b()"))
                    .method("Void b()", |m| m.weight(4).calls("App", "App.Chain", "Void c()"))
                    .method("Void c()", |m| m.weight(3))
            })
        })
        .build()
}

fn chain_method(name: &str) -> QualifiedName {
    method("App", "App.Chain", &format!("Void {name}()"))
}

#[test]
fn leaf_below_threshold_is_inlinable() {
    let program = chain();
    let mut analyzer = InlineAnalyzer::new(6, true);
    assert_eq!(analyzer.cost_of(&program, &chain_method("c")), Some(3));
    assert!(analyzer.is_inlinable(&program, &chain_method("c")));
}

#[test]
fn callee_costs_fold_transitively() {
    let program = chain();
    let mut analyzer = InlineAnalyzer::new(6, true);

    assert_eq!(analyzer.cost_of(&program, &chain_method("b")), Some(6));
    assert!(analyzer.is_inlinable(&program, &chain_method("b")));

    assert_eq!(analyzer.cost_of(&program, &chain_method("a")), Some(2 + 5));
    assert!(!analyzer.is_inlinable(&program, &chain_method("a")));
}

#[test]
fn expensive_callee_stays_a_call() {
    let program = chain();
    let mut analyzer = InlineAnalyzer::new(5, true);

    // b = 4 + 2 = 6 > 5: the call to b costs nothing extra.
    assert!(!analyzer.is_inlinable(&program, &chain_method("b")));
    assert_eq!(analyzer.cost_of(&program, &chain_method("a")), Some(2));
}

#[test]
fn memoized_cost_is_not_recomputed() {
    let program = chain();
    let graph = Counting {
        program: &program,
        weights: Cell::new(0),
    };
    let mut analyzer = InlineAnalyzer::new(6, true);

    let first = analyzer.cost_of(&graph, &chain_method("a"));
    let reads = graph.weights.get();
    assert_eq!(reads, 3);

    let second = analyzer.cost_of(&graph, &chain_method("a"));
    assert_eq!(first, second);
    assert_eq!(graph.weights.get(), reads);

    analyzer.cost_of(&graph, &chain_method("c"));
    assert_eq!(graph.weights.get(), reads);
}

#[test]
fn force_inline_bypasses_size_only() {
    let program = ProgramBuilder::new()
        .assembly("App", |a| {
            a.ty("App.Big", |t| {
                t.method("Void Huge()", |m| m.weight(100).attr("ForceInline", &[]))
                    .method("Void Spin()", |m| {
                        m.weight(1)
                            .attr("ForceInline", &[])
                            .calls("App", "App.Big", "Void Spin()")
                    })
            })
        })
        .build();
    let mut analyzer = InlineAnalyzer::new(6, true);

    assert!(analyzer.is_inlinable(&program, &method("App", "App.Big", "Void Huge()")));
    assert_eq!(
        analyzer.decide(&program, &method("App", "App.Big", "Void Spin()")),
        Decision::Rejected(Rejection::SelfRecursive)
    );
}

#[test]
fn mutual_recursion_terminates() {
    let program = ProgramBuilder::new()
        .assembly("App", |a| {
            a.ty("App.Ping", |t| {
                t.method("Void ping()", |m| m.weight(1).calls("App", "App.Ping", "Void pong()"))
                    .method("Void pong()", |m| m.weight(1).calls("App", "App.Ping", "Void ping()"))
            })
        })
        .build();
    let mut analyzer = InlineAnalyzer::new(10, true);
    let ping = method("App", "App.Ping", "Void ping()");
    let pong = method("App", "App.Ping", "Void pong()");

    assert_eq!(analyzer.cost_of(&program, &ping), Some(1));
    assert_eq!(
        analyzer.decide(&program, &pong),
        Decision::Rejected(Rejection::MutualRecursion)
    );
    // Only one side of the cycle may be inlined.
    assert!(analyzer.is_inlinable(&program, &ping));
    assert!(!analyzer.is_inlinable(&program, &pong));
}

#[test]
fn unknown_callee_is_a_plain_call() {
    let program = ProgramBuilder::new()
        .assembly("App", |a| {
            a.ty("App.Util", |t| {
                t.method("Void Caller()", |m| m.weight(2).calls("App", "App.Util", "Void Gone()"))
            })
        })
        .build();
    let mut analyzer = InlineAnalyzer::new(6, true);
    assert_eq!(analyzer.cost_of(&program, &method("App", "App.Util", "Void Caller()")), Some(2));
}

#[test]
fn disabled_analyzer_inlines_nothing() {
    let program = chain();
    let mut analyzer = InlineAnalyzer::new(6, false);
    assert!(!analyzer.is_inlinable(&program, &chain_method("c")));
    assert_eq!(analyzer.cost_of(&program, &chain_method("b")), Some(4));
}
