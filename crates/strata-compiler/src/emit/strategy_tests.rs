use strata_core::{Program, QualifiedName};

use super::{Bundle, Definition, Monolithic, OnDemand, Placement, PlacementStrategy, Traced};
use crate::test_utils::{ProgramBuilder, method};
use crate::traces::{TraceFlavor, TraceRegistry};
use crate::{Diagnostics, SourceMap};

fn program() -> Program {
    ProgramBuilder::new()
        .assembly("App", |a| {
            a.ty("App.Main", |t| {
                t.method("Void Run()", |m| m.is_static().weight(1))
                    .method("Void Helper()", |m| m.weight(1))
            })
            .ty("App.Shape", |t| t.method("Double Area()", |m| m.weight(1)))
        })
        .build()
}

/// `boot` (initial) owns `Shape`, `lazy` (on demand) owns `Helper`, the rest is remainder.
fn registry(program: &Program) -> TraceRegistry {
    let mut sources = SourceMap::new();
    let mut diags = Diagnostics::new();
    let mut registry = TraceRegistry::new();

    let boot = sources.add("boot.trace", r#"ClaimType("App", "App.Shape")"#);
    registry
        .load(program, &sources, boot, TraceFlavor::Initial, &mut diags)
        .unwrap();
    let lazy = sources.add("lazy.trace", r#"ClaimMethod("App", "App.Main", "Void Helper()")"#);
    registry
        .load(program, &sources, lazy, TraceFlavor::OnDemand, &mut diags)
        .unwrap();
    registry.finalize_remainder(program, None).unwrap();
    registry
}

#[test]
fn single_bundle_modes_ignore_ownership() {
    let name = QualifiedName::of_type("App", "App.Main");
    assert_eq!(
        Monolithic.place(Definition::Type(&name)).unwrap(),
        Placement::Inline
    );
    assert_eq!(
        OnDemand.place(Definition::Type(&name)).unwrap(),
        Placement::Cache
    );
}

#[test]
fn bootstrap_keeps_initial_and_remainder() {
    let program = program();
    let registry = registry(&program);
    let bootstrap = Traced::new(&registry, Bundle::Bootstrap);

    let shape = QualifiedName::of_type("App", "App.Shape");
    let main = QualifiedName::of_type("App", "App.Main");
    let helper = method("App", "App.Main", "Void Helper()");

    assert_eq!(bootstrap.place(Definition::Type(&shape)).unwrap(), Placement::Inline);
    assert_eq!(bootstrap.place(Definition::Type(&main)).unwrap(), Placement::Inline);
    assert_eq!(
        bootstrap.place(Definition::Method(&helper)).unwrap(),
        Placement::Redirect("lazy".into())
    );
}

#[test]
fn trace_bundle_keeps_only_its_own() {
    let program = program();
    let registry = registry(&program);
    let lazy = registry.by_name("lazy").unwrap().id;
    let strategy = Traced::new(&registry, Bundle::Trace(lazy));

    let helper = method("App", "App.Main", "Void Helper()");
    let run = method("App", "App.Main", "Void Run()");
    let shape = QualifiedName::of_type("App", "App.Shape");

    assert_eq!(strategy.place(Definition::Method(&helper)).unwrap(), Placement::Inline);
    assert_eq!(
        strategy.place(Definition::Method(&run)).unwrap(),
        Placement::Redirect("$remainder".into())
    );
    assert_eq!(
        strategy.place(Definition::Type(&shape)).unwrap(),
        Placement::Redirect("boot".into())
    );
}

#[test]
fn unassigned_definition_is_internal() {
    let registry = TraceRegistry::new();
    let strategy = Traced::new(&registry, Bundle::Bootstrap);
    let main = QualifiedName::of_type("App", "App.Main");

    let err = strategy.place(Definition::Type(&main)).unwrap_err();
    assert!(err.is_internal());
    assert_eq!(err.to_string(), "`[App]App.Main` is not assigned to any trace");
}
