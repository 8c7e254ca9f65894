use std::collections::HashSet;

use strata_core::{MethodFlag, Program, QualifiedName};

use super::{AssemblyScope, Intrinsic, SlotStyle, TypeScope};
use crate::test_utils::{MethodBuilder, ProgramBuilder, method};

fn layered() -> Program {
    ProgramBuilder::new()
        .assembly("Core", |a| {
            a.defines_metadata().ty("System.Object", |t| {
                t.method("String ToString()", |m| m.flag(MethodFlag::Virtual).weight(3))
            })
        })
        .assembly("App", |a| {
            a.reference("Core")
                .ty("App.Shape", |t| {
                    t.base("Core", "System.Object")
                        .field("origin")
                        .method("Void Draw()", |m| m.flag(MethodFlag::Virtual).weight(5))
                })
                .ty("App.Circle", |t| {
                    t.base("App", "App.Shape")
                        .field("radius")
                        .method("Void Draw()", |m| {
                            m.flag(MethodFlag::Virtual)
                                .overrides("App", "App.Shape", "Void Draw()")
                                .weight(9)
                        })
                        .method("Double Area()", |m| m.weight(4))
                })
                .ty("App.Unused", |t| t.unused())
        })
        .build()
}

fn type_scope(program: &Program, name: &str, friendly: Option<usize>) -> TypeScope {
    let ty = program
        .type_def(&QualifiedName::of_type("App", name))
        .unwrap();
    TypeScope::build(program, ty, SlotStyle::CaseSensitive, friendly, |_| true)
}

#[test]
fn assembly_scope_registers_used_types_and_references() {
    let program = layered();
    let app = program.assembly("App").unwrap();
    let scope = AssemblyScope::build(&program, app, SlotStyle::Lowercase, None);

    assert_eq!(scope.type_slot(&QualifiedName::of_type("App", "App.Shape")).unwrap(), "a");
    assert_eq!(scope.type_slot(&QualifiedName::of_type("App", "App.Circle")).unwrap(), "b");
    assert_eq!(scope.reference_slot("Core").unwrap(), "c");
    assert!(scope.type_slot(&QualifiedName::of_type("App", "App.Unused")).is_err());
    assert!(scope.intrinsic_slot(Intrinsic::Object).is_err());
}

#[test]
fn metadata_assembly_reserves_intrinsics() {
    let program = layered();
    let core = program.assembly("Core").unwrap();
    let scope = AssemblyScope::build(&program, core, SlotStyle::Lowercase, None);

    assert_eq!(scope.intrinsic_slot(Intrinsic::Object).unwrap(), "$o");
    assert_eq!(scope.intrinsic_slot(Intrinsic::Type).unwrap(), "$t");
    assert_eq!(
        scope.type_slot(&QualifiedName::of_type("Core", "System.Object")).unwrap(),
        "a"
    );
}

#[test]
fn derived_scope_never_reuses_ancestor_slots() {
    let program = layered();
    let shape = type_scope(&program, "App.Shape", None);
    let circle = type_scope(&program, "App.Circle", None);

    let inherited: HashSet<_> = shape.members().iter().map(|(_, s)| s.to_owned()).collect();
    let own: Vec<_> = circle
        .members()
        .iter()
        .filter(|(k, _)| !shape.members().contains(k))
        .map(|(_, s)| s.to_owned())
        .collect();

    assert_eq!(own.len(), 2);
    for slot in &own {
        assert!(!inherited.contains(slot), "{slot} collides with an ancestor slot");
    }
}

#[test]
fn inherited_members_keep_ancestor_slots() {
    let program = layered();
    let shape = type_scope(&program, "App.Shape", Some(15));
    let circle = type_scope(&program, "App.Circle", Some(15));

    for (key, slot) in shape.members().iter() {
        assert_eq!(circle.members().resolve(key).unwrap(), slot);
    }
}

#[test]
fn override_shares_the_introducing_slot() {
    let program = layered();
    let circle = type_scope(&program, "App.Circle", Some(15));
    let draw = program
        .method(&method("App", "App.Circle", "Void Draw()"))
        .unwrap();

    assert_eq!(
        circle.method_slot(draw).unwrap(),
        circle
            .member_slot(&method("App", "App.Shape", "Void Draw()"))
            .unwrap()
    );

    let rendered: Vec<_> = circle.members().iter().map(|(_, s)| s.to_owned()).collect();
    assert_eq!(rendered, ["tostring", "origin", "draw", "radius", "area"]);
}

#[test]
fn override_of_an_override_shares_the_root_slot() {
    let virt = |m: MethodBuilder| m.flag(MethodFlag::Virtual).weight(1);
    let program = ProgramBuilder::new()
        .assembly("App", |a| {
            a.ty("App.A", |t| t.method("Void M()", virt))
                .ty("App.B", |t| {
                    t.base("App", "App.A")
                        .method("Void M()", |m| virt(m).overrides("App", "App.A", "Void M()"))
                })
                .ty("App.C", |t| {
                    t.base("App", "App.B")
                        .method("Void M()", |m| virt(m).overrides("App", "App.B", "Void M()"))
                })
        })
        .build();

    let c = type_scope(&program, "App.C", None);
    let c_m = program.method(&method("App", "App.C", "Void M()")).unwrap();
    let root = c.member_slot(&method("App", "App.A", "Void M()")).unwrap();

    assert_eq!(c.method_slot(c_m).unwrap(), root);
    assert_eq!(c.members().len(), 1);
}

#[test]
fn skipped_methods_get_no_slot() {
    let program = layered();
    let ty = program
        .type_def(&QualifiedName::of_type("App", "App.Circle"))
        .unwrap();
    let scope = TypeScope::build(&program, ty, SlotStyle::CaseSensitive, None, |m| {
        m.short_name != "Area"
    });

    assert!(scope.member_slot(&method("App", "App.Circle", "Double Area()")).is_err());
}

#[test]
fn shared_literals_are_promoted() {
    let program = ProgramBuilder::new()
        .assembly("A", |a| {
            a.ty("T", |t| {
                t.method("Void One()", |m| m.weight(2).string("hello").string("once").string("hello"))
                    .method("Void Two()", |m| m.weight(2).string("hello"))
                    .method("Void Three()", |m| m.weight(2).string("bye"))
                    .method("Void Four()", |m| m.weight(2).string("bye"))
            })
            .ty("U", |t| t.method("Void Solo()", |m| m.weight(2).string("hello")))
        })
        .build();

    let t = program.type_def(&QualifiedName::of_type("A", "T")).unwrap();
    let scope = TypeScope::build(&program, t, SlotStyle::CaseSensitive, None, |_| true);
    let promoted: Vec<_> = scope.literals().collect();
    assert_eq!(promoted, [("hello", "a"), ("bye", "b")]);
    assert_eq!(scope.literal_slot("once"), None);

    let u = program.type_def(&QualifiedName::of_type("A", "U")).unwrap();
    let scope = TypeScope::build(&program, u, SlotStyle::CaseSensitive, None, |_| true);
    assert!(!scope.has_literals());
}
