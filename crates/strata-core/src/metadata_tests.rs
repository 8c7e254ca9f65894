use indoc::indoc;

use crate::{MetadataError, Program, QualifiedName};

const LAYERED: &str = indoc! {r#"
    {
      "entry_point": { "assembly": "App", "type": "App.Main", "member": "Void Run()" },
      "assemblies": [
        {
          "name": "App",
          "references": ["Lib"],
          "types": [
            {
              "name": "App.Main",
              "base": { "assembly": "Lib", "type": "Lib.Widget" },
              "fields": [{ "name": "count", "static": true }],
              "methods": [
                { "signature": "Void Run()", "name": "Run", "static": true,
                  "body": { "weight": 2 } },
                { "signature": "Void Draw()", "name": "Draw", "flags": ["virtual"],
                  "overrides": { "assembly": "Lib", "type": "Lib.Widget", "member": "Void Draw()" } }
              ]
            }
          ]
        },
        {
          "name": "Lib",
          "references": ["Core"],
          "types": [
            {
              "name": "Lib.Widget",
              "base": { "assembly": "Core", "type": "System.Object" },
              "methods": [
                { "signature": "Void Draw()", "name": "Draw", "flags": ["virtual", "abstract"] }
              ]
            }
          ]
        },
        {
          "name": "Core",
          "defines_metadata": true,
          "types": [
            { "name": "System.Object" },
            { "name": "System.Unused", "used": false }
          ]
        }
      ]
    }
"#};

#[test]
fn indexes_program() {
    let program = Program::from_json(LAYERED).unwrap();

    let names: Vec<_> = program.assemblies().map(|a| a.name.as_str()).collect();
    assert_eq!(names, ["App", "Lib", "Core"]);

    let core = program.assembly("Core").unwrap();
    assert!(core.defines_metadata);
    assert_eq!(core.used_types().count(), 1);

    let run = program
        .method(&QualifiedName::of_member("App", "App.Main", "Void Run()"))
        .unwrap();
    assert!(run.is_static);
    assert_eq!(run.weight(), 2);
    assert_eq!(program.entry_point(), Some(&run.name));
}

#[test]
fn ancestors_are_root_first() {
    let program = Program::from_json(LAYERED).unwrap();
    let main = program
        .type_def(&QualifiedName::of_type("App", "App.Main"))
        .unwrap();

    let chain: Vec<_> = program
        .ancestors(main)
        .into_iter()
        .map(|t| t.name.to_string())
        .collect();
    assert_eq!(chain, ["[Core]System.Object", "[Lib]Lib.Widget"]);
}

#[test]
fn override_shares_slot_identity() {
    let program = Program::from_json(LAYERED).unwrap();
    let draw = program
        .method(&QualifiedName::of_member("App", "App.Main", "Void Draw()"))
        .unwrap();
    assert!(draw.flags.is_virtual);
    assert_eq!(
        draw.slot_identity(),
        &QualifiedName::of_member("Lib", "Lib.Widget", "Void Draw()")
    );
}

#[test]
fn dependency_order_puts_references_first() {
    let program = Program::from_json(LAYERED).unwrap();
    let order: Vec<_> = program
        .dependency_order()
        .into_iter()
        .map(|a| a.name.as_str())
        .collect();
    assert_eq!(order, ["Core", "Lib", "App"]);
}

#[test]
fn transitive_references_follow_chain() {
    let program = Program::from_json(LAYERED).unwrap();
    assert_eq!(program.transitive_references("App"), ["Lib", "Core"]);
    assert!(program.transitive_references("Core").is_empty());
}

#[test]
fn content_hash_differs_per_assembly() {
    let program = Program::from_json(LAYERED).unwrap();
    let app = program.assembly("App").unwrap().content_hash;
    let lib = program.assembly("Lib").unwrap().content_hash;
    assert_ne!(app, lib);

    let again = Program::from_json(LAYERED).unwrap();
    assert_eq!(again.assembly("App").unwrap().content_hash, app);
}

#[test]
fn unknown_base_is_rejected() {
    let json = indoc! {r#"
        { "assemblies": [{ "name": "A", "types": [
            { "name": "T", "base": { "assembly": "A", "type": "Missing" } }
        ] }] }
    "#};
    let err = Program::from_json(json).unwrap_err();
    assert!(matches!(err, MetadataError::UnknownBase { .. }));
    assert_eq!(err.to_string(), "type `[A]T` extends unknown type `[A]Missing`");
}

#[test]
fn unknown_reference_is_rejected() {
    let json = r#"{ "assemblies": [{ "name": "A", "references": ["B"] }] }"#;
    let err = Program::from_json(json).unwrap_err();
    assert_eq!(err.to_string(), "assembly `A` references unknown assembly `B`");
}

#[test]
fn inheritance_cycle_is_rejected() {
    let json = indoc! {r#"
        { "assemblies": [{ "name": "A", "types": [
            { "name": "X", "base": { "assembly": "A", "type": "Y" } },
            { "name": "Y", "base": { "assembly": "A", "type": "X" } }
        ] }] }
    "#};
    let err = Program::from_json(json).unwrap_err();
    assert!(matches!(err, MetadataError::InheritanceCycle(_)));
}

#[test]
fn duplicate_method_is_rejected() {
    let json = indoc! {r#"
        { "assemblies": [{ "name": "A", "types": [
            { "name": "T", "methods": [
                { "signature": "Void M()", "name": "M" },
                { "signature": "Void M()", "name": "M" }
            ] }
        ] }] }
    "#};
    let err = Program::from_json(json).unwrap_err();
    assert_eq!(err.to_string(), "method `[A]T::Void M()` is defined more than once");
}

#[test]
fn missing_entry_point_is_rejected() {
    let json = indoc! {r#"
        { "entry_point": { "assembly": "A", "type": "T", "member": "Void Main()" },
          "assemblies": [{ "name": "A", "types": [{ "name": "T" }] }] }
    "#};
    let err = Program::from_json(json).unwrap_err();
    assert!(matches!(err, MetadataError::UnknownEntryPoint(_)));
}

#[test]
fn malformed_json_is_reported() {
    let err = Program::from_json("{ \"assemblies\": 3 }").unwrap_err();
    assert!(matches!(err, MetadataError::Json(_)));
}

const OVERRIDE_CHAIN: &str = indoc! {r#"
    { "assemblies": [{ "name": "A", "types": [
        { "name": "Base", "methods": [
            { "signature": "Void M()", "name": "M", "flags": ["virtual"] }
        ] },
        { "name": "Mid", "base": { "assembly": "A", "type": "Base" }, "methods": [
            { "signature": "Void M()", "name": "M", "flags": ["virtual"],
              "overrides": { "assembly": "A", "type": "Base", "member": "Void M()" } }
        ] },
        { "name": "Leaf", "base": { "assembly": "A", "type": "Mid" }, "methods": [
            { "signature": "Void M()", "name": "M", "flags": ["virtual"],
              "overrides": { "assembly": "A", "type": "Mid", "member": "Void M()" } }
        ] }
    ] }] }
"#};

#[test]
fn override_chain_resolves_to_introducing_method() {
    let program = Program::from_json(OVERRIDE_CHAIN).unwrap();
    let root = QualifiedName::of_member("A", "Base", "Void M()");

    for ty in ["Mid", "Leaf"] {
        let method = program
            .method(&QualifiedName::of_member("A", ty, "Void M()"))
            .unwrap();
        assert_eq!(method.slot_identity(), &root);
    }
}

#[test]
fn override_outside_ancestry_is_rejected() {
    let json = indoc! {r#"
        { "assemblies": [{ "name": "A", "types": [
            { "name": "X", "methods": [
                { "signature": "Void M()", "name": "M", "flags": ["virtual"] }
            ] },
            { "name": "Y", "methods": [
                { "signature": "Void M()", "name": "M",
                  "overrides": { "assembly": "A", "type": "X", "member": "Void M()" } }
            ] }
        ] }] }
    "#};
    let err = Program::from_json(json).unwrap_err();
    assert!(matches!(err, MetadataError::OverrideOutsideAncestry { .. }));
    assert_eq!(
        err.to_string(),
        "method `[A]Y::Void M()` overrides `[A]X::Void M()`, which no ancestor of its type declares"
    );
}
