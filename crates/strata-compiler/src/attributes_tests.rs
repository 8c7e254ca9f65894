use strata_core::{Attribute, MethodDef, Program};

use crate::attributes::{
    AttrValue, EXPORT, FORCE_INLINE, IMPORT, export_name, find, has, import_of, lookup, validate,
};
use crate::test_utils::{ProgramBuilder, method};
use crate::{DiagnosticKind, Diagnostics};

fn program() -> Program {
    ProgramBuilder::new()
        .assembly("App", |a| {
            a.ty("App.Api", |t| {
                t.method("Void Alert(String)", |m| m.is_static().attr("Import", &["alert"]))
                    .method("Void Query(String)", |m| {
                        m.is_static()
                            .attr_named("Import", &[("name", "querySelector"), ("module", "dom")])
                    })
                    .method("Void Log()", |m| m.is_static().attr("Import", &[]))
                    .method("Void Go()", |m| m.is_static().weight(1).attr("Export", &[]))
                    .method("Void Start()", |m| {
                        m.is_static().weight(1).attr("Export", &["start"]).attr("ForceInline", &[])
                    })
                    .method("Void Plain()", |m| m.weight(1).attr("Serializable", &["x", "y"]))
            })
        })
        .build()
}

fn get<'p>(program: &'p Program, signature: &str) -> &'p MethodDef {
    program.method(&method("App", "App.Api", signature)).unwrap()
}

fn attribute(args: &[&str], named: &[(&str, &str)]) -> Attribute {
    Attribute {
        name: "Import".into(),
        args: args.iter().map(|a| (*a).to_owned()).collect(),
        named: named
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect(),
    }
}

#[test]
fn named_argument_wins_over_positional() {
    let attr = attribute(&["positional"], &[("name", "named")]);
    assert_eq!(
        lookup(&IMPORT, &attr, "name").unwrap(),
        Some(AttrValue::Str("named".into()))
    );
}

#[test]
fn default_applies_when_absent() {
    let attr = attribute(&["alert"], &[]);
    assert_eq!(
        lookup(&IMPORT, &attr, "module").unwrap(),
        Some(AttrValue::Str("global".into()))
    );
    assert_eq!(
        lookup(&EXPORT, &attr, "name").unwrap(),
        Some(AttrValue::Str("alert".into()))
    );
}

#[test]
fn absent_without_default_is_none() {
    let attr = attribute(&[], &[]);
    assert_eq!(lookup(&IMPORT, &attr, "name").unwrap(), None);
}

#[test]
fn unknown_property_is_an_error() {
    let attr = attribute(&[], &[]);
    assert_eq!(
        lookup(&IMPORT, &attr, "bogus").unwrap_err(),
        "`Import` has no property `bogus`"
    );
}

#[test]
fn import_reads_module_and_name() {
    let program = program();

    assert_eq!(
        import_of(get(&program, "Void Alert(String)")),
        Some(("global".into(), "alert".into()))
    );
    assert_eq!(
        import_of(get(&program, "Void Query(String)")),
        Some(("dom".into(), "querySelector".into()))
    );
    assert_eq!(
        import_of(get(&program, "Void Log()")),
        Some(("global".into(), "Log".into()))
    );
    assert_eq!(import_of(get(&program, "Void Go()")), None);
}

#[test]
fn export_defaults_to_short_name() {
    let program = program();

    assert_eq!(export_name(get(&program, "Void Go()")).as_deref(), Some("Go"));
    assert_eq!(export_name(get(&program, "Void Start()")).as_deref(), Some("start"));
    assert_eq!(export_name(get(&program, "Void Plain()")), None);
}

#[test]
fn presence_checks() {
    let program = program();
    let start = get(&program, "Void Start()");

    assert!(has(start, &FORCE_INLINE));
    assert_eq!(find(start, &EXPORT).unwrap().args, ["start"]);
    assert!(!has(get(&program, "Void Plain()"), &FORCE_INLINE));
}

#[test]
fn well_formed_attributes_validate_cleanly() {
    let program = program();
    let mut diags = Diagnostics::new();
    validate(&program, &mut diags);
    assert!(diags.is_empty());
}

#[test]
fn validate_reports_malformed_attributes() {
    let program = ProgramBuilder::new()
        .assembly("App", |a| {
            a.ty("App.Api", |t| {
                t.method("Void Go()", |m| m.weight(1).attr("Export", &["go", "extra"]))
                    .method("Void Load()", |m| m.attr_named("Import", &[("modul", "dom")]))
                    .method("Void Blank()", |m| m.weight(1).attr("Export", &[" "]))
            })
        })
        .build();
    let mut diags = Diagnostics::new();
    validate(&program, &mut diags);

    let messages: Vec<_> = diags.iter().map(ToString::to_string).collect();
    assert_eq!(
        messages,
        [
            "warning: unknown attribute property: `Export` on `[App]App.Api::Void Go()` takes 1 positional argument(s), found 2",
            "warning: unknown attribute property: `Import.modul` on `[App]App.Api::Void Load()`",
            "warning: invalid attribute value: `Export.name` on `[App]App.Api::Void Blank()`: expected a non-empty name",
        ]
    );
    assert_eq!(diags.count_of(DiagnosticKind::InvalidAttributeValue), 1);
}
