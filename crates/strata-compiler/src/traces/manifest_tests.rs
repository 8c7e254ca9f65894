use indoc::indoc;

use super::{Claim, parse_manifest};
use crate::{Error, SourceMap};

fn parse(text: &str) -> Result<Vec<Claim>, Error> {
    let mut sources = SourceMap::new();
    let id = sources.add("core.trace", text);
    parse_manifest(&sources, id).map(|ds| ds.into_iter().map(|d| d.claim).collect())
}

fn parse_err(text: &str) -> String {
    parse(text).unwrap_err().to_string()
}

#[test]
fn parses_all_directives() {
    let claims = parse(indoc! {r#"
        // bootstrap
        ClaimAssembly("Core")
        ClaimType("App", "App.Main"); ClaimMethod("App", "App.Main", "Void Run()")

        # trailing comment
    "#})
    .unwrap();

    assert_eq!(
        claims,
        [
            Claim::Assembly("Core".into()),
            Claim::Type {
                assembly: "App".into(),
                ty: "App.Main".into(),
            },
            Claim::Method {
                assembly: "App".into(),
                ty: "App.Main".into(),
                method: "Void Run()".into(),
            },
        ]
    );
}

#[test]
fn records_line_and_span() {
    let mut sources = SourceMap::new();
    let text = "\n\n  ClaimAssembly(\"Core\")\n";
    let id = sources.add("core.trace", text);

    let directives = parse_manifest(&sources, id).unwrap();
    assert_eq!(directives[0].line, 3);
    assert_eq!(&text[directives[0].span.range.clone()], "ClaimAssembly(\"Core\")");
    assert_eq!(directives[0].location("core.trace").to_string(), "core.trace:3");
}

#[test]
fn empty_manifest_has_no_directives() {
    assert!(parse("// nothing here\n\n").unwrap().is_empty());
    assert!(parse("").unwrap().is_empty());
}

#[test]
fn unknown_directive() {
    assert_eq!(
        parse_err("\nClaimEverything(\"A\")"),
        "core.trace:2: unknown directive `ClaimEverything`; expected ClaimAssembly, ClaimType or ClaimMethod"
    );
}

#[test]
fn wrong_arity() {
    assert_eq!(
        parse_err(r#"ClaimType("App")"#),
        "core.trace:1: `ClaimType` takes 2 argument(s), found 1"
    );
    assert_eq!(
        parse_err("ClaimAssembly()"),
        "core.trace:1: `ClaimAssembly` takes 1 argument(s), found 0"
    );
}

#[test]
fn missing_parenthesis() {
    assert_eq!(
        parse_err(r#"ClaimAssembly "Core""#),
        "core.trace:1: expected `(` after `ClaimAssembly`"
    );
    assert_eq!(
        parse_err(r#"ClaimAssembly("Core""#),
        "core.trace:1: unclosed `(` in `ClaimAssembly`"
    );
}

#[test]
fn arguments_must_be_strings() {
    assert_eq!(
        parse_err("ClaimAssembly(Core)"),
        "core.trace:1: expected a string argument"
    );
    assert_eq!(
        parse_err(r#"ClaimType("A" "B")"#),
        "core.trace:1: expected `,` or `)`"
    );
}

#[test]
fn two_directives_on_one_line_need_a_separator() {
    assert_eq!(
        parse_err(r#"ClaimAssembly("A") ClaimAssembly("B")"#),
        "core.trace:1: unexpected `ClaimAssembly` after directive"
    );
}

#[test]
fn stray_input_is_rejected() {
    assert_eq!(
        parse_err("@@"),
        "core.trace:1: expected a directive, found `@@`"
    );
}

#[test]
fn escapes_are_decoded() {
    let claims = parse(r#"ClaimType("App", "Outer\"Inner")"#).unwrap();
    assert_eq!(
        claims,
        [Claim::Type {
            assembly: "App".into(),
            ty: "Outer\"Inner".into(),
        }]
    );
}

#[test]
fn syntax_error_carries_location() {
    let err = parse("\n\nClaimType(").unwrap_err();
    let at = err.location().unwrap();
    assert_eq!(at.manifest, "core.trace");
    assert_eq!(at.line, 3);
}
