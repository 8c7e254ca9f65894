//! Output files and the shared runtime, startup and load-order artifacts.

use indexmap::IndexMap;
use strata_script::{Expr, Script, Stmt, print_script};

use super::units::UnitReport;

pub const RUNTIME_PATH: &str = "runtime.js";
pub const STARTUP_PATH: &str = "startup.js";
pub const INITIAL_PATH: &str = "initial.js";
pub const LOAD_ORDER_PATH: &str = "manifest.txt";

const RUNTIME: &str = include_str!("runtime.js");

/// Name of the runtime object every artifact receives as `$`.
pub const RUNTIME_OBJECT: &str = "$strata";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Artifact {
    /// Relative to the output directory, `/`-separated.
    pub path: String,
    pub contents: String,
}

impl Artifact {
    pub fn new(path: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
        }
    }
}

/// Everything one compilation produced.
#[derive(Clone, Debug, Default)]
pub struct BuildOutput {
    /// Artifacts to write. Skipped assemblies contribute none.
    pub artifacts: Vec<Artifact>,
    pub units: Vec<UnitReport>,
}

impl BuildOutput {
    pub fn artifact(&self, path: &str) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.path == path)
    }
}

pub fn runtime() -> Artifact {
    Artifact::new(RUNTIME_PATH, RUNTIME)
}

/// One `(function ($) { ... })($strata);` per section.
pub fn wrap(sections: impl IntoIterator<Item = Vec<Stmt>>) -> String {
    let mut script = Script::new().strict();
    for body in sections {
        script.push(
            Expr::function(&["$"], body)
                .call(vec![Expr::ident(RUNTIME_OBJECT)])
                .stmt(),
        );
    }
    print_script(&script)
}

/// Registers on-demand trace locations, then runs the entry point.
///
/// Outside debug builds the entry point runs under a top-level error handler.
pub fn startup(
    entry_assembly: Option<&str>,
    locations: &IndexMap<String, String>,
    debug: bool,
) -> Artifact {
    let runtime = || Expr::ident("$");
    let mut body = Vec::new();

    if !locations.is_empty() {
        let table = Expr::object(
            locations
                .iter()
                .map(|(trace, path)| (trace.clone(), Expr::str(path.clone()))),
        );
        body.push(runtime().member("locate").call(vec![table]).stmt());
    }

    if let Some(assembly) = entry_assembly {
        let entry = runtime()
            .member("assembly")
            .call(vec![Expr::str(assembly)])
            .member("$entry");
        body.push(Stmt::var("entry", entry));

        let run = Expr::ident("entry").call(vec![]).stmt();
        if debug {
            body.push(run);
        } else {
            body.push(Stmt::Try {
                body: vec![run],
                param: "e".into(),
                handler: vec![runtime().member("uncaught").call(vec![Expr::ident("e")]).stmt()],
            });
        }
    }

    Artifact::new(STARTUP_PATH, wrap([body]))
}

/// One path per line: runtime, assemblies with their fragments, initial trace, startup.
pub fn load_order(assembly_paths: &[String], has_initial: bool) -> Artifact {
    let mut lines = vec![RUNTIME_PATH.to_owned()];
    lines.extend(assembly_paths.iter().cloned());
    if has_initial {
        lines.push(INITIAL_PATH.to_owned());
    }
    lines.push(STARTUP_PATH.to_owned());

    let mut contents = lines.join("\n");
    contents.push('\n');
    Artifact::new(LOAD_ORDER_PATH, contents)
}
