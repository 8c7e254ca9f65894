use std::fmt::Write as _;
use std::path::PathBuf;

use strata_compiler::CompileOptions;
use strata_compiler::traces::{TraceFlavor, TraceRegistry};

use super::loader::{Failure, ManifestArg, fail, load_program, open_session, prepare, report};

pub struct TracesArgs {
    pub program: PathBuf,
    /// Always a traced configuration.
    pub options: CompileOptions,
    pub manifests: Vec<ManifestArg>,
    pub color: bool,
}

pub fn run(args: TracesArgs) {
    match render(&args) {
        Ok(text) => print!("{text}"),
        Err(failure) => fail(failure),
    }
}

pub fn render(args: &TracesArgs) -> Result<String, Failure> {
    let program = load_program(&args.program)?;
    let mut session = open_session(&program, args.options.clone(), &args.manifests, args.color)?;
    prepare(&mut session, args.color)?;

    report(session.diagnostics(), session.sources(), false, args.color);
    Ok(dump(session.registry()))
}

fn flavor(flavor: TraceFlavor) -> &'static str {
    match flavor {
        TraceFlavor::Initial => "initial",
        TraceFlavor::OnDemand => "on demand",
        TraceFlavor::Remainder => "remainder",
    }
}

fn dump(registry: &TraceRegistry) -> String {
    let mut out = String::new();
    for trace in registry.traces() {
        let _ = writeln!(out, "trace {} ({})", trace.name, flavor(trace.flavor));
        if trace.is_empty() {
            out.push_str("  (empty)\n");
            continue;
        }
        for asm in trace.assemblies() {
            let _ = writeln!(out, "  assembly [{asm}]");
        }
        for (ty, _) in trace.types().filter(|(_, t)| t.structure) {
            let _ = writeln!(out, "  type {ty}");
        }
        for method in trace.methods() {
            let _ = writeln!(out, "  method {method}");
        }
    }
    out
}
