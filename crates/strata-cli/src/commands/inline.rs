use std::fmt::Write as _;
use std::path::PathBuf;

use strata_compiler::inline::Decision;
use strata_compiler::{CompileOptions, Session};

use super::loader::{Failure, fail, load_program, open_session, prepare};

pub struct InlineArgs {
    pub program: PathBuf,
    pub options: CompileOptions,
    pub color: bool,
}

pub fn run(args: InlineArgs) {
    match render(&args) {
        Ok(text) => print!("{text}"),
        Err(failure) => fail(failure),
    }
}

pub fn render(args: &InlineArgs) -> Result<String, Failure> {
    let program = load_program(&args.program)?;
    let mut session = open_session(&program, args.options.clone(), &[], args.color)?;
    prepare(&mut session, args.color)?;
    Ok(dump(&mut session))
}

/// One line per used method, in program order.
fn dump(session: &mut Session<'_>) -> String {
    let program = session.program();
    let mut out = String::new();
    for asm in program.assemblies() {
        for ty in asm.used_types() {
            for method in ty.used_methods() {
                let line = match session.inline_decision(&method.name) {
                    Decision::Rejected(rejection) => format!("rejected ({rejection})"),
                    Decision::Cost(cost) if session.is_inlined(&method.name) => {
                        format!("cost {cost}, inlined")
                    }
                    Decision::Cost(cost) => format!("cost {cost}"),
                };
                let _ = writeln!(out, "{}: {line}", method.name);
            }
        }
    }
    out
}
