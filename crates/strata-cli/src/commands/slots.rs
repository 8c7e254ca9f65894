use std::fmt::Write as _;
use std::path::PathBuf;

use strata_compiler::{CompileOptions, Session};

use super::loader::{Failure, fail, load_program, open_session, prepare};

pub struct SlotsArgs {
    pub program: PathBuf,
    pub options: CompileOptions,
    pub color: bool,
}

pub fn run(args: SlotsArgs) {
    match render(&args) {
        Ok(text) => print!("{text}"),
        Err(failure) => fail(failure),
    }
}

pub fn render(args: &SlotsArgs) -> Result<String, Failure> {
    let program = load_program(&args.program)?;
    let mut session = open_session(&program, args.options.clone(), &[], args.color)?;
    prepare(&mut session, args.color)?;
    dump(&session).map_err(|e| Failure::from_error(&e, session.sources(), args.color))
}

/// One block per assembly scope, then one per type scope.
fn dump(session: &Session<'_>) -> strata_compiler::Result<String> {
    let mut out = String::new();
    for asm in session.program().assemblies() {
        let scope = session.assembly_scope(&asm.name)?;
        let _ = writeln!(out, "[{}]", asm.name);
        for (key, slot) in scope.slots().iter() {
            let _ = writeln!(out, "  {slot} = {key}");
        }

        for ty in asm.used_types() {
            let scope = session.type_scope(&ty.name)?;
            let _ = writeln!(out, "{}", ty.name);
            for (key, slot) in scope.members().iter() {
                let _ = writeln!(out, "  {slot} = {key}");
            }
            for (value, slot) in scope.literals() {
                let _ = writeln!(out, "  $s.{slot} = literal {value:?}");
            }
        }
    }
    Ok(out)
}
