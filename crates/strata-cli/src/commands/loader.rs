//! Reading the program and trace manifests, and the exit-status policy.

use std::fs;
use std::path::{Path, PathBuf};

use strata_compiler::diagnostics::render_error;
use strata_compiler::{CompileOptions, Error, Session, SourceMap};
use strata_core::Program;

/// A trace manifest named on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestArg {
    pub path: PathBuf,
    pub initial: bool,
}

/// Why a command stopped, already rendered for the terminal.
#[derive(Debug, thiserror::Error)]
pub enum Failure {
    #[error("{0}")]
    User(String),
    #[error("{0}")]
    Internal(String),
}

impl Failure {
    pub fn from_error(error: &Error, sources: &SourceMap, colored: bool) -> Self {
        let rendered = render_error(error, sources, colored);
        if error.is_internal() {
            Self::Internal(rendered)
        } else {
            Self::User(rendered)
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Self::User(_) => 1,
            Self::Internal(_) => 2,
        }
    }
}

/// Print the failure and exit with its status.
pub fn fail(failure: Failure) -> ! {
    eprintln!("{failure}");
    std::process::exit(failure.exit_code())
}

pub fn read_text(path: &Path) -> Result<String, Failure> {
    fs::read_to_string(path)
        .map_err(|e| Failure::User(format!("error: failed to read `{}`: {e}", path.display())))
}

pub fn load_program(path: &Path) -> Result<Program, Failure> {
    let text = read_text(path)?;
    let program = Program::from_json(&text)
        .map_err(|e| Failure::User(format!("error: {}: {e}", path.display())))?;
    log::info!(
        "loaded {} assembly(ies) from {}",
        program.assemblies().count(),
        path.display()
    );
    Ok(program)
}

/// A session with every manifest loaded, in command-line order.
pub fn open_session<'p>(
    program: &'p Program,
    options: CompileOptions,
    manifests: &[ManifestArg],
    colored: bool,
) -> Result<Session<'p>, Failure> {
    let mut session = Session::new(program, options);
    for manifest in manifests {
        let text = read_text(&manifest.path)?;
        let name = manifest.path.to_string_lossy().into_owned();
        if let Err(e) = session.add_trace(name, text, manifest.initial) {
            return Err(Failure::from_error(&e, session.sources(), colored));
        }
    }
    Ok(session)
}

/// Run analysis up front so dumps can inspect the session.
pub fn prepare(session: &mut Session<'_>, colored: bool) -> Result<(), Failure> {
    session
        .prepare()
        .map_err(|e| Failure::from_error(&e, session.sources(), colored))
}

/// Print diagnostics and the warning summary to stderr.
pub fn report(
    diagnostics: &strata_compiler::Diagnostics,
    sources: &SourceMap,
    notes: bool,
    colored: bool,
) {
    let rendered = diagnostics
        .printer()
        .sources(sources)
        .colored(colored)
        .notes(notes)
        .render();
    if !rendered.is_empty() {
        eprint!("{rendered}");
    }
    let warnings = diagnostics.warning_count();
    if warnings > 0 {
        eprintln!("{warnings} warning(s)");
    }
}
