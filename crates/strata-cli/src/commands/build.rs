use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use strata_compiler::{BuildOutput, CompileOptions, UnitReport};

use super::loader::{Failure, ManifestArg, fail, load_program, open_session, report};

/// Unit reports from the previous build, next to the artifacts.
pub const UNITS_PATH: &str = "units.json";

pub struct BuildArgs {
    pub program: PathBuf,
    pub output: PathBuf,
    pub options: CompileOptions,
    pub manifests: Vec<ManifestArg>,
    pub force: bool,
    pub notes: bool,
    pub color: bool,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct BuildSummary {
    pub written: usize,
    /// Assemblies left untouched because they were up to date.
    pub skipped: Vec<String>,
    pub warnings: usize,
}

pub fn run(args: BuildArgs) {
    match execute(&args) {
        Ok(summary) => {
            log::info!(
                "wrote {} artifact(s), {} assembly(ies) up to date, {} warning(s)",
                summary.written,
                summary.skipped.len(),
                summary.warnings
            );
        }
        Err(failure) => fail(failure),
    }
}

pub fn execute(args: &BuildArgs) -> Result<BuildSummary, Failure> {
    let program = load_program(&args.program)?;
    let session = open_session(&program, args.options.clone(), &args.manifests, args.color)?;

    let skip = if args.force {
        HashSet::new()
    } else {
        up_to_date(&args.output, &session.fingerprints())
    };

    let sources = session.sources().clone();
    let (output, diagnostics) = session
        .compile_skipping(&skip)
        .map_err(|e| Failure::from_error(&e, &sources, args.color))?;
    report(&diagnostics, &sources, args.notes, args.color);

    let written = write_output(&args.output, &output)?;
    // An assembly without a fresh artifact was skipped as up to date.
    let skipped = output
        .units
        .iter()
        .filter(|u| output.artifact(&u.artifact).is_none())
        .map(|u| u.assembly.clone())
        .collect();

    Ok(BuildSummary {
        written,
        skipped,
        warnings: diagnostics.warning_count(),
    })
}

/// Assemblies whose previous artifact exists and whose fingerprint is unchanged.
fn up_to_date(dir: &Path, current: &IndexMap<String, u32>) -> HashSet<String> {
    let previous = match fs::read_to_string(dir.join(UNITS_PATH)) {
        Ok(text) => text,
        Err(_) => return HashSet::new(),
    };
    let units: Vec<UnitReport> = match serde_json::from_str(&previous) {
        Ok(units) => units,
        Err(e) => {
            log::warn!("ignoring unreadable {UNITS_PATH}: {e}");
            return HashSet::new();
        }
    };

    units
        .into_iter()
        .filter(|unit| {
            current.get(&unit.assembly) == Some(&unit.fingerprint)
                && dir.join(&unit.artifact).is_file()
        })
        .map(|unit| unit.assembly)
        .collect()
}

fn write_output(dir: &Path, output: &BuildOutput) -> Result<usize, Failure> {
    for artifact in &output.artifacts {
        write_file(&dir.join(&artifact.path), &artifact.contents)?;
    }

    let units = serde_json::to_string_pretty(&output.units)
        .map_err(|e| Failure::Internal(format!("internal error: {e}")))?;
    write_file(&dir.join(UNITS_PATH), &units)?;
    Ok(output.artifacts.len())
}

fn write_file(path: &Path, contents: &str) -> Result<(), Failure> {
    let io_failure =
        |e: std::io::Error| Failure::User(format!("error: failed to write `{}`: {e}", path.display()));
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_failure)?;
    }
    fs::write(path, contents).map_err(io_failure)?;
    log::debug!("wrote {}", path.display());
    Ok(())
}
