//! Dispatch logic: extract params from ArgMatches and convert to command args.
//!
//! - `*Params` structs are populated from clap
//! - `Into<*Args>` impls bridge dispatch → command handlers, folding flags into
//!   `CompileOptions` and manifest lists

use std::path::PathBuf;

use clap::ArgMatches;
use strata_compiler::{CompileMode, CompileOptions};

use super::ColorChoice;
use crate::commands::build::BuildArgs;
use crate::commands::inline::InlineArgs;
use crate::commands::loader::ManifestArg;
use crate::commands::slots::SlotsArgs;
use crate::commands::traces::TracesArgs;

/// Flags shared by every command that compiles.
#[derive(Debug, Default)]
pub struct OptionParams {
    pub mode: CompileMode,
    pub debug: bool,
    pub inline_threshold: Option<u32>,
    pub no_inline: bool,
    pub remainder: Option<String>,
}

impl OptionParams {
    fn from_matches(m: &ArgMatches) -> Self {
        Self {
            mode: parse_mode(m),
            debug: get_flag(m, "debug"),
            inline_threshold: m.try_get_one::<u32>("inline_threshold").ok().flatten().copied(),
            no_inline: get_flag(m, "no_inline"),
            remainder: m.try_get_one::<String>("remainder").ok().flatten().cloned(),
        }
    }

    fn into_options(self) -> CompileOptions {
        let mut options = CompileOptions::new()
            .mode(self.mode)
            .debug(self.debug)
            .inlining(!self.no_inline)
            .remainder_name(self.remainder);
        if let Some(threshold) = self.inline_threshold {
            options = options.inline_threshold(threshold);
        }
        options
    }
}

pub struct BuildParams {
    pub program: PathBuf,
    pub output: PathBuf,
    pub options: OptionParams,
    pub traces: Vec<PathBuf>,
    pub initial_traces: Vec<PathBuf>,
    pub force: bool,
    pub notes: bool,
    pub color: ColorChoice,
}

impl BuildParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            program: get_path(m, "program"),
            output: get_path(m, "output"),
            options: OptionParams::from_matches(m),
            traces: get_paths(m, "trace"),
            initial_traces: get_paths(m, "initial_trace"),
            force: m.get_flag("force"),
            notes: m.get_flag("notes"),
            color: parse_color(m),
        }
    }
}

impl From<BuildParams> for BuildArgs {
    fn from(p: BuildParams) -> Self {
        Self {
            program: p.program,
            output: p.output,
            options: p.options.into_options(),
            manifests: manifests(p.initial_traces, p.traces),
            force: p.force,
            notes: p.notes,
            color: p.color.should_colorize(),
        }
    }
}

pub struct SlotsParams {
    pub program: PathBuf,
    pub options: OptionParams,
    pub color: ColorChoice,
}

impl SlotsParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            program: get_path(m, "program"),
            options: OptionParams::from_matches(m),
            color: parse_color(m),
        }
    }
}

impl From<SlotsParams> for SlotsArgs {
    fn from(p: SlotsParams) -> Self {
        Self {
            program: p.program,
            options: p.options.into_options(),
            color: p.color.should_colorize(),
        }
    }
}

pub struct TracesParams {
    pub program: PathBuf,
    pub traces: Vec<PathBuf>,
    pub initial_traces: Vec<PathBuf>,
    pub remainder: Option<String>,
    pub color: ColorChoice,
}

impl TracesParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            program: get_path(m, "program"),
            traces: get_paths(m, "trace"),
            initial_traces: get_paths(m, "initial_trace"),
            remainder: m.get_one::<String>("remainder").cloned(),
            color: parse_color(m),
        }
    }
}

impl From<TracesParams> for TracesArgs {
    fn from(p: TracesParams) -> Self {
        let options = OptionParams {
            mode: CompileMode::Traced,
            remainder: p.remainder,
            ..Default::default()
        };
        Self {
            program: p.program,
            options: options.into_options(),
            manifests: manifests(p.initial_traces, p.traces),
            color: p.color.should_colorize(),
        }
    }
}

pub struct InlineParams {
    pub program: PathBuf,
    pub inline_threshold: Option<u32>,
    pub no_inline: bool,
    pub color: ColorChoice,
}

impl InlineParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            program: get_path(m, "program"),
            inline_threshold: m.get_one::<u32>("inline_threshold").copied(),
            no_inline: m.get_flag("no_inline"),
            color: parse_color(m),
        }
    }
}

impl From<InlineParams> for InlineArgs {
    fn from(p: InlineParams) -> Self {
        let options = OptionParams {
            inline_threshold: p.inline_threshold,
            no_inline: p.no_inline,
            ..Default::default()
        };
        Self {
            program: p.program,
            options: options.into_options(),
            color: p.color.should_colorize(),
        }
    }
}

/// `-v` count of any subcommand.
pub fn verbosity(m: &ArgMatches) -> u8 {
    m.get_count("verbose")
}

/// Initial manifests load first so their claims win conflicts.
fn manifests(initial: Vec<PathBuf>, on_demand: Vec<PathBuf>) -> Vec<ManifestArg> {
    let initial = initial.into_iter().map(|path| ManifestArg {
        path,
        initial: true,
    });
    let on_demand = on_demand.into_iter().map(|path| ManifestArg {
        path,
        initial: false,
    });
    initial.chain(on_demand).collect()
}

fn get_path(m: &ArgMatches, id: &str) -> PathBuf {
    m.get_one::<PathBuf>(id).cloned().unwrap_or_default()
}

fn get_paths(m: &ArgMatches, id: &str) -> Vec<PathBuf> {
    m.get_many::<PathBuf>(id)
        .map(|paths| paths.cloned().collect())
        .unwrap_or_default()
}

fn get_flag(m: &ArgMatches, id: &str) -> bool {
    m.try_get_one::<bool>(id).ok().flatten().copied().unwrap_or(false)
}

fn parse_mode(m: &ArgMatches) -> CompileMode {
    match m.try_get_one::<String>("mode").ok().flatten().map(String::as_str) {
        Some("on-demand") => CompileMode::OnDemand,
        Some("traced") => CompileMode::Traced,
        _ => CompileMode::Monolithic,
    }
}

fn parse_color(m: &ArgMatches) -> ColorChoice {
    match m.get_one::<String>("color").map(|s| s.as_str()) {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}
