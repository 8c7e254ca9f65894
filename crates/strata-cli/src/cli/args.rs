//! Shared argument builders for CLI commands.
//!
//! Each function returns a `clap::Arg` that can be composed into commands.

use std::path::PathBuf;

use clap::{Arg, ArgAction, value_parser};

/// Program description produced by the front end (positional).
pub fn program_arg() -> Arg {
    Arg::new("program")
        .value_name("PROGRAM")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Program description (JSON)")
}

/// Output directory (-o/--output).
pub fn output_dir_arg() -> Arg {
    Arg::new("output")
        .short('o')
        .long("output")
        .value_name("DIR")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Directory receiving the generated artifacts")
}

/// Compilation mode (--mode).
pub fn mode_arg() -> Arg {
    Arg::new("mode")
        .long("mode")
        .value_name("MODE")
        .default_value("monolithic")
        .value_parser(["monolithic", "on-demand", "traced"])
        .help("How definitions are packaged into artifacts")
}

/// On-demand trace manifest (--trace, repeatable).
pub fn trace_arg() -> Arg {
    Arg::new("trace")
        .long("trace")
        .value_name("FILE")
        .action(ArgAction::Append)
        .value_parser(value_parser!(PathBuf))
        .help("Trace manifest loaded on demand (repeatable)")
}

/// Initial trace manifest (--initial-trace, repeatable).
pub fn initial_trace_arg() -> Arg {
    Arg::new("initial_trace")
        .long("initial-trace")
        .value_name("FILE")
        .action(ArgAction::Append)
        .value_parser(value_parser!(PathBuf))
        .help("Trace manifest merged into the bootstrap (repeatable)")
}

/// Name of the catch-all trace (--remainder).
pub fn remainder_arg() -> Arg {
    Arg::new("remainder")
        .long("remainder")
        .value_name("NAME")
        .help("Emit unclaimed definitions as an on-demand trace with this name")
}

/// Debug output (--debug).
pub fn debug_arg() -> Arg {
    Arg::new("debug")
        .long("debug")
        .action(ArgAction::SetTrue)
        .help("Friendly slot names, member name tables, no top-level error handler")
}

/// Inlining cost threshold (--inline-threshold).
pub fn inline_threshold_arg() -> Arg {
    Arg::new("inline_threshold")
        .long("inline-threshold")
        .value_name("N")
        .value_parser(value_parser!(u32))
        .help("Largest cost a method may have and still be inlined (default: 24)")
}

/// Disable inlining (--no-inline).
pub fn no_inline_arg() -> Arg {
    Arg::new("no_inline")
        .long("no-inline")
        .action(ArgAction::SetTrue)
        .help("Disable inlining, including forced inlining")
}

/// Rebuild everything (--force).
pub fn force_arg() -> Arg {
    Arg::new("force")
        .long("force")
        .action(ArgAction::SetTrue)
        .help("Rewrite artifacts of assemblies that are up to date")
}

/// Show informational notes (--notes).
pub fn notes_arg() -> Arg {
    Arg::new("notes")
        .long("notes")
        .action(ArgAction::SetTrue)
        .help("Also print notes (inlined and unused definitions)")
}

/// Logging verbosity (-v, repeatable).
pub fn verbose_arg() -> Arg {
    Arg::new("verbose")
        .short('v')
        .long("verbose")
        .action(ArgAction::Count)
        .help("Log more (-v info, -vv debug, -vvv trace)")
}

/// Color output control (--color).
pub fn color_arg() -> Arg {
    Arg::new("color")
        .long("color")
        .value_name("WHEN")
        .default_value("auto")
        .value_parser(["auto", "always", "never"])
        .help("Colorize diagnostics")
}
