//! Command builders for the CLI.
//!
//! Each command is built using the shared arg builders from `args.rs`.

use clap::Command;

use super::args::*;

/// Build the complete CLI with all subcommands.
pub fn build_cli() -> Command {
    Command::new("strata")
        .about("Whole-program bundle back end")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(build_command())
        .subcommand(slots_command())
        .subcommand(traces_command())
        .subcommand(inline_command())
}

/// Flags every command accepts.
fn with_common_args(cmd: Command) -> Command {
    cmd.arg(verbose_arg()).arg(color_arg())
}

/// Flags that change compilation options.
fn with_option_args(cmd: Command) -> Command {
    cmd.arg(mode_arg())
        .arg(debug_arg())
        .arg(inline_threshold_arg())
        .arg(no_inline_arg())
        .arg(remainder_arg())
}

/// Compile a program into artifacts.
pub fn build_command() -> Command {
    let cmd = Command::new("build")
        .about("Compile a program into script artifacts")
        .after_help(
            r#"EXAMPLES:
  strata build app.json -o out
  strata build app.json -o out --mode on-demand --debug
  strata build app.json -o out --mode traced --initial-trace boot.trace --trace settings.trace
  strata build app.json -o out --force"#,
        )
        .arg(program_arg())
        .arg(output_dir_arg())
        .arg(trace_arg())
        .arg(initial_trace_arg())
        .arg(force_arg())
        .arg(notes_arg());

    with_common_args(with_option_args(cmd))
}

/// Dump slot assignments.
pub fn slots_command() -> Command {
    let cmd = Command::new("slots")
        .about("Show assembly and type slot assignments")
        .after_help(
            r#"EXAMPLES:
  strata slots app.json
  strata slots app.json --debug --mode traced"#,
        )
        .arg(program_arg());

    with_common_args(with_option_args(cmd))
}

/// Dump the trace partition.
pub fn traces_command() -> Command {
    let cmd = Command::new("traces")
        .about("Show which trace owns every definition")
        .after_help(
            r#"EXAMPLES:
  strata traces app.json --trace settings.trace
  strata traces app.json --initial-trace boot.trace --remainder rest"#,
        )
        .arg(program_arg())
        .arg(trace_arg())
        .arg(initial_trace_arg())
        .arg(remainder_arg());

    with_common_args(cmd)
}

/// Dump inlining decisions.
pub fn inline_command() -> Command {
    let cmd = Command::new("inline")
        .about("Show the inlining decision and cost of every used method")
        .after_help(
            r#"EXAMPLES:
  strata inline app.json
  strata inline app.json --inline-threshold 40"#,
        )
        .arg(program_arg())
        .arg(inline_threshold_arg())
        .arg(no_inline_arg());

    with_common_args(cmd)
}
