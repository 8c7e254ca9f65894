#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

mod cli;
mod commands;

use cli::{BuildParams, InlineParams, SlotsParams, TracesParams, build_cli, verbosity};

fn main() {
    let matches = build_cli().get_matches();

    let Some((name, m)) = matches.subcommand() else {
        unreachable!("clap should have caught this")
    };
    init_logging(verbosity(m));

    match name {
        "build" => {
            let params = BuildParams::from_matches(m);
            commands::build::run(params.into());
        }
        "slots" => {
            let params = SlotsParams::from_matches(m);
            commands::slots::run(params.into());
        }
        "traces" => {
            let params = TracesParams::from_matches(m);
            commands::traces::run(params.into());
        }
        "inline" => {
            let params = InlineParams::from_matches(m);
            commands::inline::run(params.into());
        }
        _ => unreachable!("clap should have caught this"),
    }
}

/// `-v` info, `-vv` debug, `-vvv` trace; `RUST_LOG` overrides.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .parse_default_env()
        .init();
}
