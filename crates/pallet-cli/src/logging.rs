//! Diagnostics for `pallet` runs.
//!
//! Lifecycle spans carry `recipe` and `phase` fields, so a `-vv` run shows
//! which phase of which recipe staged, sealed or rolled back. Events go to
//! stderr and never mix with descriptor output on stdout.
//!
//! `-q` drops to `error`, no flag is `warn`, and each `-v` steps through
//! `info`, `debug` and `trace`. A set `RUST_LOG` replaces the computed filter.

use std::io::IsTerminal as _;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::GlobalArgs;

/// Pallet crates whose events the computed filter lets through.
const TARGETS: [&str; 3] = ["pallet", "pallet_core", "pallet_adapters"];

/// Install the stderr subscriber. Call once, from `main`.
pub fn init_logging(args: &GlobalArgs) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(from_env) => from_env,
        Err(_) => EnvFilter::new(directives(level_for(args))),
    };

    let events = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(!args.no_color && std::io::stderr().is_terminal())
        .with_target(false)
        .with_file(false)
        .with_line_number(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(events)
        .try_init()
        .map_err(|e| anyhow::anyhow!("tracing subscriber already installed: {e}"))
}

fn directives(level: &str) -> String {
    TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

fn level_for(args: &GlobalArgs) -> &'static str {
    match (args.quiet, args.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    }
}
