//! dutil: command-line toolkit for Cloud Datastore keys and entities.
//!
//! - `dutil convert key`: re-encode a stream of keys (stdin → stdout)
//! - `dutil convert table`: render JSON keys or entities as text tables
//! - `dutil key <KEY>...`: parse keys given as arguments and print them
//!
//! Logging goes to stderr and is controlled with `RUST_LOG`.

mod commands;
mod convert;
mod format;
mod parse;

use std::io;
use std::process;

use tracing_subscriber::EnvFilter;

use commands::build_cli;
use parse::{global_options, matches_to_action, CliAction};

fn main() {
    init_tracing();

    let matches = build_cli().get_matches();
    let globals = global_options(&matches);

    if let Err(e) = run(&matches, &globals.namespace) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(matches: &clap::ArgMatches, namespace: &str) -> anyhow::Result<()> {
    let stdout = io::stdout();
    match matches_to_action(matches)? {
        CliAction::ConvertKey { from, to } => {
            convert::convert_key(from, to, namespace, io::stdin().lock(), stdout.lock())
        }
        CliAction::ConvertTable { from } => {
            convert::convert_table(from, io::stdin().lock(), stdout.lock())
        }
        CliAction::RenderKeys { keys, to } => {
            convert::render_keys(&keys, to, namespace, stdout.lock())
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();
}
