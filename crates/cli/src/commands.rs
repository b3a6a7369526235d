//! Clap command tree definition.

use clap::{Arg, ArgAction, Command};

const KEY_FORMATS: [&str; 4] = ["json", "gql", "encoded", "proto"];

/// Build the complete CLI command tree.
pub fn build_cli() -> Command {
    Command::new("dutil")
        .about("Command-line toolkit for Cloud Datastore keys, entities and GQL")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("namespace")
                .long("namespace")
                .short('n')
                .env("DATASTORE_NAMESPACE")
                .default_value("")
                .hide_default_value(true)
                .help("Default namespace for keys written without NAMESPACE(...)")
                .global(true),
        )
        .subcommand(build_convert())
        .subcommand(build_key())
}

// =========================================================================
// convert
// =========================================================================

fn build_convert() -> Command {
    Command::new("convert")
        .about("Convert JSON streams from other commands")
        .subcommand_required(true)
        .subcommand(
            Command::new("key")
                .about("Convert a stream of keys between formats (stdin → stdout)")
                .arg(
                    Arg::new("from")
                        .long("from")
                        .value_parser(["json", "gql", "encoded", "proto", "auto"])
                        .default_value("auto")
                        .help("Source key format"),
                )
                .arg(
                    Arg::new("to")
                        .long("to")
                        .value_parser(KEY_FORMATS)
                        .default_value("encoded")
                        .help("Result key format"),
                ),
        )
        .subcommand(
            Command::new("table")
                .about("Render a JSON stream of keys, entities or explain metrics as text tables")
                .arg(
                    Arg::new("from")
                        .long("from")
                        .short('f')
                        .value_parser(["key", "entity", "explain"])
                        .default_value("entity")
                        .help("Type of JSON structure to convert to table"),
                ),
        )
}

// =========================================================================
// key
// =========================================================================

fn build_key() -> Command {
    Command::new("key")
        .about("Parse keys given on the command line (opaque or KEY(...)) and print them")
        .arg(
            Arg::new("keys")
                .required(true)
                .num_args(1..)
                .action(ArgAction::Append)
                .help("Keys to parse"),
        )
        .arg(
            Arg::new("to")
                .long("to")
                .value_parser(KEY_FORMATS)
                .default_value("gql")
                .help("Output key format"),
        )
}
