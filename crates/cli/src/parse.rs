//! ArgMatches → CliAction conversion.

use anyhow::{anyhow, Result};
use clap::ArgMatches;
use dutil_core::KeyFormat;

/// What `convert table` reads from stdin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableSource {
    Key,
    Entity,
    Explain,
}

/// The result of parsing the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliAction {
    /// `convert key`; `from == None` means auto-detect
    ConvertKey {
        from: Option<KeyFormat>,
        to: KeyFormat,
    },
    /// `convert table`
    ConvertTable { from: TableSource },
    /// `key <KEY>...`
    RenderKeys { keys: Vec<String>, to: KeyFormat },
}

/// Global options shared by every command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalOptions {
    pub namespace: String,
}

pub fn global_options(matches: &ArgMatches) -> GlobalOptions {
    GlobalOptions {
        namespace: matches
            .get_one::<String>("namespace")
            .cloned()
            .unwrap_or_default(),
    }
}

pub fn matches_to_action(matches: &ArgMatches) -> Result<CliAction> {
    match matches.subcommand() {
        Some(("convert", sub)) => match sub.subcommand() {
            Some(("key", m)) => {
                let from: Option<KeyFormat> = match required(m, "from")? {
                    "auto" => None,
                    other => Some(other.parse()?),
                };
                let to: KeyFormat = required(m, "to")?.parse()?;
                Ok(CliAction::ConvertKey { from, to })
            }
            Some(("table", m)) => {
                let from = match required(m, "from")? {
                    "key" => TableSource::Key,
                    "explain" => TableSource::Explain,
                    _ => TableSource::Entity,
                };
                Ok(CliAction::ConvertTable { from })
            }
            Some((name, _)) => Err(anyhow!("unknown convert command: {}", name)),
            None => Err(anyhow!("convert needs a subcommand")),
        },
        Some(("key", m)) => {
            let keys = m
                .get_many::<String>("keys")
                .map(|values| values.cloned().collect())
                .unwrap_or_default();
            let to: KeyFormat = required(m, "to")?.parse()?;
            Ok(CliAction::RenderKeys { keys, to })
        }
        Some((name, _)) => Err(anyhow!("unknown command: {}", name)),
        None => Err(anyhow!("no command given")),
    }
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str> {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("missing --{}", name))
}
