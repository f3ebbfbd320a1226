//! CLI argument definitions.
//!
//! The main entry point is the [`Cli`] struct.

use clap::builder::PossibleValuesParser;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use super::commands::cache::CacheArgs;
use super::commands::symbols::SymbolsArgs;
use crate::record::IMAGE_KINDS;
use crate::search::Filters;

/// cardsync - card data and symbol catalog mirror.
#[derive(Debug, Parser)]
#[command(name = "cardsync")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (overrides .cardsync/config.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the local store (overrides store.dir)
    #[arg(long, global = true, env = "CARDSYNC_STORE_DIR")]
    pub store_dir: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Find a card, serving it from the local store while fresh
    Locate(LocateArgs),

    /// Compare or sync the symbol catalog with the remote API
    Symbols(SymbolsArgs),

    /// Inspect or clear the local store
    Cache(CacheArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `locate` command.
///
/// The first complete lookup wins: id, then multiverse id, then set and
/// collector number, then name.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct LocateArgs {
    /// Card printing id
    #[arg(long)]
    pub id: Option<String>,

    /// Multiverse id
    #[arg(long)]
    pub multiverse_id: Option<String>,

    /// Set code
    #[arg(long)]
    pub set: Option<String>,

    /// Collector number within the set
    #[arg(long)]
    pub number: Option<String>,

    /// Printing language, with --set and --number
    #[arg(long)]
    pub lang: Option<String>,

    /// Card name (fuzzy)
    #[arg(long)]
    pub name: Option<String>,

    /// Require a fresh image of this kind
    #[arg(long, value_name = "KIND", value_parser = PossibleValuesParser::new(IMAGE_KINDS.iter().copied()))]
    pub image: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl LocateArgs {
    /// Lookup filters named the way the card search schemes expect.
    pub fn filters(&self) -> Filters {
        [
            ("id", &self.id),
            ("multiverse_id", &self.multiverse_id),
            ("set", &self.set),
            ("collector_number", &self.number),
            ("lang", &self.lang),
            ("name", &self.name),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_ref().map(|v| (field.to_string(), v.clone())))
        .collect()
    }
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
