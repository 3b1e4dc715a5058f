//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::commands::{check, collections, insert, list, remove, renumber, reorder};

/// Manage ordered portfolio collections.
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(author, version = env!("FOLIO_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Print results as a JSON `{success, data, error}` object
    #[arg(long, global = true)]
    pub json: bool,

    #[command(flatten)]
    pub store: StoreArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where documents and collection settings come from.
#[derive(Args, Debug, Clone)]
pub struct StoreArgs {
    /// Document store URL (file:///path or https://host)
    #[arg(long = "store", env = "FOLIO_STORE", global = true)]
    pub url: Option<String>,

    /// Bearer token for an HTTP store
    #[arg(long, env = "FOLIO_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Collections file (defaults to collections.json in the config dir)
    #[arg(long, env = "FOLIO_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Apply shift batches one write at a time (HTTP stores without batch support)
    #[arg(long, global = true)]
    pub sequential: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List a partition in display order
    List(list::ListArgs),

    /// Insert a record into a partition
    Insert(insert::InsertArgs),

    /// Move a record to a new position or partition, optionally patching it
    Move(reorder::MoveArgs),

    /// Remove a record and close the gap it leaves
    Remove(remove::RemoveArgs),

    /// Report whether a partition is densely numbered
    Check(check::CheckArgs),

    /// Rewrite a partition's orders to a dense sequence
    Renumber(renumber::RenumberArgs),

    /// Show the configured collections
    Collections(collections::CollectionsArgs),
}
