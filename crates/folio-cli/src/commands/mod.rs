//! Subcommand implementations.

pub mod check;
pub mod collections;
pub mod insert;
pub mod list;
pub mod remove;
pub mod renumber;
pub mod reorder;

mod payload;

use anyhow::Result;

use folio_core::{CollectionRegistry, OrderedCollection};

use crate::cli::{Cli, Commands, StoreArgs};
use crate::output;
use crate::store::{CliStore, default_config_path};

/// State shared by every subcommand.
pub struct Env {
    pub registry: CollectionRegistry,
    pub store: CliStore,
    pub json: bool,
}

impl Env {
    fn open(args: &StoreArgs, json: bool) -> folio_core::Result<Self> {
        let config_path = match &args.config {
            Some(path) => path.clone(),
            None => default_config_path()?,
        };

        Ok(Self {
            registry: CollectionRegistry::load(&config_path)?,
            store: CliStore::open(args)?,
            json,
        })
    }

    /// The ordered collection named `name`.
    pub fn collection(&self, name: &str) -> folio_core::Result<OrderedCollection<CliStore>> {
        let config = self.registry.get(name)?.clone();
        OrderedCollection::new(self.store.clone(), config)
    }
}

pub async fn handle(cli: Cli) -> Result<()> {
    let env = match Env::open(&cli.store, cli.json) {
        Ok(env) => env,
        Err(e) => {
            return output::report::<(), _>(cli.json, Err(e), "Failed to open store", |_| Ok(()));
        }
    };

    match cli.command {
        Commands::List(args) => list::run(args, &env).await,
        Commands::Insert(args) => insert::run(args, &env).await,
        Commands::Move(args) => reorder::run(args, &env).await,
        Commands::Remove(args) => remove::run(args, &env).await,
        Commands::Check(args) => check::run(args, &env).await,
        Commands::Renumber(args) => renumber::run(args, &env).await,
        Commands::Collections(args) => collections::run(args, &env),
    }
}
