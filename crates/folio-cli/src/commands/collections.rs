//! Collections command implementation.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use folio_core::CollectionConfig;

use super::Env;
use crate::output;

#[derive(Args, Debug)]
pub struct CollectionsArgs {
    /// Show a single collection
    pub name: Option<String>,
}

pub fn run(args: CollectionsArgs, env: &Env) -> Result<()> {
    let result: folio_core::Result<Vec<CollectionConfig>> = match &args.name {
        Some(name) => env.registry.get(name).map(|c| vec![c.clone()]),
        None => Ok(env.registry.iter().cloned().collect()),
    };

    output::report(env.json, result, "Failed to read collections", |configs| {
        for config in configs {
            println!("{}", config.name.as_str().bold());
            output::field("  partition field", &config.partition_field);
            output::field("  order field", &config.order_field);
            output::field("  created-at field", &config.created_at_field);
            output::field("  base", &config.base.to_string());
        }
        Ok(())
    })
}
