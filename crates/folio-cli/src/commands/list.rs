//! List command implementation.

use anyhow::Result;
use chrono::Local;
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use folio_core::{CollectionConfig, Document, PartitionKey};

use super::Env;
use crate::output;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Collection name (e.g., awards)
    pub collection: String,

    /// Partition value (e.g., festival)
    pub partition: String,
}

/// Documents in display order, serialized as a plain array.
#[derive(Serialize)]
#[serde(transparent)]
struct Listing {
    documents: Vec<Document>,
    #[serde(skip)]
    config: CollectionConfig,
}

impl Listing {
    fn print(&self) -> Result<()> {
        if self.documents.is_empty() {
            eprintln!("{}", "No records found.".dimmed());
            return Ok(());
        }

        for doc in &self.documents {
            let order = doc
                .int_field(&self.config.order_field)
                .map(|o| o.to_string())
                .unwrap_or_else(|| "-".to_string());

            let created = doc
                .timestamp_field(&self.config.created_at_field)
                .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default();

            let mut payload = doc.fields.clone();
            payload.remove(&self.config.partition_field);
            payload.remove(&self.config.order_field);
            payload.remove(&self.config.created_at_field);

            println!(
                "{:>4}  {}  {:<16}  {}",
                order,
                doc.id.as_str().dimmed(),
                created,
                serde_json::to_string(&payload)?
            );
        }
        Ok(())
    }
}

pub async fn run(args: ListArgs, env: &Env) -> Result<()> {
    let result = async {
        let collection = env.collection(&args.collection)?;
        let partition = PartitionKey::new(args.partition.as_str())?;
        let documents = collection.list(&partition).await?;
        Ok::<_, folio_core::Error>(Listing {
            documents,
            config: collection.config().clone(),
        })
    }
    .await;

    output::report(env.json, result, "Failed to list records", Listing::print)
}
