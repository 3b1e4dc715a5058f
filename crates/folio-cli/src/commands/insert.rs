//! Insert command implementation.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use folio_core::{Document, DocumentStore, Error, PartitionKey};

use super::{Env, payload};
use crate::output;

#[derive(Args, Debug)]
pub struct InsertArgs {
    /// Collection name
    pub collection: String,

    /// Partition the record belongs to
    pub partition: String,

    /// Desired position (appends when omitted or below the base)
    #[arg(long, allow_negative_numbers = true)]
    pub order: Option<i64>,

    /// JSON file with record fields (use - for stdin)
    #[arg(long)]
    pub data: Option<String>,
}

/// The stored record, including the fields stamped on insert.
#[derive(Serialize)]
#[serde(transparent)]
struct Inserted {
    doc: Document,
    #[serde(skip)]
    order_field: String,
}

impl Inserted {
    fn print(&self) -> Result<()> {
        println!("{}", self.doc.id);
        let order = self
            .doc
            .int_field(&self.order_field)
            .map(|o| o.to_string())
            .unwrap_or_else(|| "-".to_string());
        output::success(&format!("Inserted {} at order {}", self.doc.id, order));
        Ok(())
    }
}

pub async fn run(args: InsertArgs, env: &Env) -> Result<()> {
    let result = async {
        let collection = env.collection(&args.collection)?;
        let partition = PartitionKey::new(args.partition.as_str())?;
        let fields = payload::read(args.data.as_deref())?;

        let id = collection.insert(&partition, args.order, fields).await?;

        let name = &collection.config().name;
        let doc = collection
            .store()
            .get(name, &id)
            .await?
            .ok_or_else(|| Error::not_found(name.as_str(), id.as_str()))?;
        Ok::<_, Error>(Inserted {
            doc,
            order_field: collection.config().order_field.clone(),
        })
    }
    .await;

    output::report(env.json, result, "Failed to insert record", Inserted::print)
}
