//! Move command implementation.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use folio_core::{Document, DocumentStore, Error, PartitionKey, RecordId};

use super::{Env, payload};
use crate::output;

#[derive(Args, Debug)]
pub struct MoveArgs {
    /// Collection name
    pub collection: String,

    /// Record id
    pub id: String,

    /// Partition the record should end up in
    pub partition: String,

    /// New position (keeps the current one when omitted)
    #[arg(long, allow_negative_numbers = true)]
    pub order: Option<i64>,

    /// JSON file with fields to update (use - for stdin)
    #[arg(long)]
    pub data: Option<String>,
}

pub async fn run(args: MoveArgs, env: &Env) -> Result<()> {
    let result = async {
        let collection = env.collection(&args.collection)?;
        let id = RecordId::new(args.id.as_str())?;
        let partition = PartitionKey::new(args.partition.as_str())?;
        let patch = payload::read(args.data.as_deref())?;

        collection.reorder(&id, &partition, args.order, patch).await?;

        let name = &collection.config().name;
        let doc = collection
            .store()
            .get(name, &id)
            .await?
            .ok_or_else(|| Error::not_found(name.as_str(), id.as_str()))?;
        Ok::<_, Error>(Moved {
            doc,
            order_field: collection.config().order_field.clone(),
        })
    }
    .await;

    output::report(env.json, result, "Failed to move record", Moved::print)
}

/// The record as stored after the move.
#[derive(Serialize)]
#[serde(transparent)]
struct Moved {
    doc: Document,
    #[serde(skip)]
    order_field: String,
}

impl Moved {
    fn print(&self) -> Result<()> {
        match self.doc.int_field(&self.order_field) {
            Some(order) => output::success(&format!("Moved {} to order {}", self.doc.id, order)),
            None => output::success(&format!("Updated {}", self.doc.id)),
        }
        Ok(())
    }
}
