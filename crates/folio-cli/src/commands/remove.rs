//! Remove command implementation.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use folio_core::{Document, RecordId};

use super::Env;
use crate::output;

#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Collection name
    pub collection: String,

    /// Record id
    pub id: String,

    /// Succeed without changes if the record does not exist
    #[arg(long)]
    pub if_exists: bool,
}

pub async fn run(args: RemoveArgs, env: &Env) -> Result<()> {
    let result: folio_core::Result<Option<Document>> = async {
        let collection = env.collection(&args.collection)?;
        let id = RecordId::new(args.id.as_str())?;

        if args.if_exists {
            collection.remove_if_exists(&id).await
        } else {
            collection.remove(&id).await.map(Some)
        }
    }
    .await;

    output::report(
        env.json,
        result,
        "Failed to remove record",
        |removed: &Option<Document>| {
            match removed {
                Some(doc) => output::success(&format!("Removed {}", doc.id)),
                None => eprintln!("{}", format!("No record {}; nothing removed.", args.id).dimmed()),
            }
            Ok(())
        },
    )
}
