//! Renumber command implementation.

use anyhow::Result;
use clap::Args;

use folio_core::{PartitionKey, RenumberReport};

use super::Env;
use crate::output;

#[derive(Args, Debug)]
pub struct RenumberArgs {
    /// Collection name
    pub collection: String,

    /// Partition to renumber
    pub partition: String,
}

pub async fn run(args: RenumberArgs, env: &Env) -> Result<()> {
    let result: folio_core::Result<RenumberReport> = async {
        let collection = env.collection(&args.collection)?;
        let partition = PartitionKey::new(args.partition.as_str())?;
        collection.renumber(&partition).await
    }
    .await;

    output::report(env.json, result, "Failed to renumber partition", |report| {
        if report.changed == 0 {
            output::success(&format!(
                "{} records already dense; nothing changed",
                report.total
            ));
        } else {
            output::success(&format!(
                "Renumbered {} of {} records",
                report.changed, report.total
            ));
        }
        Ok(())
    })
}
