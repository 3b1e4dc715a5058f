//! Check command implementation.

use anyhow::Result;
use clap::Args;

use folio_core::{DensityReport, PartitionKey};

use super::Env;
use crate::output;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Collection name
    pub collection: String,

    /// Partition to check
    pub partition: String,
}

fn join<T: ToString>(items: &[T]) -> String {
    items
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn print(collection: &str, report: &DensityReport) -> Result<()> {
    output::field("Partition", report.partition.as_str());
    output::field("Records", &report.count.to_string());
    output::field("Base", &report.base.to_string());
    if !report.duplicates.is_empty() {
        output::field("Duplicate orders", &join(&report.duplicates));
    }
    if !report.gaps.is_empty() {
        output::field("Missing orders", &join(&report.gaps));
    }
    if !report.below_base.is_empty() {
        output::field("Below base", &join(&report.below_base));
    }
    if !report.legacy.is_empty() {
        output::field("Without order", &join(&report.legacy));
    }
    println!();

    if report.is_dense() {
        output::success("Partition is dense");
    } else {
        output::warning(&format!(
            "Partition is not dense; run 'folio renumber {} {}' to repair",
            collection, report.partition
        ));
    }
    Ok(())
}

pub async fn run(args: CheckArgs, env: &Env) -> Result<()> {
    let result: folio_core::Result<DensityReport> = async {
        let collection = env.collection(&args.collection)?;
        let partition = PartitionKey::new(args.partition.as_str())?;
        collection.check(&partition).await
    }
    .await;

    output::report(env.json, result, "Failed to check partition", |report| {
        print(&args.collection, report)
    })
}
