//! Partition health reports.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::types::{PartitionKey, RecordId};

use super::entry::Entry;

/// Result of checking a partition against the density invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DensityReport {
    /// The checked partition.
    pub partition: PartitionKey,
    /// Number of records in the partition.
    pub count: usize,
    /// Configured base.
    pub base: i64,
    /// Orders held by more than one record.
    pub duplicates: Vec<i64>,
    /// Missing orders between `base` and the highest order.
    pub gaps: Vec<i64>,
    /// Records whose order is below `base`.
    pub below_base: Vec<RecordId>,
    /// Records without an order.
    pub legacy: Vec<RecordId>,
}

impl DensityReport {
    /// Build a report from a partition snapshot.
    pub fn from_entries(partition: PartitionKey, base: i64, entries: &[Entry]) -> Self {
        let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
        let mut below_base = Vec::new();
        let mut legacy = Vec::new();

        for entry in entries {
            match entry.order {
                Some(o) if o < base => below_base.push(entry.id.clone()),
                Some(o) => *counts.entry(o).or_default() += 1,
                None => legacy.push(entry.id.clone()),
            }
        }

        let duplicates = counts
            .iter()
            .filter(|(_, n)| **n > 1)
            .map(|(o, _)| *o)
            .collect();

        let gaps = match counts.keys().next_back() {
            Some(&max) => (base..max).filter(|o| !counts.contains_key(o)).collect(),
            None => Vec::new(),
        };

        Self {
            partition,
            count: entries.len(),
            base,
            duplicates,
            gaps,
            below_base,
            legacy,
        }
    }

    /// Returns true if orders are exactly `base..base+count`.
    pub fn is_dense(&self) -> bool {
        self.duplicates.is_empty()
            && self.gaps.is_empty()
            && self.below_base.is_empty()
            && self.legacy.is_empty()
    }
}

/// Result of renumbering a partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenumberReport {
    /// The renumbered partition.
    pub partition: PartitionKey,
    /// Number of records in the partition.
    pub total: usize,
    /// Number of records whose order was rewritten.
    pub changed: usize,
}
