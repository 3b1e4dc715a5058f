//! Partition snapshot entries and display sort.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::config::CollectionConfig;
use crate::document::Document;
use crate::types::RecordId;

/// The ordering-relevant view of one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Document id.
    pub id: RecordId,
    /// Stored ordinal, `None` for legacy documents.
    pub order: Option<i64>,
    /// Creation timestamp, if recorded.
    pub created_at: Option<DateTime<Utc>>,
}

impl Entry {
    /// Create an entry.
    pub fn new(id: RecordId, order: Option<i64>) -> Self {
        Self {
            id,
            order,
            created_at: None,
        }
    }

    /// Builder-style creation timestamp.
    pub fn created(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }

    /// Extract the entry for `doc` under `config`.
    pub fn from_document(doc: &Document, config: &CollectionConfig) -> Self {
        Self {
            id: doc.id.clone(),
            order: doc.int_field(&config.order_field),
            created_at: doc.timestamp_field(&config.created_at_field),
        }
    }

    /// Returns true if the document has no usable order.
    pub fn is_legacy(&self) -> bool {
        self.order.is_none()
    }
}

/// Display comparison: explicit orders ascending with every legacy record
/// after them. Ties go newest first, then by id.
pub fn display_cmp(a: &Entry, b: &Entry) -> Ordering {
    a.is_legacy()
        .cmp(&b.is_legacy())
        .then_with(|| a.order.cmp(&b.order))
        // Some(newer) before Some(older) before None.
        .then_with(|| b.created_at.cmp(&a.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

/// Sort entries into display order.
pub fn sort_entries(entries: &mut [Entry]) {
    entries.sort_by(display_cmp);
}
