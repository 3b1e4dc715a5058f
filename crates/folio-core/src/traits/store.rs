//! Document store trait.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::document::{Document, FieldPatch, Fields};
use crate::types::{CollectionName, PartitionKey, RecordId};

/// One entry of a batched update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchWrite {
    /// The record to patch.
    pub id: RecordId,
    /// Fields to set or remove.
    pub fields: FieldPatch,
}

impl BatchWrite {
    /// Create a batch entry.
    pub fn new(id: RecordId, fields: FieldPatch) -> Self {
        Self { id, fields }
    }
}

/// A document store holding named collections of JSON documents.
///
/// Every method is a potential network round-trip. Callers await each one
/// before computing the next step.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch every document in `collection` whose `field` equals `partition`.
    ///
    /// No ordering is guaranteed.
    async fn query_by_partition(
        &self,
        collection: &CollectionName,
        field: &str,
        partition: &PartitionKey,
    ) -> Result<Vec<Document>>;

    /// Fetch a single document, or `None` if it does not exist.
    async fn get(&self, collection: &CollectionName, id: &RecordId) -> Result<Option<Document>>;

    /// Create a document and return its new id.
    async fn create(&self, collection: &CollectionName, fields: Fields) -> Result<RecordId>;

    /// Patch a single document.
    ///
    /// Fails with [`Error::NotFound`](crate::Error::NotFound) if the document
    /// does not exist.
    async fn update(
        &self,
        collection: &CollectionName,
        id: &RecordId,
        patch: &FieldPatch,
    ) -> Result<()>;

    /// Delete a document. Deleting a missing document succeeds.
    async fn delete(&self, collection: &CollectionName, id: &RecordId) -> Result<()>;

    /// Patch several documents as one operation.
    ///
    /// Implementations with an atomic batch primitive apply all writes or
    /// none. Implementations without one report a partly applied batch as
    /// [`Error::PartialShiftFailure`](crate::Error::PartialShiftFailure).
    async fn batch_update(&self, collection: &CollectionName, writes: &[BatchWrite])
    -> Result<()>;
}

#[async_trait]
impl<T: DocumentStore + ?Sized> DocumentStore for Arc<T> {
    async fn query_by_partition(
        &self,
        collection: &CollectionName,
        field: &str,
        partition: &PartitionKey,
    ) -> Result<Vec<Document>> {
        (**self).query_by_partition(collection, field, partition).await
    }

    async fn get(&self, collection: &CollectionName, id: &RecordId) -> Result<Option<Document>> {
        (**self).get(collection, id).await
    }

    async fn create(&self, collection: &CollectionName, fields: Fields) -> Result<RecordId> {
        (**self).create(collection, fields).await
    }

    async fn update(
        &self,
        collection: &CollectionName,
        id: &RecordId,
        patch: &FieldPatch,
    ) -> Result<()> {
        (**self).update(collection, id, patch).await
    }

    async fn delete(&self, collection: &CollectionName, id: &RecordId) -> Result<()> {
        (**self).delete(collection, id).await
    }

    async fn batch_update(
        &self,
        collection: &CollectionName,
        writes: &[BatchWrite],
    ) -> Result<()> {
        (**self).batch_update(collection, writes).await
    }
}

#[async_trait]
impl<T: DocumentStore + ?Sized> DocumentStore for Box<T> {
    async fn query_by_partition(
        &self,
        collection: &CollectionName,
        field: &str,
        partition: &PartitionKey,
    ) -> Result<Vec<Document>> {
        (**self).query_by_partition(collection, field, partition).await
    }

    async fn get(&self, collection: &CollectionName, id: &RecordId) -> Result<Option<Document>> {
        (**self).get(collection, id).await
    }

    async fn create(&self, collection: &CollectionName, fields: Fields) -> Result<RecordId> {
        (**self).create(collection, fields).await
    }

    async fn update(
        &self,
        collection: &CollectionName,
        id: &RecordId,
        patch: &FieldPatch,
    ) -> Result<()> {
        (**self).update(collection, id, patch).await
    }

    async fn delete(&self, collection: &CollectionName, id: &RecordId) -> Result<()> {
        (**self).delete(collection, id).await
    }

    async fn batch_update(
        &self,
        collection: &CollectionName,
        writes: &[BatchWrite],
    ) -> Result<()> {
        (**self).batch_update(collection, writes).await
    }
}
