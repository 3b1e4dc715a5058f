//! In-memory document store.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::Result;
use crate::document::{Document, FieldPatch, Fields};
use crate::error::{Error, StoreError};
use crate::traits::{BatchWrite, DocumentStore};
use crate::types::{CollectionName, PartitionKey, RecordId};

/// A failure to inject into the next matching operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// The next batch fails without applying anything.
    RejectBatch,
    /// The next batch applies its first `applied` writes, then fails.
    PartialBatch { applied: usize },
    /// The next create fails.
    RejectCreate,
}

#[derive(Debug, Default)]
struct Inner {
    collections: HashMap<String, BTreeMap<RecordId, Fields>>,
    next_id: u64,
    faults: VecDeque<Fault>,
}

impl Inner {
    fn collection(&mut self, name: &CollectionName) -> &mut BTreeMap<RecordId, Fields> {
        self.collections.entry(name.to_string()).or_default()
    }

    fn take_fault(&mut self, matches: impl Fn(&Fault) -> bool) -> Option<Fault> {
        let pos = self.faults.iter().position(matches)?;
        self.faults.remove(pos)
    }
}

/// A document store held in process memory.
///
/// Batches are atomic. Useful for tests and for embedding folio where no
/// persistence is needed; [`inject`](Self::inject) simulates backend
/// failures.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue a failure for the next matching operation.
    pub fn inject(&self, fault: Fault) {
        self.lock().faults.push_back(fault);
    }

    /// Store a document under a caller-chosen id, replacing any existing one.
    ///
    /// Bypasses ordering entirely, e.g. to seed legacy documents.
    pub fn put(&self, collection: &CollectionName, id: RecordId, fields: Fields) {
        self.lock().collection(collection).insert(id, fields);
    }

    /// All documents in a collection, by id.
    pub fn documents(&self, collection: &CollectionName) -> Vec<Document> {
        self.lock()
            .collections
            .get(collection.as_str())
            .map(|docs| {
                docs.iter()
                    .map(|(id, fields)| Document::new(id.clone(), fields.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn injected(message: &str) -> StoreError {
    StoreError::Connection {
        message: message.to_string(),
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn query_by_partition(
        &self,
        collection: &CollectionName,
        field: &str,
        partition: &PartitionKey,
    ) -> Result<Vec<Document>> {
        let inner = self.lock();
        let Some(docs) = inner.collections.get(collection.as_str()) else {
            return Ok(Vec::new());
        };

        Ok(docs
            .iter()
            .filter(|(_, fields)| fields.get(field).and_then(Value::as_str) == Some(partition.as_str()))
            .map(|(id, fields)| Document::new(id.clone(), fields.clone()))
            .collect())
    }

    async fn get(&self, collection: &CollectionName, id: &RecordId) -> Result<Option<Document>> {
        let inner = self.lock();
        Ok(inner
            .collections
            .get(collection.as_str())
            .and_then(|docs| docs.get(id))
            .map(|fields| Document::new(id.clone(), fields.clone())))
    }

    #[instrument(skip(self, fields))]
    async fn create(&self, collection: &CollectionName, fields: Fields) -> Result<RecordId> {
        let mut inner = self.lock();
        if inner.take_fault(|f| *f == Fault::RejectCreate).is_some() {
            return Err(injected("injected create failure").into());
        }

        inner.next_id += 1;
        let id = RecordId::new(format!("{:016x}", inner.next_id))?;
        inner.collection(collection).insert(id.clone(), fields);

        debug!(%id, "Created document");
        Ok(id)
    }

    async fn update(
        &self,
        collection: &CollectionName,
        id: &RecordId,
        patch: &FieldPatch,
    ) -> Result<()> {
        let mut inner = self.lock();
        let fields = inner
            .collection(collection)
            .get_mut(id)
            .ok_or_else(|| Error::not_found(collection.as_str(), id.as_str()))?;
        patch.apply_to(fields);
        Ok(())
    }

    async fn delete(&self, collection: &CollectionName, id: &RecordId) -> Result<()> {
        self.lock().collection(collection).remove(id);
        Ok(())
    }

    #[instrument(skip(self, writes), fields(writes = writes.len()))]
    async fn batch_update(
        &self,
        collection: &CollectionName,
        writes: &[BatchWrite],
    ) -> Result<()> {
        let mut inner = self.lock();
        let fault = inner.take_fault(|f| {
            matches!(f, Fault::RejectBatch | Fault::PartialBatch { .. })
        });

        let docs = inner.collection(collection);
        if let Some(missing) = writes.iter().find(|w| !docs.contains_key(&w.id)) {
            return Err(Error::not_found(collection.as_str(), missing.id.as_str()));
        }

        match fault {
            Some(Fault::RejectBatch) => Err(injected("injected batch failure").into()),
            Some(Fault::PartialBatch { applied }) => {
                let applied = applied.min(writes.len());
                for write in &writes[..applied] {
                    if let Some(fields) = docs.get_mut(&write.id) {
                        write.fields.apply_to(fields);
                    }
                }
                Err(Error::PartialShiftFailure {
                    collection: collection.to_string(),
                    applied,
                    failed: writes.len() - applied,
                    source: injected("injected partial batch failure"),
                })
            }
            _ => {
                for write in writes {
                    if let Some(fields) = docs.get_mut(&write.id) {
                        write.fields.apply_to(fields);
                    }
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn name() -> CollectionName {
        CollectionName::new("awards").unwrap()
    }

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[tokio::test]
    async fn create_get_update_delete() {
        let store = MemoryStore::new();
        let id = store
            .create(&name(), fields(json!({"title": "A"})))
            .await
            .unwrap();

        let doc = store.get(&name(), &id).await.unwrap().unwrap();
        assert_eq!(doc.str_field("title"), Some("A"));

        store
            .update(&name(), &id, &FieldPatch::new().with("title", "B"))
            .await
            .unwrap();
        let doc = store.get(&name(), &id).await.unwrap().unwrap();
        assert_eq!(doc.str_field("title"), Some("B"));

        store.delete(&name(), &id).await.unwrap();
        assert!(store.get(&name(), &id).await.unwrap().is_none());
        store.delete(&name(), &id).await.unwrap();
    }

    #[tokio::test]
    async fn update_missing_is_not_found() {
        let store = MemoryStore::new();
        let id = RecordId::new("nope").unwrap();
        let err = store
            .update(&name(), &id, &FieldPatch::new())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn query_filters_by_partition() {
        let store = MemoryStore::new();
        store
            .create(&name(), fields(json!({"type": "award"})))
            .await
            .unwrap();
        store
            .create(&name(), fields(json!({"type": "recognition"})))
            .await
            .unwrap();
        store.create(&name(), fields(json!({}))).await.unwrap();

        let award = PartitionKey::new("award").unwrap();
        let docs = store.query_by_partition(&name(), "type", &award).await.unwrap();
        assert_eq!(docs.len(), 1);
    }

    #[tokio::test]
    async fn rejected_batch_applies_nothing() {
        let store = MemoryStore::new();
        let a = store
            .create(&name(), fields(json!({"order": 0})))
            .await
            .unwrap();
        store.inject(Fault::RejectBatch);

        let writes = vec![BatchWrite::new(a.clone(), FieldPatch::new().with("order", 1))];
        let err = store.batch_update(&name(), &writes).await.unwrap_err();
        assert!(matches!(err, Error::StoreUnavailable(_)));

        let doc = store.get(&name(), &a).await.unwrap().unwrap();
        assert_eq!(doc.int_field("order"), Some(0));

        // One-shot: the next batch goes through.
        store.batch_update(&name(), &writes).await.unwrap();
        let doc = store.get(&name(), &a).await.unwrap().unwrap();
        assert_eq!(doc.int_field("order"), Some(1));
    }

    #[tokio::test]
    async fn partial_batch_reports_counts() {
        let store = MemoryStore::new();
        let mut writes = Vec::new();
        for i in 0..3 {
            let id = store
                .create(&name(), fields(json!({"order": i})))
                .await
                .unwrap();
            writes.push(BatchWrite::new(id, FieldPatch::new().with("order", i + 1)));
        }
        store.inject(Fault::PartialBatch { applied: 2 });

        let err = store.batch_update(&name(), &writes).await.unwrap_err();
        match err {
            Error::PartialShiftFailure {
                applied, failed, ..
            } => {
                assert_eq!(applied, 2);
                assert_eq!(failed, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn batch_with_unknown_id_fails_whole() {
        let store = MemoryStore::new();
        let a = store
            .create(&name(), fields(json!({"order": 0})))
            .await
            .unwrap();
        let writes = vec![
            BatchWrite::new(a.clone(), FieldPatch::new().with("order", 5)),
            BatchWrite::new(RecordId::new("ghost").unwrap(), FieldPatch::new()),
        ];
        assert!(store.batch_update(&name(), &writes).await.is_err());
        let doc = store.get(&name(), &a).await.unwrap().unwrap();
        assert_eq!(doc.int_field("order"), Some(0));
    }
}
