//! Filesystem document store.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use fs2::FileExt;
use serde_json::Value;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use folio_core::error::{Error, StoreError};
use folio_core::{
    BatchWrite, CollectionName, Document, DocumentStore, FieldPatch, Fields, PartitionKey,
    RecordId, Result,
};

use crate::journal::{Journal, JournalEntry, JournalOp};

fn corrupt(path: &Path, err: impl std::fmt::Display) -> Error {
    Error::StoreUnavailable(StoreError::Corrupt {
        message: format!("{}: {}", path.display(), err),
    })
}

/// Exclusive advisory lock on one collection directory.
struct CollectionLock {
    file: File,
}

impl Drop for CollectionLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

/// Filesystem-backed document store.
///
/// Writes go through a temp file and a rename, so a reader never sees a
/// half-written document. A batch stages every temp file before renaming
/// any of them and holds the collection lock throughout. The lock does not
/// serialize whole ordering operations across processes.
///
/// The journal is written after the data. A journal failure is logged and
/// does not fail a write that has already landed.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
    journal: Journal,
}

impl FileStore {
    /// Create a file store at the given root directory.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        let journal = Journal::new(&root);
        Self { root, journal }
    }

    /// Get the root directory path.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the mutation journal.
    pub fn journal_path(&self) -> &Path {
        self.journal.path()
    }

    /// Every journal entry, oldest first.
    pub fn journal(&self) -> Result<Vec<JournalEntry>> {
        self.journal.read()
    }

    fn collection_dir(&self, collection: &CollectionName) -> PathBuf {
        self.root.join("collections").join(collection.as_str())
    }

    fn document_path(&self, collection: &CollectionName, id: &RecordId) -> PathBuf {
        self.collection_dir(collection)
            .join(format!("{}.json", id.as_str()))
    }

    fn record<'a>(
        &self,
        op: JournalOp,
        collection: &CollectionName,
        ids: impl IntoIterator<Item = &'a str>,
    ) {
        if let Err(e) = self.journal.append(op, collection.as_str(), ids) {
            warn!(
                ?op,
                journal = %self.journal.path().display(),
                error = %e,
                "Journal append failed; data was written"
            );
        }
    }

    fn generate_id() -> Result<RecordId> {
        RecordId::new(Uuid::new_v4().simple().to_string())
    }

    fn lock_collection(&self, collection: &CollectionName) -> Result<CollectionLock> {
        let dir = self.collection_dir(collection);
        fs::create_dir_all(&dir)?;

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(dir.join(".lock"))?;
        file.lock_exclusive()?;

        Ok(CollectionLock { file })
    }

    fn read_fields(path: &Path) -> Result<Option<Fields>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path)?;
        match serde_json::from_str::<Value>(&content).map_err(|e| corrupt(path, e))? {
            Value::Object(fields) => Ok(Some(fields)),
            _ => Err(corrupt(path, "document is not a JSON object")),
        }
    }

    /// Write `fields` next to `path` and return the temp file's path.
    fn stage(path: &Path, fields: &Fields) -> Result<PathBuf> {
        let content = serde_json::to_string_pretty(fields).map_err(|e| corrupt(path, e))?;
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, content)?;
        Ok(temp_path)
    }

    fn write_fields(path: &Path, fields: &Fields) -> Result<()> {
        let temp_path = Self::stage(path, fields)?;
        fs::rename(&temp_path, path)?;
        Ok(())
    }

    fn discard(staged: &[(PathBuf, PathBuf)]) {
        for (temp_path, _) in staged {
            let _ = fs::remove_file(temp_path);
        }
    }
}

#[async_trait]
impl DocumentStore for FileStore {
    #[instrument(skip(self))]
    async fn query_by_partition(
        &self,
        collection: &CollectionName,
        field: &str,
        partition: &PartitionKey,
    ) -> Result<Vec<Document>> {
        let dir = self.collection_dir(collection);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut documents = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if !path.extension().is_some_and(|ext| ext == "json") {
                continue;
            }

            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let id = match RecordId::new(stem) {
                Ok(id) => id,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping file with invalid id");
                    continue;
                }
            };

            let Some(fields) = Self::read_fields(&path)? else {
                continue;
            };
            if fields.get(field).and_then(Value::as_str) == Some(partition.as_str()) {
                documents.push(Document::new(id, fields));
            }
        }

        debug!(count = documents.len(), "Queried partition");
        Ok(documents)
    }

    async fn get(&self, collection: &CollectionName, id: &RecordId) -> Result<Option<Document>> {
        let path = self.document_path(collection, id);
        Ok(Self::read_fields(&path)?.map(|fields| Document::new(id.clone(), fields)))
    }

    #[instrument(skip(self, fields))]
    async fn create(&self, collection: &CollectionName, fields: Fields) -> Result<RecordId> {
        let id = Self::generate_id()?;
        {
            let _lock = self.lock_collection(collection)?;
            Self::write_fields(&self.document_path(collection, &id), &fields)?;
        }
        self.record(JournalOp::Create, collection, [id.as_str()]);

        debug!(%id, "Created document");
        Ok(id)
    }

    #[instrument(skip(self, patch))]
    async fn update(
        &self,
        collection: &CollectionName,
        id: &RecordId,
        patch: &FieldPatch,
    ) -> Result<()> {
        {
            let _lock = self.lock_collection(collection)?;
            let path = self.document_path(collection, id);
            let mut fields = Self::read_fields(&path)?
                .ok_or_else(|| Error::not_found(collection.as_str(), id.as_str()))?;
            patch.apply_to(&mut fields);
            Self::write_fields(&path, &fields)?;
        }
        self.record(JournalOp::Update, collection, [id.as_str()]);

        debug!("Updated document");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, collection: &CollectionName, id: &RecordId) -> Result<()> {
        let path = self.document_path(collection, id);
        if !path.exists() {
            return Ok(());
        }

        {
            let _lock = self.lock_collection(collection)?;
            fs::remove_file(&path)?;
        }
        self.record(JournalOp::Delete, collection, [id.as_str()]);

        debug!("Deleted document");
        Ok(())
    }

    #[instrument(skip(self, writes), fields(writes = writes.len()))]
    async fn batch_update(
        &self,
        collection: &CollectionName,
        writes: &[BatchWrite],
    ) -> Result<()> {
        if writes.is_empty() {
            return Ok(());
        }

        let lock = self.lock_collection(collection)?;

        // Patches to the same id accumulate.
        let mut pending: BTreeMap<&RecordId, Fields> = BTreeMap::new();
        for write in writes {
            if let Some(fields) = pending.get_mut(&write.id) {
                write.fields.apply_to(fields);
                continue;
            }
            let path = self.document_path(collection, &write.id);
            let mut fields = Self::read_fields(&path)?
                .ok_or_else(|| Error::not_found(collection.as_str(), write.id.as_str()))?;
            write.fields.apply_to(&mut fields);
            pending.insert(&write.id, fields);
        }

        let mut staged = Vec::with_capacity(pending.len());
        for (id, fields) in &pending {
            let path = self.document_path(collection, id);
            match Self::stage(&path, fields) {
                Ok(temp_path) => staged.push((temp_path, path)),
                Err(e) => {
                    Self::discard(&staged);
                    return Err(e);
                }
            }
        }

        for (applied, (temp_path, path)) in staged.iter().enumerate() {
            if let Err(e) = fs::rename(temp_path, path) {
                Self::discard(&staged[applied..]);
                if applied == 0 {
                    return Err(e.into());
                }

                warn!(applied, failed = staged.len() - applied, "Batch rename stopped partway");
                return Err(Error::PartialShiftFailure {
                    collection: collection.to_string(),
                    applied,
                    failed: staged.len() - applied,
                    source: StoreError::from(e),
                });
            }
        }
        drop(lock);

        self.record(
            JournalOp::Update,
            collection,
            pending.keys().map(|id| id.as_str()),
        );

        debug!("Applied batch");
        Ok(())
    }
}
