//! Store selection for the CLI.

use std::path::PathBuf;

use async_trait::async_trait;
use directories::ProjectDirs;

use folio_core::error::InvalidInputError;
use folio_core::{
    BatchWrite, CollectionName, Document, DocumentStore, FieldPatch, Fields, PartitionKey,
    RecordId, Result, StoreUrl,
};
use folio_file::FileStore;
use folio_http::{BatchMode, HttpStore};

use crate::cli::StoreArgs;

/// Either store backend, chosen by URL scheme.
#[derive(Debug, Clone)]
pub enum CliStore {
    File(FileStore),
    Http(HttpStore),
}

impl CliStore {
    /// Open the store named by `--store`, or the local default.
    pub fn open(args: &StoreArgs) -> Result<Self> {
        let url = match &args.url {
            Some(url) => StoreUrl::new(url)?,
            None => default_store_url()?,
        };

        if url.is_local() {
            let path = url.to_file_path().ok_or_else(|| InvalidInputError::StoreUrl {
                value: url.to_string(),
                reason: "not a usable file path".to_string(),
            })?;
            tracing::debug!(path = %path.display(), "Using file store");
            return Ok(CliStore::File(FileStore::new(path)));
        }

        let mode = if args.sequential {
            BatchMode::Sequential
        } else {
            BatchMode::Atomic
        };
        let mut store = HttpStore::new(url)?.with_batch_mode(mode);
        if let Some(token) = &args.token {
            store = store.with_token(token.clone());
        }
        tracing::debug!(url = %store.url(), ?mode, "Using HTTP store");
        Ok(CliStore::Http(store))
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("", "", "folio").ok_or_else(|| {
        InvalidInputError::Other {
            message: "could not determine a home directory".to_string(),
        }
        .into()
    })
}

/// `<data dir>/store` as a file URL.
fn default_store_url() -> Result<StoreUrl> {
    StoreUrl::from_path(project_dirs()?.data_dir().join("store"))
}

/// `<config dir>/collections.json`.
pub fn default_config_path() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join("collections.json"))
}

#[async_trait]
impl DocumentStore for CliStore {
    async fn query_by_partition(
        &self,
        collection: &CollectionName,
        field: &str,
        partition: &PartitionKey,
    ) -> Result<Vec<Document>> {
        match self {
            CliStore::File(store) => store.query_by_partition(collection, field, partition).await,
            CliStore::Http(store) => store.query_by_partition(collection, field, partition).await,
        }
    }

    async fn get(&self, collection: &CollectionName, id: &RecordId) -> Result<Option<Document>> {
        match self {
            CliStore::File(store) => store.get(collection, id).await,
            CliStore::Http(store) => store.get(collection, id).await,
        }
    }

    async fn create(&self, collection: &CollectionName, fields: Fields) -> Result<RecordId> {
        match self {
            CliStore::File(store) => store.create(collection, fields).await,
            CliStore::Http(store) => store.create(collection, fields).await,
        }
    }

    async fn update(
        &self,
        collection: &CollectionName,
        id: &RecordId,
        patch: &FieldPatch,
    ) -> Result<()> {
        match self {
            CliStore::File(store) => store.update(collection, id, patch).await,
            CliStore::Http(store) => store.update(collection, id, patch).await,
        }
    }

    async fn delete(&self, collection: &CollectionName, id: &RecordId) -> Result<()> {
        match self {
            CliStore::File(store) => store.delete(collection, id).await,
            CliStore::Http(store) => store.delete(collection, id).await,
        }
    }

    async fn batch_update(
        &self,
        collection: &CollectionName,
        writes: &[BatchWrite],
    ) -> Result<()> {
        match self {
            CliStore::File(store) => store.batch_update(collection, writes).await,
            CliStore::Http(store) => store.batch_update(collection, writes).await,
        }
    }
}
