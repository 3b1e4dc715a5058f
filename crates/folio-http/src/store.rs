//! Network-backed document store.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use tracing::{debug, instrument};

use folio_core::error::{Error, StoreError};
use folio_core::store::apply_sequentially;
use folio_core::{
    BatchWrite, CollectionName, Document, DocumentStore, FieldPatch, Fields, PartitionKey,
    RecordId, Result, StoreUrl,
};

use crate::client::{DEFAULT_TIMEOUT, HttpClient};
use crate::endpoints::{
    BatchUpdateRequest, CreateRequest, CreateResponse, DocumentsResponse, PartitionQuery,
    PatchRequest,
};

/// How [`HttpStore`] applies a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BatchMode {
    /// One `:batchUpdate` call, committed by the server as a unit.
    #[default]
    Atomic,
    /// One `PATCH` per write, for servers without a batch endpoint.
    ///
    /// A failure partway through is reported as
    /// [`Error::PartialShiftFailure`].
    Sequential,
}

/// A document store reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: HttpClient,
    batch_mode: BatchMode,
}

impl HttpStore {
    /// Create a store client for the given base URL.
    pub fn new(url: StoreUrl) -> Result<Self> {
        Self::with_timeout(url, DEFAULT_TIMEOUT)
    }

    /// Create a store client with a custom request timeout.
    pub fn with_timeout(url: StoreUrl, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: HttpClient::new(url, timeout)?,
            batch_mode: BatchMode::default(),
        })
    }

    /// Authenticate every request with a bearer token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.client.set_token(Some(token.into()));
        self
    }

    pub fn with_batch_mode(mut self, mode: BatchMode) -> Self {
        self.batch_mode = mode;
        self
    }

    /// Returns the store URL.
    pub fn url(&self) -> &StoreUrl {
        self.client.base()
    }

    pub fn batch_mode(&self) -> BatchMode {
        self.batch_mode
    }

    fn document_path(collection: &CollectionName, id: &RecordId) -> String {
        format!("{}/{}", collection, id)
    }
}

fn is_status(err: &Error, status: u16) -> bool {
    matches!(err, Error::StoreUnavailable(StoreError::Rejected(r)) if r.status == status)
}

#[async_trait]
impl DocumentStore for HttpStore {
    #[instrument(skip(self))]
    async fn query_by_partition(
        &self,
        collection: &CollectionName,
        field: &str,
        partition: &PartitionKey,
    ) -> Result<Vec<Document>> {
        let query = PartitionQuery {
            field,
            equals: partition.as_str(),
        };
        let response: DocumentsResponse = self.client.get_json(collection.as_str(), &query).await?;

        debug!(count = response.documents.len(), "Queried partition");
        Ok(response.documents)
    }

    async fn get(&self, collection: &CollectionName, id: &RecordId) -> Result<Option<Document>> {
        self.client
            .get_optional(&Self::document_path(collection, id))
            .await
    }

    #[instrument(skip(self, fields))]
    async fn create(&self, collection: &CollectionName, fields: Fields) -> Result<RecordId> {
        let response: CreateResponse = self
            .client
            .send_json(Method::POST, collection.as_str(), &CreateRequest { fields: &fields })
            .await?;

        debug!(id = %response.id, "Created document");
        Ok(response.id)
    }

    #[instrument(skip(self, patch))]
    async fn update(
        &self,
        collection: &CollectionName,
        id: &RecordId,
        patch: &FieldPatch,
    ) -> Result<()> {
        self.client
            .send_json_no_response(
                Method::PATCH,
                &Self::document_path(collection, id),
                &PatchRequest { fields: patch },
            )
            .await
            .map_err(|e| {
                if is_status(&e, 404) {
                    Error::not_found(collection.as_str(), id.as_str())
                } else {
                    e
                }
            })
    }

    #[instrument(skip(self))]
    async fn delete(&self, collection: &CollectionName, id: &RecordId) -> Result<()> {
        match self
            .client
            .delete(&Self::document_path(collection, id))
            .await
        {
            Err(e) if is_status(&e, 404) => {
                debug!("Document already absent");
                Ok(())
            }
            other => other,
        }
    }

    #[instrument(skip(self, writes), fields(writes = writes.len(), mode = ?self.batch_mode))]
    async fn batch_update(
        &self,
        collection: &CollectionName,
        writes: &[BatchWrite],
    ) -> Result<()> {
        if writes.is_empty() {
            return Ok(());
        }

        match self.batch_mode {
            BatchMode::Atomic => {
                self.client
                    .send_json_no_response(
                        Method::POST,
                        &format!("{}:batchUpdate", collection),
                        &BatchUpdateRequest { writes },
                    )
                    .await
            }
            BatchMode::Sequential => apply_sequentially(self, collection, writes).await,
        }
    }
}
