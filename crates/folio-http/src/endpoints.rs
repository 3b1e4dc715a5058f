//! Request and response bodies of the document API.

use serde::{Deserialize, Serialize};

use folio_core::{BatchWrite, Document, FieldPatch, Fields, RecordId};

/// Query string for a partition listing.
#[derive(Debug, Serialize)]
pub struct PartitionQuery<'a> {
    pub field: &'a str,
    pub equals: &'a str,
}

/// Response from a partition listing.
#[derive(Debug, Deserialize)]
pub struct DocumentsResponse {
    #[serde(default)]
    pub documents: Vec<Document>,
}

/// Request body for document creation.
#[derive(Debug, Serialize)]
pub struct CreateRequest<'a> {
    pub fields: &'a Fields,
}

/// Response from document creation.
#[derive(Debug, Deserialize)]
pub struct CreateResponse {
    pub id: RecordId,
}

/// Request body for a single patch.
#[derive(Debug, Serialize)]
pub struct PatchRequest<'a> {
    pub fields: &'a FieldPatch,
}

/// Request body for an atomic batch.
#[derive(Debug, Serialize)]
pub struct BatchUpdateRequest<'a> {
    pub writes: &'a [BatchWrite],
}

/// Error body returned with non-2xx statuses.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: Option<String>,
    pub message: Option<String>,
}
