//! Error types for folio.
//!
//! This module provides a unified error type with explicit variants for
//! missing records, store failures, partially applied shift batches and
//! input validation errors.

use std::fmt;
use thiserror::Error;

/// The unified error type for folio operations.
///
/// Callers that need the `{success, error}` shape should convert through
/// [`Outcome`](crate::Outcome) instead of matching on this directly.
#[derive(Debug, Error)]
pub enum Error {
    /// The referenced record does not exist.
    #[error("record '{id}' not found in collection '{collection}'")]
    NotFound { collection: String, id: String },

    /// The backing document store rejected or failed to complete a request.
    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    /// A shift batch was only partly applied.
    ///
    /// The partition may now contain duplicate or missing ordinals and needs
    /// a renumber pass.
    #[error(
        "partial shift failure in '{collection}': {applied} applied, {failed} failed: {source}"
    )]
    PartialShiftFailure {
        collection: String,
        applied: usize,
        failed: usize,
        #[source]
        source: StoreError,
    },

    /// Input validation errors (invalid id, collection name, URL, config).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

impl Error {
    /// Build a `NotFound` error.
    pub fn not_found(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Error::NotFound {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// Returns true if this is a `NotFound` error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// Returns true if the error indicates the partition may be inconsistent.
    pub fn is_integrity_error(&self) -> bool {
        matches!(self, Error::PartialShiftFailure { .. })
    }
}

/// Failures reported by a document store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Local filesystem error.
    #[error("IO error: {message}")]
    Io { message: String },

    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out")]
    Timeout,

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },

    /// The store answered but refused the request.
    #[error("{0}")]
    Rejected(RejectedRequest),

    /// Stored data could not be decoded.
    #[error("corrupt document: {message}")]
    Corrupt { message: String },
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::StoreUnavailable(StoreError::from(err))
    }
}

impl From<RejectedRequest> for Error {
    fn from(err: RejectedRequest) -> Self {
        Error::StoreUnavailable(StoreError::Rejected(err))
    }
}

/// A request the store answered with an error status.
#[derive(Debug, Clone)]
pub struct RejectedRequest {
    /// HTTP-style status code.
    pub status: u16,
    /// Machine-readable error code (if present).
    pub code: Option<String>,
    /// Error message from the store.
    pub message: Option<String>,
}

impl fmt::Display for RejectedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "status {}", self.status)?;
        if let Some(ref code) = self.code {
            write!(f, " [{}]", code)?;
        }
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for RejectedRequest {}

impl RejectedRequest {
    /// Create a new rejected request error.
    pub fn new(status: u16, code: Option<String>, message: Option<String>) -> Self {
        Self {
            status,
            code,
            message,
        }
    }

    /// Check if the store denied access.
    pub fn is_auth_error(&self) -> bool {
        self.status == 401 || self.status == 403
    }
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid record id.
    #[error("invalid record id '{value}': {reason}")]
    RecordId { value: String, reason: String },

    /// Invalid collection name.
    #[error("invalid collection name '{value}': {reason}")]
    CollectionName { value: String, reason: String },

    /// Invalid partition key.
    #[error("invalid partition key '{value}': {reason}")]
    PartitionKey { value: String, reason: String },

    /// Invalid store URL.
    #[error("invalid store URL '{value}': {reason}")]
    StoreUrl { value: String, reason: String },

    /// A stored order too large to shift. Renumbering the partition repairs it.
    #[error("order {order} of record '{id}' is out of range; renumber the partition")]
    OrderOutOfRange { id: String, order: i64 },

    /// Invalid collection configuration.
    #[error("invalid collection config '{name}': {reason}")]
    Config { name: String, reason: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}
