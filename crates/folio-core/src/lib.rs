//! folio-core - Ordered content collections over an abstract document store.
//!
//! Portfolio content (awards, photos, tearsheets, ...) is shown in an order
//! chosen by an editor. [`OrderedCollection`] keeps that order dense per
//! partition while records are inserted, moved and removed through any
//! [`DocumentStore`].

pub mod config;
pub mod document;
pub mod error;
pub mod ordering;
pub mod outcome;
pub mod store;
pub mod traits;
pub mod types;

pub use config::{CollectionConfig, CollectionRegistry};
pub use document::{Document, FieldPatch, Fields};
pub use error::Error;
pub use ordering::{DensityReport, OrderedCollection, RenumberReport};
pub use outcome::{ErrorKind, Outcome};
pub use store::MemoryStore;
pub use traits::{BatchWrite, DocumentStore};
pub use types::{CollectionName, PartitionKey, RecordId, StoreUrl};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
