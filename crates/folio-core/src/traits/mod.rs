//! Core traits for document storage.

mod store;

pub use store::{BatchWrite, DocumentStore};
