//! Document types.
//!
//! This module defines what a [`DocumentStore`](crate::DocumentStore) hands
//! back and accepts. The ordering logic lives in [`ordering`](crate::ordering).

mod types;

pub use types::{Document, FieldPatch, Fields};
