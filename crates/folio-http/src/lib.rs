//! folio-http - Document store over a JSON REST API.

mod client;
mod endpoints;
mod store;

pub use store::{BatchMode, HttpStore};
