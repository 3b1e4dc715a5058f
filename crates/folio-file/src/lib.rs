//! folio-file - Filesystem-backed document store.
//!
//! Every document is one pretty-printed JSON file under
//! `<root>/collections/<collection>/<id>.json`. Mutations are appended to
//! `<root>/journal.jsonl`.

mod journal;
mod store;

pub use journal::{JournalEntry, JournalOp};
pub use store::FileStore;
