//! Core folio types.
//!
//! These types enforce their invariants at construction time,
//! ensuring invalid states are unrepresentable.

mod collection_name;
mod partition_key;
mod record_id;
mod store_url;

pub use collection_name::CollectionName;
pub use partition_key::PartitionKey;
pub use record_id::RecordId;
pub use store_url::StoreUrl;
