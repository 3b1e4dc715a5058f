//! Batch fallback for stores without a batch primitive.

use tracing::warn;

use crate::Result;
use crate::error::{Error, RejectedRequest, StoreError};
use crate::traits::{BatchWrite, DocumentStore};
use crate::types::CollectionName;

/// Apply `writes` one [`update`](DocumentStore::update) at a time.
///
/// If the first write fails nothing has changed and its error is returned
/// as is. A later failure leaves the earlier writes in place and is
/// reported as [`Error::PartialShiftFailure`].
pub async fn apply_sequentially<S>(
    store: &S,
    collection: &CollectionName,
    writes: &[BatchWrite],
) -> Result<()>
where
    S: DocumentStore + ?Sized,
{
    for (applied, write) in writes.iter().enumerate() {
        let Err(e) = store.update(collection, &write.id, &write.fields).await else {
            continue;
        };

        if applied == 0 {
            return Err(e);
        }

        warn!(
            %collection,
            applied,
            failed = writes.len() - applied,
            "Sequential batch stopped partway"
        );
        return Err(Error::PartialShiftFailure {
            collection: collection.to_string(),
            applied,
            failed: writes.len() - applied,
            source: into_store_error(e),
        });
    }

    Ok(())
}

fn into_store_error(err: Error) -> StoreError {
    match err {
        Error::StoreUnavailable(source) => source,
        Error::PartialShiftFailure { source, .. } => source,
        Error::NotFound { id, .. } => StoreError::Rejected(RejectedRequest::new(
            404,
            Some("NotFound".to_string()),
            Some(format!("record '{}' not found", id)),
        )),
        Error::InvalidInput(e) => StoreError::Rejected(RejectedRequest::new(
            400,
            Some("InvalidInput".to_string()),
            Some(e.to_string()),
        )),
    }
}
