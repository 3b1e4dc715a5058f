//! The ordered collection manager.

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::config::CollectionConfig;
use crate::document::{Document, FieldPatch, Fields};
use crate::error::Error;
use crate::traits::{BatchWrite, DocumentStore};
use crate::types::{CollectionName, PartitionKey, RecordId};
use crate::Result;

use super::entry::{Entry, display_cmp};
use super::plan::{Shift, plan_insert, plan_remove, plan_renumber, plan_reorder};
use super::report::{DensityReport, RenumberReport};

/// Keeps the order field of one collection dense and unique per partition.
///
/// Every operation re-reads the partition, plans the shifts and writes them
/// back. There is no isolation between concurrent operations on the same
/// partition; the density invariant only holds when calls are serialized.
#[derive(Debug, Clone)]
pub struct OrderedCollection<S> {
    store: S,
    config: CollectionConfig,
}

impl<S: DocumentStore> OrderedCollection<S> {
    /// Bind a store to a collection config.
    ///
    /// # Errors
    ///
    /// Returns an error if the config fails validation.
    pub fn new(store: S, config: CollectionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { store, config })
    }

    /// The collection config.
    pub fn config(&self) -> &CollectionConfig {
        &self.config
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    fn name(&self) -> &CollectionName {
        &self.config.name
    }

    /// List a partition in display order.
    #[instrument(skip(self), fields(collection = %self.config.name, %partition))]
    pub async fn list(&self, partition: &PartitionKey) -> Result<Vec<Document>> {
        let docs = self.snapshot(partition).await?;

        let mut keyed: Vec<(Entry, Document)> = docs
            .into_iter()
            .map(|doc| (Entry::from_document(&doc, &self.config), doc))
            .collect();
        keyed.sort_by(|(a, _), (b, _)| display_cmp(a, b));

        Ok(keyed.into_iter().map(|(_, doc)| doc).collect())
    }

    /// Insert a new record into `partition`.
    ///
    /// Without a usable `desired_order` the record is appended. Records at
    /// or after the chosen position move up by one before the record is
    /// created. The partition, order and creation timestamp fields are set
    /// here; the rest of `payload` is stored as given.
    #[instrument(skip(self, payload), fields(collection = %self.config.name, %partition))]
    pub async fn insert(
        &self,
        partition: &PartitionKey,
        desired_order: Option<i64>,
        payload: FieldPatch,
    ) -> Result<RecordId> {
        let entries = self.entries(&self.snapshot(partition).await?);
        let plan = plan_insert(&entries, desired_order, self.config.base)?;
        debug!(
            order = plan.order,
            shifts = plan.shifts.len(),
            "Planned insert"
        );

        self.write_batch(partition, self.shift_writes(&plan.shifts))
            .await?;

        let fields = self.new_fields(partition, plan.order, payload);
        let id = match self.store.create(self.name(), fields).await {
            Ok(id) => id,
            Err(e) => {
                if !plan.shifts.is_empty() {
                    error!(
                        data_integrity = true,
                        order = plan.order,
                        error = %e,
                        "Records shifted but create failed; partition has a gap"
                    );
                }
                return Err(e);
            }
        };

        info!(%id, order = plan.order, "Inserted record");
        Ok(id)
    }

    /// Update a record, optionally moving it.
    ///
    /// Within the same partition the record rotates to `new_order` and the
    /// records in between shift by one; the shifts and the record's own
    /// update go out as one batch. If `partition` differs from the stored
    /// one, the record is inserted into `partition` (at `new_order`, or
    /// appended) and the gap it leaves behind is closed.
    ///
    /// The partition and order fields in `patch` are ignored; they are
    /// controlled by the other arguments.
    #[instrument(skip(self, patch), fields(collection = %self.config.name, %partition))]
    pub async fn reorder(
        &self,
        id: &RecordId,
        partition: &PartitionKey,
        new_order: Option<i64>,
        mut patch: FieldPatch,
    ) -> Result<()> {
        self.strip_reserved(&mut patch);

        let doc = self.fetch(id).await?;
        let current = doc.int_field(&self.config.order_field);
        let stored_partition = doc.str_field(&self.config.partition_field);

        if stored_partition != Some(partition.as_str()) {
            let from = stored_partition.and_then(|p| PartitionKey::new(p).ok());
            return self
                .move_partition(&doc, from, partition, new_order, patch)
                .await;
        }

        let others: Vec<Entry> = self
            .entries(&self.snapshot(partition).await?)
            .into_iter()
            .filter(|e| &e.id != id)
            .collect();
        let plan = plan_reorder(&others, current, new_order, self.config.base)?;

        if plan.is_noop(current) {
            if let Some(order) = current {
                patch.set(self.config.order_field.clone(), order);
            }
            if patch.is_empty() {
                debug!(%id, "Nothing to update");
                return Ok(());
            }
            self.store.update(self.name(), id, &patch).await?;
            info!(%id, "Updated record in place");
            return Ok(());
        }

        let mut writes = self.shift_writes(&plan.shifts);
        if let Some(order) = plan.order {
            patch.set(self.config.order_field.clone(), order);
        }
        writes.push(BatchWrite::new(id.clone(), patch));
        self.write_batch(partition, writes).await?;

        info!(
            %id,
            from = ?current,
            to = ?plan.order,
            shifted = plan.shifts.len(),
            "Moved record"
        );
        Ok(())
    }

    /// Remove a record and close the gap it leaves.
    ///
    /// Returns the removed document so the caller can clean up anything it
    /// references outside the store.
    #[instrument(skip(self), fields(collection = %self.config.name))]
    pub async fn remove(&self, id: &RecordId) -> Result<Document> {
        let doc = self.fetch(id).await?;
        self.store.delete(self.name(), id).await?;

        let gap = doc.int_field(&self.config.order_field);
        let partition = doc
            .str_field(&self.config.partition_field)
            .and_then(|p| PartitionKey::new(p).ok());

        match (partition, gap) {
            (Some(partition), Some(gap)) => self.close_gap(&partition, gap).await?,
            (None, _) => warn!(%id, "Removed record has no partition; nothing to shift"),
            (_, None) => debug!(%id, "Removed legacy record"),
        }

        info!(%id, order = ?gap, "Removed record");
        Ok(doc)
    }

    /// Like [`remove`](Self::remove), but a missing record is not an error.
    pub async fn remove_if_exists(&self, id: &RecordId) -> Result<Option<Document>> {
        match self.remove(id).await {
            Ok(doc) => Ok(Some(doc)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Rewrite a partition's orders to `base..base+N` in display order.
    ///
    /// This is the recovery path after a partial shift failure. It is never
    /// run implicitly.
    #[instrument(skip(self), fields(collection = %self.config.name, %partition))]
    pub async fn renumber(&self, partition: &PartitionKey) -> Result<RenumberReport> {
        let entries = self.entries(&self.snapshot(partition).await?);
        let shifts = plan_renumber(&entries, self.config.base);

        self.write_batch(partition, self.shift_writes(&shifts))
            .await?;

        if shifts.is_empty() {
            debug!("Partition already dense");
        } else {
            warn!(changed = shifts.len(), "Renumbered partition");
        }

        Ok(RenumberReport {
            partition: partition.clone(),
            total: entries.len(),
            changed: shifts.len(),
        })
    }

    /// Check a partition against the density invariant.
    #[instrument(skip(self), fields(collection = %self.config.name, %partition))]
    pub async fn check(&self, partition: &PartitionKey) -> Result<DensityReport> {
        let entries = self.entries(&self.snapshot(partition).await?);
        Ok(DensityReport::from_entries(
            partition.clone(),
            self.config.base,
            &entries,
        ))
    }

    async fn move_partition(
        &self,
        doc: &Document,
        from: Option<PartitionKey>,
        to: &PartitionKey,
        new_order: Option<i64>,
        mut patch: FieldPatch,
    ) -> Result<()> {
        let id = &doc.id;
        let gap = doc.int_field(&self.config.order_field);

        let others: Vec<Entry> = self
            .entries(&self.snapshot(to).await?)
            .into_iter()
            .filter(|e| &e.id != id)
            .collect();
        let plan = plan_insert(&others, new_order, self.config.base)?;

        let mut writes = self.shift_writes(&plan.shifts);
        patch.set(self.config.partition_field.clone(), to.as_str());
        patch.set(self.config.order_field.clone(), plan.order);
        writes.push(BatchWrite::new(id.clone(), patch));
        self.write_batch(to, writes).await?;

        // The record has left `from`; close its old slot.
        if let (Some(from), Some(gap)) = (&from, gap) {
            self.close_gap(from, gap).await?;
        }

        info!(
            %id,
            from = ?from.as_ref().map(PartitionKey::as_str),
            order = plan.order,
            "Moved record to another partition"
        );
        Ok(())
    }

    async fn close_gap(&self, partition: &PartitionKey, gap: i64) -> Result<()> {
        let remaining = self.entries(&self.snapshot(partition).await?);
        let shifts = plan_remove(&remaining, Some(gap), self.config.base)?;
        debug!(%partition, gap, shifts = shifts.len(), "Closing gap");
        self.write_batch(partition, self.shift_writes(&shifts)).await
    }

    async fn fetch(&self, id: &RecordId) -> Result<Document> {
        self.store
            .get(self.name(), id)
            .await?
            .ok_or_else(|| Error::not_found(self.name().as_str(), id.as_str()))
    }

    async fn snapshot(&self, partition: &PartitionKey) -> Result<Vec<Document>> {
        let docs = self
            .store
            .query_by_partition(self.name(), &self.config.partition_field, partition)
            .await?;
        debug!(%partition, count = docs.len(), "Fetched partition");
        Ok(docs)
    }

    fn entries(&self, docs: &[Document]) -> Vec<Entry> {
        let entries: Vec<Entry> = docs
            .iter()
            .map(|doc| Entry::from_document(doc, &self.config))
            .collect();

        let legacy = entries.iter().filter(|e| e.is_legacy()).count();
        if legacy > 0 {
            warn!(legacy, "Partition holds records without an order");
        }
        entries
    }

    fn shift_writes(&self, shifts: &[Shift]) -> Vec<BatchWrite> {
        shifts
            .iter()
            .map(|s| {
                BatchWrite::new(
                    s.id.clone(),
                    FieldPatch::new().with(self.config.order_field.clone(), s.to),
                )
            })
            .collect()
    }

    async fn write_batch(&self, partition: &PartitionKey, writes: Vec<BatchWrite>) -> Result<()> {
        if writes.is_empty() {
            return Ok(());
        }

        match self.store.batch_update(self.name(), &writes).await {
            Ok(()) => {
                debug!(%partition, writes = writes.len(), "Applied batch");
                Ok(())
            }
            Err(e) if e.is_integrity_error() => {
                error!(
                    data_integrity = true,
                    %partition,
                    error = %e,
                    "Shift batch partially applied; partition needs renumbering"
                );
                Err(e)
            }
            Err(e) => {
                warn!(%partition, error = %e, "Shift batch failed");
                Err(e)
            }
        }
    }

    fn new_fields(&self, partition: &PartitionKey, order: i64, payload: FieldPatch) -> Fields {
        let mut fields = payload.into_fields();
        fields.insert(
            self.config.partition_field.clone(),
            Value::String(partition.to_string()),
        );
        fields.insert(self.config.order_field.clone(), Value::from(order));
        fields
            .entry(self.config.created_at_field.clone())
            .or_insert_with(|| Value::String(Utc::now().to_rfc3339()));
        fields
    }

    fn strip_reserved(&self, patch: &mut FieldPatch) {
        for field in [&self.config.partition_field, &self.config.order_field] {
            if patch.take(field).is_some() {
                debug!(field = %field, "Ignoring reserved field in patch");
            }
        }
    }
}
