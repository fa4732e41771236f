//! Core record storage trait.
//!
//! [`RecordStore`] provides the fundamental CRUD operations for records,
//! plus bulk variants and soft-delete/restore. All operations require a
//! [`TenantContext`] - there is no escape hatch around tenant isolation.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{RecordError, StoreError, StoreResult};
use crate::tenant::TenantContext;
use crate::types::{RecordPatch, StoredRecord};

/// Core storage trait for records.
///
/// # Soft Deletes
///
/// [`soft_delete`](Self::soft_delete) marks a record deleted by setting its
/// deletion timestamp; the row stays in the store and can be fetched with
/// [`get_any`](Self::get_any) or brought back with
/// [`restore`](Self::restore). [`delete`](Self::delete) removes the row for
/// good. Soft-deleted records are excluded from listings unless the caller
/// opts in.
///
/// # Failure semantics
///
/// Backends log each failure with the collection name and operation, then
/// propagate the error unchanged. There is no retry and no partial-result
/// suppression; for bulk semantics see the individual methods.
///
/// # Example
///
/// ```ignore
/// async fn example<S: RecordStore>(store: &S, tenant: &TenantContext) -> StoreResult<()> {
///     let report = serde_json::json!({
///         "title": "Q3 emissions report",
///         "status": "draft",
///     });
///     let stored = store.create(tenant, "compliance_reports", report).await?;
///
///     let fetched = store.get(tenant, "compliance_reports", stored.id()).await?;
///     assert_eq!(fetched.document()["status"], "draft");
///
///     store
///         .update(tenant, "compliance_reports", stored.id(),
///                 serde_json::json!({"status": "published"}))
///         .await?;
///
///     store.delete(tenant, "compliance_reports", stored.id()).await?;
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Returns a human-readable name for this storage backend.
    fn backend_name(&self) -> &'static str;

    /// Creates a new record.
    ///
    /// When the document carries no `id` field, one is generated. The
    /// returned record includes the stored representation with assigned ID
    /// and timestamps.
    ///
    /// # Errors
    ///
    /// * [`RecordError::AlreadyExists`] - a record with the document's ID exists
    /// * [`QueryError::InvalidDocument`](crate::error::QueryError::InvalidDocument) - the document is not a JSON object
    /// * [`TenantError`](crate::error::TenantError) - create not permitted
    async fn create(
        &self,
        tenant: &TenantContext,
        collection: &str,
        document: Value,
    ) -> StoreResult<StoredRecord>;

    /// Fetches exactly one record by ID.
    ///
    /// # Errors
    ///
    /// * [`RecordError::NotFound`] - no record with this ID
    /// * [`RecordError::Gone`] - the record was soft-deleted
    async fn get(
        &self,
        tenant: &TenantContext,
        collection: &str,
        id: &str,
    ) -> StoreResult<StoredRecord>;

    /// Fetches a record by ID, including soft-deleted records.
    ///
    /// # Errors
    ///
    /// * [`RecordError::NotFound`] - no record with this ID
    async fn get_any(
        &self,
        tenant: &TenantContext,
        collection: &str,
        id: &str,
    ) -> StoreResult<StoredRecord>;

    /// Applies a partial update to a record.
    ///
    /// The patch object's top-level fields are merged into the stored
    /// document; fields absent from the patch keep their stored values. The
    /// record's `id` cannot be changed through a patch.
    ///
    /// # Errors
    ///
    /// * [`RecordError::NotFound`] - no record with this ID
    /// * [`RecordError::Gone`] - the record was soft-deleted
    /// * [`QueryError::InvalidDocument`](crate::error::QueryError::InvalidDocument) - the patch is not a JSON object
    async fn update(
        &self,
        tenant: &TenantContext,
        collection: &str,
        id: &str,
        patch: Value,
    ) -> StoreResult<StoredRecord>;

    /// Hard-deletes a record and returns nothing on success.
    ///
    /// # Errors
    ///
    /// * [`RecordError::NotFound`] - no record with this ID
    async fn delete(&self, tenant: &TenantContext, collection: &str, id: &str)
        -> StoreResult<()>;

    /// Soft-deletes a record by stamping its deletion timestamp.
    ///
    /// Idempotent: soft-deleting an already-deleted record keeps the
    /// original deletion timestamp. Does not cascade to dependent records.
    async fn soft_delete(
        &self,
        tenant: &TenantContext,
        collection: &str,
        id: &str,
    ) -> StoreResult<StoredRecord>;

    /// Clears a record's deletion timestamp.
    ///
    /// Idempotent: restoring a live record is a no-op.
    async fn restore(
        &self,
        tenant: &TenantContext,
        collection: &str,
        id: &str,
    ) -> StoreResult<StoredRecord>;

    /// Inserts several records in a single transaction.
    ///
    /// The whole batch commits or none of it does.
    async fn bulk_create(
        &self,
        tenant: &TenantContext,
        collection: &str,
        documents: Vec<Value>,
    ) -> StoreResult<Vec<StoredRecord>>;

    /// Applies several partial updates in a single transaction.
    ///
    /// All-or-nothing: if any update fails (including a missing ID), the
    /// whole batch rolls back and the error names the failing record.
    async fn bulk_update(
        &self,
        tenant: &TenantContext,
        collection: &str,
        updates: Vec<RecordPatch>,
    ) -> StoreResult<Vec<StoredRecord>>;

    /// Hard-deletes all records whose IDs appear in `ids` with a single
    /// statement. Returns the number of rows removed; missing IDs are
    /// skipped, not errors.
    async fn bulk_delete(
        &self,
        tenant: &TenantContext,
        collection: &str,
        ids: &[&str],
    ) -> StoreResult<u64>;

    /// Fetches multiple records by ID.
    ///
    /// Missing and soft-deleted records are omitted from the result, not
    /// errors.
    async fn get_batch(
        &self,
        tenant: &TenantContext,
        collection: &str,
        ids: &[&str],
    ) -> StoreResult<Vec<StoredRecord>> {
        let mut results = Vec::with_capacity(ids.len());
        for id in ids {
            match self.get(tenant, collection, id).await {
                Ok(record) => results.push(record),
                Err(StoreError::Record(RecordError::NotFound { .. }))
                | Err(StoreError::Record(RecordError::Gone { .. })) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(results)
    }

    /// Checks if a live (non-soft-deleted) record exists.
    async fn exists(
        &self,
        tenant: &TenantContext,
        collection: &str,
        id: &str,
    ) -> StoreResult<bool> {
        match self.get(tenant, collection, id).await {
            Ok(_) => Ok(true),
            Err(StoreError::Record(RecordError::NotFound { .. }))
            | Err(StoreError::Record(RecordError::Gone { .. })) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Counts live (non-soft-deleted) records in the collection.
    async fn count(&self, tenant: &TenantContext, collection: &str) -> StoreResult<u64>;
}
