//! Version snapshot trait.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreResult;
use crate::tenant::TenantContext;
use crate::types::VersionEntry;

/// Explicit point-in-time versioning.
///
/// Versioning is caller-driven: a snapshot is written only when
/// [`record_version`](Self::record_version) is invoked, typically right
/// before or after a mutation. There is no automatic diffing; every call
/// stores a full copy of the record's current document plus the changes
/// object verbatim. Snapshots are append-only and never touched again by
/// this layer.
#[async_trait]
pub trait VersionedStore: Send + Sync {
    /// Writes a snapshot of the record's current state plus the given delta.
    ///
    /// The record may be soft-deleted; its document is snapshotted as-is.
    ///
    /// # Errors
    ///
    /// * [`RecordError::NotFound`](crate::error::RecordError::NotFound) - no record with this ID
    async fn record_version(
        &self,
        tenant: &TenantContext,
        collection: &str,
        id: &str,
        changes: Value,
    ) -> StoreResult<VersionEntry>;

    /// Returns all snapshots for a record, newest first.
    ///
    /// An empty history is not an error.
    async fn version_history(
        &self,
        tenant: &TenantContext,
        collection: &str,
        id: &str,
    ) -> StoreResult<Vec<VersionEntry>>;
}
