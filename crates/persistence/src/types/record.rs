//! Stored record type.
//!
//! [`StoredRecord`] wraps a JSON document with the persistence metadata the
//! store maintains for it: collection, id, owning tenant, and timestamps.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{BackendError, StoreError, StoreResult};
use crate::tenant::TenantId;

/// A record with persistence metadata.
///
/// The document body is schemaless JSON; the store only interprets the
/// metadata fields it maintains itself. Use [`StoredRecord::decode`] to
/// deserialize the document into a caller-defined type.
///
/// # Examples
///
/// ```
/// use meridian_persistence::types::StoredRecord;
/// use meridian_persistence::tenant::TenantId;
/// use serde_json::json;
///
/// let record = StoredRecord::new(
///     "compliance_reports",
///     "report-1",
///     TenantId::new("acme-corp"),
///     json!({"title": "Q3 emissions", "status": "draft"}),
/// );
///
/// assert_eq!(record.collection(), "compliance_reports");
/// assert_eq!(record.id(), "report-1");
/// assert!(!record.is_deleted());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredRecord {
    /// The collection the record belongs to.
    collection: String,

    /// The record's unique ID within the collection.
    id: String,

    /// The tenant that owns this record.
    tenant_id: TenantId,

    /// The record content as JSON.
    document: Value,

    /// When the record was first created.
    created_at: DateTime<Utc>,

    /// When the record was last modified.
    updated_at: DateTime<Utc>,

    /// If the record has been soft-deleted, when it was deleted.
    deleted_at: Option<DateTime<Utc>>,
}

impl StoredRecord {
    /// Creates a new record stamped with the current time.
    pub fn new(
        collection: impl Into<String>,
        id: impl Into<String>,
        tenant_id: TenantId,
        document: Value,
    ) -> Self {
        let now = Utc::now();
        Self {
            collection: collection.into(),
            id: id.into(),
            tenant_id,
            document,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Creates a record from existing data (e.g., loaded from the database).
    #[allow(clippy::too_many_arguments)]
    pub fn from_storage(
        collection: impl Into<String>,
        id: impl Into<String>,
        tenant_id: TenantId,
        document: Value,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        deleted_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            collection: collection.into(),
            id: id.into(),
            tenant_id,
            document,
            created_at,
            updated_at,
            deleted_at,
        }
    }

    /// Returns the collection name.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Returns the record's ID.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the tenant that owns this record.
    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    /// Returns the record document as JSON.
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Returns a mutable reference to the record document.
    pub fn document_mut(&mut self) -> &mut Value {
        &mut self.document
    }

    /// Consumes self and returns the document.
    pub fn into_document(self) -> Value {
        self.document
    }

    /// Deserializes the document into a caller-defined type.
    pub fn decode<T: DeserializeOwned>(&self) -> StoreResult<T> {
        serde_json::from_value(self.document.clone()).map_err(|e| {
            StoreError::Backend(BackendError::SerializationError {
                message: format!(
                    "failed to decode {}/{}: {}",
                    self.collection, self.id, e
                ),
            })
        })
    }

    /// Returns when the record was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the record was last modified.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns when the record was soft-deleted, if applicable.
    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    /// Returns `true` if the record has been soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}
