//! Error types for the record store.
//!
//! All fallible operations in this crate return [`StoreResult`], whose error
//! type groups failures into record-state, tenant, query, and backend
//! categories.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

use crate::tenant::TenantId;

/// The primary error type for all store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Record state errors
    #[error(transparent)]
    Record(#[from] RecordError),

    /// Tenant isolation errors
    #[error(transparent)]
    Tenant(#[from] TenantError),

    /// Query construction errors
    #[error(transparent)]
    Query(#[from] QueryError),

    /// Backend-specific errors
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Errors related to record state.
#[derive(Error, Debug)]
pub enum RecordError {
    /// The requested record was not found.
    #[error("record not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    /// A record with the given ID already exists.
    #[error("record already exists: {collection}/{id}")]
    AlreadyExists { collection: String, id: String },

    /// The record has been soft-deleted.
    #[error("record deleted: {collection}/{id}")]
    Gone {
        collection: String,
        id: String,
        deleted_at: Option<chrono::DateTime<chrono::Utc>>,
    },
}

/// Errors related to tenant isolation.
#[derive(Error, Debug)]
pub enum TenantError {
    /// Access to a record denied for the current tenant.
    #[error("access denied: tenant {tenant_id} cannot access {collection}/{record_id}")]
    AccessDenied {
        tenant_id: TenantId,
        collection: String,
        record_id: String,
    },

    /// Operation not permitted for tenant.
    #[error("operation {operation} not permitted for tenant {tenant_id}")]
    OperationNotPermitted {
        tenant_id: TenantId,
        operation: String,
    },
}

/// Errors related to query construction.
#[derive(Error, Debug)]
pub enum QueryError {
    /// The collection is not registered in the schema registry.
    #[error("unknown collection: {collection}")]
    UnknownCollection { collection: String },

    /// A collection with this name is already registered.
    #[error("collection already registered: {collection}")]
    DuplicateCollection { collection: String },

    /// A filter value cannot be expressed as an equality predicate.
    #[error("invalid filter on field '{field}': {message}")]
    InvalidFilter { field: String, message: String },

    /// The requested order field is not a legal field name.
    #[error("invalid order field: {field}")]
    InvalidOrderField { field: String },

    /// The supplied document or patch is not a JSON object.
    #[error("invalid document: {message}")]
    InvalidDocument { message: String },
}

/// Errors originating from the database backend.
#[derive(Error, Debug)]
pub enum BackendError {
    /// Connection to the backend failed.
    #[error("connection failed to {backend_name}: {message}")]
    ConnectionFailed {
        backend_name: String,
        message: String,
    },

    /// Connection pool exhausted.
    #[error("connection pool exhausted for {backend_name}")]
    PoolExhausted { backend_name: String },

    /// Schema migration error.
    #[error("schema migration failed: {message}")]
    MigrationError { message: String },

    /// Internal backend error.
    #[error("internal error in {backend_name}: {message}")]
    Internal {
        backend_name: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Serialization/deserialization error.
    #[error("serialization error: {message}")]
    SerializationError { message: String },
}

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

// Implement conversions from common error types

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Backend(BackendError::SerializationError {
            message: err.to_string(),
        })
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Backend(BackendError::Internal {
            backend_name: "sqlite".to_string(),
            message: err.to_string(),
            source: Some(Box::new(err)),
        })
    }
}

#[cfg(feature = "sqlite")]
impl From<r2d2::Error> for StoreError {
    fn from(_err: r2d2::Error) -> Self {
        StoreError::Backend(BackendError::PoolExhausted {
            backend_name: "sqlite".to_string(),
        })
    }
}
