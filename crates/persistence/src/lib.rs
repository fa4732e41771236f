//! Meridian Record Store
//!
//! This crate is the persistence layer of the Meridian compliance monitoring
//! platform: a generic, multi-tenant record store exposing typed CRUD,
//! filtered listing with pagination and ordering, substring search, bulk
//! operations, soft delete with restore, explicit point-in-time versioning,
//! and time-bucketed creation analytics over schemaless JSON records.
//!
//! # Architecture
//!
//! - [`tenant`] - Multi-tenant support with mandatory tenant context
//! - [`registry`] - Collection schema registry consulted by search operations
//! - [`types`] - Stored records, query options, versions, analytics reports
//! - [`error`] - Error types for all operations
//! - [`core`] - Store traits ([`RecordStore`], [`SearchStore`],
//!   [`VersionedStore`], [`AnalyticsProvider`])
//! - [`backends`] - Backend implementations (SQLite by default)
//!
//! # Quick Start
//!
//! ```no_run
//! use meridian_persistence::backends::sqlite::SqliteBackend;
//! use meridian_persistence::registry::{CollectionSchema, SchemaRegistry};
//! use meridian_persistence::tenant::{TenantContext, TenantId, TenantPermissions};
//! use meridian_persistence::RecordStore;
//! use serde_json::json;
//!
//! # async fn example() -> meridian_persistence::StoreResult<()> {
//! // Declare the collections the store may touch.
//! let registry = SchemaRegistry::with_collections([
//!     CollectionSchema::new("compliance_reports"),
//!     CollectionSchema::new("incidents").with_text_columns(["summary", "details"]),
//! ])?;
//!
//! let backend = SqliteBackend::in_memory(registry)?;
//! backend.init_schema()?;
//!
//! // Every operation requires a tenant context.
//! let tenant = TenantContext::new(
//!     TenantId::new("acme-corp"),
//!     TenantPermissions::full_access(),
//! );
//!
//! let stored = backend
//!     .create(&tenant, "compliance_reports", json!({
//!         "title": "Q3 emissions report",
//!         "category": "emissions",
//!         "status": "draft",
//!     }))
//!     .await?;
//!
//! let fetched = backend.get(&tenant, "compliance_reports", stored.id()).await?;
//! assert_eq!(fetched.document()["status"], "draft");
//! # Ok(())
//! # }
//! ```
//!
//! # Multitenancy
//!
//! All store operations require a [`TenantContext`](tenant::TenantContext),
//! ensuring tenant isolation at the type level. There is no way to bypass
//! this requirement.
//!
//! ```
//! use meridian_persistence::tenant::{Operation, TenantContext, TenantId, TenantPermissions};
//!
//! let admin = TenantContext::new(
//!     TenantId::new("acme-corp"),
//!     TenantPermissions::full_access(),
//! );
//! let reader = TenantContext::new(
//!     TenantId::new("acme-corp"),
//!     TenantPermissions::read_only(),
//! );
//!
//! assert!(admin.check_permission(Operation::Create, "incidents").is_ok());
//! assert!(reader.check_permission(Operation::Create, "incidents").is_err());
//! ```
//!
//! # Searching
//!
//! ```
//! use meridian_persistence::types::{ListOptions, OrderBy, SearchCriteria};
//! use serde_json::json;
//!
//! // Equality filters with pagination and ordering.
//! let options = ListOptions::new()
//!     .with_filter("status", json!("open"))
//!     .with_page(0, 20)
//!     .with_order(OrderBy::desc("created_at"));
//!
//! // Combined free-text, tag, and category search.
//! let criteria = SearchCriteria::new()
//!     .with_query("emissions")
//!     .with_tags(["scope-3"])
//!     .with_category("environment")
//!     .with_page(0, 25);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod backends;
pub mod core;
pub mod error;
pub mod registry;
pub mod tenant;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{StoreError, StoreResult};
pub use registry::{CollectionSchema, SchemaRegistry};
pub use tenant::{TenantContext, TenantId, TenantPermissions};
pub use types::{ListOptions, SearchCriteria, StoredRecord};

// Re-export core traits
pub use crate::core::{AnalyticsProvider, RecordStore, SearchStore, VersionedStore};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
