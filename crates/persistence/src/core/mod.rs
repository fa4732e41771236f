//! Core store traits and abstractions.
//!
//! The adapter surface is split into one trait per concern:
//!
//! - [`RecordStore`] - CRUD, bulk operations, soft delete
//! - [`SearchStore`] - filtered listing, substring search, advanced search
//! - [`VersionedStore`] - explicit version snapshots and history
//! - [`AnalyticsProvider`] - time-windowed creation analytics
//!
//! Backends implement whichever traits they support; the SQLite backend
//! implements all four. Every method takes a
//! [`TenantContext`](crate::tenant::TenantContext) as its first parameter,
//! so tenant isolation is enforced at the type level.

pub mod analytics;
pub mod search;
pub mod store;
pub mod versioned;

pub use analytics::AnalyticsProvider;
pub use search::SearchStore;
pub use store::RecordStore;
pub use versioned::VersionedStore;
