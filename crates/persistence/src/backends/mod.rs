//! Backend implementations.
//!
//! Backends are gated behind feature flags; `sqlite` is the default.

#[cfg(feature = "sqlite")]
pub mod sqlite;
