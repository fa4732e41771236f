//! SQLite backend handle and configuration.

use std::fmt::Debug;
use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use serde::{Deserialize, Serialize};

use crate::error::{BackendError, QueryError, StoreError, StoreResult};
use crate::registry::{CollectionSchema, SchemaRegistry};

use super::schema;

/// SQLite backend for record storage.
///
/// Holds an r2d2 connection pool and the collection schema registry. The
/// backend is a plain value: construct one, call
/// [`init_schema`](Self::init_schema), and pass it by reference to whoever
/// needs it. There is no process-global instance.
pub struct SqliteBackend {
    pool: Pool<SqliteConnectionManager>,
    config: SqliteBackendConfig,
    is_memory: bool,
    /// Registered collection schemas.
    registry: Arc<RwLock<SchemaRegistry>>,
}

impl Debug for SqliteBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteBackend")
            .field("config", &self.config)
            .field("is_memory", &self.is_memory)
            .field("collections", &self.registry.read().len())
            .finish_non_exhaustive()
    }
}

/// Configuration for the SQLite backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqliteBackendConfig {
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum number of idle connections.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Connection timeout in milliseconds.
    #[serde(default = "default_connection_timeout_ms")]
    pub connection_timeout_ms: u64,

    /// SQLite busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u32,

    /// Enable WAL mode for better concurrency.
    #[serde(default = "default_true")]
    pub enable_wal: bool,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connection_timeout_ms() -> u64 {
    30000
}

fn default_busy_timeout_ms() -> u32 {
    5000
}

fn default_true() -> bool {
    true
}

impl Default for SqliteBackendConfig {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connection_timeout_ms: default_connection_timeout_ms(),
            busy_timeout_ms: default_busy_timeout_ms(),
            enable_wal: true,
        }
    }
}

impl SqliteBackend {
    /// Creates a new in-memory SQLite backend.
    pub fn in_memory(registry: SchemaRegistry) -> StoreResult<Self> {
        Self::with_config(":memory:", SqliteBackendConfig::default(), registry)
    }

    /// Opens or creates a file-based SQLite database.
    pub fn open<P: AsRef<Path>>(path: P, registry: SchemaRegistry) -> StoreResult<Self> {
        Self::with_config(path, SqliteBackendConfig::default(), registry)
    }

    /// Creates a backend with custom configuration.
    pub fn with_config<P: AsRef<Path>>(
        path: P,
        config: SqliteBackendConfig,
        registry: SchemaRegistry,
    ) -> StoreResult<Self> {
        let path_str = path.as_ref().to_string_lossy();
        let is_memory = path_str == ":memory:";

        let manager = SqliteConnectionManager::file(path.as_ref());

        let pool = Pool::builder()
            .max_size(config.max_connections)
            .min_idle(Some(config.min_connections))
            .connection_timeout(std::time::Duration::from_millis(
                config.connection_timeout_ms,
            ))
            .build(manager)
            .map_err(|e| {
                StoreError::Backend(BackendError::ConnectionFailed {
                    backend_name: "sqlite".to_string(),
                    message: e.to_string(),
                })
            })?;

        tracing::debug!(
            collections = registry.len(),
            is_memory,
            "opening sqlite record store"
        );

        let backend = Self {
            pool,
            config,
            is_memory,
            registry: Arc::new(RwLock::new(registry)),
        };

        backend.configure_connection()?;

        Ok(backend)
    }

    /// Initialize the database schema.
    pub fn init_schema(&self) -> StoreResult<()> {
        let conn = self.get_connection()?;
        schema::initialize_schema(&conn)
    }

    /// Get a connection from the pool.
    pub(crate) fn get_connection(
        &self,
    ) -> StoreResult<PooledConnection<SqliteConnectionManager>> {
        self.pool.get().map_err(|e| {
            StoreError::Backend(BackendError::ConnectionFailed {
                backend_name: "sqlite".to_string(),
                message: e.to_string(),
            })
        })
    }

    /// Configure connection settings.
    fn configure_connection(&self) -> StoreResult<()> {
        let conn = self.get_connection()?;

        conn.busy_timeout(std::time::Duration::from_millis(
            self.config.busy_timeout_ms as u64,
        ))
        .map_err(|e| {
            StoreError::Backend(BackendError::Internal {
                backend_name: "sqlite".to_string(),
                message: format!("failed to set busy timeout: {}", e),
                source: None,
            })
        })?;

        if self.config.enable_wal && !self.is_memory {
            conn.pragma_update(None, "journal_mode", "WAL").map_err(|e| {
                StoreError::Backend(BackendError::Internal {
                    backend_name: "sqlite".to_string(),
                    message: format!("failed to enable WAL mode: {}", e),
                    source: None,
                })
            })?;
        }

        Ok(())
    }

    /// Returns whether this is an in-memory database.
    pub fn is_memory(&self) -> bool {
        self.is_memory
    }

    /// Returns the backend configuration.
    pub fn config(&self) -> &SqliteBackendConfig {
        &self.config
    }

    /// Returns a handle to the collection registry.
    pub fn registry(&self) -> &Arc<RwLock<SchemaRegistry>> {
        &self.registry
    }

    /// Looks up the schema of a registered collection.
    pub(crate) fn collection_schema(&self, collection: &str) -> StoreResult<CollectionSchema> {
        self.registry
            .read()
            .get(collection)
            .cloned()
            .ok_or_else(|| {
                StoreError::Query(QueryError::UnknownCollection {
                    collection: collection.to_string(),
                })
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = SqliteBackendConfig::default();
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 1);
        assert!(config.enable_wal);
    }

    #[test]
    fn test_config_deserialization_fills_defaults() {
        let config: SqliteBackendConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.busy_timeout_ms, 5000);

        let config: SqliteBackendConfig =
            serde_json::from_str(r#"{"max_connections": 2}"#).unwrap();
        assert_eq!(config.max_connections, 2);
        assert_eq!(config.min_connections, 1);
    }

    #[test]
    fn test_unknown_collection_lookup() {
        let backend = SqliteBackend::in_memory(SchemaRegistry::new()).unwrap();
        let err = backend.collection_schema("missing").unwrap_err();
        assert!(err.to_string().contains("unknown collection"));
    }
}
