//! Shared helpers for backend integration tests.

#![allow(dead_code)]

use meridian_persistence::backends::sqlite::SqliteBackend;
use meridian_persistence::registry::{CollectionSchema, SchemaRegistry};
use meridian_persistence::tenant::{TenantContext, TenantId, TenantPermissions};
use serde_json::{json, Value};

/// Registry with the collections the tests exercise.
pub fn test_registry() -> SchemaRegistry {
    SchemaRegistry::with_collections([
        CollectionSchema::new("compliance_reports"),
        CollectionSchema::new("incidents")
            .with_text_columns(["summary", "details"])
            .with_status_column("state"),
    ])
    .expect("registry should build")
}

/// In-memory backend with the schema applied.
pub fn backend() -> SqliteBackend {
    let backend =
        SqliteBackend::in_memory(test_registry()).expect("failed to create SQLite backend");
    backend.init_schema().expect("failed to initialize schema");
    backend
}

pub fn tenant() -> TenantContext {
    TenantContext::new(TenantId::new("test-tenant"), TenantPermissions::full_access())
}

pub fn secondary_tenant() -> TenantContext {
    TenantContext::new(
        TenantId::new("other-tenant"),
        TenantPermissions::full_access(),
    )
}

/// A compliance report document in the shape the dashboards write.
pub fn report(title: &str, category: &str, status: &str) -> Value {
    json!({
        "title": title,
        "description": format!("{} description", title),
        "category": category,
        "status": status,
        "tags": [],
    })
}

pub fn report_with_tags(title: &str, category: &str, tags: &[&str]) -> Value {
    json!({
        "title": title,
        "description": format!("{} description", title),
        "category": category,
        "status": "open",
        "tags": tags,
    })
}
