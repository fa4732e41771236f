//! Tests for listing, substring search, and advanced search.

#![cfg(feature = "sqlite")]

mod common;

use std::collections::HashSet;

use chrono::{Duration, Utc};
use meridian_persistence::types::{ListOptions, OrderBy, SearchCriteria};
use meridian_persistence::{RecordStore, SearchStore};
use serde_json::json;

use common::{backend, report, report_with_tags, tenant};

// ============================================================================
// List: filters
// ============================================================================

#[tokio::test]
async fn test_list_filters_are_exact_and_conjunctive() {
    let backend = backend();
    let tenant = tenant();

    for (title, category, status) in [
        ("a", "emissions", "open"),
        ("b", "emissions", "closed"),
        ("c", "water", "open"),
    ] {
        backend
            .create(&tenant, "compliance_reports", report(title, category, status))
            .await
            .unwrap();
    }

    let page = backend
        .list(
            &tenant,
            "compliance_reports",
            &ListOptions::new()
                .with_filter("category", json!("emissions"))
                .with_filter("status", json!("open")),
        )
        .await
        .unwrap();

    assert_eq!(page.len(), 1);
    assert_eq!(page.records[0].document()["title"], "a");
    assert_eq!(page.meta.total_count, 1);
}

#[tokio::test]
async fn test_list_total_count_ignores_page_window() {
    let backend = backend();
    let tenant = tenant();

    for i in 0..7 {
        backend
            .create(
                &tenant,
                "compliance_reports",
                report(&format!("r{}", i), "emissions", "open"),
            )
            .await
            .unwrap();
    }

    let page = backend
        .list(
            &tenant,
            "compliance_reports",
            &ListOptions::new()
                .with_filter("category", json!("emissions"))
                .with_page(0, 3),
        )
        .await
        .unwrap();

    assert_eq!(page.len(), 3);
    assert_eq!(page.meta.total_count, 7);
}

// ============================================================================
// List: pagination
// ============================================================================

#[tokio::test]
async fn test_list_pages_partition_without_overlap() {
    let backend = backend();
    let tenant = tenant();

    for i in 0..5 {
        backend
            .create(
                &tenant,
                "compliance_reports",
                report(&format!("r{}", i), "emissions", "open"),
            )
            .await
            .unwrap();
    }

    let mut seen = HashSet::new();
    let mut sizes = Vec::new();
    for page_index in 0..3 {
        let page = backend
            .list(
                &tenant,
                "compliance_reports",
                &ListOptions::new()
                    .with_page(page_index, 2)
                    .with_order(OrderBy::asc("title")),
            )
            .await
            .unwrap();

        assert_eq!(page.meta.total_count, 5);
        sizes.push(page.len());
        for record in &page.records {
            assert!(
                seen.insert(record.id().to_string()),
                "pages must not overlap"
            );
        }
    }

    assert_eq!(sizes, vec![2, 2, 1]);
    assert_eq!(seen.len(), 5);
}

#[tokio::test]
async fn test_list_plain_limit_without_page() {
    let backend = backend();
    let tenant = tenant();

    for i in 0..4 {
        backend
            .create(
                &tenant,
                "compliance_reports",
                report(&format!("r{}", i), "emissions", "open"),
            )
            .await
            .unwrap();
    }

    let page = backend
        .list(
            &tenant,
            "compliance_reports",
            &ListOptions::new().with_limit(2),
        )
        .await
        .unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page.meta.total_count, 4);
}

// ============================================================================
// List: ordering and soft-delete filtering
// ============================================================================

#[tokio::test]
async fn test_list_orders_by_document_field() {
    let backend = backend();
    let tenant = tenant();

    for title in ["charlie", "alpha", "bravo"] {
        backend
            .create(&tenant, "compliance_reports", report(title, "emissions", "open"))
            .await
            .unwrap();
    }

    let page = backend
        .list(
            &tenant,
            "compliance_reports",
            &ListOptions::new().with_order(OrderBy::asc("title")),
        )
        .await
        .unwrap();

    let titles: Vec<_> = page
        .records
        .iter()
        .map(|r| r.document()["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, vec!["alpha", "bravo", "charlie"]);

    let page = backend
        .list(
            &tenant,
            "compliance_reports",
            &ListOptions::new().with_order(OrderBy::desc("title")),
        )
        .await
        .unwrap();
    assert_eq!(
        page.records[0].document()["title"].as_str().unwrap(),
        "charlie"
    );
}

#[tokio::test]
async fn test_list_hides_soft_deleted_by_default() {
    let backend = backend();
    let tenant = tenant();

    let kept = backend
        .create(&tenant, "compliance_reports", report("kept", "emissions", "open"))
        .await
        .unwrap();
    let removed = backend
        .create(&tenant, "compliance_reports", report("removed", "emissions", "open"))
        .await
        .unwrap();
    backend
        .soft_delete(&tenant, "compliance_reports", removed.id())
        .await
        .unwrap();

    let page = backend
        .list(&tenant, "compliance_reports", &ListOptions::new())
        .await
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page.records[0].id(), kept.id());
    assert_eq!(page.meta.total_count, 1);

    let page = backend
        .list(
            &tenant,
            "compliance_reports",
            &ListOptions::new().with_deleted(),
        )
        .await
        .unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page.meta.total_count, 2);
}

// ============================================================================
// Substring search
// ============================================================================

#[tokio::test]
async fn test_search_matches_case_insensitive_substring() {
    let backend = backend();
    let tenant = tenant();

    backend
        .create(
            &tenant,
            "compliance_reports",
            json!({"title": "Carbon Audit", "description": "scope 1"}),
        )
        .await
        .unwrap();
    backend
        .create(
            &tenant,
            "compliance_reports",
            json!({"title": "Water usage", "description": "river CARBON intake"}),
        )
        .await
        .unwrap();
    backend
        .create(
            &tenant,
            "compliance_reports",
            json!({"title": "Labor policy", "description": "unrelated"}),
        )
        .await
        .unwrap();

    let hits = backend
        .search(
            &tenant,
            "compliance_reports",
            "carbon",
            &["title", "description"],
            None,
        )
        .await
        .unwrap();

    assert_eq!(hits.len(), 2);
    for record in &hits {
        let text = format!(
            "{} {}",
            record.document()["title"], record.document()["description"]
        )
        .to_lowercase();
        assert!(text.contains("carbon"));
    }
}

#[tokio::test]
async fn test_search_only_looks_at_given_columns() {
    let backend = backend();
    let tenant = tenant();

    backend
        .create(
            &tenant,
            "compliance_reports",
            json!({"title": "clean", "description": "carbon here"}),
        )
        .await
        .unwrap();

    let hits = backend
        .search(&tenant, "compliance_reports", "carbon", &["title"], None)
        .await
        .unwrap();
    assert!(hits.is_empty());
}

#[tokio::test]
async fn test_search_respects_limit() {
    let backend = backend();
    let tenant = tenant();

    for i in 0..15 {
        backend
            .create(
                &tenant,
                "compliance_reports",
                json!({"title": format!("carbon report {}", i)}),
            )
            .await
            .unwrap();
    }

    // Default cap is 10.
    let hits = backend
        .search(&tenant, "compliance_reports", "carbon", &["title"], None)
        .await
        .unwrap();
    assert_eq!(hits.len(), 10);

    let hits = backend
        .search(&tenant, "compliance_reports", "carbon", &["title"], Some(3))
        .await
        .unwrap();
    assert_eq!(hits.len(), 3);
}

// ============================================================================
// Advanced search
// ============================================================================

/// The canonical scenario: records A, B, Ab; a query for "a" matches A and
/// Ab but not B, and a category filter matches the two x-category records.
#[tokio::test]
async fn test_advanced_search_query_and_category() {
    let backend = backend();
    let tenant = tenant();

    backend
        .create(&tenant, "compliance_reports", json!({"title": "A", "category": "x"}))
        .await
        .unwrap();
    backend
        .create(&tenant, "compliance_reports", json!({"title": "B", "category": "y"}))
        .await
        .unwrap();
    backend
        .create(&tenant, "compliance_reports", json!({"title": "Ab", "category": "x"}))
        .await
        .unwrap();

    let page = backend
        .advanced_search(
            &tenant,
            "compliance_reports",
            &SearchCriteria::new().with_query("a"),
        )
        .await
        .unwrap();
    let titles: HashSet<_> = page
        .records
        .iter()
        .map(|r| r.document()["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, HashSet::from(["A".to_string(), "Ab".to_string()]));

    let page = backend
        .advanced_search(
            &tenant,
            "compliance_reports",
            &SearchCriteria::new().with_category("x"),
        )
        .await
        .unwrap();
    let titles: HashSet<_> = page
        .records
        .iter()
        .map(|r| r.document()["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, HashSet::from(["A".to_string(), "Ab".to_string()]));
}

#[tokio::test]
async fn test_advanced_search_requires_all_tags() {
    let backend = backend();
    let tenant = tenant();

    backend
        .create(
            &tenant,
            "compliance_reports",
            report_with_tags("both", "emissions", &["scope-1", "scope-2"]),
        )
        .await
        .unwrap();
    backend
        .create(
            &tenant,
            "compliance_reports",
            report_with_tags("one", "emissions", &["scope-1"]),
        )
        .await
        .unwrap();
    backend
        .create(
            &tenant,
            "compliance_reports",
            report_with_tags("none", "emissions", &[]),
        )
        .await
        .unwrap();

    let page = backend
        .advanced_search(
            &tenant,
            "compliance_reports",
            &SearchCriteria::new().with_tags(["scope-1", "scope-2"]),
        )
        .await
        .unwrap();

    assert_eq!(page.records.len(), 1);
    assert_eq!(page.records[0].document()["title"], "both");
}

#[tokio::test]
async fn test_advanced_search_date_range_is_inclusive() {
    let backend = backend();
    let tenant = tenant();

    let stored = backend
        .create(&tenant, "compliance_reports", report("now", "emissions", "open"))
        .await
        .unwrap();

    // Bounds exactly at the record's creation instant still match.
    let page = backend
        .advanced_search(
            &tenant,
            "compliance_reports",
            &SearchCriteria::new().with_date_range(stored.created_at(), stored.created_at()),
        )
        .await
        .unwrap();
    assert_eq!(page.records.len(), 1);

    // A window entirely in the past matches nothing.
    let past = Utc::now() - Duration::days(30);
    let page = backend
        .advanced_search(
            &tenant,
            "compliance_reports",
            &SearchCriteria::new().with_date_range(past - Duration::days(1), past),
        )
        .await
        .unwrap();
    assert!(page.records.is_empty());
}

#[tokio::test]
async fn test_advanced_search_status_filter_uses_schema_column() {
    let backend = backend();
    let tenant = tenant();

    // The incidents collection maps status to its `state` field.
    backend
        .create(
            &tenant,
            "incidents",
            json!({"summary": "spill", "details": "tank 4", "state": "open"}),
        )
        .await
        .unwrap();
    backend
        .create(
            &tenant,
            "incidents",
            json!({"summary": "leak", "details": "pipe 7", "state": "resolved"}),
        )
        .await
        .unwrap();

    let page = backend
        .advanced_search(&tenant, "incidents", &SearchCriteria::new().with_status("open"))
        .await
        .unwrap();
    assert_eq!(page.records.len(), 1);
    assert_eq!(page.records[0].document()["summary"], "spill");

    // Free text searches the collection's registered columns.
    let page = backend
        .advanced_search(&tenant, "incidents", &SearchCriteria::new().with_query("pipe"))
        .await
        .unwrap();
    assert_eq!(page.records.len(), 1);
    assert_eq!(page.records[0].document()["summary"], "leak");
}

#[tokio::test]
async fn test_advanced_search_page_count_uses_caller_limit() {
    let backend = backend();
    let tenant = tenant();

    for i in 0..5 {
        backend
            .create(
                &tenant,
                "compliance_reports",
                report(&format!("r{}", i), "emissions", "open"),
            )
            .await
            .unwrap();
    }

    let page = backend
        .advanced_search(
            &tenant,
            "compliance_reports",
            &SearchCriteria::new()
                .with_category("emissions")
                .with_page(0, 2),
        )
        .await
        .unwrap();

    assert_eq!(page.records.len(), 2);
    assert_eq!(page.total_count, 5);
    assert_eq!(page.page_count, 3);

    // The last page holds the remainder.
    let page = backend
        .advanced_search(
            &tenant,
            "compliance_reports",
            &SearchCriteria::new()
                .with_category("emissions")
                .with_page(2, 2),
        )
        .await
        .unwrap();
    assert_eq!(page.records.len(), 1);
}

#[tokio::test]
async fn test_advanced_search_hides_soft_deleted_by_default() {
    let backend = backend();
    let tenant = tenant();

    let removed = backend
        .create(&tenant, "compliance_reports", report("gone", "emissions", "open"))
        .await
        .unwrap();
    backend
        .create(&tenant, "compliance_reports", report("kept", "emissions", "open"))
        .await
        .unwrap();
    backend
        .soft_delete(&tenant, "compliance_reports", removed.id())
        .await
        .unwrap();

    let page = backend
        .advanced_search(
            &tenant,
            "compliance_reports",
            &SearchCriteria::new().with_category("emissions"),
        )
        .await
        .unwrap();
    assert_eq!(page.records.len(), 1);
    assert_eq!(page.records[0].document()["title"], "kept");
}
