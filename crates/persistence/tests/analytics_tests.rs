//! Tests for time-windowed creation analytics.

#![cfg(feature = "sqlite")]

mod common;

use meridian_persistence::types::TimeRange;
use meridian_persistence::{AnalyticsProvider, RecordStore};
use serde_json::json;

use common::{backend, report, tenant};

#[tokio::test]
async fn test_empty_window_yields_zeroes_not_errors() {
    let backend = backend();
    let tenant = tenant();

    let out = backend
        .analytics(&tenant, "compliance_reports", TimeRange::Month)
        .await
        .expect("analytics on an empty collection should succeed");

    assert_eq!(out.total, 0);
    assert_eq!(out.growth_percent, 0.0);
    assert!(out.by_category.is_empty());
    assert!(out.by_status.is_empty());
    assert!(out.timeline.is_empty());
}

#[tokio::test]
async fn test_totals_and_histograms() {
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

    let out = backend
        .analytics(&tenant, "compliance_reports", TimeRange::Week)
        .await
        .unwrap();

    assert_eq!(out.total, 3);
    assert_eq!(out.by_category.get("emissions"), Some(&2));
    assert_eq!(out.by_category.get("water"), Some(&1));
    assert_eq!(out.by_status.get("open"), Some(&2));
    assert_eq!(out.by_status.get("closed"), Some(&1));

    // Everything was created just now, so the timeline is a single day
    // carrying the full total.
    assert_eq!(out.timeline.len(), 1);
    assert_eq!(out.timeline[0].count, 3);

    // Nothing predates the window, so growth is guarded to zero.
    assert_eq!(out.growth_percent, 0.0);
}

#[tokio::test]
async fn test_records_missing_category_are_skipped_in_histogram() {
    let backend = backend();
    let tenant = tenant();

    backend
        .create(&tenant, "compliance_reports", json!({"title": "untagged"}))
        .await
        .unwrap();
    backend
        .create(&tenant, "compliance_reports", report("tagged", "emissions", "open"))
        .await
        .unwrap();

    let out = backend
        .analytics(&tenant, "compliance_reports", TimeRange::Day)
        .await
        .unwrap();

    assert_eq!(out.total, 2);
    assert_eq!(out.by_category.len(), 1);
    assert_eq!(out.by_category.get("emissions"), Some(&1));
}

#[tokio::test]
async fn test_analytics_is_tenant_scoped() {
    let backend = backend();
    let tenant_a = tenant();
    let tenant_b = common::secondary_tenant();

    backend
        .create(&tenant_a, "compliance_reports", report("a", "emissions", "open"))
        .await
        .unwrap();

    let out = backend
        .analytics(&tenant_b, "compliance_reports", TimeRange::Month)
        .await
        .unwrap();
    assert_eq!(out.total, 0);
}

#[tokio::test]
async fn test_timeline_is_sorted_ascending() {
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

    let out = backend
        .analytics(&tenant, "compliance_reports", TimeRange::Quarter)
        .await
        .unwrap();

    let dates: Vec<_> = out.timeline.iter().map(|p| p.date.clone()).collect();
    let mut sorted = dates.clone();
    sorted.sort();
    assert_eq!(dates, sorted);

    let summed: u64 = out.timeline.iter().map(|p| p.count).sum();
    assert_eq!(summed, out.total);
}
