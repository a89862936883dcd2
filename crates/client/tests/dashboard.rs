//! Integration tests for the officials dashboard.

mod common;

use std::sync::Arc;

use citypulse_client::OfficialsDashboard;
use citypulse_core::filter::StatusFilter;
use citypulse_core::presentation::{MarkerColor, MarkerKind};
use citypulse_store::MemoryStore;
use common::within;
use serde_json::json;

async fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    for (id, status) in [("p-1", "ongoing"), ("p-2", "planned"), ("p-3", "ongoing")] {
        store
            .set_document(
                "projects",
                id,
                json!({
                    "name": format!("Project {id}"),
                    "type": "road",
                    "status": status,
                    "position": [37.7, -122.4]
                }),
            )
            .await
            .unwrap();
    }
    for (id, kind, status) in [
        ("r-1", "congestion", "reported"),
        ("r-2", "hazard", "confirmed"),
        ("r-3", "hazard", "resolved"),
    ] {
        store
            .set_document(
                "reports",
                id,
                json!({
                    "type": kind,
                    "description": "",
                    "position": [37.7, -122.4],
                    "status": status,
                    "timestamp": "2024-05-01T12:00:00Z"
                }),
            )
            .await
            .unwrap();
    }
    store
}

async fn mounted(store: &Arc<MemoryStore>) -> OfficialsDashboard {
    let mut dashboard = OfficialsDashboard::mount(store.clone()).await;
    while within(dashboard.step()).await == Some(true) {}
    dashboard
}

// ---------------------------------------------------------------------------
// Test: stats and bottlenecks
// ---------------------------------------------------------------------------

#[tokio::test]
async fn stats_and_bottlenecks_follow_the_mirrors() {
    let store = seeded_store().await;
    let mut dashboard = mounted(&store).await;

    let stats = dashboard.stats();
    assert_eq!(stats.total_projects, 3);
    assert_eq!(stats.ongoing_projects, 2);
    assert_eq!(stats.total_reports, 3);
    assert_eq!(stats.unresolved_reports, 2);
    assert_eq!(dashboard.bottlenecks().len(), 2);
    assert!(dashboard
        .bottlenecks()
        .iter()
        .all(|b| b.reason == "Extended timeline"));

    // A project finishing drops its bottleneck.
    store
        .set_document(
            "projects",
            "p-1",
            json!({"name": "Project p-1", "type": "road", "status": "completed", "position": [0.0, 0.0]}),
        )
        .await
        .unwrap();
    assert!(dashboard.step().await);
    assert_eq!(dashboard.stats().ongoing_projects, 1);
    assert_eq!(dashboard.bottlenecks().len(), 1);
}

// ---------------------------------------------------------------------------
// Test: filter
// ---------------------------------------------------------------------------

#[tokio::test]
async fn filter_narrows_lists_and_markers_but_not_charts() {
    let store = seeded_store().await;
    let mut dashboard = mounted(&store).await;

    dashboard.set_filter(StatusFilter::parse("reported").unwrap());

    assert_eq!(dashboard.filtered_reports().len(), 1);
    assert!(dashboard.filtered_projects().is_empty());

    let model = dashboard.view_model();
    assert_eq!(model.markers.len(), 1);
    assert_eq!(model.markers[0].color, MarkerColor::Red);
    assert_eq!(model.stats.total_reports, 3);
    assert_eq!(model.reports_by_type.data, vec![1, 2, 0, 0]);
    assert_eq!(model.projects_by_status.data, vec![1, 2, 0]);

    dashboard.set_filter(StatusFilter::All);
    assert_eq!(dashboard.view_model().markers.len(), 6);
}

// ---------------------------------------------------------------------------
// Test: selection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn selecting_a_marker_yields_a_callout() {
    let store = seeded_store().await;
    let mut dashboard = mounted(&store).await;

    assert!(dashboard.select(MarkerKind::Report, "r-2"));
    let callout = dashboard.view_model().callout.unwrap();
    assert_eq!(callout.title, "Hazard");
    assert_eq!(callout.status, "confirmed");

    assert!(dashboard.select(MarkerKind::Project, "p-2"));
    assert_eq!(dashboard.view_model().callout.unwrap().title, "Project p-2");

    assert!(!dashboard.select(MarkerKind::Project, "missing"));
    assert!(dashboard.view_model().callout.is_some());

    dashboard.clear_selection();
    assert!(dashboard.view_model().callout.is_none());
}

// ---------------------------------------------------------------------------
// Test: initial load
// ---------------------------------------------------------------------------

#[tokio::test]
async fn load_waits_for_both_mirrors() {
    let store = seeded_store().await;
    let mut dashboard = OfficialsDashboard::mount(store.clone()).await;
    assert!(!dashboard.is_loaded());

    assert!(dashboard.load().await);

    assert!(dashboard.is_loaded());
    assert_eq!(dashboard.stats().total_projects, 3);
    assert_eq!(dashboard.stats().total_reports, 3);
}

#[tokio::test]
async fn load_completes_for_empty_collections() {
    let store = Arc::new(MemoryStore::new());
    let mut dashboard = OfficialsDashboard::mount(store).await;

    assert_eq!(within(dashboard.load()).await, Some(true));
    assert_eq!(dashboard.stats().total_projects, 0);
}
