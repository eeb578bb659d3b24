//! Audit trail queries over HTTP.

#![allow(clippy::unwrap_used)]

use serde_json::json;

use signal_living_admin::services::Actor;
use signal_living_core::{ActivityAction, AdminRole};
use signal_living_integration_tests::TestApp;

#[tokio::test]
async fn test_pagination_newest_first() {
    let app = TestApp::spawn().await;
    let actor = Actor::account(None, "importer", "10.0.0.1");
    for n in 0..25 {
        app.state
            .audit()
            .record(
                &actor,
                ActivityAction::UpdateOrder,
                Some(format!("ORD-{n:03}")),
                json!({ "n": n }),
            )
            .await;
    }
    let client = app.super_admin().await;

    let (status, page) = app
        .get_json(&client, "/api/admin/activity-logs?action=UPDATE_ORDER&limit=10&page=3")
        .await;
    assert_eq!(status, 200);
    assert_eq!(page["total"], 25);
    assert_eq!(page["totalPages"], 3);
    assert_eq!(page["page"], 3);
    let entries = page["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 5);
    assert_eq!(entries[0]["target"], "ORD-004");
    assert_eq!(entries[4]["target"], "ORD-000");

    let (_, second) = app
        .get_json(&client, "/api/admin/activity-logs?action=UPDATE_ORDER&limit=10&page=2")
        .await;
    let entries = second["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 10);
    assert_eq!(entries[0]["target"], "ORD-014");
    assert_eq!(entries[9]["target"], "ORD-005");

    let (_, first) = app
        .get_json(&client, "/api/admin/activity-logs?action=UPDATE_ORDER&limit=10")
        .await;
    assert_eq!(first["entries"][0]["target"], "ORD-024");
}

#[tokio::test]
async fn test_filters_by_admin_and_date() {
    let app = TestApp::spawn().await;
    let manager = app.create_admin("manager", "manager-pass", AdminRole::Admin).await;
    app.client_as("manager", "manager-pass").await;
    let client = app.super_admin().await;

    let (_, page) = app
        .get_json(
            &client,
            &format!("/api/admin/activity-logs?adminId={}", manager.id),
        )
        .await;
    assert_eq!(page["total"], 1);
    assert_eq!(page["entries"][0]["action"], "LOGIN");

    let (_, future) = app
        .get_json(&client, "/api/admin/activity-logs?startDate=2999-01-01")
        .await;
    assert_eq!(future["total"], 0);

    let (_, past) = app
        .get_json(&client, "/api/admin/activity-logs?endDate=2000-01-01")
        .await;
    assert_eq!(past["total"], 0);

    let (status, _) = app
        .get_json(&client, "/api/admin/activity-logs?startDate=yesterday")
        .await;
    assert_eq!(status, 400);
    let (status, _) = app
        .get_json(&client, "/api/admin/activity-logs?action=HACK")
        .await;
    assert_eq!(status, 400);
}

#[tokio::test]
async fn test_stats_count_today() {
    let app = TestApp::spawn().await;
    let client = TestApp::client();
    app.login(&client, "admin", "wrong-password").await;
    let client = app.super_admin().await;

    let (status, stats) = app.get_json(&client, "/api/admin/activity-stats").await;
    assert_eq!(status, 200);
    assert_eq!(stats["total"], 2);
    assert_eq!(stats["today"], 2);
    assert_eq!(stats["thisWeek"], 2);
    assert_eq!(stats["byAction"]["LOGIN"], 1);
    assert_eq!(stats["byAction"]["LOGIN_FAILED"], 1);
}

#[tokio::test]
async fn test_ring_keeps_most_recent_entries() {
    let app = TestApp::spawn_with(|config| config.activity_log_capacity = 5).await;
    let actor = Actor::account(None, "importer", "10.0.0.1");
    for n in 0..8 {
        app.state
            .audit()
            .record(&actor, ActivityAction::UpdateOrder, Some(format!("{n}")), json!({}))
            .await;
    }
    let client = app.super_admin().await;

    let (_, page) = app.get_json(&client, "/api/admin/activity-logs").await;
    assert_eq!(page["total"], 5);
    assert_eq!(page["entries"][0]["action"], "LOGIN");
    assert_eq!(page["entries"][4]["target"], "4");
}
