//! Login, session check and logout over HTTP.

#![allow(clippy::unwrap_used)]

use serde_json::Value;

use signal_living_core::AdminRole;
use signal_living_integration_tests::{SUPER_PASSWORD, SUPER_USERNAME, TestApp};

#[tokio::test]
async fn test_login_check_logout_flow() {
    let app = TestApp::spawn().await;
    let client = TestApp::client();

    let (status, body) = app.get_json(&client, "/api/auth/check").await;
    assert_eq!(status, 200);
    assert_eq!(body["authenticated"], false);

    let response = app.login(&client, SUPER_USERNAME, SUPER_PASSWORD).await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["username"], SUPER_USERNAME);
    assert_eq!(body["user"]["role"], "super_admin");
    assert!(body["user"].get("password").is_none());

    let (status, body) = app.get_json(&client, "/api/auth/check").await;
    assert_eq!(status, 200);
    assert_eq!(body["authenticated"], true);
    assert_eq!(body["user"]["role"], "super_admin");

    let (status, _) = app.get_json(&client, "/api/admin/stats").await;
    assert_eq!(status, 200);

    let response = client.post(app.url("/api/auth/logout")).send().await.unwrap();
    assert_eq!(response.status(), 200);

    let (_, body) = app.get_json(&client, "/api/auth/check").await;
    assert_eq!(body["authenticated"], false);
    let (status, body) = app.get_json(&client, "/api/admin/stats").await;
    assert_eq!(status, 401);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_failed_logins_are_indistinguishable() {
    let app = TestApp::spawn().await;
    let client = TestApp::client();

    let unknown = app.login(&client, "nobody", SUPER_PASSWORD).await;
    assert_eq!(unknown.status(), 401);
    let unknown: Value = unknown.json().await.unwrap();

    let wrong = app.login(&client, SUPER_USERNAME, "wrong-password").await;
    assert_eq!(wrong.status(), 401);
    let wrong: Value = wrong.json().await.unwrap();

    assert_eq!(unknown, wrong);
    assert_eq!(unknown["success"], false);

    // Both failures are still audited
    let admin = app.super_admin().await;
    let (_, page) = app
        .get_json(&admin, "/api/admin/activity-logs?action=LOGIN_FAILED")
        .await;
    assert_eq!(page["total"], 2);
}

#[tokio::test]
async fn test_login_requires_both_fields() {
    let app = TestApp::spawn().await;
    let client = TestApp::client();

    let response = app.login(&client, "   ", "").await;
    assert_eq!(response.status(), 400);

    let response = client
        .post(app.url("/api/auth/login"))
        .json(&serde_json::json!({ "username": SUPER_USERNAME }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_usernames_are_case_sensitive() {
    let app = TestApp::spawn().await;
    let client = TestApp::client();

    let response = app.login(&client, "ADMIN", SUPER_PASSWORD).await;
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_login_records_last_login() {
    let app = TestApp::spawn().await;
    let user = app.create_admin("manager", "manager-pass", AdminRole::Admin).await;
    assert!(user.last_login.is_none());

    let client = app.client_as("manager", "manager-pass").await;
    let (_, body) = app.get_json(&client, "/api/auth/check").await;
    assert_eq!(body["user"]["role"], "admin");

    let stored = app
        .state
        .repos()
        .admin_users
        .get_by_id(user.id)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.last_login.is_some());
}

#[tokio::test]
async fn test_login_rate_limit_returns_json_429() {
    let app = TestApp::spawn_with(|config| config.login_rate_limit = true).await;
    let client = TestApp::client();

    for _ in 0..5 {
        let response = app.login(&client, SUPER_USERNAME, "wrong-password").await;
        assert_eq!(response.status(), 401);
    }

    let response = app.login(&client, SUPER_USERNAME, SUPER_PASSWORD).await;
    assert_eq!(response.status(), 429);
    assert!(response.headers().contains_key("retry-after"));
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);

    // Other routes are not limited
    let (status, _) = app.get_json(&client, "/api/auth/check").await;
    assert_eq!(status, 200);
}

#[tokio::test]
async fn test_check_writes_no_audit_entries() {
    let app = TestApp::spawn().await;
    let client = app.super_admin().await;

    for _ in 0..3 {
        let (_, body) = app.get_json(&client, "/api/auth/check").await;
        assert_eq!(body["authenticated"], true);
    }

    let (_, page) = app.get_json(&client, "/api/admin/activity-logs").await;
    assert_eq!(page["total"], 1);
    assert_eq!(page["entries"][0]["action"], "LOGIN");
}
