//! Integration tests for Signal Living.
//!
//! Each test spawns the full admin router on an ephemeral port, backed by
//! the in-memory store and session store, and drives it over HTTP with a
//! cookie-keeping client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p signal-living-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use reqwest::Client;
use serde_json::{Value, json};
use tower_sessions::MemoryStore;

use signal_living_admin::config::{AdminConfig, HashingConfig};
use signal_living_admin::db::Repositories;
use signal_living_admin::models::{AdminUser, CreateAdminRequest};
use signal_living_admin::routes::build_router;
use signal_living_admin::seed;
use signal_living_admin::services::{Actor, PasswordHasher};
use signal_living_admin::state::AppState;
use signal_living_core::AdminRole;

/// Bootstrap super admin credentials used by every test app.
pub const SUPER_USERNAME: &str = "admin";
pub const SUPER_PASSWORD: &str = "admin12345";

/// A running server plus direct access to its state.
pub struct TestApp {
    pub addr: SocketAddr,
    pub state: AppState,
    pub upload_dir: PathBuf,
}

impl TestApp {
    /// Spawn with defaults: seeded catalog, login limiter off.
    pub async fn spawn() -> Self {
        Self::spawn_with(|_| {}).await
    }

    /// Spawn after adjusting the test configuration.
    pub async fn spawn_with(configure: impl FnOnce(&mut AdminConfig)) -> Self {
        let upload_dir = std::env::temp_dir().join(format!("sigliv-test-{}", uuid::Uuid::new_v4()));
        let mut config = AdminConfig {
            port: 0,
            upload_dir: upload_dir.clone(),
            login_rate_limit: false,
            hashing: HashingConfig::fast(),
            ..AdminConfig::default()
        };
        configure(&mut config);

        let repos = Repositories::in_memory(config.activity_log_capacity);
        let hasher = PasswordHasher::new(config.hashing).unwrap();
        seed::run(&repos, &hasher, &config).await.unwrap();
        let state = AppState::new(config, repos, hasher);

        let app = build_router(state.clone(), MemoryStore::default());
        let listener = tokio::net::TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .unwrap();
        });

        Self {
            addr,
            state,
            upload_dir,
        }
    }

    /// Absolute URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// A fresh client with its own cookie jar.
    #[must_use]
    pub fn client() -> Client {
        Client::builder().cookie_store(true).build().unwrap()
    }

    /// POST a login and return the raw response.
    pub async fn login(&self, client: &Client, username: &str, password: &str) -> reqwest::Response {
        client
            .post(self.url("/api/auth/login"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .unwrap()
    }

    /// A client logged in as `username`.
    pub async fn client_as(&self, username: &str, password: &str) -> Client {
        let client = Self::client();
        let response = self.login(&client, username, password).await;
        assert_eq!(response.status(), 200, "login as {username} failed");
        client
    }

    /// A client logged in as the bootstrap super admin.
    pub async fn super_admin(&self) -> Client {
        self.client_as(SUPER_USERNAME, SUPER_PASSWORD).await
    }

    /// Create an account directly through the service layer.
    pub async fn create_admin(&self, username: &str, password: &str, role: AdminRole) -> AdminUser {
        self.state
            .admin_users()
            .create(
                &Actor::account(None, "test", "127.0.0.1"),
                CreateAdminRequest {
                    username: username.to_owned(),
                    password: password.to_owned(),
                    role,
                },
            )
            .await
            .unwrap()
    }

    /// GET `path` and decode the JSON body.
    pub async fn get_json(&self, client: &Client, path: &str) -> (u16, Value) {
        let response = client.get(self.url(path)).send().await.unwrap();
        let status = response.status().as_u16();
        (status, response.json().await.unwrap_or(Value::Null))
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.upload_dir);
    }
}

/// A valid product body.
#[must_use]
pub fn product_body(name: &str, price: i64) -> Value {
    json!({
        "name": name,
        "category": "bedding",
        "price": price,
        "stock": 10,
        "status": "on-sale",
        "description": "test product",
    })
}
