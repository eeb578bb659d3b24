//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                          - Liveness
//! GET    /health/ready                    - Store connectivity
//! GET    /uploads/*                       - Uploaded images
//!
//! # Catalog (public)
//! GET    /api/products?category=          - On-sale products
//! GET    /api/products/{id}               - Product detail
//! GET    /api/products/category/{category}
//!
//! # Auth
//! POST   /api/auth/login                  - Rate limited per client IP
//! POST   /api/auth/logout
//! GET    /api/auth/check
//!
//! # Admin (session required)
//! GET    /api/admin/stats
//! GET    /api/admin/products              POST /api/admin/products
//! PUT    /api/admin/products/{id}         DELETE /api/admin/products/{id}
//! GET    /api/admin/orders                GET /api/admin/orders/{id}
//! PATCH  /api/admin/orders/{id}/status
//! GET    /api/admin/activity-logs         GET /api/admin/activity-stats
//! POST   /api/upload/image
//!
//! # Admin users (super admin only)
//! GET    /api/admin/users                 POST /api/admin/users
//! PATCH  /api/admin/users/{id}            DELETE /api/admin/users/{id}
//! GET    /api/admin/users/{id}/activity
//! ```

pub mod activity_logs;
pub mod admin_users;
pub mod auth;
pub mod catalog;
pub mod dashboard;
pub mod orders;
pub mod products;
pub mod upload;

use axum::extract::State;
use axum::http::{Method, StatusCode, header};
use axum::{Router, routing::get};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tower_sessions::SessionStore;
use tracing::Span;

use crate::db::RepositoryError;
use crate::error::AppError;
use crate::middleware::create_session_layer;
use crate::state::AppState;

/// Build every API route.
pub fn routes(login_rate_limit: bool) -> Router<AppState> {
    Router::new()
        .merge(catalog::router())
        .merge(auth::router(login_rate_limit))
        .merge(dashboard::router())
        .merge(products::router())
        .merge(orders::router())
        .merge(admin_users::router())
        .merge(activity_logs::router())
        .merge(upload::router())
}

/// Assemble the full application: routes, static uploads, sessions, CORS,
/// tracing and Sentry.
pub fn build_router<S>(state: AppState, session_store: S) -> Router
where
    S: SessionStore + Clone,
{
    let config = state.config();
    let session_layer = create_session_layer(session_store, config);
    let cors = CorsLayer::new()
        .allow_origin(config.cors_origin.clone())
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE]);
    let uploads = ServeDir::new(&config.upload_dir);

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes(config.login_rate_limit))
        .nest_service("/uploads", uploads)
        .layer(session_layer)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

/// Map a repository `NotFound` to a named 404.
pub(crate) fn not_found_as(what: &'static str) -> impl Fn(RepositoryError) -> AppError {
    move |err| match err {
        RepositoryError::NotFound => AppError::NotFound(what),
        other => AppError::Database(other),
    }
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the store is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.repos().ping().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
