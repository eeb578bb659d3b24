//! Audit trail queries.

use axum::{Json, Router, extract::State, routing::get};
use chrono::Local;
use tracing::instrument;

use crate::error::AppError;
use crate::extract::ApiQuery;
use crate::middleware::RequireAdminAuth;
use crate::models::{ActivityLogPage, ActivityLogParams, ActivityStats};
use crate::state::AppState;

/// Build the activity log router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/admin/activity-logs", get(index))
        .route("/api/admin/activity-stats", get(stats))
}

/// GET /api/admin/activity-logs?page&limit&adminId&action&startDate&endDate
///
/// Bare dates are read in the server's local timezone.
#[instrument(skip_all)]
async fn index(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ActivityLogParams>,
) -> Result<Json<ActivityLogPage>, AppError> {
    let query = params.into_query(&Local).map_err(AppError::Validation)?;
    Ok(Json(state.audit().query(&query).await?))
}

/// GET /api/admin/activity-stats
#[instrument(skip_all)]
async fn stats(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<ActivityStats>, AppError> {
    Ok(Json(state.audit().stats().await?))
}
