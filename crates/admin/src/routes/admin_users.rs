//! Admin account management handlers (`super_admin` only).

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, patch},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use signal_living_core::AdminUserId;

use crate::error::AppError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::{ClientIp, RequireSuperAdmin};
use crate::models::activity_log::{DEFAULT_RECENT_LIMIT, MAX_PAGE_SIZE};
use crate::models::{ActivityLog, AdminUser, CreateAdminRequest, UpdateAdminRequest};
use crate::services::{Actor, AdminUserError};
use crate::state::AppState;

/// Build the admin users router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/admin/users", get(index).post(create))
        .route("/api/admin/users/{id}", patch(update).delete(destroy))
        .route("/api/admin/users/{id}/activity", get(activity))
}

#[derive(Debug, Default, Deserialize)]
pub struct ActivityQuery {
    pub limit: Option<u32>,
}

/// GET /api/admin/users
#[instrument(skip_all)]
async fn index(
    RequireSuperAdmin(_admin): RequireSuperAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<AdminUser>>, AppError> {
    Ok(Json(state.repos().admin_users.list().await?))
}

/// POST /api/admin/users
#[instrument(skip_all, fields(admin_id = %admin.id))]
async fn create(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    ip: ClientIp,
    ApiJson(body): ApiJson<CreateAdminRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let user = state
        .admin_users()
        .create(&Actor::admin(&admin, ip.0), body)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Admin created",
            "user": user,
        })),
    ))
}

/// PATCH /api/admin/users/{id}
#[instrument(skip_all, fields(admin_id = %admin.id, target_id = %id))]
async fn update(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    ip: ClientIp,
    ApiPath(id): ApiPath<AdminUserId>,
    ApiJson(body): ApiJson<UpdateAdminRequest>,
) -> Result<Json<Value>, AppError> {
    let user = state
        .admin_users()
        .update(&Actor::admin(&admin, ip.0), id, body)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Admin updated",
        "user": user,
    })))
}

/// DELETE /api/admin/users/{id}
#[instrument(skip_all, fields(admin_id = %admin.id, target_id = %id))]
async fn destroy(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    ip: ClientIp,
    ApiPath(id): ApiPath<AdminUserId>,
) -> Result<Json<Value>, AppError> {
    let user = state
        .admin_users()
        .delete(&Actor::admin(&admin, ip.0), &admin, id)
        .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Admin deleted",
        "user": user,
    })))
}

/// GET /api/admin/users/{id}/activity?limit=
#[instrument(skip_all, fields(target_id = %id))]
async fn activity(
    RequireSuperAdmin(_admin): RequireSuperAdmin,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<AdminUserId>,
    ApiQuery(query): ApiQuery<ActivityQuery>,
) -> Result<Json<Vec<ActivityLog>>, AppError> {
    if state.repos().admin_users.get_by_id(id).await?.is_none() {
        return Err(AdminUserError::NotFound.into());
    }

    let limit = query
        .limit
        .unwrap_or(DEFAULT_RECENT_LIMIT)
        .clamp(1, MAX_PAGE_SIZE);
    Ok(Json(state.audit().recent_by_admin(id, limit).await?))
}
