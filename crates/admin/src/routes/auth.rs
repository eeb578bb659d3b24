//! Authentication route handlers.
//!
//! Failed logins always answer with the same 401 body; the audit trail
//! records whether the username existed.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::extract::ApiJson;
use crate::middleware::{ClientIp, json_rate_limit_response, login_rate_limiter};
use crate::models::SessionUser;
use crate::services::auth::current_session;
use crate::state::AppState;

/// Build the auth router. The login route is rate limited when enabled.
pub fn router(rate_limit: bool) -> Router<AppState> {
    let mut login_route = Router::new().route("/api/auth/login", post(login));
    if rate_limit {
        login_route = login_route
            .layer(login_rate_limiter())
            .layer(axum::middleware::map_response(json_rate_limit_response));
    }

    Router::new()
        .merge(login_route)
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/check", get(check))
}

/// Login body. Missing fields are treated as blank.
#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub user: SessionUser,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<SessionUser>,
}

/// POST /api/auth/login
#[instrument(skip_all, fields(ip = %ip.as_str()))]
async fn login(
    State(state): State<AppState>,
    session: Session,
    ip: ClientIp,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let password = SecretString::from(body.password);
    let user = state
        .auth()
        .login(&session, ip.as_str(), &body.username, &password)
        .await?;

    set_sentry_user(user.id, user.username.as_str());
    Ok(Json(LoginResponse {
        success: true,
        user: SessionUser {
            id: user.id,
            username: user.username.to_string(),
            role: user.role,
        },
    }))
}

/// POST /api/auth/logout
#[instrument(skip_all)]
async fn logout(
    State(state): State<AppState>,
    session: Session,
    ip: ClientIp,
) -> Result<Json<LogoutResponse>, AppError> {
    state.auth().logout(&session, ip.as_str()).await?;
    clear_sentry_user();
    Ok(Json(LogoutResponse { success: true }))
}

/// GET /api/auth/check
async fn check(session: Session) -> Result<Json<CheckResponse>, AppError> {
    let current = current_session(&session).await?;
    Ok(Json(CheckResponse {
        authenticated: current.is_some(),
        user: current.as_ref().map(SessionUser::from),
    }))
}
