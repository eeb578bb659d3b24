//! Authorization gate extractors.
//!
//! Handlers opt into the gate by taking [`RequireAdminAuth`] or
//! [`RequireSuperAdmin`] as an argument. Rejections happen before the
//! handler body runs, so a rejected request never writes to the store and
//! leaves no audit entry.

use axum::{extract::FromRequestParts, http::request::Parts};
use chrono::Utc;
use tower_sessions::Session;

use signal_living_core::AdminRole;

use crate::error::{AppError, set_sentry_user};
use crate::models::{AdminSession, session_keys};
use crate::state::AppState;

/// Extractor that requires a live admin session.
///
/// Missing, unreadable, or expired sessions are rejected with 401; expired
/// ones are flushed on the way out.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAdminAuth(admin): RequireAdminAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", admin.username)
/// }
/// ```
pub struct RequireAdminAuth(pub AdminSession);

impl<S> FromRequestParts<S> for RequireAdminAuth
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AppError::Unauthorized)?;

        let admin: AdminSession = session
            .get(session_keys::CURRENT_ADMIN)
            .await
            .ok()
            .flatten()
            .ok_or(AppError::Unauthorized)?;

        if admin.is_expired(Utc::now()) {
            tracing::debug!(admin_id = %admin.id, "Rejecting expired admin session");
            if let Err(e) = session.flush().await {
                tracing::warn!(error = %e, "Failed to flush expired session");
            }
            return Err(AppError::Unauthorized);
        }

        set_sentry_user(admin.id, &admin.username);
        Ok(Self(admin))
    }
}

/// Extractor that requires a live `super_admin` session.
///
/// The role is re-read from the store on every request, so a demotion or
/// deletion takes effect before the next privileged call rather than at
/// re-login. Unauthenticated requests and sessions whose account is gone
/// get 401; other roles get 403.
pub struct RequireSuperAdmin(pub AdminSession);

impl FromRequestParts<AppState> for RequireSuperAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireAdminAuth(admin) = RequireAdminAuth::from_request_parts(parts, state).await?;

        let Some(account) = state.repos().admin_users.get_by_id(admin.id).await? else {
            tracing::info!(admin_id = %admin.id, "Session account no longer exists");
            if let Some(session) = parts.extensions.get::<Session>()
                && let Err(e) = session.flush().await
            {
                tracing::warn!(error = %e, "Failed to flush orphaned session");
            }
            return Err(AppError::Unauthorized);
        };

        if account.role != AdminRole::SuperAdmin {
            tracing::info!(admin_id = %admin.id, path = %parts.uri.path(), "Super admin route denied");
            return Err(AppError::Forbidden);
        }

        Ok(Self(admin))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::http::Request;
    use chrono::Duration;
    use secrecy::SecretString;
    use tower_sessions::MemoryStore;

    use signal_living_core::Username;

    use super::*;
    use crate::config::{AdminConfig, HashingConfig};
    use crate::db::Repositories;
    use crate::models::{ActivityLogQuery, AdminUser, AdminUserChanges, NewAdminUser};
    use crate::services::PasswordHasher;

    fn state() -> AppState {
        let config = AdminConfig {
            hashing: HashingConfig::fast(),
            ..AdminConfig::default()
        };
        let hasher = PasswordHasher::new(config.hashing).unwrap();
        AppState::new(config, Repositories::in_memory(100), hasher)
    }

    async fn account(state: &AppState, username: &str, role: AdminRole) -> AdminUser {
        state
            .repos()
            .admin_users
            .create(NewAdminUser {
                username: Username::parse(username).unwrap(),
                password_hash: state.hasher().hash(&SecretString::from("password1")).unwrap(),
                role,
            })
            .await
            .unwrap()
    }

    async fn session_with(admin: &AdminSession) -> Session {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        session
            .insert(session_keys::CURRENT_ADMIN, admin)
            .await
            .unwrap();
        session
    }

    fn parts(session: &Session) -> Parts {
        let (mut parts, ()) = Request::builder()
            .uri("/api/admin/users")
            .body(())
            .unwrap()
            .into_parts();
        parts.extensions.insert(session.clone());
        parts
    }

    async fn stored_admin(session: &Session) -> Option<AdminSession> {
        session.get(session_keys::CURRENT_ADMIN).await.unwrap()
    }

    async fn audit_total(state: &AppState) -> u64 {
        state
            .repos()
            .activity_logs
            .query(&ActivityLogQuery::default())
            .await
            .unwrap()
            .total
    }

    #[tokio::test]
    async fn test_missing_session_is_unauthorized() {
        let state = state();
        let (mut parts, ()) = Request::builder().body(()).unwrap().into_parts();

        let result = RequireAdminAuth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_expired_session_is_rejected_and_flushed() {
        let state = state();
        let user = account(&state, "admin", AdminRole::SuperAdmin).await;
        let mut expired = AdminSession::start(&user, Utc::now() - Duration::hours(25));
        assert!(expired.is_expired(Utc::now()));
        let session = session_with(&expired).await;

        let result = RequireAdminAuth::from_request_parts(&mut parts(&session), &state).await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
        assert!(stored_admin(&session).await.is_none());

        // Same outcome through the privileged gate
        expired.expires_at = Utc::now() - Duration::seconds(1);
        let session = session_with(&expired).await;
        let result = RequireSuperAdmin::from_request_parts(&mut parts(&session), &state).await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
        assert!(stored_admin(&session).await.is_none());

        assert_eq!(audit_total(&state).await, 0);
    }

    #[tokio::test]
    async fn test_live_session_passes_both_gates() {
        let state = state();
        let user = account(&state, "admin", AdminRole::SuperAdmin).await;
        let session = session_with(&AdminSession::start(&user, Utc::now())).await;

        let RequireAdminAuth(admin) =
            RequireAdminAuth::from_request_parts(&mut parts(&session), &state)
                .await
                .unwrap();
        assert_eq!(admin.id, user.id);
        let RequireSuperAdmin(admin) =
            RequireSuperAdmin::from_request_parts(&mut parts(&session), &state)
                .await
                .unwrap();
        assert_eq!(admin.username, "admin");
    }

    #[tokio::test]
    async fn test_plain_admin_is_forbidden_from_super_admin_gate() {
        let state = state();
        let user = account(&state, "manager", AdminRole::Admin).await;
        let session = session_with(&AdminSession::start(&user, Utc::now())).await;

        let result = RequireSuperAdmin::from_request_parts(&mut parts(&session), &state).await;
        assert!(matches!(result, Err(AppError::Forbidden)));
        // Still logged in for the routes every admin may use
        assert!(stored_admin(&session).await.is_some());
    }

    #[tokio::test]
    async fn test_demoted_super_admin_is_forbidden_without_relogin() {
        let state = state();
        let _root = account(&state, "admin", AdminRole::SuperAdmin).await;
        let deputy = account(&state, "deputy", AdminRole::SuperAdmin).await;
        let session = session_with(&AdminSession::start(&deputy, Utc::now())).await;

        state
            .repos()
            .admin_users
            .update(
                deputy.id,
                AdminUserChanges {
                    role: Some(AdminRole::Admin),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        // The session payload still says super_admin
        assert_eq!(stored_admin(&session).await.unwrap().role, AdminRole::SuperAdmin);
        let result = RequireSuperAdmin::from_request_parts(&mut parts(&session), &state).await;
        assert!(matches!(result, Err(AppError::Forbidden)));
    }

    #[tokio::test]
    async fn test_deleted_account_session_is_unauthorized_and_flushed() {
        let state = state();
        let _root = account(&state, "admin", AdminRole::SuperAdmin).await;
        let deputy = account(&state, "deputy", AdminRole::SuperAdmin).await;
        let session = session_with(&AdminSession::start(&deputy, Utc::now())).await;

        state.repos().admin_users.delete(deputy.id).await.unwrap();

        let result = RequireSuperAdmin::from_request_parts(&mut parts(&session), &state).await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
        assert!(stored_admin(&session).await.is_none());
        assert!(
            state
                .repos()
                .admin_users
                .get_by_id(deputy.id)
                .await
                .unwrap()
                .is_none()
        );
    }
}
