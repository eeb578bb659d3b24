//! Admin authentication service.
//!
//! Password login against the credential store, session issue and teardown,
//! and the audit entries each step produces. Failure responses are identical
//! for unknown usernames and wrong passwords; only the audit trail records
//! which one happened.

mod error;

pub use error::AuthError;

use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tower_sessions::cookie::time::{Duration, OffsetDateTime};
use tower_sessions::{Expiry, Session};

use signal_living_core::ActivityAction;

use crate::db::AdminUserStore;
use crate::models::{AdminSession, AdminUser, SESSION_LIFETIME_HOURS, session_keys};
use crate::services::audit::{Actor, AuditLog};
use crate::services::password::PasswordHasher;

/// Admin authentication service.
pub struct AuthService<'a> {
    users: &'a dyn AdminUserStore,
    hasher: &'a PasswordHasher,
    audit: &'a AuditLog,
}

impl<'a> AuthService<'a> {
    /// Create a new admin authentication service.
    #[must_use]
    pub const fn new(
        users: &'a dyn AdminUserStore,
        hasher: &'a PasswordHasher,
        audit: &'a AuditLog,
    ) -> Self {
        Self {
            users,
            hasher,
            audit,
        }
    }

    // =========================================================================
    // Login / Logout
    // =========================================================================

    /// Verify credentials and bind a fresh session to the account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingCredentials` for blank input and
    /// `AuthError::InvalidCredentials` for an unknown user or wrong password.
    pub async fn login(
        &self,
        session: &Session,
        ip_address: &str,
        username: &str,
        password: &SecretString,
    ) -> Result<AdminUser, AuthError> {
        let username = username.trim();
        if username.is_empty() || password.expose_secret().is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let Some(credentials) = self.users.get_credentials(username).await? else {
            tracing::info!(username, "Login attempt for unknown admin");
            self.audit
                .record(
                    &Actor::account(None, username, ip_address),
                    ActivityAction::LoginFailed,
                    None,
                    json!({ "reason": "unknown user" }),
                )
                .await;
            return Err(AuthError::InvalidCredentials);
        };

        let user = credentials.user;
        if !self.hasher.verify(password, &credentials.password_hash) {
            tracing::info!(admin_id = %user.id, "Login failed: wrong password");
            self.audit
                .record(
                    &Actor::account(Some(user.id), user.username.as_str(), ip_address),
                    ActivityAction::LoginFailed,
                    None,
                    json!({ "reason": "bad password" }),
                )
                .await;
            return Err(AuthError::InvalidCredentials);
        }

        let now = Utc::now();
        // Before the session is touched, so a store failure leaves no login behind
        self.users.record_login(user.id, now).await?;

        let admin_session = AdminSession::start(&user, now);

        // New id on privilege change
        session.cycle_id().await?;
        session
            .insert(session_keys::CURRENT_ADMIN, &admin_session)
            .await?;
        session.set_expiry(Some(Expiry::AtDateTime(
            OffsetDateTime::now_utc() + Duration::hours(SESSION_LIFETIME_HOURS),
        )));

        self.audit
            .record(
                &Actor::admin(&admin_session, ip_address),
                ActivityAction::Login,
                None,
                json!({}),
            )
            .await;

        tracing::info!(admin_id = %user.id, role = %user.role, "Admin logged in");
        Ok(AdminUser {
            last_login: Some(now),
            ..user
        })
    }

    /// Destroy the session. The `LOGOUT` entry is written in the background.
    ///
    /// Logging out without a session is not an error.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Session` if the session store fails.
    pub async fn logout(&self, session: &Session, ip_address: &str) -> Result<(), AuthError> {
        let current = session
            .get::<AdminSession>(session_keys::CURRENT_ADMIN)
            .await?;
        session.flush().await?;

        if let Some(current) = current {
            tracing::info!(admin_id = %current.id, "Admin logged out");
            let audit = self.audit.clone();
            let actor = Actor::admin(&current, ip_address);
            tokio::spawn(async move {
                audit
                    .record(&actor, ActivityAction::Logout, None, json!({}))
                    .await;
            });
        }
        Ok(())
    }
}

/// The live session payload, if any. Pure read: expired payloads are
/// reported as absent but left for the gate to clear.
///
/// # Errors
///
/// Returns `AuthError::Session` if the session store fails.
pub async fn current_session(session: &Session) -> Result<Option<AdminSession>, AuthError> {
    let current = session
        .get::<AdminSession>(session_keys::CURRENT_ADMIN)
        .await?;
    Ok(current.filter(|s| !s.is_expired(Utc::now())))
}
