//! Session-stored admin identity.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use signal_living_core::{AdminRole, AdminUserId};

use super::admin_user::AdminUser;

/// Absolute session lifetime from login.
pub const SESSION_LIFETIME_HOURS: i64 = 24;

/// Data stored in the session once an admin has logged in.
///
/// Role and username are snapshotted at login; changes to the account take
/// effect on the next login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSession {
    pub id: AdminUserId,
    pub username: String,
    pub role: AdminRole,
    /// Fixed expiry, not extended by activity.
    pub expires_at: DateTime<Utc>,
}

impl AdminSession {
    /// Start a session for `user` at `now`.
    #[must_use]
    pub fn start(user: &AdminUser, now: DateTime<Utc>) -> Self {
        Self {
            id: user.id,
            username: user.username.to_string(),
            role: user.role,
            expires_at: now + Duration::hours(SESSION_LIFETIME_HOURS),
        }
    }

    /// Whether the session is past its absolute expiry.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Public view of the session user in auth responses.
#[derive(Debug, Clone, Serialize)]
pub struct SessionUser {
    pub id: AdminUserId,
    pub username: String,
    pub role: AdminRole,
}

impl From<&AdminSession> for SessionUser {
    fn from(session: &AdminSession) -> Self {
        Self {
            id: session.id,
            username: session.username.clone(),
            role: session.role,
        }
    }
}

/// Session keys for admin authentication data.
pub mod session_keys {
    /// Key for storing the current logged-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use signal_living_core::Username;

    use super::*;

    #[test]
    fn test_session_expires_after_24_hours() {
        let now = Utc::now();
        let user = AdminUser {
            id: AdminUserId::new(1),
            username: Username::parse("admin").unwrap(),
            role: AdminRole::SuperAdmin,
            last_login: None,
            created_at: now,
        };
        let session = AdminSession::start(&user, now);

        assert!(!session.is_expired(now + Duration::hours(23)));
        assert!(session.is_expired(now + Duration::hours(24)));
        assert_eq!(session.username, "admin");
    }
}
