//! Admin account domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use signal_living_core::{AdminRole, AdminUserId, Username};

/// An admin account (sanitized: never carries the password hash).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    /// Unique admin user ID.
    pub id: AdminUserId,
    /// Login name, matched case-sensitively.
    pub username: Username,
    /// Permission level.
    pub role: AdminRole,
    /// Last successful login.
    pub last_login: Option<DateTime<Utc>>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

/// An account together with its stored hash, for login verification only.
#[derive(Debug, Clone)]
pub struct AdminCredentials {
    pub user: AdminUser,
    pub password_hash: String,
}

/// Insert payload for a new account. The hash is produced by the caller.
#[derive(Debug, Clone)]
pub struct NewAdminUser {
    pub username: Username,
    pub password_hash: String,
    pub role: AdminRole,
}

/// Partial update for an account; `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct AdminUserChanges {
    pub username: Option<Username>,
    pub password_hash: Option<String>,
    pub role: Option<AdminRole>,
}

impl AdminUserChanges {
    /// Whether the update touches nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.username.is_none() && self.password_hash.is_none() && self.role.is_none()
    }

    /// Names of the changed fields, for the audit trail.
    ///
    /// The password is reported by name only.
    #[must_use]
    pub fn changed_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.username.is_some() {
            fields.push("username");
        }
        if self.password_hash.is_some() {
            fields.push("password");
        }
        if self.role.is_some() {
            fields.push("role");
        }
        fields
    }
}

/// Body of `POST /api/admin/users`.
#[derive(Deserialize)]
pub struct CreateAdminRequest {
    pub username: String,
    pub password: String,
    #[serde(default = "default_role")]
    pub role: AdminRole,
}

const fn default_role() -> AdminRole {
    AdminRole::Admin
}

/// Body of `PATCH /api/admin/users/{id}`; absent fields stay unchanged.
#[derive(Default, Deserialize)]
pub struct UpdateAdminRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub role: Option<AdminRole>,
}
