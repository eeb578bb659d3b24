//! Admin account management (`super_admin` only).
//!
//! Enforces the account invariants: usernames are unique, at least one
//! `super_admin` always exists, and nobody deletes their own account.
//! Passwords are hashed here, explicitly, before anything is stored.

use axum::http::StatusCode;
use secrecy::SecretString;
use serde_json::json;
use thiserror::Error;

use signal_living_core::{ActivityAction, AdminUserId, Username, UsernameError};

use crate::db::{AdminUserStore, RepositoryError};
use crate::models::{
    AdminSession, AdminUser, AdminUserChanges, CreateAdminRequest, NewAdminUser,
    UpdateAdminRequest,
};
use crate::services::audit::{Actor, AuditLog};
use crate::services::password::{PasswordError, PasswordHasher};

/// Errors from account management.
#[derive(Debug, Error)]
pub enum AdminUserError {
    #[error("invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error("username already exists")]
    UsernameTaken,

    #[error("at least one super admin must remain")]
    LastSuperAdmin,

    #[error("you cannot delete your own account")]
    SelfDeletion,

    #[error("no changes provided")]
    NoChanges,

    #[error("admin user not found")]
    NotFound,

    #[error("database error: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for AdminUserError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound,
            RepositoryError::Conflict(_) => Self::UsernameTaken,
            RepositoryError::LastSuperAdmin => Self::LastSuperAdmin,
            other => Self::Repository(other),
        }
    }
}

impl AdminUserError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidUsername(_)
            | Self::UsernameTaken
            | Self::LastSuperAdmin
            | Self::SelfDeletion
            | Self::NoChanges
            | Self::Password(PasswordError::TooShort | PasswordError::TooLong) => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Password(_) | Self::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Account management for one acting admin.
pub struct AdminUserService<'a> {
    users: &'a dyn AdminUserStore,
    hasher: &'a PasswordHasher,
    audit: &'a AuditLog,
}

impl<'a> AdminUserService<'a> {
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

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns a validation error, `UsernameTaken`, or a repository error.
    pub async fn create(
        &self,
        actor: &Actor,
        request: CreateAdminRequest,
    ) -> Result<AdminUser, AdminUserError> {
        let username = Username::parse(&request.username)?;
        let password_hash = self.hasher.hash(&SecretString::from(request.password))?;

        let user = self
            .users
            .create(NewAdminUser {
                username,
                password_hash,
                role: request.role,
            })
            .await?;

        self.audit
            .record(
                actor,
                ActivityAction::CreateAdmin,
                Some(user.username.to_string()),
                json!({ "adminId": user.id, "role": user.role }),
            )
            .await;
        tracing::info!(admin_id = %user.id, role = %user.role, "Admin account created");
        Ok(user)
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `NoChanges`, a validation error, `LastSuperAdmin` when the
    /// update would demote the only `super_admin`, `NotFound`, or
    /// `UsernameTaken`.
    pub async fn update(
        &self,
        actor: &Actor,
        id: AdminUserId,
        request: UpdateAdminRequest,
    ) -> Result<AdminUser, AdminUserError> {
        let changes = AdminUserChanges {
            username: request.username.as_deref().map(Username::parse).transpose()?,
            password_hash: request
                .password
                .map(|p| self.hasher.hash(&SecretString::from(p)))
                .transpose()?,
            role: request.role,
        };
        if changes.is_empty() {
            return Err(AdminUserError::NoChanges);
        }

        // The store refuses to demote the last super admin
        let fields = changes.changed_fields();
        let user = self.users.update(id, changes).await?;

        self.audit
            .record(
                actor,
                ActivityAction::UpdateAdmin,
                Some(user.username.to_string()),
                json!({ "adminId": user.id, "changes": fields }),
            )
            .await;
        tracing::info!(admin_id = %user.id, ?fields, "Admin account updated");
        Ok(user)
    }

    /// Delete an account.
    ///
    /// # Errors
    ///
    /// Returns `SelfDeletion`, `LastSuperAdmin`, or `NotFound`.
    pub async fn delete(
        &self,
        actor: &Actor,
        current: &AdminSession,
        id: AdminUserId,
    ) -> Result<AdminUser, AdminUserError> {
        if current.id == id {
            return Err(AdminUserError::SelfDeletion);
        }

        let user = self.users.delete(id).await?;

        self.audit
            .record(
                actor,
                ActivityAction::DeleteAdmin,
                Some(user.username.to_string()),
                json!({ "adminId": user.id, "role": user.role }),
            )
            .await;
        tracing::info!(admin_id = %user.id, "Admin account deleted");
        Ok(user)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use signal_living_core::AdminRole;

    use super::*;
    use crate::config::HashingConfig;
    use crate::db::ActivityLogStore;
    use crate::db::memory::{MemoryActivityLog, MemoryAdminUsers};
    use crate::models::{ActivityLogQuery, AdminCredentials};

    struct Fixture {
        users: MemoryAdminUsers,
        hasher: PasswordHasher,
        audit: AuditLog,
        log: Arc<MemoryActivityLog>,
        root: AdminUser,
    }

    impl Fixture {
        fn service(&self) -> AdminUserService<'_> {
            AdminUserService::new(&self.users, &self.hasher, &self.audit)
        }

        fn root_session(&self) -> AdminSession {
            AdminSession::start(&self.root, Utc::now())
        }

        fn actor(&self) -> Actor {
            Actor::admin(&self.root_session(), "127.0.0.1")
        }

        async fn audit_count(&self) -> u64 {
            self.log
                .query(&ActivityLogQuery::default())
                .await
                .unwrap()
                .total
        }
    }

    /// Yields to the scheduler before every store call, so two joined
    /// service calls interleave at each await point.
    struct Interleaving<'a>(&'a MemoryAdminUsers);

    #[async_trait]
    impl AdminUserStore for Interleaving<'_> {
        async fn list(&self) -> Result<Vec<AdminUser>, RepositoryError> {
            tokio::task::yield_now().await;
            self.0.list().await
        }

        async fn get_by_id(&self, id: AdminUserId) -> Result<Option<AdminUser>, RepositoryError> {
            tokio::task::yield_now().await;
            self.0.get_by_id(id).await
        }

        async fn get_credentials(
            &self,
            username: &str,
        ) -> Result<Option<AdminCredentials>, RepositoryError> {
            tokio::task::yield_now().await;
            self.0.get_credentials(username).await
        }

        async fn create(&self, new: NewAdminUser) -> Result<AdminUser, RepositoryError> {
            tokio::task::yield_now().await;
            self.0.create(new).await
        }

        async fn update(
            &self,
            id: AdminUserId,
            changes: AdminUserChanges,
        ) -> Result<AdminUser, RepositoryError> {
            tokio::task::yield_now().await;
            self.0.update(id, changes).await
        }

        async fn delete(&self, id: AdminUserId) -> Result<AdminUser, RepositoryError> {
            tokio::task::yield_now().await;
            self.0.delete(id).await
        }

        async fn count(&self) -> Result<u64, RepositoryError> {
            tokio::task::yield_now().await;
            self.0.count().await
        }

        async fn count_by_role(&self, role: AdminRole) -> Result<u64, RepositoryError> {
            tokio::task::yield_now().await;
            self.0.count_by_role(role).await
        }

        async fn record_login(
            &self,
            id: AdminUserId,
            at: DateTime<Utc>,
        ) -> Result<(), RepositoryError> {
            tokio::task::yield_now().await;
            self.0.record_login(id, at).await
        }
    }

    async fn fixture() -> Fixture {
        let hasher = PasswordHasher::new(HashingConfig::fast()).unwrap();
        let users = MemoryAdminUsers::default();
        let root = users
            .create(NewAdminUser {
                username: Username::parse("admin").unwrap(),
                password_hash: hasher.hash(&SecretString::from("admin12345")).unwrap(),
                role: AdminRole::SuperAdmin,
            })
            .await
            .unwrap();
        let log = Arc::new(MemoryActivityLog::new(100));
        Fixture {
            users,
            hasher,
            audit: AuditLog::new(log.clone()),
            log,
            root,
        }
    }

    fn create_request(username: &str, role: AdminRole) -> CreateAdminRequest {
        CreateAdminRequest {
            username: username.to_owned(),
            password: "password1".to_owned(),
            role,
        }
    }

    #[tokio::test]
    async fn test_create_hashes_and_audits() {
        let f = fixture().await;
        let user = f
            .service()
            .create(&f.actor(), create_request("manager", AdminRole::Admin))
            .await
            .unwrap();

        let stored = f.users.get_credentials("manager").await.unwrap().unwrap();
        assert!(stored.password_hash.starts_with("$argon2id$"));
        assert!(f.hasher.verify(&SecretString::from("password1"), &stored.password_hash));
        assert_eq!(user.role, AdminRole::Admin);
        assert_eq!(f.audit_count().await, 1);
    }

    #[tokio::test]
    async fn test_create_rejects_bad_input_without_audit() {
        let f = fixture().await;
        let service = f.service();

        let err = service
            .create(&f.actor(), create_request("ab", AdminRole::Admin))
            .await
            .unwrap_err();
        assert!(matches!(err, AdminUserError::InvalidUsername(_)));

        let mut short = create_request("manager", AdminRole::Admin);
        short.password = "12345".to_owned();
        let err = service.create(&f.actor(), short).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = service
            .create(&f.actor(), create_request("admin", AdminRole::Admin))
            .await
            .unwrap_err();
        assert!(matches!(err, AdminUserError::UsernameTaken));

        assert_eq!(f.audit_count().await, 0);
    }

    #[tokio::test]
    async fn test_last_super_admin_cannot_be_deleted_or_demoted() {
        let f = fixture().await;
        let service = f.service();
        let other = service
            .create(&f.actor(), create_request("manager", AdminRole::Admin))
            .await
            .unwrap();
        let other_session = AdminSession::start(&other, Utc::now());
        let other_actor = Actor::admin(&other_session, "127.0.0.1");

        let err = service
            .delete(&other_actor, &other_session, f.root.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AdminUserError::LastSuperAdmin));

        let err = service
            .update(
                &f.actor(),
                f.root.id,
                UpdateAdminRequest {
                    role: Some(AdminRole::Admin),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AdminUserError::LastSuperAdmin));

        assert_eq!(f.users.count().await.unwrap(), 2);
        assert_eq!(
            f.users.get_by_id(f.root.id).await.unwrap().unwrap().role,
            AdminRole::SuperAdmin
        );
    }

    /// Two super admins: `root` and a freshly created `deputy`.
    async fn two_super_admins(f: &Fixture) -> (AdminSession, AdminSession) {
        let deputy = f
            .service()
            .create(&f.actor(), create_request("deputy", AdminRole::SuperAdmin))
            .await
            .unwrap();
        (f.root_session(), AdminSession::start(&deputy, Utc::now()))
    }

    #[tokio::test]
    async fn test_concurrent_mutual_deletes_keep_one_super_admin() {
        let f = fixture().await;
        let (root, deputy) = two_super_admins(&f).await;
        let store = Interleaving(&f.users);
        let service = AdminUserService::new(&store, &f.hasher, &f.audit);
        let root_actor = Actor::admin(&root, "10.0.0.1");
        let deputy_actor = Actor::admin(&deputy, "10.0.0.2");

        let (first, second) = tokio::join!(
            service.delete(&root_actor, &root, deputy.id),
            service.delete(&deputy_actor, &deputy, root.id),
        );

        assert_eq!(
            u8::from(first.is_ok()) + u8::from(second.is_ok()),
            1,
            "exactly one delete may win"
        );
        let loser = first.err().or(second.err()).unwrap();
        assert!(matches!(loser, AdminUserError::LastSuperAdmin));
        assert_eq!(f.users.count_by_role(AdminRole::SuperAdmin).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_mutual_demotions_keep_one_super_admin() {
        let f = fixture().await;
        let (root, deputy) = two_super_admins(&f).await;
        let store = Interleaving(&f.users);
        let service = AdminUserService::new(&store, &f.hasher, &f.audit);
        let demote = || UpdateAdminRequest {
            role: Some(AdminRole::Admin),
            ..Default::default()
        };

        let root_actor = Actor::admin(&root, "10.0.0.1");
        let deputy_actor = Actor::admin(&deputy, "10.0.0.2");

        let (first, second) = tokio::join!(
            service.update(&root_actor, deputy.id, demote()),
            service.update(&deputy_actor, root.id, demote()),
        );

        assert!(first.is_ok() != second.is_ok());
        assert_eq!(f.users.count_by_role(AdminRole::SuperAdmin).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_self_deletion_rejected() {
        let f = fixture().await;
        let err = f
            .service()
            .delete(&f.actor(), &f.root_session(), f.root.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AdminUserError::SelfDeletion));
    }

    #[tokio::test]
    async fn test_update_records_field_names_only() {
        let f = fixture().await;
        let service = f.service();
        let other = service
            .create(&f.actor(), create_request("manager", AdminRole::Admin))
            .await
            .unwrap();

        let updated = service
            .update(
                &f.actor(),
                other.id,
                UpdateAdminRequest {
                    password: Some("new-password".to_owned()),
                    role: Some(AdminRole::SuperAdmin),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.role, AdminRole::SuperAdmin);

        let page = f.log.query(&ActivityLogQuery::default()).await.unwrap();
        let entry = &page.entries[0];
        assert_eq!(entry.action, ActivityAction::UpdateAdmin);
        assert_eq!(entry.details["changes"], json!(["password", "role"]));
        assert!(!entry.details.to_string().contains("new-password"));

        // Two super admins now, so demoting one is allowed
        service
            .update(
                &f.actor(),
                other.id,
                UpdateAdminRequest {
                    role: Some(AdminRole::Admin),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_account() {
        let f = fixture().await;
        let service = f.service();
        let missing = AdminUserId::new(999);

        let err = service
            .update(
                &f.actor(),
                missing,
                UpdateAdminRequest {
                    role: Some(AdminRole::Admin),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AdminUserError::NotFound));

        let err = service
            .delete(&f.actor(), &f.root_session(), missing)
            .await
            .unwrap_err();
        assert!(matches!(err, AdminUserError::NotFound));

        let err = service
            .update(&f.actor(), f.root.id, UpdateAdminRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AdminUserError::NoChanges));
    }
}
