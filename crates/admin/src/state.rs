//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::AdminConfig;
use crate::db::Repositories;
use crate::services::{AdminUserService, AuditLog, AuthService, PasswordHasher};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    repos: Repositories,
    hasher: PasswordHasher,
    audit: AuditLog,
}

impl AppState {
    #[must_use]
    pub fn new(config: AdminConfig, repos: Repositories, hasher: PasswordHasher) -> Self {
        let audit = AuditLog::new(repos.activity_logs.clone());
        Self {
            inner: Arc::new(AppStateInner {
                config,
                repos,
                hasher,
                audit,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn repos(&self) -> &Repositories {
        &self.inner.repos
    }

    #[must_use]
    pub fn hasher(&self) -> &PasswordHasher {
        &self.inner.hasher
    }

    #[must_use]
    pub fn audit(&self) -> &AuditLog {
        &self.inner.audit
    }

    #[must_use]
    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(
            self.inner.repos.admin_users.as_ref(),
            &self.inner.hasher,
            &self.inner.audit,
        )
    }

    #[must_use]
    pub fn admin_users(&self) -> AdminUserService<'_> {
        AdminUserService::new(
            self.inner.repos.admin_users.as_ref(),
            &self.inner.hasher,
            &self.inner.audit,
        )
    }
}
