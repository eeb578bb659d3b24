//! Audit trail recording.
//!
//! Writes are best-effort: a failing store is logged and never fails the
//! operation being audited.

use std::sync::Arc;

use chrono::{Local, Utc};
use serde_json::Value;

use signal_living_core::{ActivityAction, AdminUserId};

use crate::db::{ActivityLogStore, RepositoryError};
use crate::models::{
    ActivityLog, ActivityLogPage, ActivityLogQuery, ActivityStats, AdminSession, NewActivityLog,
    StatsWindow,
};

/// Who performed an audited action, and from where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: Option<AdminUserId>,
    pub username: String,
    pub ip_address: String,
}

impl Actor {
    /// The admin of a live session.
    #[must_use]
    pub fn admin(session: &AdminSession, ip_address: impl Into<String>) -> Self {
        Self {
            id: Some(session.id),
            username: session.username.clone(),
            ip_address: ip_address.into(),
        }
    }

    /// An account-level actor identified without a session (e.g. during login).
    #[must_use]
    pub fn account(
        id: Option<AdminUserId>,
        username: impl Into<String>,
        ip_address: impl Into<String>,
    ) -> Self {
        Self {
            id,
            username: username.into(),
            ip_address: ip_address.into(),
        }
    }
}

/// Handle to the audit trail.
#[derive(Clone)]
pub struct AuditLog {
    store: Arc<dyn ActivityLogStore>,
}

impl AuditLog {
    #[must_use]
    pub fn new(store: Arc<dyn ActivityLogStore>) -> Self {
        Self { store }
    }

    /// Append one entry, swallowing store failures.
    pub async fn record(
        &self,
        actor: &Actor,
        action: ActivityAction,
        target: Option<String>,
        details: Value,
    ) {
        let entry = NewActivityLog {
            admin_id: actor.id,
            admin_username: actor.username.clone(),
            action,
            target,
            details,
            timestamp: Utc::now(),
            ip_address: actor.ip_address.clone(),
        };

        if let Err(e) = self.store.append(entry).await {
            tracing::warn!(
                error = %e,
                action = %action,
                admin = %actor.username,
                "Failed to write audit entry"
            );
        }
    }

    /// Filtered page of entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails.
    pub async fn query(&self, query: &ActivityLogQuery) -> Result<ActivityLogPage, RepositoryError> {
        self.store.query(query).await
    }

    /// Totals for today (server-local midnight), the trailing week, and per action.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails.
    pub async fn stats(&self) -> Result<ActivityStats, RepositoryError> {
        self.store.stats(StatsWindow::at(Utc::now(), &Local)).await
    }

    /// Newest entries of one admin.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store fails.
    pub async fn recent_by_admin(
        &self,
        admin_id: AdminUserId,
        limit: u32,
    ) -> Result<Vec<ActivityLog>, RepositoryError> {
        self.store.recent_by_admin(admin_id, limit).await
    }
}
