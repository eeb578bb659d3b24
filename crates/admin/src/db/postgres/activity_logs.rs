//! Audit trail repository.
//!
//! Unlike the in-memory ring, the table is not capped; retention is left to
//! the database operator.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use signal_living_core::{ActivityAction, ActivityLogId, AdminUserId};

use super::to_count;
use crate::db::{ActivityLogStore, RepositoryError};
use crate::models::{
    ActivityLog, ActivityLogPage, ActivityLogQuery, ActivityStats, NewActivityLog, StatsWindow,
};

const COLUMNS: &str =
    "id, admin_id, admin_username, action, target, details, occurred_at, ip_address";

#[derive(Debug, sqlx::FromRow)]
struct ActivityLogRow {
    id: i32,
    admin_id: Option<i32>,
    admin_username: String,
    action: ActivityAction,
    target: Option<String>,
    details: serde_json::Value,
    occurred_at: DateTime<Utc>,
    ip_address: String,
}

impl From<ActivityLogRow> for ActivityLog {
    fn from(row: ActivityLogRow) -> Self {
        Self {
            id: ActivityLogId::new(row.id),
            admin_id: row.admin_id.map(AdminUserId::new),
            admin_username: row.admin_username,
            action: row.action,
            target: row.target,
            details: row.details,
            timestamp: row.occurred_at,
            ip_address: row.ip_address,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct WindowCounts {
    total: i64,
    today: i64,
    this_week: i64,
}

/// Append the `WHERE` clause shared by the count and page queries.
fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &ActivityLogQuery) {
    builder.push(" WHERE TRUE");
    if let Some(admin_id) = query.admin_id {
        builder.push(" AND admin_id = ").push_bind(admin_id);
    }
    if let Some(action) = query.action {
        builder.push(" AND action = ").push_bind(action);
    }
    if let Some(start) = query.start {
        builder.push(" AND occurred_at >= ").push_bind(start);
    }
    if let Some(end) = query.end {
        builder.push(" AND occurred_at <= ").push_bind(end);
    }
}

/// Audit entries in `admin.activity_log`.
pub struct PgActivityLog {
    pool: PgPool,
}

impl PgActivityLog {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActivityLogStore for PgActivityLog {
    async fn append(&self, entry: NewActivityLog) -> Result<ActivityLog, RepositoryError> {
        let row = sqlx::query_as::<_, ActivityLogRow>(&format!(
            "INSERT INTO admin.activity_log
                 (admin_id, admin_username, action, target, details, occurred_at, ip_address)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        ))
        .bind(entry.admin_id)
        .bind(&entry.admin_username)
        .bind(entry.action)
        .bind(entry.target.as_deref())
        .bind(&entry.details)
        .bind(entry.timestamp)
        .bind(&entry.ip_address)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn query(&self, query: &ActivityLogQuery) -> Result<ActivityLogPage, RepositoryError> {
        let mut count_builder = QueryBuilder::new("SELECT COUNT(*) FROM admin.activity_log");
        push_filters(&mut count_builder, query);
        let total: i64 = count_builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut builder = QueryBuilder::new(format!("SELECT {COLUMNS} FROM admin.activity_log"));
        push_filters(&mut builder, query);
        builder
            .push(" ORDER BY occurred_at DESC, id DESC LIMIT ")
            .push_bind(i64::from(query.limit))
            .push(" OFFSET ")
            .push_bind(i64::try_from(query.offset()).unwrap_or(i64::MAX));

        let rows = builder
            .build_query_as::<ActivityLogRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(ActivityLogPage::new(
            rows.into_iter().map(Into::into).collect(),
            to_count(total)?,
            query,
        ))
    }

    async fn stats(&self, window: StatsWindow) -> Result<ActivityStats, RepositoryError> {
        let counts = sqlx::query_as::<_, WindowCounts>(
            "SELECT COUNT(*) AS total,
                    COUNT(*) FILTER (WHERE occurred_at >= $1) AS today,
                    COUNT(*) FILTER (WHERE occurred_at >= $2) AS this_week
             FROM admin.activity_log",
        )
        .bind(window.today_start)
        .bind(window.week_start)
        .fetch_one(&self.pool)
        .await?;

        let grouped: Vec<(ActivityAction, i64)> = sqlx::query_as(
            "SELECT action, COUNT(*) FROM admin.activity_log GROUP BY action",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut by_action = BTreeMap::new();
        for (action, count) in grouped {
            by_action.insert(action, to_count(count)?);
        }

        Ok(ActivityStats {
            total: to_count(counts.total)?,
            today: to_count(counts.today)?,
            this_week: to_count(counts.this_week)?,
            by_action,
        })
    }

    async fn recent_by_admin(
        &self,
        admin_id: AdminUserId,
        limit: u32,
    ) -> Result<Vec<ActivityLog>, RepositoryError> {
        let rows = sqlx::query_as::<_, ActivityLogRow>(&format!(
            "SELECT {COLUMNS} FROM admin.activity_log
             WHERE admin_id = $1
             ORDER BY occurred_at DESC, id DESC
             LIMIT $2"
        ))
        .bind(admin_id)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
