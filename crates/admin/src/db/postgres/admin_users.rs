//! Admin account repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use signal_living_core::{AdminRole, AdminUserId, Username};

use super::{conflict_or_database, to_count};
use crate::db::{AdminUserStore, RepositoryError};
use crate::models::{AdminCredentials, AdminUser, AdminUserChanges, NewAdminUser};

const COLUMNS: &str = "id, username, password_hash, role, last_login, created_at";

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for `PostgreSQL` admin user queries.
#[derive(Debug, sqlx::FromRow)]
struct AdminUserRow {
    id: i32,
    username: String,
    password_hash: String,
    role: AdminRole,
    last_login: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<AdminUserRow> for AdminCredentials {
    type Error = RepositoryError;

    fn try_from(row: AdminUserRow) -> Result<Self, Self::Error> {
        let username = Username::parse(&row.username).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid username in database: {e}"))
        })?;

        Ok(Self {
            user: AdminUser {
                id: AdminUserId::new(row.id),
                username,
                role: row.role,
                last_login: row.last_login,
                created_at: row.created_at,
            },
            password_hash: row.password_hash,
        })
    }
}

fn into_user(row: AdminUserRow) -> Result<AdminUser, RepositoryError> {
    AdminCredentials::try_from(row).map(|c| c.user)
}

/// Lock every `super_admin` row for the rest of the transaction and fail if
/// `id` is the only one. Concurrent removals queue on the same rows, so the
/// second one sees the first one's result.
async fn ensure_other_super_admin(
    conn: &mut PgConnection,
    id: AdminUserId,
) -> Result<(), RepositoryError> {
    let super_admins: Vec<i32> =
        sqlx::query_scalar("SELECT id FROM admin.admin_user WHERE role = $1 FOR UPDATE")
            .bind(AdminRole::SuperAdmin)
            .fetch_all(&mut *conn)
            .await?;

    if super_admins.len() <= 1 && super_admins.contains(&id.as_i32()) {
        return Err(RepositoryError::LastSuperAdmin);
    }
    Ok(())
}

// =============================================================================
// Repository
// =============================================================================

/// Admin accounts in `admin.admin_user`.
pub struct PgAdminUsers {
    pool: PgPool,
}

impl PgAdminUsers {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AdminUserStore for PgAdminUsers {
    async fn list(&self) -> Result<Vec<AdminUser>, RepositoryError> {
        let rows = sqlx::query_as::<_, AdminUserRow>(&format!(
            "SELECT {COLUMNS} FROM admin.admin_user ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(into_user).collect()
    }

    async fn get_by_id(&self, id: AdminUserId) -> Result<Option<AdminUser>, RepositoryError> {
        let row = sqlx::query_as::<_, AdminUserRow>(&format!(
            "SELECT {COLUMNS} FROM admin.admin_user WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(into_user).transpose()
    }

    async fn get_credentials(
        &self,
        username: &str,
    ) -> Result<Option<AdminCredentials>, RepositoryError> {
        let row = sqlx::query_as::<_, AdminUserRow>(&format!(
            "SELECT {COLUMNS} FROM admin.admin_user WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn create(&self, new: NewAdminUser) -> Result<AdminUser, RepositoryError> {
        let row = sqlx::query_as::<_, AdminUserRow>(&format!(
            "INSERT INTO admin.admin_user (username, password_hash, role)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        ))
        .bind(new.username.as_str())
        .bind(&new.password_hash)
        .bind(new.role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_or_database(e, "username"))?;

        into_user(row)
    }

    async fn update(
        &self,
        id: AdminUserId,
        changes: AdminUserChanges,
    ) -> Result<AdminUser, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        if changes.role.is_some_and(|role| role != AdminRole::SuperAdmin) {
            ensure_other_super_admin(&mut tx, id).await?;
        }

        let row = sqlx::query_as::<_, AdminUserRow>(&format!(
            "UPDATE admin.admin_user
             SET username = COALESCE($2, username),
                 password_hash = COALESCE($3, password_hash),
                 role = COALESCE($4, role),
                 updated_at = now()
             WHERE id = $1
             RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(changes.username.as_ref().map(Username::as_str))
        .bind(changes.password_hash.as_deref())
        .bind(changes.role)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| conflict_or_database(e, "username"))?
        .ok_or(RepositoryError::NotFound)?;
        tx.commit().await?;

        into_user(row)
    }

    async fn delete(&self, id: AdminUserId) -> Result<AdminUser, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        ensure_other_super_admin(&mut tx, id).await?;

        let row = sqlx::query_as::<_, AdminUserRow>(&format!(
            "DELETE FROM admin.admin_user WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;
        tx.commit().await?;

        into_user(row)
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admin.admin_user")
            .fetch_one(&self.pool)
            .await?;
        to_count(count)
    }

    async fn count_by_role(&self, role: AdminRole) -> Result<u64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admin.admin_user WHERE role = $1")
            .bind(role)
            .fetch_one(&self.pool)
            .await?;
        to_count(count)
    }

    async fn record_login(
        &self,
        id: AdminUserId,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE admin.admin_user SET last_login = $2 WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
