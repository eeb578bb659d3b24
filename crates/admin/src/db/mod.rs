//! Storage for admin accounts, catalog, orders and the audit trail.
//!
//! Handlers talk to the store through four repository traits so the same
//! code runs against either backend:
//!
//! - [`memory`] - `RwLock`-guarded collections; the activity log is a bounded
//!   ring buffer. Used when no database URL is configured, and by tests.
//! - [`postgres`] - `PostgreSQL` via sqlx. Tables live in the `admin` schema.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/admin/migrations/` and run via:
//! ```bash
//! cargo run -p signal-living-cli -- migrate
//! ```

pub mod memory;
pub mod postgres;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use signal_living_core::{AdminRole, AdminUserId, OrderId, OrderStatus, ProductId};

use crate::models::{
    ActivityLog, ActivityLogPage, ActivityLogQuery, ActivityStats, AdminCredentials, AdminUser,
    AdminUserChanges, NewActivityLog, NewAdminUser, NewOrder, Order, OrderSummary, Product,
    ProductDraft, ProductFilter, StatsWindow,
};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique username).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// The change would leave no `super_admin` account.
    #[error("at least one super admin must remain")]
    LastSuperAdmin,
}

/// Admin account storage.
#[async_trait]
pub trait AdminUserStore: Send + Sync {
    /// All accounts, newest first.
    async fn list(&self) -> Result<Vec<AdminUser>, RepositoryError>;

    async fn get_by_id(&self, id: AdminUserId) -> Result<Option<AdminUser>, RepositoryError>;

    /// Account and stored hash by exact (case-sensitive) username.
    async fn get_credentials(
        &self,
        username: &str,
    ) -> Result<Option<AdminCredentials>, RepositoryError>;

    /// Insert an account. Duplicate usernames are `Conflict`.
    async fn create(&self, new: NewAdminUser) -> Result<AdminUser, RepositoryError>;

    /// Apply a partial update. Missing accounts are `NotFound`.
    ///
    /// Demoting the only `super_admin` is `LastSuperAdmin`; the check and
    /// the write are one atomic step.
    async fn update(
        &self,
        id: AdminUserId,
        changes: AdminUserChanges,
    ) -> Result<AdminUser, RepositoryError>;

    /// Remove an account. Missing accounts are `NotFound`.
    ///
    /// Removing the only `super_admin` is `LastSuperAdmin`; the check and
    /// the write are one atomic step.
    async fn delete(&self, id: AdminUserId) -> Result<AdminUser, RepositoryError>;

    async fn count(&self) -> Result<u64, RepositoryError>;

    async fn count_by_role(&self, role: AdminRole) -> Result<u64, RepositoryError>;

    async fn record_login(&self, id: AdminUserId, at: DateTime<Utc>)
    -> Result<(), RepositoryError>;
}

/// Catalog storage.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Matching products, newest first.
    async fn list(&self, filter: ProductFilter) -> Result<Vec<Product>, RepositoryError>;

    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    async fn create(&self, draft: ProductDraft) -> Result<Product, RepositoryError>;

    /// Replace all editable fields. Missing products are `NotFound`.
    async fn update(&self, id: ProductId, draft: ProductDraft)
    -> Result<Product, RepositoryError>;

    /// Remove and return a product. Missing products are `NotFound`.
    async fn delete(&self, id: ProductId) -> Result<Product, RepositoryError>;

    async fn count(&self) -> Result<u64, RepositoryError>;
}

/// Order storage.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// All orders, newest first.
    async fn list(&self) -> Result<Vec<Order>, RepositoryError>;

    async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError>;

    /// Insert an order. Duplicate order numbers are `Conflict`.
    async fn create(&self, new: NewOrder) -> Result<Order, RepositoryError>;

    /// Set the status, returning the updated order and the previous status.
    async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<(Order, OrderStatus), RepositoryError>;

    async fn summary(&self) -> Result<OrderSummary, RepositoryError>;
}

/// Append-only audit trail.
#[async_trait]
pub trait ActivityLogStore: Send + Sync {
    async fn append(&self, entry: NewActivityLog) -> Result<ActivityLog, RepositoryError>;

    /// Filtered page, newest first; ties broken by id.
    async fn query(&self, query: &ActivityLogQuery) -> Result<ActivityLogPage, RepositoryError>;

    async fn stats(&self, window: StatsWindow) -> Result<ActivityStats, RepositoryError>;

    /// Newest entries of one admin.
    async fn recent_by_admin(
        &self,
        admin_id: AdminUserId,
        limit: u32,
    ) -> Result<Vec<ActivityLog>, RepositoryError>;
}

/// The store set owned by the application.
#[derive(Clone)]
pub struct Repositories {
    pub admin_users: Arc<dyn AdminUserStore>,
    pub products: Arc<dyn ProductStore>,
    pub orders: Arc<dyn OrderStore>,
    pub activity_logs: Arc<dyn ActivityLogStore>,
    pool: Option<PgPool>,
}

impl Repositories {
    /// Fresh in-memory stores.
    #[must_use]
    pub fn in_memory(activity_log_capacity: usize) -> Self {
        Self {
            admin_users: Arc::new(memory::MemoryAdminUsers::default()),
            products: Arc::new(memory::MemoryProducts::default()),
            orders: Arc::new(memory::MemoryOrders::default()),
            activity_logs: Arc::new(memory::MemoryActivityLog::new(activity_log_capacity)),
            pool: None,
        }
    }

    /// Stores backed by `PostgreSQL`.
    #[must_use]
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            admin_users: Arc::new(postgres::PgAdminUsers::new(pool.clone())),
            products: Arc::new(postgres::PgProducts::new(pool.clone())),
            orders: Arc::new(postgres::PgOrders::new(pool.clone())),
            activity_logs: Arc::new(postgres::PgActivityLog::new(pool.clone())),
            pool: Some(pool),
        }
    }

    /// The connection pool, if database-backed.
    #[must_use]
    pub const fn pool(&self) -> Option<&PgPool> {
        self.pool.as_ref()
    }

    /// Check that the backing store answers.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the database is unreachable.
    pub async fn ping(&self) -> Result<(), RepositoryError> {
        if let Some(pool) = &self.pool {
            sqlx::query("SELECT 1").execute(pool).await?;
        }
        Ok(())
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
