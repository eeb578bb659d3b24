//! Session middleware configuration.
//!
//! The cookie carries only an opaque session id; the [`AdminSession`]
//! payload lives in the store. `MemoryStore` backs in-memory deployments,
//! `PostgresStore` the database-backed ones.
//!
//! [`AdminSession`]: crate::models::AdminSession

use sqlx::PgPool;
use tower_sessions::cookie::SameSite;
use tower_sessions::cookie::time::Duration;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::AdminConfig;
use crate::models::SESSION_LIFETIME_HOURS;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "sigliv_admin_session";

/// Create the session layer over any store.
///
/// Login replaces the inactivity expiry below with an absolute one.
#[must_use]
pub fn create_session_layer<S>(store: S, config: &AdminConfig) -> SessionManagerLayer<S>
where
    S: SessionStore + Clone,
{
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(Duration::hours(SESSION_LIFETIME_HOURS)))
        .with_secure(config.is_secure())
        .with_same_site(SameSite::Strict)
        .with_http_only(true)
        .with_path("/")
}

/// `PostgreSQL` session store on `admin.session`.
///
/// The table is created by the admin migrations.
///
/// # Errors
///
/// Returns the store's message if the schema or table name is rejected.
pub fn postgres_store(pool: &PgPool) -> Result<PostgresStore, String> {
    PostgresStore::new(pool.clone())
        .with_schema_name("admin")?
        .with_table_name("session")
}
