//! CLI command implementations.

pub mod admin;
pub mod migrate;
pub mod seed;

use signal_living_admin::config::AdminConfig;
use signal_living_admin::db::{self, Repositories};
use signal_living_admin::services::{PasswordError, PasswordHasher};
use signal_living_admin::state::AppState;
use sqlx::PgPool;
use thiserror::Error;

/// Errors shared by the database-backed commands.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] signal_living_admin::config::ConfigError),

    #[error("Missing environment variable: SIGLIV_DATABASE_URL (or DATABASE_URL)")]
    MissingDatabaseUrl,

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Password hashing error: {0}")]
    Hashing(#[from] PasswordError),

    #[error("{0}")]
    Seed(#[from] signal_living_admin::seed::SeedError),

    #[error("{0}")]
    AdminUser(#[from] signal_living_admin::services::AdminUserError),

    #[error("Invalid role: {0}. Valid roles: super_admin, admin")]
    InvalidRole(String),
}

/// Load configuration and connect to the configured database.
async fn connect() -> Result<(AdminConfig, PgPool), CommandError> {
    let config = AdminConfig::from_env()?;
    let database_url = config
        .database_url
        .as_ref()
        .ok_or(CommandError::MissingDatabaseUrl)?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(database_url).await?;
    Ok((config, pool))
}

/// Application state over the configured database.
async fn connect_state() -> Result<AppState, CommandError> {
    let (config, pool) = connect().await?;
    let hasher = PasswordHasher::new(config.hashing)?;
    Ok(AppState::new(config, Repositories::postgres(pool), hasher))
}
