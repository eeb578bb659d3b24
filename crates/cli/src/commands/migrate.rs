//! Database migration command.
//!
//! ```bash
//! sigliv-cli migrate
//! ```
//!
//! Migrations live in `crates/admin/migrations/` and create the `admin`
//! schema: accounts, products, orders, the activity log and sessions.

use super::{CommandError, connect};

/// Run all pending migrations.
pub async fn run() -> Result<(), CommandError> {
    let (_config, pool) = connect().await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../admin/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
