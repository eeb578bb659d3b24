//! Seed the database.
//!
//! ```bash
//! # Bootstrap super admin only (from ADMIN_USERNAME / ADMIN_PASSWORD)
//! sigliv-cli seed
//!
//! # Also insert the sample catalog and orders
//! sigliv-cli seed --catalog
//! ```

use signal_living_admin::seed::{self, SeedReport};

use super::{CommandError, connect_state};

/// Seed an empty database.
pub async fn run(catalog: bool) -> Result<SeedReport, CommandError> {
    let state = connect_state().await?;

    let mut config = state.config().clone();
    config.seed_catalog |= catalog;

    Ok(seed::run(state.repos(), state.hasher(), &config).await?)
}
