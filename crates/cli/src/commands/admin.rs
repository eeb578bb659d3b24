//! Admin account commands.
//!
//! ```bash
//! sigliv-cli admin create -u manager -r admin --password 'secret123'
//! SIGLIV_NEW_ADMIN_PASSWORD='secret123' sigliv-cli admin create -u manager
//! ```
//!
//! The account is recorded in the activity log with `cli` as the actor.

use signal_living_admin::models::{AdminUser, CreateAdminRequest};
use signal_living_admin::services::Actor;
use signal_living_core::AdminRole;

use super::{CommandError, connect_state};

/// Actor name recorded for CLI-made changes.
const CLI_ACTOR: &str = "cli";

/// Create an admin account.
pub async fn create_user(
    username: &str,
    password: String,
    role: &str,
) -> Result<AdminUser, CommandError> {
    let role: AdminRole = role
        .parse()
        .map_err(|_| CommandError::InvalidRole(role.to_owned()))?;

    let state = connect_state().await?;
    let actor = Actor::account(None, CLI_ACTOR, "127.0.0.1");

    tracing::info!("Creating admin user: {} ({})", username, role);
    let user = state
        .admin_users()
        .create(
            &actor,
            CreateAdminRequest {
                username: username.to_owned(),
                password,
                role,
            },
        )
        .await?;

    tracing::info!(
        "Admin user created successfully! ID: {}, Username: {}, Role: {}",
        user.id,
        user.username,
        user.role
    );
    Ok(user)
}
