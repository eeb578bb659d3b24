//! Signal Living CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! sigliv-cli migrate
//!
//! # Create the bootstrap super admin (and optionally sample data)
//! sigliv-cli seed --catalog
//!
//! # Create admin user
//! sigliv-cli admin create -u manager -r admin --password 'secret123'
//! ```
//!
//! All commands read `SIGLIV_DATABASE_URL` (or `DATABASE_URL`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "sigliv-cli")]
#[command(author, version, about = "Signal Living CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Create the bootstrap super admin in an empty database
    Seed {
        /// Also insert sample products and orders
        #[arg(long)]
        catalog: bool,
    },
    /// Manage admin users
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin user
    Create {
        /// Login name
        #[arg(short, long)]
        username: String,

        /// Initial password (at least 6 characters)
        #[arg(long, env = "SIGLIV_NEW_ADMIN_PASSWORD", hide_env_values = true)]
        password: String,

        /// Admin role (`super_admin`, `admin`)
        #[arg(short, long, default_value = "admin")]
        role: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { catalog } => {
            let report = commands::seed::run(catalog).await?;
            tracing::info!(
                admin_created = report.admin_created,
                products = report.products,
                orders = report.orders,
                "Seed finished"
            );
        }
        Commands::Admin { action } => match action {
            AdminAction::Create {
                username,
                password,
                role,
            } => {
                commands::admin::create_user(&username, password, &role).await?;
            }
        },
    }
    Ok(())
}
