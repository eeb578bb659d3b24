//! Admin API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `SIGLIV_HOST` - Bind address (default: 127.0.0.1)
//! - `SIGLIV_PORT` - Listen port (default: 3001)
//! - `SIGLIV_BASE_URL` - Public URL; `https://` enables the `Secure` cookie flag
//! - `SIGLIV_DATABASE_URL` / `DATABASE_URL` - `PostgreSQL` connection string.
//!   When unset the server runs on the in-memory backend.
//! - `SIGLIV_CORS_ORIGIN` - Browser origin allowed to send credentials
//!   (default: `http://localhost:5173`)
//! - `SIGLIV_UPLOAD_DIR` - Root directory for uploaded files (default: `uploads`)
//! - `SIGLIV_ACTIVITY_LOG_CAPACITY` - In-memory audit ring size (default: 1000)
//! - `SIGLIV_LOGIN_RATE_LIMIT` - Enable the login limiter (default: true)
//! - `SIGLIV_SEED_CATALOG` - Seed sample products/orders (default: true in memory mode)
//! - `SIGLIV_LOG_JSON` - Emit JSON logs
//! - `ADMIN_USERNAME` / `ADMIN_PASSWORD` - Bootstrap super admin
//!   (default: `admin` / `admin12345`)
//! - `SIGLIV_HASH_MEMORY_KIB`, `SIGLIV_HASH_ITERATIONS`, `SIGLIV_HASH_PARALLELISM` -
//!   Argon2id cost parameters
//! - `SENTRY_DSN`, `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`,
//!   `SENTRY_TRACES_SAMPLE_RATE` - Error tracking

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use axum::http::HeaderValue;
use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_BASE_URL: &str = "http://localhost:3001";
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";
const DEFAULT_ADMIN_USERNAME: &str = "admin";
const DEFAULT_ADMIN_PASSWORD: &str = "admin12345";

/// Default number of audit entries kept by the in-memory backend.
pub const DEFAULT_ACTIVITY_LOG_CAPACITY: usize = 1000;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Admin API configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of the API
    pub base_url: String,
    /// `PostgreSQL` connection URL; `None` selects the in-memory backend
    pub database_url: Option<SecretString>,
    /// Origin allowed by CORS (credentials included)
    pub cors_origin: HeaderValue,
    /// Root directory for uploaded files, served under `/uploads`
    pub upload_dir: PathBuf,
    /// Ring-buffer size of the in-memory activity log
    pub activity_log_capacity: usize,
    /// Whether `POST /api/auth/login` is rate limited
    pub login_rate_limit: bool,
    /// Whether sample products and orders are seeded into an empty store
    pub seed_catalog: bool,
    /// Emit JSON-formatted logs
    pub log_json: bool,
    /// Bootstrap super admin account
    pub bootstrap_admin: BootstrapAdmin,
    /// Password hashing cost
    pub hashing: HashingConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Credentials of the super admin created when no accounts exist.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct BootstrapAdmin {
    pub username: String,
    pub password: SecretString,
}

impl std::fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl Default for BootstrapAdmin {
    fn default() -> Self {
        Self {
            username: DEFAULT_ADMIN_USERNAME.to_owned(),
            password: SecretString::from(DEFAULT_ADMIN_PASSWORD),
        }
    }
}

/// Argon2id cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashingConfig {
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Number of passes
    pub iterations: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

impl HashingConfig {
    /// Minimum-cost parameters for tests.
    #[must_use]
    pub const fn fast() -> Self {
        Self {
            memory_kib: argon2::Params::MIN_M_COST,
            iterations: 1,
            parallelism: 1,
        }
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3001,
            base_url: DEFAULT_BASE_URL.to_owned(),
            database_url: None,
            cors_origin: HeaderValue::from_static(DEFAULT_CORS_ORIGIN),
            upload_dir: PathBuf::from("uploads"),
            activity_log_capacity: DEFAULT_ACTIVITY_LOG_CAPACITY,
            login_rate_limit: true,
            seed_catalog: true,
            log_json: false,
            bootstrap_admin: BootstrapAdmin::default(),
            hashing: HashingConfig::default(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);
        let defaults = Self::default();

        let database_url = env
            .get("SIGLIV_DATABASE_URL")
            .or_else(|| env.get("DATABASE_URL"))
            .map(SecretString::from);

        let cors_origin = match env.get("SIGLIV_CORS_ORIGIN") {
            Some(origin) => HeaderValue::from_str(&origin).map_err(|e| {
                ConfigError::InvalidEnvVar("SIGLIV_CORS_ORIGIN".to_owned(), e.to_string())
            })?,
            None => defaults.cors_origin,
        };

        let activity_log_capacity =
            env.parse_or("SIGLIV_ACTIVITY_LOG_CAPACITY", defaults.activity_log_capacity)?;
        if activity_log_capacity == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "SIGLIV_ACTIVITY_LOG_CAPACITY".to_owned(),
                "must be at least 1".to_owned(),
            ));
        }

        // Sample data only makes sense by default for throwaway stores
        let seed_catalog = env.flag_or("SIGLIV_SEED_CATALOG", database_url.is_none())?;

        let bootstrap_admin = BootstrapAdmin {
            username: env
                .get("ADMIN_USERNAME")
                .unwrap_or(defaults.bootstrap_admin.username),
            password: env
                .get("ADMIN_PASSWORD")
                .map_or(defaults.bootstrap_admin.password, SecretString::from),
        };

        let hashing = HashingConfig {
            memory_kib: env.parse_or("SIGLIV_HASH_MEMORY_KIB", defaults.hashing.memory_kib)?,
            iterations: env.parse_or("SIGLIV_HASH_ITERATIONS", defaults.hashing.iterations)?,
            parallelism: env.parse_or("SIGLIV_HASH_PARALLELISM", defaults.hashing.parallelism)?,
        };

        Ok(Self {
            host: env.parse_or("SIGLIV_HOST", defaults.host)?,
            port: env.parse_or("SIGLIV_PORT", defaults.port)?,
            base_url: env.get("SIGLIV_BASE_URL").unwrap_or(defaults.base_url),
            database_url,
            cors_origin,
            upload_dir: env
                .get("SIGLIV_UPLOAD_DIR")
                .map_or(defaults.upload_dir, PathBuf::from),
            activity_log_capacity,
            login_rate_limit: env.flag_or("SIGLIV_LOGIN_RATE_LIMIT", defaults.login_rate_limit)?,
            seed_catalog,
            log_json: env.flag_or("SIGLIV_LOG_JSON", defaults.log_json)?,
            bootstrap_admin,
            hashing,
            sentry_dsn: env.get("SENTRY_DSN"),
            sentry_environment: env.get("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: env.parse_or("SENTRY_SAMPLE_RATE", defaults.sentry_sample_rate)?,
            sentry_traces_sample_rate: env.parse_or(
                "SENTRY_TRACES_SAMPLE_RATE",
                defaults.sentry_traces_sample_rate,
            )?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies must carry the `Secure` attribute.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable lookup with typed accessors.
struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Get a variable, treating blank values as unset.
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Parse a variable, falling back to `default` when unset.
    fn parse_or<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.get(key).map_or(Ok(default), |value| {
            value
                .trim()
                .parse()
                .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_owned(), e.to_string()))
        })
    }

    /// Parse a boolean flag (`true/false`, `1/0`, `yes/no`, `on/off`).
    fn flag_or(&self, key: &str, default: bool) -> Result<bool, ConfigError> {
        let Some(value) = self.get(key) else {
            return Ok(default);
        };
        match value.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            other => Err(ConfigError::InvalidEnvVar(
                key.to_owned(),
                format!("expected a boolean, got '{other}'"),
            )),
        }
    }
}
