//! HTTP middleware stack for the API.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, transactions)
//! 2. `TraceLayer` (request span with status and latency)
//! 3. CORS (single configured origin, credentials allowed)
//! 4. Session layer (tower-sessions, memory or `PostgreSQL` store)
//! 5. Login rate limiter (`POST /api/auth/login` only)
//! 6. Authorization gate extractors in handlers

pub mod auth;
pub mod client_ip;
pub mod rate_limit;
pub mod session;

pub use auth::{RequireAdminAuth, RequireSuperAdmin};
pub use client_ip::ClientIp;
pub use rate_limit::{json_rate_limit_response, login_rate_limiter};
pub use session::{SESSION_COOKIE_NAME, create_session_layer, postgres_store};
