//! Business logic services for the admin API.
//!
//! # Services
//!
//! - `admin_users` - Account management with the `super_admin` invariants
//! - `audit` - Best-effort audit trail writes and queries
//! - `auth` - Password login, session issue and logout
//! - `password` - Argon2id hashing
//! - `upload` - Product image storage

pub mod admin_users;
pub mod audit;
pub mod auth;
pub mod password;
pub mod upload;

pub use admin_users::{AdminUserError, AdminUserService};
pub use audit::{Actor, AuditLog};
pub use auth::{AuthError, AuthService};
pub use password::{PasswordError, PasswordHasher};
