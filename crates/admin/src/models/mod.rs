//! Domain models for the admin API.
//!
//! Request bodies are deserialized into `*Request` types and validated once
//! into domain values before any store call.

pub mod activity_log;
pub mod admin_user;
pub mod order;
pub mod product;
pub mod session;

pub use activity_log::{
    ActivityLog, ActivityLogPage, ActivityLogParams, ActivityLogQuery, ActivityStats,
    NewActivityLog, StatsWindow,
};
pub use admin_user::{
    AdminCredentials, AdminUser, AdminUserChanges, CreateAdminRequest, NewAdminUser,
    UpdateAdminRequest,
};
pub use order::{NewOrder, Order, OrderItem, OrderSummary};
pub use product::{Product, ProductDraft, ProductError, ProductFilter, ProductRequest};
pub use session::{AdminSession, SESSION_LIFETIME_HOURS, SessionUser, session_keys};
