//! Signal Living Core - Shared domain types.
//!
//! This crate provides the types used across the Signal Living components:
//! - `admin` - The `/api` server (catalog reads, admin back-office, auth)
//! - `cli` - Command-line tools for migrations, seeding and account management
//!
//! # Architecture
//!
//! The core crate contains only types and parsing rules - no I/O, no database
//! access, no HTTP. Database encode/decode impls are behind the `postgres`
//! feature.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, enumerations, and validated newtypes

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
