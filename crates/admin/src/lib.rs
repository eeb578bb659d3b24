//! Signal Living admin API library.
//!
//! Session-authenticated JSON API for the shop's back office: product and
//! order management, admin accounts with a two-level role gate, and an
//! audit trail of every privileged action. The public catalog reads live
//! here as well.
//!
//! The binary in `main.rs` wires configuration, logging and the store
//! backend; everything else is exposed as a library so the integration
//! tests can build the same router.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod seed;
pub mod services;
pub mod state;
