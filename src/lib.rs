//! Storefront Server
//!
//! CRUD storefront backend: product catalog, order placement, user
//! accounts, and token-based authentication.
//!
//! # Module structure
//!
//! ```text
//! src/
//! ├── core/       # configuration, state, HTTP server
//! ├── common/     # errors, response envelope, logging
//! ├── db/         # SQLite pool and models
//! ├── inventory/  # stock ledger (reserve/release)
//! ├── orders/     # line-item reconciliation engine
//! ├── auth/       # JWT credentials, sessions, auth gate
//! └── api/        # HTTP routes and handlers
//! ```
//!
//! The two load-bearing subsystems are order reconciliation
//! ([`orders`] + [`inventory`]) and sliding-window session
//! authentication ([`auth`]); everything else is request/response
//! plumbing around them.

pub mod api;
pub mod auth;
pub mod common;
pub mod core;
pub mod db;
pub mod inventory;
pub mod orders;

// Re-export public types
pub use auth::{CurrentUser, SessionStore, TokenService};
pub use common::{AppError, AppResponse, AppResult};
pub use core::{Config, Server, ServerState};
pub use orders::OrderEngine;

// Re-export logger setup
pub use common::logger::init_logger;
