//! Authentication API
//!
//! - `/api/auth/register`, `/api/auth/login`, `/api/auth/refresh`: public
//! - `/api/auth/logout`: protected (requires auth)

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/auth/register", post(handler::register))
        .route("/api/auth/login", post(handler::login))
        .route("/api/auth/refresh", post(handler::refresh))
        .route("/api/auth/logout", post(handler::logout))
}
