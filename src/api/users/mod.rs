//! User Administration API
//!
//! Listing all users requires the admin role; updates require auth.

mod handler;

use axum::middleware as axum_middleware;
use axum::{Router, routing::get, routing::put};

use crate::auth::require_role;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route(
            "/api/users",
            get(handler::list).layer(axum_middleware::from_fn(require_role("admin"))),
        )
        .route("/api/users/{id}", put(handler::update))
}
