//! API Routing Module
//!
//! # Structure
//!
//! - [`health`] - liveness route
//! - [`auth`] - register, login, refresh, logout
//! - [`users`] - user administration
//! - [`products`] - product catalog CRUD
//! - [`orders`] - order placement and reconciliation

use axum::Router;
use axum::middleware as axum_middleware;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::require_auth;
use crate::core::ServerState;

pub mod auth;
pub mod health;
pub mod orders;
pub mod products;
pub mod users;

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(users::router())
        .merge(products::router())
        .merge(orders::router())
}

/// Build a fully configured application with all middleware
pub fn build_app(state: &ServerState) -> Router<ServerState> {
    build_router()
        // CORS - handle cross-origin requests
        .layer(CorsLayer::permissive())
        // Request tracing (logs at INFO level)
        .layer(TraceLayer::new_for_http())
        // Authentication gate - verifies the credential, slides the session
        // window, and injects CurrentUser before any protected route runs
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ))
}
