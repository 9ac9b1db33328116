//! Order API
//!
//! All order routes require auth; mutations delegate to the
//! reconciliation engine. `POST /api/orders/{id}` takes the buyer's user
//! id, the PUT/DELETE routes take an order id.

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/orders", get(handler::list))
        .route("/api/orders/buyer/{buyer}", get(handler::list_for_buyer))
        .route(
            "/api/orders/{id}",
            axum::routing::post(handler::create)
                .put(handler::update)
                .delete(handler::delete),
        )
}
