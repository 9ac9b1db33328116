//! Order Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::common::{AppError, AppResponse, AppResult, ok, ok_with_message};
use crate::core::ServerState;
use crate::db::models::{ItemRequest, OrderView, User};

#[derive(Debug, Deserialize)]
pub struct OrderRequest {
    pub items: Vec<ItemRequest>,
}

/// GET /api/orders - list all orders with their items
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<AppResponse<Vec<OrderView>>>> {
    let orders = state.orders().list_orders().await?;
    Ok(ok(orders))
}

/// GET /api/orders/buyer/{buyer} - list one buyer's orders
pub async fn list_for_buyer(
    State(state): State<ServerState>,
    Path(buyer): Path<String>,
) -> AppResult<Json<AppResponse<Vec<OrderView>>>> {
    let orders = state.orders().orders_for_buyer(&buyer).await?;
    Ok(ok(orders))
}

/// POST /api/orders/{id} - place an order for the buyer with that user id
pub async fn create(
    State(state): State<ServerState>,
    Path(buyer): Path<String>,
    Json(req): Json<OrderRequest>,
) -> AppResult<(StatusCode, Json<AppResponse<OrderView>>)> {
    // The buyer path segment must resolve to an existing user
    let user_id: i64 = buyer
        .parse()
        .map_err(|_| AppError::validation("Invalid buyer"))?;
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(state.db.pool())
        .await?
        .ok_or_else(|| AppError::validation("Invalid buyer"))?;

    let order = state.orders().create_order(&buyer, &req.items).await?;
    Ok((
        StatusCode::CREATED,
        ok_with_message(order, "Order placed successfully"),
    ))
}

/// PUT /api/orders/{id} - reconcile an order against a requested item set
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(req): Json<OrderRequest>,
) -> AppResult<Json<AppResponse<OrderView>>> {
    let order = state.orders().update_order(id, &req.items).await?;
    Ok(ok_with_message(order, "Order has been successfully updated"))
}

/// DELETE /api/orders/{id} - remove an order, returning stock to inventory
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<AppResponse<()>>> {
    state.orders().delete_order(id).await?;
    Ok(ok_with_message((), "Order has been successfully deleted"))
}
