//! Product Catalog Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use validator::Validate;

use crate::common::{AppError, AppResponse, AppResult, ok, ok_with_message};
use crate::core::ServerState;
use crate::db::models::{Product, ProductCreate, ProductUpdate};

/// GET /api/products - list the catalog (public)
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<AppResponse<Vec<Product>>>> {
    let products = sqlx::query_as::<_, Product>("SELECT * FROM products ORDER BY id")
        .fetch_all(state.db.pool())
        .await?;

    Ok(ok(products))
}

/// GET /api/products/{id} - fetch one product
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<AppResponse<Product>>> {
    let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ?")
        .bind(id)
        .fetch_optional(state.db.pool())
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product {id} not found")))?;

    Ok(ok(product))
}

/// POST /api/products - create a product
pub async fn create(
    State(state): State<ServerState>,
    Json(req): Json<ProductCreate>,
) -> AppResult<(StatusCode, Json<AppResponse<Product>>)> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let existing = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE name = ?")
        .bind(&req.name)
        .fetch_optional(state.db.pool())
        .await?;
    if existing.is_some() {
        return Err(AppError::conflict(format!(
            "Product {} already exists",
            req.name
        )));
    }

    let created_at = Utc::now().timestamp_millis();
    let id = sqlx::query("INSERT INTO products (name, price, amount, created_at) VALUES (?, ?, ?, ?)")
        .bind(&req.name)
        .bind(req.price)
        .bind(req.amount)
        .bind(created_at)
        .execute(state.db.pool())
        .await?
        .last_insert_rowid();

    let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ?")
        .bind(id)
        .fetch_one(state.db.pool())
        .await?;

    tracing::info!(product_id = id, name = %product.name, "Product created");
    Ok((
        StatusCode::CREATED,
        ok_with_message(product, "Successfully created product"),
    ))
}

/// PUT /api/products/{id} - partial update (restocking included)
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(req): Json<ProductUpdate>,
) -> AppResult<Json<AppResponse<Product>>> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let mut product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ?")
        .bind(id)
        .fetch_optional(state.db.pool())
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product {id} not found")))?;

    if let Some(name) = req.name {
        product.name = name;
    }
    if let Some(price) = req.price {
        product.price = price;
    }
    if let Some(amount) = req.amount {
        product.amount = amount;
    }

    sqlx::query("UPDATE products SET name = ?, price = ?, amount = ? WHERE id = ?")
        .bind(&product.name)
        .bind(product.price)
        .bind(product.amount)
        .bind(id)
        .execute(state.db.pool())
        .await?;

    tracing::info!(product_id = id, "Product updated");
    Ok(ok_with_message(product, "Updated product successfully"))
}

/// DELETE /api/products/{id} - remove a product
///
/// Orders referencing the product by name keep their lines; any later
/// reconciliation touching such a line fails with `NotFound`.
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<AppResponse<()>>> {
    let result = sqlx::query("DELETE FROM products WHERE id = ?")
        .bind(id)
        .execute(state.db.pool())
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found(format!("Product {id} not found")));
    }

    tracing::info!(product_id = id, "Product deleted");
    Ok(ok_with_message((), "Product has been deleted"))
}
