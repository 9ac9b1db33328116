//! Inventory Ledger
//!
//! Atomic reserve/release of product stock. Every operation runs on the
//! caller's connection so that ledger changes commit or roll back together
//! with the order mutation that triggered them.
//!
//! The stock check is a conditional `UPDATE ... WHERE amount - delta >= 0`,
//! so two concurrent reservations against the same product can never both
//! pass the check and oversell, regardless of interleaving.

use sqlx::SqliteConnection;

use crate::common::{AppError, AppResult};
use crate::db::models::Product;

/// Resolve a product by name (case-sensitive exact match)
///
/// Orders reference products by name, not by foreign key, so every
/// line-item operation re-resolves the product through this lookup and
/// fails with `NotFound` if it no longer exists.
pub async fn lookup(conn: &mut SqliteConnection, name: &str) -> AppResult<Product> {
    let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE name = ?")
        .bind(name)
        .fetch_optional(conn)
        .await?;

    product.ok_or_else(|| AppError::not_found(format!("Product {name} not found")))
}

/// Apply a net stock adjustment: `available -= delta`
///
/// A positive delta reserves stock, a negative delta releases it, in one
/// step. Fails with `InsufficientStock` when the product cannot cover the
/// decrement, and with `NotFound` when the product does not exist. On
/// failure the row is untouched.
pub async fn adjust(conn: &mut SqliteConnection, name: &str, delta: i64) -> AppResult<()> {
    if delta == 0 {
        // Still require the product to exist
        lookup(conn, name).await?;
        return Ok(());
    }

    let result = sqlx::query("UPDATE products SET amount = amount - ?1 WHERE name = ?2 AND amount - ?1 >= 0")
        .bind(delta)
        .bind(name)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        // Either the product is gone or the stock cannot cover the delta
        lookup(conn, name).await?;
        return Err(AppError::insufficient_stock(name));
    }

    Ok(())
}

/// Reserve `qty` units of a product, failing with `InsufficientStock` if
/// fewer than `qty` units are available
pub async fn reserve(conn: &mut SqliteConnection, name: &str, qty: i64) -> AppResult<()> {
    adjust(conn, name, qty).await
}

/// Release `qty` units back to a product's available stock
///
/// Used on order cancellation or line reduction.
pub async fn release(conn: &mut SqliteConnection, name: &str, qty: i64) -> AppResult<()> {
    adjust(conn, name, -qty).await
}
