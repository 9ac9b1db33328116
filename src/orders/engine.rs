//! Order Reconciliation Engine
//!
//! Applies reconciliation plans against the inventory ledger and persists
//! the resulting item set and total price. Every public operation runs in
//! a single transaction: the first failing line aborts the whole mutation
//! and rolls back any ledger change already applied.

use chrono::Utc;
use sqlx::{Sqlite, Transaction};

use crate::common::{AppError, AppResult};
use crate::db::DbService;
use crate::db::models::{ItemRequest, Order, OrderItem, OrderView};
use crate::inventory;
use crate::orders::reconcile::{self, ReconcilePlan};

/// Order engine — owns all order mutations
#[derive(Clone)]
pub struct OrderEngine {
    db: DbService,
}

impl OrderEngine {
    pub fn new(db: DbService) -> Self {
        Self { db }
    }

    /// List all orders with their items
    pub async fn list_orders(&self) -> AppResult<Vec<OrderView>> {
        let orders = sqlx::query_as::<_, Order>("SELECT * FROM orders ORDER BY id")
            .fetch_all(self.db.pool())
            .await?;

        let mut views = Vec::with_capacity(orders.len());
        for order in orders {
            let items = self.fetch_items(order.id).await?;
            views.push(OrderView::from_parts(order, items));
        }
        Ok(views)
    }

    /// List all orders placed by one buyer
    pub async fn orders_for_buyer(&self, buyer: &str) -> AppResult<Vec<OrderView>> {
        let orders = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE buyer = ? ORDER BY id")
            .bind(buyer)
            .fetch_all(self.db.pool())
            .await?;

        let mut views = Vec::with_capacity(orders.len());
        for order in orders {
            let items = self.fetch_items(order.id).await?;
            views.push(OrderView::from_parts(order, items));
        }
        Ok(views)
    }

    /// Fetch one order with its items
    pub async fn get_order(&self, order_id: i64) -> AppResult<OrderView> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ?")
            .bind(order_id)
            .fetch_optional(self.db.pool())
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order {order_id} not found")))?;

        let items = self.fetch_items(order.id).await?;
        Ok(OrderView::from_parts(order, items))
    }

    /// Create an order for a buyer
    ///
    /// Every requested line is a pure reservation; any failing line aborts
    /// the whole order — no partial orders are ever created.
    pub async fn create_order(&self, buyer: &str, lines: &[ItemRequest]) -> AppResult<OrderView> {
        validate_lines(lines)?;

        let mut tx = self.db.pool().begin().await?;

        let created_at = Utc::now().timestamp_millis();
        let order_id = sqlx::query("INSERT INTO orders (buyer, total_price, created_at) VALUES (?, 0, ?)")
            .bind(buyer)
            .bind(created_at)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();

        let plan = reconcile::plan(&[], lines);
        let total = self.apply_plan(&mut tx, order_id, &plan).await?;

        sqlx::query("UPDATE orders SET total_price = ? WHERE id = ?")
            .bind(total)
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(order_id, buyer, total, "Order created");
        self.get_order(order_id).await
    }

    /// Reconcile an order's items against a requested set
    ///
    /// Products omitted from the request are carried over unchanged (see
    /// [`reconcile::CarriedLine`]); requested lines reserve the increase or
    /// release the decrease in one ledger step. Total price is recomputed
    /// over the full reconciled set.
    pub async fn update_order(&self, order_id: i64, lines: &[ItemRequest]) -> AppResult<OrderView> {
        validate_lines(lines)?;

        let mut tx = self.db.pool().begin().await?;

        sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ?")
            .bind(order_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order {order_id} not found")))?;

        let current: Vec<ItemRequest> = sqlx::query_as::<_, OrderItem>(
            "SELECT * FROM order_items WHERE order_id = ? ORDER BY id",
        )
        .bind(order_id)
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .map(|item| ItemRequest {
            product: item.product,
            quantity: item.quantity,
        })
        .collect();

        let plan = reconcile::plan(&current, lines);
        let total = self.apply_plan(&mut tx, order_id, &plan).await?;

        sqlx::query("UPDATE orders SET total_price = ? WHERE id = ?")
            .bind(total)
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(order_id, total, "Order updated");
        self.get_order(order_id).await
    }

    /// Remove an order, returning all reserved stock to the ledger
    ///
    /// Either every line is released and the order deleted, or nothing
    /// happens — stock is never partially released.
    pub async fn delete_order(&self, order_id: i64) -> AppResult<()> {
        let mut tx = self.db.pool().begin().await?;

        sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = ?")
            .bind(order_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order {order_id} not found")))?;

        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT * FROM order_items WHERE order_id = ? ORDER BY id",
        )
        .bind(order_id)
        .fetch_all(&mut *tx)
        .await?;

        for item in &items {
            inventory::release(&mut *tx, &item.product, item.quantity).await?;
        }

        sqlx::query("DELETE FROM order_items WHERE order_id = ?")
            .bind(order_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM orders WHERE id = ?")
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(order_id, lines = items.len(), "Order deleted, stock released");
        Ok(())
    }

    /// Apply a reconciliation plan inside the caller's transaction
    ///
    /// Re-resolves every product, applies the net ledger adjustment per
    /// changed line, rewrites the order's item rows, and returns the new
    /// total price. Any error leaves the transaction poised for rollback.
    async fn apply_plan(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        order_id: i64,
        plan: &ReconcilePlan,
    ) -> AppResult<i64> {
        let mut total: i64 = 0;

        // Carried lines keep their quantity but still must resolve, and
        // their value counts towards the total
        for carried in &plan.carried {
            let product = inventory::lookup(&mut **tx, &carried.product).await?;
            total += product.price * carried.quantity;
        }

        for changed in &plan.changed {
            let product = inventory::lookup(&mut **tx, &changed.product).await?;
            inventory::adjust(&mut **tx, &changed.product, changed.delta()).await?;
            total += product.price * changed.requested;
        }

        // Rewrite the item set from the plan
        sqlx::query("DELETE FROM order_items WHERE order_id = ?")
            .bind(order_id)
            .execute(&mut **tx)
            .await?;

        for line in plan.final_lines() {
            sqlx::query("INSERT INTO order_items (order_id, product, quantity) VALUES (?, ?, ?)")
                .bind(order_id)
                .bind(&line.product)
                .bind(line.quantity)
                .execute(&mut **tx)
                .await?;
        }

        Ok(total)
    }

    async fn fetch_items(&self, order_id: i64) -> AppResult<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT * FROM order_items WHERE order_id = ? ORDER BY id",
        )
        .bind(order_id)
        .fetch_all(self.db.pool())
        .await?;
        Ok(items)
    }
}

/// Reject lines with a non-positive quantity before touching storage
fn validate_lines(lines: &[ItemRequest]) -> AppResult<()> {
    for line in lines {
        if line.quantity < 1 {
            return Err(AppError::validation(format!(
                "Quantity for product {} must be at least 1",
                line.product
            )));
        }
    }
    Ok(())
}
