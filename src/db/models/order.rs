//! Order and Item Models

use serde::{Deserialize, Serialize};

/// Order row
///
/// `total_price` is derived by the reconciliation engine and never set
/// directly by callers.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Order {
    pub id: i64,
    pub buyer: String,
    pub total_price: i64,
    pub created_at: i64,
}

/// Order line item row
///
/// Items are exclusively owned by their order; within one order the
/// product name is the de-facto line key (one line per distinct product).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product: String,
    pub quantity: i64,
}

/// A requested order line (caller input)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRequest {
    pub product: String,
    pub quantity: i64,
}

/// Order with its items, as returned to callers
#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
    pub id: i64,
    pub buyer: String,
    pub total_price: i64,
    pub created_at: i64,
    pub items: Vec<OrderItem>,
}

impl OrderView {
    pub fn from_parts(order: Order, items: Vec<OrderItem>) -> Self {
        Self {
            id: order.id,
            buyer: order.buyer,
            total_price: order.total_price,
            created_at: order.created_at,
            items,
        }
    }
}
