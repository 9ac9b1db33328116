//! Product Model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Product row
///
/// `amount` is the available stock; it is mutated only through the
/// inventory ledger's reserve/release operations and never goes below zero.
/// Prices are integers in the smallest currency unit.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: i64,
    pub amount: i64,
    pub created_at: i64,
}

/// Create payload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProductCreate {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(range(min = 0, message = "price must be non-negative"))]
    pub price: i64,
    #[validate(range(min = 0, message = "amount must be non-negative"))]
    pub amount: i64,
}

/// Partial update payload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProductUpdate {
    #[validate(length(min = 1))]
    pub name: Option<String>,
    #[validate(range(min = 0))]
    pub price: Option<i64>,
    #[validate(range(min = 0))]
    pub amount: Option<i64>,
}
