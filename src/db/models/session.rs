//! Session Model

use serde::Serialize;

/// Per-user session row
///
/// One row per user (`user_id` is the primary key). `last_active` is unix
/// milliseconds and is monotonically non-decreasing except at creation.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SessionRecord {
    pub user_id: i64,
    pub last_active: i64,
}
