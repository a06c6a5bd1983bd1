//! Order Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Order entity
///
/// `total_price` is frozen at creation: book price at order time times quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub book_id: i64,
    pub quantity: i32,
    pub total_price: i64,
    pub created_at: DateTime<Utc>,
}

/// Place order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    pub book_id: i64,
    pub quantity: i32,
}
