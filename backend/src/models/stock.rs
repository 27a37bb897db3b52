//! Stock batch records

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// One purchased FIFO lot of a product.
///
/// `quantity` is the remaining amount; consumption only ever decrements it
/// and batches are never deleted, so depleted lots stay behind as cost
/// history.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StockBatch {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
    pub created_at: DateTime<Utc>,
}
