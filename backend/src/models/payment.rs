//! Payment records
//!
//! Receipts from customers and disbursements to suppliers. Append-only:
//! never mutated after creation.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CustomerPayment {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub amount: Decimal,
    pub method: Option<String>,
    pub note: Option<String>,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SupplierPayment {
    pub id: Uuid,
    pub supplier_id: Uuid,
    pub amount: Decimal,
    pub method: Option<String>,
    pub note: Option<String>,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}
