//! Customer and supplier records

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub opening_balance: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Supplier {
    pub id: Uuid,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub opening_balance: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Minimal party reference carried in ledger statements.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PartyRef {
    pub id: Uuid,
    pub name: String,
}
