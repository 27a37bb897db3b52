//! Invoice header and line item records
//!
//! Invoices are immutable once committed. Line items are owned by their
//! invoice and carry the per-line amount; sale lines additionally carry the
//! FIFO cost of the units they consumed.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PurchaseInvoiceHeader {
    pub id: Uuid,
    pub invoice_no: String,
    pub supplier_id: Uuid,
    pub supplier_name: String,
    pub date: NaiveDate,
    pub sub_total: Decimal,
    pub discount: Decimal,
    pub grand_total: Decimal,
    pub paid: Decimal,
    pub due: Decimal,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PurchaseInvoiceItem {
    pub id: Uuid,
    pub position: i32,
    pub product_id: Uuid,
    pub product_name: String,
    pub unit: String,
    pub quantity: Decimal,
    pub price: Decimal,
    pub amount: Decimal,
}

/// Full purchase invoice: header plus ordered line items.
#[derive(Debug, Clone, Serialize)]
pub struct PurchaseInvoice {
    #[serde(flatten)]
    pub header: PurchaseInvoiceHeader,
    pub items: Vec<PurchaseInvoiceItem>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SalesInvoiceHeader {
    pub id: Uuid,
    pub invoice_no: String,
    pub customer_id: Uuid,
    pub customer_name: String,
    pub date: NaiveDate,
    pub sub_total: Decimal,
    pub discount: Decimal,
    pub grand_total: Decimal,
    pub paid: Decimal,
    pub due: Decimal,
    pub note: Option<String>,
    pub cogs_total: Decimal,
    pub profit: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SalesInvoiceItem {
    pub id: Uuid,
    pub position: i32,
    pub product_id: Uuid,
    pub product_name: String,
    pub unit: String,
    pub quantity: Decimal,
    pub price: Decimal,
    pub amount: Decimal,
    /// FIFO cost of the units sold by this line
    pub cogs: Decimal,
}

/// Full sales invoice: header plus ordered line items.
#[derive(Debug, Clone, Serialize)]
pub struct SalesInvoice {
    #[serde(flatten)]
    pub header: SalesInvoiceHeader,
    pub items: Vec<SalesInvoiceItem>,
}
