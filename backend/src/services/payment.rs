//! Payment recording service.
//!
//! Payments are standalone ledger events. Recording one never rewrites an
//! invoice's paid or due figures; settlement shows up in the party ledger
//! and the balance sheet instead.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use shared::validation::validate_amount;

use crate::error::{AppError, AppResult};
use crate::models::{CustomerPayment, SupplierPayment};

/// Payment service for customer receipts and supplier disbursements.
#[derive(Clone)]
pub struct PaymentService {
    db: PgPool,
}

/// Input for recording a payment
#[derive(Debug, Deserialize)]
pub struct PaymentInput {
    pub party_id: Uuid,
    pub amount: Decimal,
    pub method: Option<String>,
    pub note: Option<String>,
    pub date: Option<NaiveDate>,
}

/// Date-window filter for payment lists
#[derive(Debug, Default, Deserialize)]
pub struct PaymentFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub party_id: Option<Uuid>,
}

impl PaymentService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record money received from a customer.
    pub async fn record_customer_payment(
        &self,
        input: PaymentInput,
    ) -> AppResult<CustomerPayment> {
        validate_amount(input.amount).map_err(|msg| AppError::validation("amount", msg))?;

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM customers WHERE id = $1)",
        )
        .bind(input.party_id)
        .fetch_one(&self.db)
        .await?;
        if !exists {
            return Err(AppError::NotFound("Customer".to_string()));
        }

        let payment = sqlx::query_as::<_, CustomerPayment>(
            r#"
            INSERT INTO customer_payments (customer_id, amount, method, note, date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, customer_id, amount, method, note, date, created_at
            "#,
        )
        .bind(input.party_id)
        .bind(input.amount)
        .bind(&input.method)
        .bind(&input.note)
        .bind(input.date.unwrap_or_else(|| Utc::now().date_naive()))
        .fetch_one(&self.db)
        .await?;

        tracing::info!(customer_id = %payment.customer_id, amount = %payment.amount,
            "customer payment recorded");

        Ok(payment)
    }

    /// Record money paid out to a supplier.
    pub async fn record_supplier_payment(
        &self,
        input: PaymentInput,
    ) -> AppResult<SupplierPayment> {
        validate_amount(input.amount).map_err(|msg| AppError::validation("amount", msg))?;

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM suppliers WHERE id = $1)",
        )
        .bind(input.party_id)
        .fetch_one(&self.db)
        .await?;
        if !exists {
            return Err(AppError::NotFound("Supplier".to_string()));
        }

        let payment = sqlx::query_as::<_, SupplierPayment>(
            r#"
            INSERT INTO supplier_payments (supplier_id, amount, method, note, date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, supplier_id, amount, method, note, date, created_at
            "#,
        )
        .bind(input.party_id)
        .bind(input.amount)
        .bind(&input.method)
        .bind(&input.note)
        .bind(input.date.unwrap_or_else(|| Utc::now().date_naive()))
        .fetch_one(&self.db)
        .await?;

        tracing::info!(supplier_id = %payment.supplier_id, amount = %payment.amount,
            "supplier payment recorded");

        Ok(payment)
    }

    pub async fn list_customer_payments(
        &self,
        filter: PaymentFilter,
    ) -> AppResult<Vec<CustomerPayment>> {
        let payments = sqlx::query_as::<_, CustomerPayment>(
            r#"
            SELECT id, customer_id, amount, method, note, date, created_at
            FROM customer_payments
            WHERE ($1::date IS NULL OR date >= $1)
              AND ($2::date IS NULL OR date <= $2)
              AND ($3::uuid IS NULL OR customer_id = $3)
            ORDER BY date DESC, created_at DESC
            "#,
        )
        .bind(filter.start_date)
        .bind(filter.end_date)
        .bind(filter.party_id)
        .fetch_all(&self.db)
        .await?;

        Ok(payments)
    }

    pub async fn list_supplier_payments(
        &self,
        filter: PaymentFilter,
    ) -> AppResult<Vec<SupplierPayment>> {
        let payments = sqlx::query_as::<_, SupplierPayment>(
            r#"
            SELECT id, supplier_id, amount, method, note, date, created_at
            FROM supplier_payments
            WHERE ($1::date IS NULL OR date >= $1)
              AND ($2::date IS NULL OR date <= $2)
              AND ($3::uuid IS NULL OR supplier_id = $3)
            ORDER BY date DESC, created_at DESC
            "#,
        )
        .bind(filter.start_date)
        .bind(filter.end_date)
        .bind(filter.party_id)
        .fetch_all(&self.db)
        .await?;

        Ok(payments)
    }
}
