//! Party ledger service.
//!
//! Pulls a counterparty's invoices and payments out of storage and hands
//! them to the statement builder in `shared::ledger`. Windowed statements
//! fold everything before the window into the opening balance, so a
//! statement for any window reconciles with the full history.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use shared::ledger::{
    build_statement, opening_balance, LedgerEntry, LedgerEntryKind, LedgerStatement,
};

use crate::error::{AppError, AppResult};
use crate::models::PartyRef;

/// Ledger service for customer and supplier statements.
#[derive(Clone)]
pub struct LedgerService {
    db: PgPool,
}

/// Optional statement window; open-ended on either side.
#[derive(Debug, Default, Clone, Copy, Deserialize)]
pub struct LedgerWindow {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// A counterparty statement with the party it belongs to.
#[derive(Debug, Serialize)]
pub struct PartyStatement {
    pub party: PartyRef,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(flatten)]
    pub statement: LedgerStatement,
}

#[derive(Debug, FromRow)]
struct InvoiceEntryRow {
    id: Uuid,
    date: NaiveDate,
    invoice_no: String,
    grand_total: rust_decimal::Decimal,
}

#[derive(Debug, FromRow)]
struct PaymentEntryRow {
    id: Uuid,
    date: NaiveDate,
    amount: rust_decimal::Decimal,
    method: Option<String>,
}

#[derive(Debug, FromRow)]
struct PartyRow {
    id: Uuid,
    name: String,
    opening_balance: rust_decimal::Decimal,
}

impl LedgerService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Statement of a customer's sales invoices against their receipts.
    pub async fn customer_statement(
        &self,
        customer_id: Uuid,
        window: LedgerWindow,
    ) -> AppResult<PartyStatement> {
        let party = sqlx::query_as::<_, PartyRow>(
            "SELECT id, name, opening_balance FROM customers WHERE id = $1",
        )
        .bind(customer_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Customer".to_string()))?;

        self.build(
            party,
            window,
            "sales_invoices",
            "customer_id",
            "customer_payments",
            LedgerEntryKind::Sale,
            LedgerEntryKind::Receipt,
        )
        .await
    }

    /// Statement of a supplier's purchase invoices against payments made.
    pub async fn supplier_statement(
        &self,
        supplier_id: Uuid,
        window: LedgerWindow,
    ) -> AppResult<PartyStatement> {
        let party = sqlx::query_as::<_, PartyRow>(
            "SELECT id, name, opening_balance FROM suppliers WHERE id = $1",
        )
        .bind(supplier_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Supplier".to_string()))?;

        self.build(
            party,
            window,
            "purchase_invoices",
            "supplier_id",
            "supplier_payments",
            LedgerEntryKind::Purchase,
            LedgerEntryKind::Payment,
        )
        .await
    }

    #[allow(clippy::too_many_arguments)]
    async fn build(
        &self,
        party: PartyRow,
        window: LedgerWindow,
        invoice_table: &str,
        party_column: &str,
        payment_table: &str,
        debit_kind: LedgerEntryKind,
        credit_kind: LedgerEntryKind,
    ) -> AppResult<PartyStatement> {
        // Everything strictly before the window start folds into the opening.
        let pre_query = format!(
            r#"
            SELECT
                COALESCE((SELECT SUM(grand_total) FROM {invoice_table}
                          WHERE {party_column} = $1 AND ($2::date IS NOT NULL AND date < $2)), 0),
                COALESCE((SELECT SUM(amount) FROM {payment_table}
                          WHERE {party_column} = $1 AND ($2::date IS NOT NULL AND date < $2)), 0)
            "#
        );
        let (pre_debits, pre_credits) =
            sqlx::query_as::<_, (rust_decimal::Decimal, rust_decimal::Decimal)>(&pre_query)
                .bind(party.id)
                .bind(window.start_date)
                .fetch_one(&self.db)
                .await?;

        let invoice_query = format!(
            r#"
            SELECT id, date, invoice_no, grand_total
            FROM {invoice_table}
            WHERE {party_column} = $1
              AND ($2::date IS NULL OR date >= $2)
              AND ($3::date IS NULL OR date <= $3)
            "#
        );
        let invoices = sqlx::query_as::<_, InvoiceEntryRow>(&invoice_query)
            .bind(party.id)
            .bind(window.start_date)
            .bind(window.end_date)
            .fetch_all(&self.db)
            .await?;

        let payment_query = format!(
            r#"
            SELECT id, date, amount, method
            FROM {payment_table}
            WHERE {party_column} = $1
              AND ($2::date IS NULL OR date >= $2)
              AND ($3::date IS NULL OR date <= $3)
            "#
        );
        let payments = sqlx::query_as::<_, PaymentEntryRow>(&payment_query)
            .bind(party.id)
            .bind(window.start_date)
            .bind(window.end_date)
            .fetch_all(&self.db)
            .await?;

        let mut entries = Vec::with_capacity(invoices.len() + payments.len());
        for inv in invoices {
            entries.push(LedgerEntry {
                id: inv.id,
                date: inv.date,
                kind: debit_kind,
                description: inv.invoice_no,
                debit: inv.grand_total,
                credit: rust_decimal::Decimal::ZERO,
            });
        }
        for pay in payments {
            entries.push(LedgerEntry {
                id: pay.id,
                date: pay.date,
                kind: credit_kind,
                description: pay.method.unwrap_or_else(|| "Payment".to_string()),
                debit: rust_decimal::Decimal::ZERO,
                credit: pay.amount,
            });
        }

        let opening = opening_balance(party.opening_balance, pre_debits, pre_credits);
        let statement = build_statement(opening, entries);

        Ok(PartyStatement {
            party: PartyRef {
                id: party.id,
                name: party.name,
            },
            start_date: window.start_date,
            end_date: window.end_date,
            statement,
        })
    }
}
