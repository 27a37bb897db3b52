//! Stock batch service: batch lifecycle, FIFO consumption, valuation.
//!
//! All mutating operations take an open transaction so invoice creation can
//! wrap stock movement and invoice persistence atomically. Batch rows for a
//! product are locked with `SELECT ... FOR UPDATE` before consumption, which
//! serializes concurrent sales of the same product.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use shared::costing::{plan_fifo_consumption, BatchView, ConsumptionPlan, CostFallbackPolicy};

use crate::error::{AppError, AppResult};
use crate::models::StockBatch;

/// Stock service for batch-level inventory.
#[derive(Clone)]
pub struct StockService {
    db: PgPool,
    fallback: CostFallbackPolicy,
}

/// One product's valuation line.
#[derive(Debug, Clone, Serialize)]
pub struct ValuationRow {
    pub product_id: Uuid,
    pub product_name: String,
    pub unit: String,
    pub quantity: Decimal,
    /// Quantity-weighted average of the effective batch costs
    pub average_cost: Decimal,
    pub value: Decimal,
}

/// Whole-inventory valuation.
#[derive(Debug, Clone, Serialize)]
pub struct ValuationSummary {
    pub as_of: Option<NaiveDate>,
    pub product_count: usize,
    pub total_quantity: Decimal,
    pub total_value: Decimal,
    pub products: Vec<ValuationRow>,
}

/// Outcome of rebuilding the denormalized stock caches.
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileReport {
    pub products_checked: i64,
    pub products_corrected: i64,
}

#[derive(Debug, FromRow)]
struct ValuationBatchRow {
    product_id: Uuid,
    product_name: String,
    unit: String,
    list_price: Decimal,
    quantity: Decimal,
    unit_cost: Decimal,
}

impl StockService {
    pub fn new(db: PgPool, fallback: CostFallbackPolicy) -> Self {
        Self { db, fallback }
    }

    /// Add a new batch for a purchased line and refresh the stock cache.
    pub async fn replenish(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product_id: Uuid,
        quantity: Decimal,
        unit_cost: Decimal,
    ) -> AppResult<StockBatch> {
        let batch = sqlx::query_as::<_, StockBatch>(
            r#"
            INSERT INTO stock_batches (product_id, quantity, unit_cost)
            VALUES ($1, $2, $3)
            RETURNING id, product_id, quantity, unit_cost, created_at
            "#,
        )
        .bind(product_id)
        .bind(quantity)
        .bind(unit_cost)
        .fetch_one(&mut **tx)
        .await?;

        self.refresh_stock_total(tx, product_id).await?;

        Ok(batch)
    }

    /// Consume `quantity` units of a product oldest-batch-first.
    ///
    /// Locks the product's batches, plans the consumption, applies the
    /// decrements, and refreshes the stock cache. Returns the plan so the
    /// caller has per-line COGS. A shortfall surfaces as
    /// [`AppError::InsufficientStock`] and leaves no decrement behind; the
    /// surrounding transaction rolls back untouched.
    pub async fn consume_fifo(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product_id: Uuid,
        product_name: &str,
        quantity: Decimal,
    ) -> AppResult<ConsumptionPlan> {
        let batches = sqlx::query_as::<_, StockBatch>(
            r#"
            SELECT id, product_id, quantity, unit_cost, created_at
            FROM stock_batches
            WHERE product_id = $1 AND quantity > 0
            ORDER BY created_at, id
            FOR UPDATE
            "#,
        )
        .bind(product_id)
        .fetch_all(&mut **tx)
        .await?;

        let views: Vec<BatchView> = batches
            .iter()
            .map(|b| BatchView {
                id: b.id,
                remaining: b.quantity,
                unit_cost: b.unit_cost,
            })
            .collect();

        let plan = plan_fifo_consumption(&views, quantity).map_err(|shortfall| {
            tracing::warn!(
                product = %product_name,
                requested = %shortfall.requested,
                available = %shortfall.available,
                "insufficient stock for sale"
            );
            AppError::InsufficientStock {
                product: product_name.to_string(),
            }
        })?;

        for take in &plan.takes {
            sqlx::query("UPDATE stock_batches SET quantity = quantity - $1 WHERE id = $2")
                .bind(take.quantity)
                .bind(take.batch_id)
                .execute(&mut **tx)
                .await?;
        }

        self.refresh_stock_total(tx, product_id).await?;

        Ok(plan)
    }

    /// Total quantity currently held across a product's batches.
    pub async fn available_quantity(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product_id: Uuid,
    ) -> AppResult<Decimal> {
        let total = sqlx::query_scalar::<_, Option<Decimal>>(
            "SELECT SUM(quantity) FROM stock_batches WHERE product_id = $1",
        )
        .bind(product_id)
        .fetch_one(&mut **tx)
        .await?
        .unwrap_or(Decimal::ZERO);

        Ok(total)
    }

    /// Rewrite a product's denormalized stock cache from its batches.
    pub async fn refresh_stock_total(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product_id: Uuid,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE products
            SET stock = COALESCE(
                (SELECT SUM(quantity) FROM stock_batches WHERE product_id = $1), 0)
            WHERE id = $1
            "#,
        )
        .bind(product_id)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Rebuild every product's stock cache from batch truth.
    ///
    /// Maintenance operation for caches that drifted (manual edits, partial
    /// restores). Reports how many rows actually changed.
    pub async fn reconcile_stock_totals(&self) -> AppResult<ReconcileReport> {
        let mut tx = self.db.begin().await?;

        let products_checked =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products")
                .fetch_one(&mut *tx)
                .await?;

        let corrected = sqlx::query(
            r#"
            UPDATE products p
            SET stock = COALESCE(b.total, 0)
            FROM (
                SELECT p2.id, SUM(sb.quantity) AS total
                FROM products p2
                LEFT JOIN stock_batches sb ON sb.product_id = p2.id
                GROUP BY p2.id
            ) b
            WHERE b.id = p.id AND p.stock IS DISTINCT FROM COALESCE(b.total, 0)
            "#,
        )
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let report = ReconcileReport {
            products_checked,
            products_corrected: corrected.rows_affected() as i64,
        };
        tracing::info!(
            checked = report.products_checked,
            corrected = report.products_corrected,
            "stock reconciliation finished"
        );

        Ok(report)
    }

    /// Value the whole inventory, optionally as of a past date.
    ///
    /// With `as_of` set, only batches created on or before that date count,
    /// at their remaining quantity. Batches with no usable cost are valued
    /// per the configured fallback policy.
    pub async fn valuation(&self, as_of: Option<NaiveDate>) -> AppResult<ValuationSummary> {
        let rows = sqlx::query_as::<_, ValuationBatchRow>(
            r#"
            SELECT p.id AS product_id, p.name AS product_name, p.unit,
                   p.price AS list_price, sb.quantity, sb.unit_cost
            FROM products p
            JOIN stock_batches sb ON sb.product_id = p.id
            WHERE sb.quantity > 0
              AND ($1::date IS NULL OR sb.created_at::date <= $1)
            ORDER BY p.name, sb.created_at, sb.id
            "#,
        )
        .bind(as_of)
        .fetch_all(&self.db)
        .await?;

        let mut products: Vec<ValuationRow> = Vec::new();
        for row in rows {
            let latest_purchase = if row.unit_cost > Decimal::ZERO {
                None
            } else {
                self.latest_purchase_price(row.product_id).await?
            };
            let unit_cost =
                self.fallback
                    .effective_unit_cost(row.unit_cost, latest_purchase, row.list_price);
            let value = row.quantity * unit_cost;

            match products.last_mut() {
                Some(last) if last.product_id == row.product_id => {
                    last.quantity += row.quantity;
                    last.value += value;
                }
                _ => products.push(ValuationRow {
                    product_id: row.product_id,
                    product_name: row.product_name,
                    unit: row.unit,
                    quantity: row.quantity,
                    average_cost: Decimal::ZERO,
                    value,
                }),
            }
        }

        for product in &mut products {
            if product.quantity > Decimal::ZERO {
                product.average_cost = product.value / product.quantity;
            }
        }

        let total_quantity = products.iter().map(|p| p.quantity).sum();
        let total_value = products.iter().map(|p| p.value).sum();

        Ok(ValuationSummary {
            as_of,
            product_count: products.len(),
            total_quantity,
            total_value,
            products,
        })
    }

    /// Total inventory value, for the balance sheet.
    pub async fn inventory_value(&self, as_of: Option<NaiveDate>) -> AppResult<Decimal> {
        Ok(self.valuation(as_of).await?.total_value)
    }

    /// Most recent purchase price recorded for a product, if any.
    async fn latest_purchase_price(&self, product_id: Uuid) -> AppResult<Option<Decimal>> {
        let price = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT pii.price
            FROM purchase_invoice_items pii
            JOIN purchase_invoices pi ON pi.id = pii.invoice_id
            WHERE pii.product_id = $1
            ORDER BY pi.date DESC, pi.created_at DESC, pii.position DESC
            LIMIT 1
            "#,
        )
        .bind(product_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(price)
    }
}
