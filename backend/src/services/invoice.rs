//! Invoice orchestration: purchases and sales.
//!
//! Invoice creation is the write path that ties stock movement to financial
//! records. Each create runs normalize, validate, move stock, compute
//! totals, persist as one database transaction; any failure rolls the whole
//! invoice back, stock movements included.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use shared::costing::{invoice_totals, line_amount, sale_profit};
use shared::types::Pagination;
use shared::validation::{
    validate_amount, validate_items_not_empty, validate_quantity, validate_unit_price,
};

use crate::error::{AppError, AppResult};
use crate::models::{
    PurchaseInvoice, PurchaseInvoiceHeader, PurchaseInvoiceItem, SalesInvoice,
    SalesInvoiceHeader, SalesInvoiceItem,
};
use crate::services::StockService;

/// Invoice service wrapping purchase and sale creation and lookup.
#[derive(Clone)]
pub struct InvoiceService {
    db: PgPool,
    stock: StockService,
}

/// One requested invoice line.
#[derive(Debug, Clone, Deserialize)]
pub struct InvoiceItemInput {
    pub product_id: Uuid,
    pub quantity: Decimal,
    pub price: Decimal,
}

/// Input for creating a purchase invoice.
#[derive(Debug, Deserialize)]
pub struct CreatePurchaseInput {
    pub supplier_id: Uuid,
    pub items: Vec<InvoiceItemInput>,
    pub date: Option<NaiveDate>,
    pub discount: Option<Decimal>,
    pub paid: Option<Decimal>,
    pub note: Option<String>,
}

/// Input for creating a sales invoice.
#[derive(Debug, Deserialize)]
pub struct CreateSaleInput {
    pub customer_id: Uuid,
    pub items: Vec<InvoiceItemInput>,
    pub date: Option<NaiveDate>,
    pub discount: Option<Decimal>,
    pub paid: Option<Decimal>,
    pub note: Option<String>,
}

/// Filters for invoice list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct InvoiceFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Counterparty (supplier or customer, per endpoint)
    pub party_id: Option<Uuid>,
    /// Matches invoice number or counterparty name
    pub q: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
}

impl InvoiceFilter {
    fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page.unwrap_or(1),
            limit: self.limit.unwrap_or(50),
        }
        .clamped()
    }

    fn search_pattern(&self) -> Option<String> {
        self.q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(|q| format!("%{}%", q))
    }
}

/// Aggregate figures over a filtered purchase list.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PurchaseStats {
    pub count: i64,
    pub sub_total: Decimal,
    pub discount: Decimal,
    pub grand_total: Decimal,
    pub paid: Decimal,
    pub due: Decimal,
}

/// Aggregate figures over a filtered sales list.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SalesStats {
    pub count: i64,
    pub sub_total: Decimal,
    pub discount: Decimal,
    pub grand_total: Decimal,
    pub paid: Decimal,
    pub due: Decimal,
    pub cogs_total: Decimal,
    pub profit: Decimal,
}

/// One page of purchase invoices with list-wide aggregates.
#[derive(Debug, Serialize)]
pub struct PurchasePage {
    pub invoices: Vec<PurchaseInvoiceHeader>,
    pub page: u32,
    pub limit: u32,
    pub stats: PurchaseStats,
}

/// One page of sales invoices with list-wide aggregates.
#[derive(Debug, Serialize)]
pub struct SalesPage {
    pub invoices: Vec<SalesInvoiceHeader>,
    pub page: u32,
    pub limit: u32,
    pub stats: SalesStats,
}

/// Generate an invoice number: prefix, timestamp, random tail.
///
/// The tail keeps numbers unique when two invoices land within the same
/// second.
fn make_invoice_no(prefix: &str) -> String {
    let stamp = Utc::now().format("%Y%m%d-%H%M%S");
    let tail = Uuid::new_v4().simple().to_string()[..4].to_uppercase();
    format!("{}-{}-{}", prefix, stamp, tail)
}

#[derive(Debug, FromRow)]
struct ProductRef {
    id: Uuid,
    name: String,
    unit: String,
}

impl InvoiceService {
    pub fn new(db: PgPool, stock: StockService) -> Self {
        Self { db, stock }
    }

    fn validate_common(
        items: &[InvoiceItemInput],
        discount: Decimal,
        paid: Decimal,
    ) -> AppResult<()> {
        validate_items_not_empty(items.len())
            .map_err(|msg| AppError::validation("items", msg))?;
        for (i, item) in items.iter().enumerate() {
            validate_quantity(item.quantity)
                .map_err(|msg| AppError::validation(format!("items[{}].quantity", i), msg))?;
            validate_unit_price(item.price)
                .map_err(|msg| AppError::validation(format!("items[{}].price", i), msg))?;
        }
        validate_amount(discount).map_err(|msg| AppError::validation("discount", msg))?;
        validate_amount(paid).map_err(|msg| AppError::validation("paid", msg))?;
        Ok(())
    }

    /// Record a purchase: one new stock batch per line, then the invoice.
    pub async fn create_purchase(&self, input: CreatePurchaseInput) -> AppResult<PurchaseInvoice> {
        let discount = input.discount.unwrap_or(Decimal::ZERO);
        let paid = input.paid.unwrap_or(Decimal::ZERO);
        Self::validate_common(&input.items, discount, paid)?;

        let date = input.date.unwrap_or_else(|| Utc::now().date_naive());

        let mut tx = self.db.begin().await?;

        let supplier_name = sqlx::query_scalar::<_, String>(
            "SELECT name FROM suppliers WHERE id = $1",
        )
        .bind(input.supplier_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Supplier".to_string()))?;

        let mut sub_total = Decimal::ZERO;
        let mut lines: Vec<(ProductRef, Decimal, Decimal, Decimal)> = Vec::new();
        for item in &input.items {
            let product = sqlx::query_as::<_, ProductRef>(
                "SELECT id, name, unit FROM products WHERE id = $1",
            )
            .bind(item.product_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

            self.stock
                .replenish(&mut tx, product.id, item.quantity, item.price)
                .await?;

            let amount = line_amount(item.quantity, item.price);
            sub_total += amount;
            lines.push((product, item.quantity, item.price, amount));
        }

        let totals = invoice_totals(sub_total, discount, paid);
        let invoice_no = make_invoice_no("PINV");

        let header_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO purchase_invoices
                (invoice_no, supplier_id, date, sub_total, discount, grand_total, paid, due, note)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(&invoice_no)
        .bind(input.supplier_id)
        .bind(date)
        .bind(totals.sub_total)
        .bind(discount)
        .bind(totals.grand_total)
        .bind(paid)
        .bind(totals.due)
        .bind(&input.note)
        .fetch_one(&mut *tx)
        .await?;

        for (position, (product, quantity, price, amount)) in lines.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO purchase_invoice_items
                    (invoice_id, position, product_id, unit, quantity, price, amount)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(header_id)
            .bind(position as i32)
            .bind(product.id)
            .bind(&product.unit)
            .bind(quantity)
            .bind(price)
            .bind(amount)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(
            invoice_no = %invoice_no,
            supplier = %supplier_name,
            grand_total = %totals.grand_total,
            "purchase invoice created"
        );

        self.get_purchase(header_id).await
    }

    /// Record a sale: FIFO-consume stock per line, then the invoice.
    ///
    /// Shortfall on any line aborts the whole invoice; earlier lines'
    /// consumption rolls back with the transaction.
    pub async fn create_sale(&self, input: CreateSaleInput) -> AppResult<SalesInvoice> {
        let discount = input.discount.unwrap_or(Decimal::ZERO);
        let paid = input.paid.unwrap_or(Decimal::ZERO);
        Self::validate_common(&input.items, discount, paid)?;

        let date = input.date.unwrap_or_else(|| Utc::now().date_naive());

        let mut tx = self.db.begin().await?;

        let customer_name = sqlx::query_scalar::<_, String>(
            "SELECT name FROM customers WHERE id = $1",
        )
        .bind(input.customer_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Customer".to_string()))?;

        let mut sub_total = Decimal::ZERO;
        let mut cogs_total = Decimal::ZERO;
        let mut lines: Vec<(ProductRef, Decimal, Decimal, Decimal, Decimal)> = Vec::new();
        for item in &input.items {
            let product = sqlx::query_as::<_, ProductRef>(
                "SELECT id, name, unit FROM products WHERE id = $1",
            )
            .bind(item.product_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

            let available = self.stock.available_quantity(&mut tx, product.id).await?;
            if available < item.quantity {
                return Err(AppError::InsufficientStock {
                    product: product.name,
                });
            }

            let plan = self
                .stock
                .consume_fifo(&mut tx, product.id, &product.name, item.quantity)
                .await?;

            let amount = line_amount(item.quantity, item.price);
            sub_total += amount;
            cogs_total += plan.cogs;
            lines.push((product, item.quantity, item.price, amount, plan.cogs));
        }

        let totals = invoice_totals(sub_total, discount, paid);
        let profit = sale_profit(totals.grand_total, cogs_total);
        let invoice_no = make_invoice_no("SINV");

        let header_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO sales_invoices
                (invoice_no, customer_id, date, sub_total, discount, grand_total,
                 paid, due, note, cogs_total, profit)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING id
            "#,
        )
        .bind(&invoice_no)
        .bind(input.customer_id)
        .bind(date)
        .bind(totals.sub_total)
        .bind(discount)
        .bind(totals.grand_total)
        .bind(paid)
        .bind(totals.due)
        .bind(&input.note)
        .bind(cogs_total)
        .bind(profit)
        .fetch_one(&mut *tx)
        .await?;

        for (position, (product, quantity, price, amount, cogs)) in lines.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO sales_invoice_items
                    (invoice_id, position, product_id, unit, quantity, price, amount, cogs)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(header_id)
            .bind(position as i32)
            .bind(product.id)
            .bind(&product.unit)
            .bind(quantity)
            .bind(price)
            .bind(amount)
            .bind(cogs)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!(
            invoice_no = %invoice_no,
            customer = %customer_name,
            grand_total = %totals.grand_total,
            profit = %profit,
            "sales invoice created"
        );

        self.get_sale(header_id).await
    }

    /// Fetch one purchase invoice with its lines.
    pub async fn get_purchase(&self, id: Uuid) -> AppResult<PurchaseInvoice> {
        let header = sqlx::query_as::<_, PurchaseInvoiceHeader>(
            r#"
            SELECT pi.id, pi.invoice_no, pi.supplier_id, s.name AS supplier_name,
                   pi.date, pi.sub_total, pi.discount, pi.grand_total, pi.paid,
                   pi.due, pi.note, pi.created_at
            FROM purchase_invoices pi
            JOIN suppliers s ON s.id = pi.supplier_id
            WHERE pi.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Purchase invoice".to_string()))?;

        let items = sqlx::query_as::<_, PurchaseInvoiceItem>(
            r#"
            SELECT i.id, i.position, i.product_id, p.name AS product_name,
                   i.unit, i.quantity, i.price, i.amount
            FROM purchase_invoice_items i
            JOIN products p ON p.id = i.product_id
            WHERE i.invoice_id = $1
            ORDER BY i.position
            "#,
        )
        .bind(id)
        .fetch_all(&self.db)
        .await?;

        Ok(PurchaseInvoice { header, items })
    }

    /// Fetch one sales invoice with its lines.
    pub async fn get_sale(&self, id: Uuid) -> AppResult<SalesInvoice> {
        let header = sqlx::query_as::<_, SalesInvoiceHeader>(
            r#"
            SELECT si.id, si.invoice_no, si.customer_id, c.name AS customer_name,
                   si.date, si.sub_total, si.discount, si.grand_total, si.paid,
                   si.due, si.note, si.cogs_total, si.profit, si.created_at
            FROM sales_invoices si
            JOIN customers c ON c.id = si.customer_id
            WHERE si.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Sales invoice".to_string()))?;

        let items = sqlx::query_as::<_, SalesInvoiceItem>(
            r#"
            SELECT i.id, i.position, i.product_id, p.name AS product_name,
                   i.unit, i.quantity, i.price, i.amount, i.cogs
            FROM sales_invoice_items i
            JOIN products p ON p.id = i.product_id
            WHERE i.invoice_id = $1
            ORDER BY i.position
            "#,
        )
        .bind(id)
        .fetch_all(&self.db)
        .await?;

        Ok(SalesInvoice { header, items })
    }

    /// List purchase invoices newest-first with aggregates over the filter.
    pub async fn list_purchases(&self, filter: InvoiceFilter) -> AppResult<PurchasePage> {
        let pagination = filter.pagination();
        let pattern = filter.search_pattern();

        let invoices = sqlx::query_as::<_, PurchaseInvoiceHeader>(
            r#"
            SELECT pi.id, pi.invoice_no, pi.supplier_id, s.name AS supplier_name,
                   pi.date, pi.sub_total, pi.discount, pi.grand_total, pi.paid,
                   pi.due, pi.note, pi.created_at
            FROM purchase_invoices pi
            JOIN suppliers s ON s.id = pi.supplier_id
            WHERE ($1::date IS NULL OR pi.date >= $1)
              AND ($2::date IS NULL OR pi.date <= $2)
              AND ($3::uuid IS NULL OR pi.supplier_id = $3)
              AND ($4::text IS NULL OR pi.invoice_no ILIKE $4 OR s.name ILIKE $4)
            ORDER BY pi.date DESC, pi.created_at DESC
            LIMIT $5 OFFSET $6
            "#,
        )
        .bind(filter.start_date)
        .bind(filter.end_date)
        .bind(filter.party_id)
        .bind(&pattern)
        .bind(i64::from(pagination.limit))
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        let stats = sqlx::query_as::<_, PurchaseStats>(
            r#"
            SELECT COUNT(*) AS count,
                   COALESCE(SUM(pi.sub_total), 0) AS sub_total,
                   COALESCE(SUM(pi.discount), 0) AS discount,
                   COALESCE(SUM(pi.grand_total), 0) AS grand_total,
                   COALESCE(SUM(pi.paid), 0) AS paid,
                   COALESCE(SUM(pi.due), 0) AS due
            FROM purchase_invoices pi
            JOIN suppliers s ON s.id = pi.supplier_id
            WHERE ($1::date IS NULL OR pi.date >= $1)
              AND ($2::date IS NULL OR pi.date <= $2)
              AND ($3::uuid IS NULL OR pi.supplier_id = $3)
              AND ($4::text IS NULL OR pi.invoice_no ILIKE $4 OR s.name ILIKE $4)
            "#,
        )
        .bind(filter.start_date)
        .bind(filter.end_date)
        .bind(filter.party_id)
        .bind(&pattern)
        .fetch_one(&self.db)
        .await?;

        Ok(PurchasePage {
            invoices,
            page: pagination.page,
            limit: pagination.limit,
            stats,
        })
    }

    /// List sales invoices newest-first with aggregates over the filter.
    pub async fn list_sales(&self, filter: InvoiceFilter) -> AppResult<SalesPage> {
        let pagination = filter.pagination();
        let pattern = filter.search_pattern();

        let invoices = sqlx::query_as::<_, SalesInvoiceHeader>(
            r#"
            SELECT si.id, si.invoice_no, si.customer_id, c.name AS customer_name,
                   si.date, si.sub_total, si.discount, si.grand_total, si.paid,
                   si.due, si.note, si.cogs_total, si.profit, si.created_at
            FROM sales_invoices si
            JOIN customers c ON c.id = si.customer_id
            WHERE ($1::date IS NULL OR si.date >= $1)
              AND ($2::date IS NULL OR si.date <= $2)
              AND ($3::uuid IS NULL OR si.customer_id = $3)
              AND ($4::text IS NULL OR si.invoice_no ILIKE $4 OR c.name ILIKE $4)
            ORDER BY si.date DESC, si.created_at DESC
            LIMIT $5 OFFSET $6
            "#,
        )
        .bind(filter.start_date)
        .bind(filter.end_date)
        .bind(filter.party_id)
        .bind(&pattern)
        .bind(i64::from(pagination.limit))
        .bind(pagination.offset())
        .fetch_all(&self.db)
        .await?;

        let stats = sqlx::query_as::<_, SalesStats>(
            r#"
            SELECT COUNT(*) AS count,
                   COALESCE(SUM(si.sub_total), 0) AS sub_total,
                   COALESCE(SUM(si.discount), 0) AS discount,
                   COALESCE(SUM(si.grand_total), 0) AS grand_total,
                   COALESCE(SUM(si.paid), 0) AS paid,
                   COALESCE(SUM(si.due), 0) AS due,
                   COALESCE(SUM(si.cogs_total), 0) AS cogs_total,
                   COALESCE(SUM(si.profit), 0) AS profit
            FROM sales_invoices si
            JOIN customers c ON c.id = si.customer_id
            WHERE ($1::date IS NULL OR si.date >= $1)
              AND ($2::date IS NULL OR si.date <= $2)
              AND ($3::uuid IS NULL OR si.customer_id = $3)
              AND ($4::text IS NULL OR si.invoice_no ILIKE $4 OR c.name ILIKE $4)
            "#,
        )
        .bind(filter.start_date)
        .bind(filter.end_date)
        .bind(filter.party_id)
        .bind(&pattern)
        .fetch_one(&self.db)
        .await?;

        Ok(SalesPage {
            invoices,
            page: pagination.page,
            limit: pagination.limit,
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invoice_no_shape() {
        let no = make_invoice_no("SINV");
        let parts: Vec<&str> = no.split('-').collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0], "SINV");
        assert_eq!(parts[1].len(), 8);
        assert_eq!(parts[2].len(), 6);
        assert_eq!(parts[3].len(), 4);
        assert!(parts[3].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn invoice_nos_are_distinct() {
        let a = make_invoice_no("PINV");
        let b = make_invoice_no("PINV");
        assert_ne!(a, b);
    }
}
