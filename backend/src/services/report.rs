//! Financial reporting service: balance sheet, P&L series, sales summaries.

use chrono::{Datelike, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use shared::reporting::{build_balance_sheet, BalanceSheet, BalanceSheetInputs, PnlRow};
use shared::types::{DateRange, Granularity};

use crate::error::{AppError, AppResult};
use crate::services::StockService;

/// Reporting service
#[derive(Clone)]
pub struct ReportService {
    db: PgPool,
    stock: StockService,
}

/// One day's sales totals
#[derive(Debug, Serialize)]
pub struct DailySales {
    pub date: NaiveDate,
    pub invoice_count: i64,
    pub revenue: Decimal,
    pub cogs: Decimal,
    pub gross_profit: Decimal,
}

/// One month of the trailing-year profit series
#[derive(Debug, Serialize)]
pub struct MonthlyProfitPoint {
    pub label: String,
    pub revenue: Decimal,
    pub purchases: Decimal,
    pub profit: Decimal,
}

#[derive(Debug, sqlx::FromRow)]
struct PeriodSumRow {
    period: String,
    revenue: Decimal,
    cogs: Decimal,
}

impl ReportService {
    pub fn new(db: PgPool, stock: StockService) -> Self {
        Self { db, stock }
    }

    /// Point-in-time balance sheet.
    ///
    /// Every figure is cut off at `as_of` (defaults to today). The attached
    /// P&L block covers `period`, defaulting to the as-of calendar month.
    pub async fn balance_sheet(
        &self,
        as_of: Option<NaiveDate>,
        period: Option<DateRange>,
    ) -> AppResult<BalanceSheet> {
        let as_of = as_of.unwrap_or_else(|| Utc::now().date_naive());
        let period = match period {
            Some(p) => {
                if p.end < p.start {
                    return Err(AppError::validation(
                        "period",
                        "Period end must not precede its start",
                    ));
                }
                p
            }
            None => calendar_month_of(as_of),
        };

        let (customer_payments, supplier_payments, sales_total, purchases_total) =
            sqlx::query_as::<_, (Decimal, Decimal, Decimal, Decimal)>(
                r#"
                SELECT
                    COALESCE((SELECT SUM(amount) FROM customer_payments WHERE date <= $1), 0),
                    COALESCE((SELECT SUM(amount) FROM supplier_payments WHERE date <= $1), 0),
                    COALESCE((SELECT SUM(grand_total) FROM sales_invoices WHERE date <= $1), 0),
                    COALESCE((SELECT SUM(grand_total) FROM purchase_invoices WHERE date <= $1), 0)
                "#,
            )
            .bind(as_of)
            .fetch_one(&self.db)
            .await?;

        let (period_revenue, period_cogs) = sqlx::query_as::<_, (Decimal, Decimal)>(
            r#"
            SELECT COALESCE(SUM(grand_total), 0), COALESCE(SUM(cogs_total), 0)
            FROM sales_invoices
            WHERE date >= $1 AND date <= $2
            "#,
        )
        .bind(period.start)
        .bind(period.end)
        .fetch_one(&self.db)
        .await?;

        let inventory_value = self.stock.inventory_value(Some(as_of)).await?;

        Ok(build_balance_sheet(
            as_of,
            period,
            BalanceSheetInputs {
                customer_payments,
                supplier_payments,
                sales_total,
                purchases_total,
                inventory_value,
                period_revenue,
                period_cogs,
            },
        ))
    }

    /// Revenue, COGS and gross profit grouped by period over a window.
    ///
    /// Periods with no sales are absent from the series.
    pub async fn pnl_series(
        &self,
        range: DateRange,
        granularity: Granularity,
    ) -> AppResult<Vec<PnlRow>> {
        if range.end < range.start {
            return Err(AppError::validation(
                "range",
                "Range end must not precede its start",
            ));
        }

        // Granularity maps to a fixed TO_CHAR pattern, never user text.
        let query = format!(
            r#"
            SELECT TO_CHAR(date, '{}') AS period,
                   COALESCE(SUM(grand_total), 0) AS revenue,
                   COALESCE(SUM(cogs_total), 0) AS cogs
            FROM sales_invoices
            WHERE date >= $1 AND date <= $2
            GROUP BY TO_CHAR(date, '{}')
            ORDER BY period
            "#,
            granularity.pg_format(),
            granularity.pg_format(),
        );

        let rows = sqlx::query_as::<_, PeriodSumRow>(&query)
            .bind(range.start)
            .bind(range.end)
            .fetch_all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| PnlRow::from_sums(r.period, r.revenue, r.cogs))
            .collect())
    }

    /// Sales totals for one day (defaults to today).
    pub async fn daily_sales(&self, date: Option<NaiveDate>) -> AppResult<DailySales> {
        let date = date.unwrap_or_else(|| Utc::now().date_naive());

        let (invoice_count, revenue, cogs) = sqlx::query_as::<_, (i64, Decimal, Decimal)>(
            r#"
            SELECT COUNT(*),
                   COALESCE(SUM(grand_total), 0),
                   COALESCE(SUM(cogs_total), 0)
            FROM sales_invoices
            WHERE date = $1
            "#,
        )
        .bind(date)
        .fetch_one(&self.db)
        .await?;

        Ok(DailySales {
            date,
            invoice_count,
            revenue,
            cogs,
            gross_profit: revenue - cogs,
        })
    }

    /// Revenue and profit for each of the trailing twelve months,
    /// zero-filled so charts always get twelve points.
    pub async fn monthly_profit(&self) -> AppResult<Vec<MonthlyProfitPoint>> {
        let start = trailing_year_start(Utc::now().date_naive());

        let sales = sqlx::query_as::<_, (String, Decimal, Decimal)>(
            r#"
            SELECT TO_CHAR(date, 'YYYY-MM') AS period,
                   COALESCE(SUM(grand_total), 0) AS revenue,
                   COALESCE(SUM(profit), 0) AS profit
            FROM sales_invoices
            WHERE date >= $1
            GROUP BY TO_CHAR(date, 'YYYY-MM')
            "#,
        )
        .bind(start)
        .fetch_all(&self.db)
        .await?;

        let purchases = sqlx::query_as::<_, (String, Decimal)>(
            r#"
            SELECT TO_CHAR(date, 'YYYY-MM') AS period,
                   COALESCE(SUM(grand_total), 0) AS purchases
            FROM purchase_invoices
            WHERE date >= $1
            GROUP BY TO_CHAR(date, 'YYYY-MM')
            "#,
        )
        .bind(start)
        .fetch_all(&self.db)
        .await?;

        let mut series = Vec::with_capacity(12);
        let mut month = start;
        for _ in 0..12 {
            let key = month.format("%Y-%m").to_string();
            let (revenue, profit) = sales
                .iter()
                .find(|(period, _, _)| *period == key)
                .map(|(_, r, p)| (*r, *p))
                .unwrap_or((Decimal::ZERO, Decimal::ZERO));
            let bought = purchases
                .iter()
                .find(|(period, _)| *period == key)
                .map(|(_, b)| *b)
                .unwrap_or(Decimal::ZERO);
            series.push(MonthlyProfitPoint {
                label: month.format("%b %Y").to_string(),
                revenue,
                purchases: bought,
                profit,
            });
            month = next_month(month);
        }

        Ok(series)
    }

    /// Serialize report rows to CSV for download endpoints.
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        let csv_data = String::from_utf8(
            wtr.into_inner()
                .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?,
        )
        .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))?;
        Ok(csv_data)
    }
}

fn calendar_month_of(date: NaiveDate) -> DateRange {
    let start = first_of_month(date);
    let end = next_month(start) - Duration::days(1);
    DateRange { start, end }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    // day 1 of an existing month always exists
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

fn next_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(date)
}

fn previous_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 1 {
        (date.year() - 1, 12)
    } else {
        (date.year(), date.month() - 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(date)
}

/// First day of the oldest month in a trailing twelve-month window.
fn trailing_year_start(today: NaiveDate) -> NaiveDate {
    let mut start = first_of_month(today);
    for _ in 0..11 {
        start = previous_month(start);
    }
    start
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calendar_month_covers_whole_month() {
        let d = NaiveDate::from_ymd_opt(2024, 2, 15).unwrap();
        let range = calendar_month_of(d);
        assert_eq!(range.start, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
        assert_eq!(range.end, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn next_month_rolls_over_year() {
        let d = NaiveDate::from_ymd_opt(2024, 12, 1).unwrap();
        assert_eq!(next_month(d), NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    }

    #[test]
    fn previous_month_rolls_back_year() {
        let d = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        assert_eq!(previous_month(d), NaiveDate::from_ymd_opt(2024, 12, 1).unwrap());
    }

    #[test]
    fn trailing_year_start_on_month_end() {
        // 31-day months must not shorten the window
        let d = NaiveDate::from_ymd_opt(2026, 8, 31).unwrap();
        assert_eq!(
            trailing_year_start(d),
            NaiveDate::from_ymd_opt(2025, 9, 1).unwrap()
        );
    }

    #[test]
    fn trailing_year_start_spans_twelve_months() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(
            trailing_year_start(d),
            NaiveDate::from_ymd_opt(2023, 4, 1).unwrap()
        );
    }
}
