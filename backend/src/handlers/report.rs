//! HTTP handlers for financial reports

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use shared::reporting::{BalanceSheet, PnlRow};
use shared::types::{DateRange, Granularity};

use crate::error::{AppError, AppResult};
use crate::services::report::{DailySales, MonthlyProfitPoint, ReportService};
use crate::services::StockService;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct BalanceSheetQuery {
    pub as_of: Option<NaiveDate>,
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PnlQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub granularity: Granularity,
}

#[derive(Debug, Default, Deserialize)]
pub struct DailySalesQuery {
    pub date: Option<NaiveDate>,
}

fn report_service(state: AppState) -> ReportService {
    let stock = StockService::new(state.db.clone(), state.config.valuation.cost_fallback);
    ReportService::new(state.db, stock)
}

/// Balance sheet snapshot
pub async fn balance_sheet(
    State(state): State<AppState>,
    Query(query): Query<BalanceSheetQuery>,
) -> AppResult<Json<BalanceSheet>> {
    let period = match (query.period_start, query.period_end) {
        (Some(start), Some(end)) => Some(DateRange { start, end }),
        (None, None) => None,
        _ => {
            return Err(AppError::validation(
                "period",
                "period_start and period_end must be given together",
            ))
        }
    };
    let sheet = report_service(state)
        .balance_sheet(query.as_of, period)
        .await?;
    Ok(Json(sheet))
}

/// P&L series grouped by day, month, or year
pub async fn pnl(
    State(state): State<AppState>,
    Query(query): Query<PnlQuery>,
) -> AppResult<Json<Vec<PnlRow>>> {
    let range = DateRange::close_open_ends(
        query.start_date,
        query.end_date,
        Utc::now().date_naive(),
    );
    let series = report_service(state)
        .pnl_series(range, query.granularity)
        .await?;
    Ok(Json(series))
}

/// One day's sales totals
pub async fn daily_sales(
    State(state): State<AppState>,
    Query(query): Query<DailySalesQuery>,
) -> AppResult<Json<DailySales>> {
    let summary = report_service(state).daily_sales(query.date).await?;
    Ok(Json(summary))
}

/// Trailing twelve months of revenue and profit
pub async fn monthly_profit(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<MonthlyProfitPoint>>> {
    let series = report_service(state).monthly_profit().await?;
    Ok(Json(series))
}
