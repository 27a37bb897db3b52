//! HTTP handlers for stock valuation and maintenance endpoints

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::CurrentUser;
use crate::services::{ReportService, StockService};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ValuationQuery {
    pub as_of: Option<NaiveDate>,
}

fn stock_service(state: &AppState) -> StockService {
    StockService::new(state.db.clone(), state.config.valuation.cost_fallback)
}

/// Inventory valuation, optionally as of a past date
pub async fn valuation(
    State(state): State<AppState>,
    Query(query): Query<ValuationQuery>,
) -> AppResult<Json<crate::services::stock::ValuationSummary>> {
    let summary = stock_service(&state).valuation(query.as_of).await?;
    Ok(Json(summary))
}

/// Inventory valuation as CSV download
pub async fn valuation_csv(
    State(state): State<AppState>,
    Query(query): Query<ValuationQuery>,
) -> AppResult<impl IntoResponse> {
    let summary = stock_service(&state).valuation(query.as_of).await?;
    let csv = ReportService::export_to_csv(&summary.products)?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"valuation.csv\"",
            ),
        ],
        csv,
    ))
}

/// Rebuild the denormalized per-product stock caches (admin only)
pub async fn reconcile(
    State(state): State<AppState>,
    current_user: CurrentUser,
) -> AppResult<(StatusCode, Json<crate::services::stock::ReconcileReport>)> {
    if !current_user.0.is_admin() {
        return Err(AppError::InsufficientPermissions);
    }
    let report = stock_service(&state).reconcile_stock_totals().await?;
    Ok((StatusCode::OK, Json(report)))
}
