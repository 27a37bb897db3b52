//! HTTP handlers for party ledger statements

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::services::ledger::{LedgerService, LedgerWindow, PartyStatement};
use crate::AppState;

/// Customer ledger statement
pub async fn customer_statement(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(window): Query<LedgerWindow>,
) -> AppResult<Json<PartyStatement>> {
    let service = LedgerService::new(state.db);
    let statement = service.customer_statement(id, window).await?;
    Ok(Json(statement))
}

/// Supplier ledger statement
pub async fn supplier_statement(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(window): Query<LedgerWindow>,
) -> AppResult<Json<PartyStatement>> {
    let service = LedgerService::new(state.db);
    let statement = service.supplier_statement(id, window).await?;
    Ok(Json(statement))
}
