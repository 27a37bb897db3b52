//! HTTP handlers for purchase and sales invoice endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{PurchaseInvoice, SalesInvoice};
use crate::services::invoice::{
    CreatePurchaseInput, CreateSaleInput, InvoiceFilter, InvoiceService, PurchasePage, SalesPage,
};
use crate::services::StockService;
use crate::AppState;

fn invoice_service(state: AppState) -> InvoiceService {
    let stock = StockService::new(state.db.clone(), state.config.valuation.cost_fallback);
    InvoiceService::new(state.db, stock)
}

/// Record a purchase invoice
pub async fn create_purchase(
    State(state): State<AppState>,
    Json(input): Json<CreatePurchaseInput>,
) -> AppResult<(StatusCode, Json<PurchaseInvoice>)> {
    let invoice = invoice_service(state).create_purchase(input).await?;
    Ok((StatusCode::CREATED, Json(invoice)))
}

/// Record a sales invoice
pub async fn create_sale(
    State(state): State<AppState>,
    Json(input): Json<CreateSaleInput>,
) -> AppResult<(StatusCode, Json<SalesInvoice>)> {
    let invoice = invoice_service(state).create_sale(input).await?;
    Ok((StatusCode::CREATED, Json(invoice)))
}

/// Get one purchase invoice with items
pub async fn get_purchase(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<PurchaseInvoice>> {
    let invoice = invoice_service(state).get_purchase(id).await?;
    Ok(Json(invoice))
}

/// Get one sales invoice with items
pub async fn get_sale(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SalesInvoice>> {
    let invoice = invoice_service(state).get_sale(id).await?;
    Ok(Json(invoice))
}

/// List purchase invoices with filters and aggregates
pub async fn list_purchases(
    State(state): State<AppState>,
    Query(filter): Query<InvoiceFilter>,
) -> AppResult<Json<PurchasePage>> {
    let page = invoice_service(state).list_purchases(filter).await?;
    Ok(Json(page))
}

/// List sales invoices with filters and aggregates
pub async fn list_sales(
    State(state): State<AppState>,
    Query(filter): Query<InvoiceFilter>,
) -> AppResult<Json<SalesPage>> {
    let page = invoice_service(state).list_sales(filter).await?;
    Ok(Json(page))
}
