//! HTTP handlers for payment endpoints

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use crate::error::AppResult;
use crate::models::{CustomerPayment, SupplierPayment};
use crate::services::payment::{PaymentFilter, PaymentInput, PaymentService};
use crate::AppState;

/// Record a payment received from a customer
pub async fn record_customer_payment(
    State(state): State<AppState>,
    Json(input): Json<PaymentInput>,
) -> AppResult<(StatusCode, Json<CustomerPayment>)> {
    let service = PaymentService::new(state.db);
    let payment = service.record_customer_payment(input).await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

/// Record a payment made to a supplier
pub async fn record_supplier_payment(
    State(state): State<AppState>,
    Json(input): Json<PaymentInput>,
) -> AppResult<(StatusCode, Json<SupplierPayment>)> {
    let service = PaymentService::new(state.db);
    let payment = service.record_supplier_payment(input).await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

/// List customer payments
pub async fn list_customer_payments(
    State(state): State<AppState>,
    Query(filter): Query<PaymentFilter>,
) -> AppResult<Json<Vec<CustomerPayment>>> {
    let service = PaymentService::new(state.db);
    let payments = service.list_customer_payments(filter).await?;
    Ok(Json(payments))
}

/// List supplier payments
pub async fn list_supplier_payments(
    State(state): State<AppState>,
    Query(filter): Query<PaymentFilter>,
) -> AppResult<Json<Vec<SupplierPayment>>> {
    let service = PaymentService::new(state.db);
    let payments = service.list_supplier_payments(filter).await?;
    Ok(Json(payments))
}
