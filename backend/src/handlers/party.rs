//! HTTP handlers for customer and supplier endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{Customer, Supplier};
use crate::services::party::{PartyInput, PartyService};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct PartyListQuery {
    pub q: Option<String>,
}

/// Create a customer
pub async fn create_customer(
    State(state): State<AppState>,
    Json(input): Json<PartyInput>,
) -> AppResult<(StatusCode, Json<Customer>)> {
    let service = PartyService::new(state.db);
    let customer = service.create_customer(input).await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

/// Update a customer
pub async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<PartyInput>,
) -> AppResult<Json<Customer>> {
    let service = PartyService::new(state.db);
    let customer = service.update_customer(id, input).await?;
    Ok(Json(customer))
}

/// Get one customer
pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Customer>> {
    let service = PartyService::new(state.db);
    let customer = service.get_customer(id).await?;
    Ok(Json(customer))
}

/// List customers with optional name search
pub async fn list_customers(
    State(state): State<AppState>,
    Query(query): Query<PartyListQuery>,
) -> AppResult<Json<Vec<Customer>>> {
    let service = PartyService::new(state.db);
    let customers = service.list_customers(query.q.as_deref()).await?;
    Ok(Json(customers))
}

/// Delete a customer
pub async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = PartyService::new(state.db);
    service.delete_customer(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Create a supplier
pub async fn create_supplier(
    State(state): State<AppState>,
    Json(input): Json<PartyInput>,
) -> AppResult<(StatusCode, Json<Supplier>)> {
    let service = PartyService::new(state.db);
    let supplier = service.create_supplier(input).await?;
    Ok((StatusCode::CREATED, Json(supplier)))
}

/// Update a supplier
pub async fn update_supplier(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<PartyInput>,
) -> AppResult<Json<Supplier>> {
    let service = PartyService::new(state.db);
    let supplier = service.update_supplier(id, input).await?;
    Ok(Json(supplier))
}

/// Get one supplier
pub async fn get_supplier(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Supplier>> {
    let service = PartyService::new(state.db);
    let supplier = service.get_supplier(id).await?;
    Ok(Json(supplier))
}

/// List suppliers with optional name search
pub async fn list_suppliers(
    State(state): State<AppState>,
    Query(query): Query<PartyListQuery>,
) -> AppResult<Json<Vec<Supplier>>> {
    let service = PartyService::new(state.db);
    let suppliers = service.list_suppliers(query.q.as_deref()).await?;
    Ok(Json(suppliers))
}

/// Delete a supplier
pub async fn delete_supplier(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let service = PartyService::new(state.db);
    service.delete_supplier(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
