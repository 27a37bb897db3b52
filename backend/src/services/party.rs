//! Customer and supplier master data service.
//!
//! Customers and suppliers share a shape, so one service covers both with
//! the table name fixed per method pair.

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use shared::validation::validate_name;

use crate::error::{AppError, AppResult};
use crate::models::{Customer, Supplier};

/// Party service for customers and suppliers.
#[derive(Clone)]
pub struct PartyService {
    db: PgPool,
}

/// Input for creating or updating a customer or supplier
#[derive(Debug, Deserialize)]
pub struct PartyInput {
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub opening_balance: Option<Decimal>,
}

impl PartyService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn create_customer(&self, input: PartyInput) -> AppResult<Customer> {
        validate_name(&input.name).map_err(|msg| AppError::validation("name", msg))?;

        let customer = sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (name, phone, address, opening_balance)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, phone, address, opening_balance, created_at
            "#,
        )
        .bind(input.name.trim())
        .bind(&input.phone)
        .bind(&input.address)
        .bind(input.opening_balance.unwrap_or(Decimal::ZERO))
        .fetch_one(&self.db)
        .await?;

        Ok(customer)
    }

    pub async fn update_customer(&self, id: Uuid, input: PartyInput) -> AppResult<Customer> {
        validate_name(&input.name).map_err(|msg| AppError::validation("name", msg))?;

        let current = self.get_customer(id).await?;

        let customer = sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers
            SET name = $1, phone = $2, address = $3, opening_balance = $4
            WHERE id = $5
            RETURNING id, name, phone, address, opening_balance, created_at
            "#,
        )
        .bind(input.name.trim())
        .bind(&input.phone)
        .bind(&input.address)
        .bind(input.opening_balance.unwrap_or(current.opening_balance))
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        Ok(customer)
    }

    pub async fn get_customer(&self, id: Uuid) -> AppResult<Customer> {
        sqlx::query_as::<_, Customer>(
            "SELECT id, name, phone, address, opening_balance, created_at \
             FROM customers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Customer".to_string()))
    }

    pub async fn list_customers(&self, q: Option<&str>) -> AppResult<Vec<Customer>> {
        let pattern = search_pattern(q);
        let customers = sqlx::query_as::<_, Customer>(
            "SELECT id, name, phone, address, opening_balance, created_at \
             FROM customers WHERE ($1::text IS NULL OR name ILIKE $1) ORDER BY name",
        )
        .bind(&pattern)
        .fetch_all(&self.db)
        .await?;

        Ok(customers)
    }

    /// Delete a customer without invoices or payments on file.
    pub async fn delete_customer(&self, id: Uuid) -> AppResult<()> {
        let referenced = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM sales_invoices WHERE customer_id = $1)
                OR EXISTS(SELECT 1 FROM customer_payments WHERE customer_id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        if referenced {
            return Err(AppError::validation(
                "id",
                "Customer has invoices or payments and cannot be deleted",
            ));
        }

        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Customer".to_string()));
        }

        Ok(())
    }

    pub async fn create_supplier(&self, input: PartyInput) -> AppResult<Supplier> {
        validate_name(&input.name).map_err(|msg| AppError::validation("name", msg))?;

        let supplier = sqlx::query_as::<_, Supplier>(
            r#"
            INSERT INTO suppliers (name, phone, address, opening_balance)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, phone, address, opening_balance, created_at
            "#,
        )
        .bind(input.name.trim())
        .bind(&input.phone)
        .bind(&input.address)
        .bind(input.opening_balance.unwrap_or(Decimal::ZERO))
        .fetch_one(&self.db)
        .await?;

        Ok(supplier)
    }

    pub async fn update_supplier(&self, id: Uuid, input: PartyInput) -> AppResult<Supplier> {
        validate_name(&input.name).map_err(|msg| AppError::validation("name", msg))?;

        let current = self.get_supplier(id).await?;

        let supplier = sqlx::query_as::<_, Supplier>(
            r#"
            UPDATE suppliers
            SET name = $1, phone = $2, address = $3, opening_balance = $4
            WHERE id = $5
            RETURNING id, name, phone, address, opening_balance, created_at
            "#,
        )
        .bind(input.name.trim())
        .bind(&input.phone)
        .bind(&input.address)
        .bind(input.opening_balance.unwrap_or(current.opening_balance))
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        Ok(supplier)
    }

    pub async fn get_supplier(&self, id: Uuid) -> AppResult<Supplier> {
        sqlx::query_as::<_, Supplier>(
            "SELECT id, name, phone, address, opening_balance, created_at \
             FROM suppliers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Supplier".to_string()))
    }

    pub async fn list_suppliers(&self, q: Option<&str>) -> AppResult<Vec<Supplier>> {
        let pattern = search_pattern(q);
        let suppliers = sqlx::query_as::<_, Supplier>(
            "SELECT id, name, phone, address, opening_balance, created_at \
             FROM suppliers WHERE ($1::text IS NULL OR name ILIKE $1) ORDER BY name",
        )
        .bind(&pattern)
        .fetch_all(&self.db)
        .await?;

        Ok(suppliers)
    }

    /// Delete a supplier without invoices or payments on file.
    pub async fn delete_supplier(&self, id: Uuid) -> AppResult<()> {
        let referenced = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM purchase_invoices WHERE supplier_id = $1)
                OR EXISTS(SELECT 1 FROM supplier_payments WHERE supplier_id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        if referenced {
            return Err(AppError::validation(
                "id",
                "Supplier has invoices or payments and cannot be deleted",
            ));
        }

        let result = sqlx::query("DELETE FROM suppliers WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Supplier".to_string()));
        }

        Ok(())
    }
}

fn search_pattern(q: Option<&str>) -> Option<String> {
    q.map(str::trim)
        .filter(|q| !q.is_empty())
        .map(|q| format!("%{}%", q))
}
