//! Product and category catalog service.

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use shared::validation::{validate_amount, validate_name};

use crate::error::{AppError, AppResult};
use crate::models::{Category, Product};

/// Catalog service for products and categories.
#[derive(Clone)]
pub struct CatalogService {
    db: PgPool,
}

/// Input for creating a product
#[derive(Debug, Deserialize)]
pub struct CreateProductInput {
    pub name: String,
    pub unit: Option<String>,
    pub price: Option<Decimal>,
    pub category_id: Option<Uuid>,
}

/// Input for updating a product; absent fields keep their value
#[derive(Debug, Deserialize)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub unit: Option<String>,
    pub price: Option<Decimal>,
    pub category_id: Option<Uuid>,
}

/// Input for creating or renaming a category
#[derive(Debug, Deserialize)]
pub struct CategoryInput {
    pub name: String,
    pub note: Option<String>,
}

const PRODUCT_COLUMNS: &str = r#"
    p.id, p.name, p.unit, p.price, p.stock, p.category_id,
    c.name AS category_name, p.created_at
"#;

impl CatalogService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn create_product(&self, input: CreateProductInput) -> AppResult<Product> {
        validate_name(&input.name).map_err(|msg| AppError::validation("name", msg))?;
        let price = input.price.unwrap_or(Decimal::ZERO);
        validate_amount(price).map_err(|msg| AppError::validation("price", msg))?;

        if let Some(category_id) = input.category_id {
            self.get_category(category_id).await?;
        }

        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO products (name, unit, price, category_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(input.name.trim())
        .bind(input.unit.unwrap_or_default())
        .bind(price)
        .bind(input.category_id)
        .fetch_one(&self.db)
        .await?;

        self.get_product(id).await
    }

    pub async fn update_product(&self, id: Uuid, input: UpdateProductInput) -> AppResult<Product> {
        let current = self.get_product(id).await?;

        let name = match input.name {
            Some(name) => {
                validate_name(&name).map_err(|msg| AppError::validation("name", msg))?;
                name.trim().to_string()
            }
            None => current.name,
        };
        let price = match input.price {
            Some(price) => {
                validate_amount(price).map_err(|msg| AppError::validation("price", msg))?;
                price
            }
            None => current.price,
        };
        let unit = input.unit.unwrap_or(current.unit);
        let category_id = match input.category_id {
            Some(cid) => {
                self.get_category(cid).await?;
                Some(cid)
            }
            None => current.category_id,
        };

        sqlx::query(
            "UPDATE products SET name = $1, unit = $2, price = $3, category_id = $4 WHERE id = $5",
        )
        .bind(&name)
        .bind(&unit)
        .bind(price)
        .bind(category_id)
        .bind(id)
        .execute(&self.db)
        .await?;

        self.get_product(id).await
    }

    pub async fn get_product(&self, id: Uuid) -> AppResult<Product> {
        let query = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products p \
             LEFT JOIN categories c ON c.id = p.category_id WHERE p.id = $1"
        );
        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Product".to_string()))
    }

    /// List products, optionally filtered by name match or category.
    pub async fn list_products(
        &self,
        q: Option<&str>,
        category_id: Option<Uuid>,
    ) -> AppResult<Vec<Product>> {
        let pattern = q
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(|q| format!("%{}%", q));

        let query = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products p \
             LEFT JOIN categories c ON c.id = p.category_id \
             WHERE ($1::text IS NULL OR p.name ILIKE $1) \
               AND ($2::uuid IS NULL OR p.category_id = $2) \
             ORDER BY p.name"
        );
        let products = sqlx::query_as::<_, Product>(&query)
            .bind(&pattern)
            .bind(category_id)
            .fetch_all(&self.db)
            .await?;

        Ok(products)
    }

    /// Delete a product. Refused while any invoice line references it.
    pub async fn delete_product(&self, id: Uuid) -> AppResult<()> {
        let referenced = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(SELECT 1 FROM purchase_invoice_items WHERE product_id = $1)
                OR EXISTS(SELECT 1 FROM sales_invoice_items WHERE product_id = $1)
            "#,
        )
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        if referenced {
            return Err(AppError::validation(
                "id",
                "Product is referenced by invoices and cannot be deleted",
            ));
        }

        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Product".to_string()));
        }

        Ok(())
    }

    pub async fn create_category(&self, input: CategoryInput) -> AppResult<Category> {
        validate_name(&input.name).map_err(|msg| AppError::validation("name", msg))?;

        let existing = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM categories WHERE name = $1",
        )
        .bind(input.name.trim())
        .fetch_one(&self.db)
        .await?;
        if existing > 0 {
            return Err(AppError::DuplicateEntry("category name".to_string()));
        }

        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, note)
            VALUES ($1, $2)
            RETURNING id, name, note, created_at
            "#,
        )
        .bind(input.name.trim())
        .bind(&input.note)
        .fetch_one(&self.db)
        .await?;

        Ok(category)
    }

    pub async fn update_category(&self, id: Uuid, input: CategoryInput) -> AppResult<Category> {
        validate_name(&input.name).map_err(|msg| AppError::validation("name", msg))?;

        let category = sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories SET name = $1, note = $2
            WHERE id = $3
            RETURNING id, name, note, created_at
            "#,
        )
        .bind(input.name.trim())
        .bind(&input.note)
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Category".to_string()))?;

        Ok(category)
    }

    pub async fn get_category(&self, id: Uuid) -> AppResult<Category> {
        sqlx::query_as::<_, Category>(
            "SELECT id, name, note, created_at FROM categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Category".to_string()))
    }

    pub async fn list_categories(&self) -> AppResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, note, created_at FROM categories ORDER BY name",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(categories)
    }

    /// Delete a category; products keep existing and lose the link.
    pub async fn delete_category(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Category".to_string()));
        }

        Ok(())
    }
}
