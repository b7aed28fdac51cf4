//! Product catalog repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::prelude::FromRow;

use cerveceria_core::{BeerStyle, Pesos, ProductId};

use super::RepositoryError;
use crate::models::Product;

#[derive(FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    style: String,
    description: String,
    price: Pesos,
    stock: i32,
    abv: f64,
    ibu: i32,
    format: String,
    image: Option<String>,
    rating_avg: f64,
    rating_count: i32,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProductRow {
    fn into_product(self) -> Result<Product, RepositoryError> {
        let style = self.style.parse::<BeerStyle>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid beer style in database: {e}"))
        })?;

        Ok(Product {
            id: self.id,
            name: self.name,
            style,
            description: self.description,
            price: self.price,
            stock: self.stock,
            abv: self.abv,
            ibu: self.ibu,
            format: self.format,
            image: self.image,
            rating_avg: self.rating_avg,
            rating_count: self.rating_count,
            active: self.active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const PRODUCT_COLUMNS: &str = "id, name, style, description, price, stock, abv, ibu, format, \
                               image, rating_avg, rating_count, active, created_at, updated_at";

/// Fields for creating a product.
#[derive(Debug)]
pub struct NewProduct {
    pub name: String,
    pub style: BeerStyle,
    pub description: String,
    pub price: Pesos,
    pub stock: i32,
    pub abv: f64,
    pub ibu: i32,
    pub format: String,
}

/// Partial update for a product. `None` leaves a field unchanged.
#[derive(Debug, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub style: Option<BeerStyle>,
    pub description: Option<String>,
    pub price: Option<Pesos>,
    pub stock: Option<i32>,
    pub abv: Option<f64>,
    pub ibu: Option<i32>,
    pub format: Option<String>,
    pub image: Option<String>,
    pub active: Option<bool>,
}

/// Catalog list filters. `None` means unfiltered.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProductFilter {
    pub style: Option<BeerStyle>,
    pub price_min: Option<Pesos>,
    pub price_max: Option<Pesos>,
    pub abv_min: Option<f64>,
    pub abv_max: Option<f64>,
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List active products matching the filter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn list(&self, filter: ProductFilter) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products
             WHERE active
               AND ($1::TEXT IS NULL OR style = $1)
               AND ($2::BIGINT IS NULL OR price >= $2)
               AND ($3::BIGINT IS NULL OR price <= $3)
               AND ($4::DOUBLE PRECISION IS NULL OR abv >= $4)
               AND ($5::DOUBLE PRECISION IS NULL OR abv <= $5)
             ORDER BY name"
        ))
        .bind(filter.style.map(BeerStyle::as_str))
        .bind(filter.price_min)
        .bind(filter.price_max)
        .bind(filter.abv_min)
        .bind(filter.abv_max)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(ProductRow::into_product).collect()
    }

    /// Search active products by name or description, case-insensitive.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search(&self, query: &str) -> Result<Vec<Product>, RepositoryError> {
        let pattern = format!("%{}%", query.replace('%', "\\%").replace('_', "\\_"));
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products
             WHERE active AND (name ILIKE $1 OR description ILIKE $1)
             ORDER BY name"
        ))
        .bind(pattern)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(ProductRow::into_product).collect()
    }

    /// Get a product by ID, active or not.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(ProductRow::into_product).transpose()
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, product: NewProduct) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "INSERT INTO products (name, style, description, price, stock, abv, ibu, format)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&product.name)
        .bind(product.style.as_str())
        .bind(&product.description)
        .bind(product.price)
        .bind(product.stock)
        .bind(product.abv)
        .bind(product.ibu)
        .bind(&product.format)
        .fetch_one(self.pool)
        .await?;

        row.into_product()
    }

    /// Apply a partial update to a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn update(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "UPDATE products
             SET name = COALESCE($2, name),
                 style = COALESCE($3, style),
                 description = COALESCE($4, description),
                 price = COALESCE($5, price),
                 stock = COALESCE($6, stock),
                 abv = COALESCE($7, abv),
                 ibu = COALESCE($8, ibu),
                 format = COALESCE($9, format),
                 image = COALESCE($10, image),
                 active = COALESCE($11, active),
                 updated_at = now()
             WHERE id = $1
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .bind(&patch.name)
        .bind(patch.style.map(BeerStyle::as_str))
        .bind(&patch.description)
        .bind(patch.price)
        .bind(patch.stock)
        .bind(patch.abv)
        .bind(patch.ibu)
        .bind(&patch.format)
        .bind(&patch.image)
        .bind(patch.active)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.into_product()
    }

    /// Soft-delete a product by clearing its `active` flag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn soft_delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE products SET active = FALSE, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

}
