//! Review repository.
//!
//! The product's denormalized rating aggregates are recomputed in the same
//! transaction as any review write.

use chrono::{DateTime, Utc};
use sqlx::prelude::FromRow;
use sqlx::{PgConnection, PgPool};

use cerveceria_core::{ProductId, ReviewId, UserId};

use super::RepositoryError;
use crate::models::Review;

#[derive(FromRow)]
struct ReviewRow {
    id: ReviewId,
    user_id: UserId,
    user_name: String,
    product_id: ProductId,
    rating: i32,
    comment: Option<String>,
    verified: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            user_name: row.user_name,
            product_id: row.product_id,
            rating: row.rating,
            comment: row.comment,
            verified: row.verified,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

const REVIEW_SELECT: &str = "SELECT r.id, r.user_id, u.name AS user_name, r.product_id, \
                             r.rating, r.comment, r.verified, r.created_at, r.updated_at \
                             FROM reviews r JOIN users u ON u.id = r.user_id";

/// Repository for review database operations.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a review and refresh the product's rating aggregates.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user already reviewed
    /// this product.
    pub async fn create(
        &self,
        user_id: UserId,
        product_id: ProductId,
        rating: i32,
        comment: Option<&str>,
        verified: bool,
    ) -> Result<Review, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let review_id = sqlx::query_scalar::<_, ReviewId>(
            "INSERT INTO reviews (user_id, product_id, rating, comment, verified)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id",
        )
        .bind(user_id)
        .bind(product_id)
        .bind(rating)
        .bind(comment)
        .bind(verified)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if RepositoryError::is_unique_violation(&e) {
                RepositoryError::Conflict("product already reviewed by this user".to_string())
            } else {
                RepositoryError::Database(e)
            }
        })?;

        Self::refresh_product_rating(&mut tx, product_id).await?;
        tx.commit().await?;

        self.get(review_id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Get a review by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ReviewId) -> Result<Option<Review>, RepositoryError> {
        let row = sqlx::query_as::<_, ReviewRow>(&format!("{REVIEW_SELECT} WHERE r.id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Review::from))
    }

    /// List a product's reviews, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_product(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<Review>, RepositoryError> {
        let rows = sqlx::query_as::<_, ReviewRow>(&format!(
            "{REVIEW_SELECT} WHERE r.product_id = $1 ORDER BY r.created_at DESC"
        ))
        .bind(product_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Review::from).collect())
    }

    /// Update a review's rating and comment, refreshing the aggregates.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review does not exist.
    pub async fn update(
        &self,
        id: ReviewId,
        rating: i32,
        comment: Option<&str>,
    ) -> Result<Review, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let product_id = sqlx::query_scalar::<_, ProductId>(
            "UPDATE reviews
             SET rating = $2, comment = $3, updated_at = now()
             WHERE id = $1
             RETURNING product_id",
        )
        .bind(id)
        .bind(rating)
        .bind(comment)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Self::refresh_product_rating(&mut tx, product_id).await?;
        tx.commit().await?;

        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Delete a review and refresh the aggregates.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review does not exist.
    pub async fn delete(&self, id: ReviewId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let product_id = sqlx::query_scalar::<_, ProductId>(
            "DELETE FROM reviews WHERE id = $1 RETURNING product_id",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Self::refresh_product_rating(&mut tx, product_id).await?;
        tx.commit().await?;

        Ok(())
    }

    /// Whether the user has a non-cancelled order containing the product.
    ///
    /// Used to set the `verified` flag on new reviews.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn has_purchase(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<bool, RepositoryError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (
                 SELECT 1
                 FROM orders o
                 JOIN order_items oi ON oi.order_id = o.id
                 WHERE o.user_id = $1 AND oi.product_id = $2 AND o.status <> 'Cancelado'
             )",
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_one(self.pool)
        .await?;

        Ok(exists)
    }

    async fn refresh_product_rating(
        conn: &mut PgConnection,
        product_id: ProductId,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "UPDATE products p
             SET rating_avg = agg.avg, rating_count = agg.count, updated_at = now()
             FROM (
                 SELECT COALESCE(AVG(rating), 0)::DOUBLE PRECISION AS avg,
                        COUNT(*)::INT AS count
                 FROM reviews WHERE product_id = $1
             ) agg
             WHERE p.id = $1",
        )
        .bind(product_id)
        .execute(conn)
        .await?;

        Ok(())
    }
}
