//! Cart repository.
//!
//! Carts are created lazily: every read goes through `get_or_create`.
//! Denormalized totals on the cart row are recomputed inside the same
//! transaction as any line mutation.

use chrono::{DateTime, Utc};
use sqlx::prelude::FromRow;
use sqlx::{PgConnection, PgPool};

use cerveceria_core::{CartId, CartItemId, Pesos, ProductId, UserId};

use super::RepositoryError;
use crate::models::{Cart, CartItem};

#[derive(FromRow)]
struct CartRow {
    id: CartId,
    user_id: UserId,
    subtotal: Pesos,
    iva: Pesos,
    total: Pesos,
    item_count: i32,
    updated_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct CartItemRow {
    id: CartItemId,
    product_id: ProductId,
    product_name: String,
    product_image: Option<String>,
    quantity: i32,
    unit_price: Pesos,
    subtotal: Pesos,
}

impl From<CartItemRow> for CartItem {
    fn from(row: CartItemRow) -> Self {
        Self {
            id: row.id,
            product_id: row.product_id,
            product_name: row.product_name,
            product_image: row.product_image,
            quantity: row.quantity,
            unit_price: row.unit_price,
            subtotal: row.subtotal,
        }
    }
}

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the user's cart, creating an empty one if none exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_or_create(&self, user_id: UserId) -> Result<Cart, RepositoryError> {
        let row = sqlx::query_as::<_, CartRow>(
            "INSERT INTO carts (user_id) VALUES ($1)
             ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
             RETURNING id, user_id, subtotal, iva, total, item_count, updated_at",
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        let items = self.load_items(row.id).await?;
        Ok(assemble(row, items))
    }

    /// Add a quantity of a product to the user's cart.
    ///
    /// Existing lines for the same product accumulate. The unit price is
    /// snapshotted when the line is first created and kept on merge, so a
    /// catalog price change never silently reprices a cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn add_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
        unit_price: Pesos,
    ) -> Result<Cart, RepositoryError> {
        let cart = self.get_or_create(user_id).await?;
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO cart_items (cart_id, product_id, quantity, unit_price, subtotal)
             VALUES ($1, $2, $3, $4, $4 * $3)
             ON CONFLICT (cart_id, product_id) DO UPDATE
             SET quantity = cart_items.quantity + EXCLUDED.quantity,
                 subtotal = cart_items.unit_price * (cart_items.quantity + EXCLUDED.quantity)",
        )
        .bind(cart.id)
        .bind(product_id)
        .bind(quantity)
        .bind(unit_price)
        .execute(&mut *tx)
        .await?;

        Self::recompute_totals(&mut tx, cart.id).await?;
        tx.commit().await?;

        self.load(cart.id).await
    }

    /// Set the quantity of an existing line, keeping its snapshotted
    /// unit price.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product is not in the cart.
    pub async fn set_item_quantity(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<Cart, RepositoryError> {
        let cart = self.get_or_create(user_id).await?;
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE cart_items
             SET quantity = $3, subtotal = unit_price * $3
             WHERE cart_id = $1 AND product_id = $2",
        )
        .bind(cart.id)
        .bind(product_id)
        .bind(quantity)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Self::recompute_totals(&mut tx, cart.id).await?;
        tx.commit().await?;

        self.load(cart.id).await
    }

    /// Remove a product's line from the user's cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product is not in the cart.
    pub async fn remove_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<Cart, RepositoryError> {
        let cart = self.get_or_create(user_id).await?;
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM cart_items WHERE cart_id = $1 AND product_id = $2")
            .bind(cart.id)
            .bind(product_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Self::recompute_totals(&mut tx, cart.id).await?;
        tx.commit().await?;

        self.load(cart.id).await
    }

    /// Remove every line from the user's cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear(&self, user_id: UserId) -> Result<Cart, RepositoryError> {
        let cart = self.get_or_create(user_id).await?;
        let mut tx = self.pool.begin().await?;

        Self::clear_in_tx(&mut tx, cart.id).await?;
        tx.commit().await?;

        self.load(cart.id).await
    }

    /// Clear a cart inside an existing transaction (used by checkout).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear_in_tx(
        conn: &mut PgConnection,
        cart_id: CartId,
    ) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
            .bind(cart_id)
            .execute(&mut *conn)
            .await?;
        Self::recompute_totals(conn, cart_id).await?;
        Ok(())
    }

    /// Load a cart with its lines by cart ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the cart does not exist.
    pub async fn load(&self, cart_id: CartId) -> Result<Cart, RepositoryError> {
        let row = sqlx::query_as::<_, CartRow>(
            "SELECT id, user_id, subtotal, iva, total, item_count, updated_at
             FROM carts WHERE id = $1",
        )
        .bind(cart_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        let items = self.load_items(cart_id).await?;
        Ok(assemble(row, items))
    }

    async fn load_items(&self, cart_id: CartId) -> Result<Vec<CartItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartItemRow>(
            "SELECT ci.id, ci.product_id, p.name AS product_name, p.image AS product_image,
                    ci.quantity, ci.unit_price, ci.subtotal
             FROM cart_items ci
             JOIN products p ON p.id = ci.product_id
             WHERE ci.cart_id = $1
             ORDER BY ci.created_at",
        )
        .bind(cart_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(CartItem::from).collect())
    }

    /// Recompute the denormalized totals from the lines.
    ///
    /// IVA is rounded half-up, matching `Pesos::iva`. `item_count` counts
    /// lines, not units.
    async fn recompute_totals(
        conn: &mut PgConnection,
        cart_id: CartId,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "UPDATE carts c
             SET subtotal = agg.subtotal,
                 iva = (agg.subtotal * 19 + 50) / 100,
                 total = agg.subtotal + (agg.subtotal * 19 + 50) / 100,
                 item_count = agg.item_count,
                 updated_at = now()
             FROM (
                 SELECT COALESCE(SUM(subtotal), 0) AS subtotal,
                        COUNT(*)::INT AS item_count
                 FROM cart_items WHERE cart_id = $1
             ) agg
             WHERE c.id = $1",
        )
        .bind(cart_id)
        .execute(conn)
        .await?;

        Ok(())
    }
}

fn assemble(row: CartRow, items: Vec<CartItem>) -> Cart {
    Cart {
        id: row.id,
        user_id: row.user_id,
        items,
        subtotal: row.subtotal,
        iva: row.iva,
        total: row.total,
        item_count: row.item_count,
        updated_at: row.updated_at,
    }
}
