//! Checkout: turn a cart into an order.
//!
//! The whole operation runs in one transaction: stock validation, the
//! order insert, stock decrements, and the cart clear all commit or roll
//! back together. Product rows are locked for the duration so concurrent
//! checkouts cannot oversell.

use chrono::Utc;
use sqlx::PgPool;
use sqlx::prelude::FromRow;
use thiserror::Error;

use cerveceria_core::{AddressId, CartId, Pesos, ProductId, UserId};

use crate::db::orders::{NewOrder, NewOrderItem};
use crate::db::{CartRepository, OrderRepository, RepositoryError};
use crate::models::Order;

/// Errors that can occur while placing an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The cart has no lines.
    #[error("cart is empty")]
    EmptyCart,

    /// The chosen address does not belong to the user.
    #[error("address not found")]
    AddressNotFound,

    /// A line asks for more units than are in stock.
    #[error("insufficient stock for {product}")]
    InsufficientStock { product: String },

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for CheckoutError {
    fn from(e: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(e))
    }
}

#[derive(FromRow)]
struct CheckoutLine {
    product_id: ProductId,
    product_name: String,
    quantity: i32,
    price: Pesos,
    stock: i32,
}

/// Checkout service.
pub struct CheckoutService<'a> {
    pool: &'a PgPool,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Place an order from the user's cart.
    ///
    /// Lines are priced at the unit price snapshotted on the cart line
    /// when the product was added. Shipping is free at or above the
    /// threshold in `cerveceria_core::types::money`.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` if the cart has no lines,
    /// `CheckoutError::AddressNotFound` if the address isn't the user's,
    /// and `CheckoutError::InsufficientStock` naming the first product
    /// that cannot be fulfilled.
    pub async fn place_order(
        &self,
        user_id: UserId,
        address_id: AddressId,
        payment_method: &str,
    ) -> Result<Order, CheckoutError> {
        let mut tx = self.pool.begin().await?;

        let address_ok = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM addresses WHERE id = $1 AND user_id = $2)",
        )
        .bind(address_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;
        if !address_ok {
            return Err(CheckoutError::AddressNotFound);
        }

        let cart_id = sqlx::query_scalar::<_, CartId>("SELECT id FROM carts WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(CheckoutError::EmptyCart)?;

        // Lock the product rows so stock checks hold until commit.
        let lines = sqlx::query_as::<_, CheckoutLine>(
            "SELECT ci.product_id, p.name AS product_name, ci.quantity,
                    ci.unit_price AS price, p.stock
             FROM cart_items ci
             JOIN products p ON p.id = ci.product_id
             WHERE ci.cart_id = $1 AND p.active
             ORDER BY p.name
             FOR UPDATE OF p",
        )
        .bind(cart_id)
        .fetch_all(&mut *tx)
        .await?;

        if lines.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        for line in &lines {
            if line.stock < line.quantity {
                return Err(CheckoutError::InsufficientStock {
                    product: line.product_name.clone(),
                });
            }
        }

        let items: Vec<NewOrderItem> = lines
            .iter()
            .map(|line| NewOrderItem {
                product_id: line.product_id,
                product_name: line.product_name.clone(),
                quantity: line.quantity,
                unit_price: line.price,
                subtotal: line.price.times(i64::from(line.quantity)),
            })
            .collect();

        let subtotal: Pesos = items.iter().map(|item| item.subtotal).sum();
        let iva = subtotal.iva();
        let shipping_cost = subtotal.shipping();
        let total = subtotal.saturating_add(iva).saturating_add(shipping_cost);

        let order = NewOrder {
            order_number: format!("ORD-{}", Utc::now().timestamp_millis()),
            user_id,
            address_id,
            subtotal,
            iva,
            shipping_cost,
            total,
            payment_method: payment_method.to_string(),
            items,
        };

        let order_id = OrderRepository::create_in_tx(&mut tx, &order).await?;

        for line in &lines {
            sqlx::query("UPDATE products SET stock = stock - $2, updated_at = now() WHERE id = $1")
                .bind(line.product_id)
                .bind(line.quantity)
                .execute(&mut *tx)
                .await?;
        }

        CartRepository::clear_in_tx(&mut tx, cart_id).await?;
        tx.commit().await?;

        OrderRepository::new(self.pool)
            .get(order_id)
            .await?
            .ok_or(CheckoutError::Repository(RepositoryError::NotFound))
    }
}
