//! Order repository.
//!
//! Order creation happens inside the checkout transaction (see
//! `services::checkout`), so the insert helpers take a `PgConnection`
//! rather than the pool.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::prelude::FromRow;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use cerveceria_core::{AddressId, OrderId, OrderStatus, Pesos, ProductId, UserId};

use super::RepositoryError;
use crate::models::{Order, OrderItem, OrderStats, StatusCount};

#[derive(FromRow)]
struct OrderRow {
    id: OrderId,
    order_number: String,
    user_id: UserId,
    address_id: AddressId,
    subtotal: Pesos,
    iva: Pesos,
    shipping_cost: Pesos,
    total: Pesos,
    status: String,
    payment_method: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Result<Order, RepositoryError> {
        let status = self.status.parse::<OrderStatus>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid order status in database: {e}"))
        })?;

        Ok(Order {
            id: self.id,
            order_number: self.order_number,
            user_id: self.user_id,
            address_id: self.address_id,
            items,
            subtotal: self.subtotal,
            iva: self.iva,
            shipping_cost: self.shipping_cost,
            total: self.total,
            status,
            payment_method: self.payment_method,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(FromRow)]
struct OrderItemRow {
    order_id: OrderId,
    product_id: ProductId,
    product_name: String,
    quantity: i32,
    unit_price: Pesos,
    subtotal: Pesos,
}

#[derive(FromRow)]
struct StatusCountRow {
    status: String,
    count: i64,
}

#[derive(FromRow)]
struct StatsRow {
    total_orders: i64,
    total_revenue: Pesos,
    orders_today: i64,
    orders_this_week: i64,
    orders_this_month: i64,
    average_ticket: Pesos,
}

const ORDER_COLUMNS: &str = "id, order_number, user_id, address_id, subtotal, iva, \
                             shipping_cost, total, status, payment_method, created_at, updated_at";

/// A fully-priced order ready to be inserted at checkout.
#[derive(Debug)]
pub struct NewOrder {
    pub order_number: String,
    pub user_id: UserId,
    pub address_id: AddressId,
    pub subtotal: Pesos,
    pub iva: Pesos,
    pub shipping_cost: Pesos,
    pub total: Pesos,
    pub payment_method: String,
    pub items: Vec<NewOrderItem>,
}

/// A snapshotted line for a new order.
#[derive(Debug)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Pesos,
    pub subtotal: Pesos,
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert an order and its lines inside an existing transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any insert fails.
    pub async fn create_in_tx(
        conn: &mut PgConnection,
        order: &NewOrder,
    ) -> Result<OrderId, RepositoryError> {
        let order_id = sqlx::query_scalar::<_, OrderId>(
            "INSERT INTO orders
                 (order_number, user_id, address_id, subtotal, iva,
                  shipping_cost, total, payment_method)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING id",
        )
        .bind(&order.order_number)
        .bind(order.user_id)
        .bind(order.address_id)
        .bind(order.subtotal)
        .bind(order.iva)
        .bind(order.shipping_cost)
        .bind(order.total)
        .bind(&order.payment_method)
        .fetch_one(&mut *conn)
        .await?;

        for item in &order.items {
            sqlx::query(
                "INSERT INTO order_items
                     (order_id, product_id, product_name, quantity, unit_price, subtotal)
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(order_id)
            .bind(item.product_id)
            .bind(&item.product_name)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.subtotal)
            .execute(&mut *conn)
            .await?;
        }

        Ok(order_id)
    }

    /// Get an order with its lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(row) => {
                let mut items = self.load_items(&[row.id]).await?;
                let items = items.remove(&row.id).unwrap_or_default();
                Ok(Some(row.into_order(items)?))
            }
            None => Ok(None),
        }
    }

    /// List a user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        self.assemble_all(rows).await
    }

    /// List every order, newest first, optionally filtered by status
    /// and creation date range. Both range ends are inclusive.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(
        &self,
        status: Option<OrderStatus>,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders
             WHERE ($1::TEXT IS NULL OR status = $1)
               AND ($2::DATE IS NULL OR created_at >= $2)
               AND ($3::DATE IS NULL OR created_at < $3 + INTERVAL '1 day')
             ORDER BY created_at DESC"
        ))
        .bind(status.map(OrderStatus::as_str))
        .bind(from)
        .bind(to)
        .fetch_all(self.pool)
        .await?;

        self.assemble_all(rows).await
    }

    /// Set an order's status. Transition legality is checked by the caller.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE orders SET status = $2, updated_at = now() WHERE id = $1")
                .bind(id)
                .bind(status.as_str())
                .execute(self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Aggregate sales figures for the admin dashboard.
    ///
    /// Revenue and the average ticket exclude cancelled orders; the
    /// day/week/month counts do not.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn stats(&self) -> Result<OrderStats, RepositoryError> {
        let totals = sqlx::query_as::<_, StatsRow>(
            "SELECT COUNT(*) AS total_orders,
                    COALESCE(SUM(total) FILTER (WHERE status <> 'Cancelado'), 0) AS total_revenue,
                    COUNT(*) FILTER (WHERE created_at >= date_trunc('day', now())) AS orders_today,
                    COUNT(*) FILTER (WHERE created_at >= date_trunc('week', now())) AS orders_this_week,
                    COUNT(*) FILTER (WHERE created_at >= date_trunc('month', now())) AS orders_this_month,
                    COALESCE(ROUND(AVG(total) FILTER (WHERE status <> 'Cancelado')), 0)::BIGINT
                        AS average_ticket
             FROM orders",
        )
        .fetch_one(self.pool)
        .await?;

        let status_rows = sqlx::query_as::<_, StatusCountRow>(
            "SELECT status, COUNT(*) AS count FROM orders GROUP BY status ORDER BY status",
        )
        .fetch_all(self.pool)
        .await?;

        let by_status = status_rows
            .into_iter()
            .map(|row| {
                let status = row.status.parse::<OrderStatus>().map_err(|e| {
                    RepositoryError::DataCorruption(format!(
                        "invalid order status in database: {e}"
                    ))
                })?;
                Ok(StatusCount {
                    status,
                    count: row.count,
                })
            })
            .collect::<Result<Vec<_>, RepositoryError>>()?;

        Ok(OrderStats {
            total_orders: totals.total_orders,
            total_revenue: totals.total_revenue,
            orders_today: totals.orders_today,
            orders_this_week: totals.orders_this_week,
            orders_this_month: totals.orders_this_month,
            average_ticket: totals.average_ticket,
            by_status,
        })
    }

    async fn assemble_all(&self, rows: Vec<OrderRow>) -> Result<Vec<Order>, RepositoryError> {
        let ids: Vec<OrderId> = rows.iter().map(|r| r.id).collect();
        let mut items = self.load_items(&ids).await?;

        rows.into_iter()
            .map(|row| {
                let order_items = items.remove(&row.id).unwrap_or_default();
                row.into_order(order_items)
            })
            .collect()
    }

    async fn load_items(
        &self,
        order_ids: &[OrderId],
    ) -> Result<HashMap<OrderId, Vec<OrderItem>>, RepositoryError> {
        if order_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let raw_ids: Vec<Uuid> = order_ids.iter().map(OrderId::as_uuid).collect();
        let rows = sqlx::query_as::<_, OrderItemRow>(
            "SELECT order_id, product_id, product_name, quantity, unit_price, subtotal
             FROM order_items
             WHERE order_id = ANY($1)
             ORDER BY product_name",
        )
        .bind(raw_ids)
        .fetch_all(self.pool)
        .await?;

        let mut grouped: HashMap<OrderId, Vec<OrderItem>> = HashMap::new();
        for row in rows {
            grouped.entry(row.order_id).or_default().push(OrderItem {
                product_id: row.product_id,
                product_name: row.product_name,
                quantity: row.quantity,
                unit_price: row.unit_price,
                subtotal: row.subtotal,
            });
        }
        Ok(grouped)
    }
}
