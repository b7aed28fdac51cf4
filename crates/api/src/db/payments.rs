//! Payment repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::prelude::FromRow;

use cerveceria_core::{OrderId, PaymentId, PaymentStatus, Pesos};

use super::RepositoryError;
use crate::models::Payment;

#[derive(FromRow)]
struct PaymentRow {
    id: PaymentId,
    order_id: OrderId,
    token: Option<String>,
    flow_order: Option<i64>,
    amount: Pesos,
    method: String,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PaymentRow {
    fn into_payment(self) -> Result<Payment, RepositoryError> {
        let status = self.status.parse::<PaymentStatus>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid payment status in database: {e}"))
        })?;

        Ok(Payment {
            id: self.id,
            order_id: self.order_id,
            token: self.token,
            flow_order: self.flow_order,
            amount: self.amount,
            method: self.method,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const PAYMENT_COLUMNS: &str =
    "id, order_id, token, flow_order, amount, method, status, created_at, updated_at";

/// Repository for payment database operations.
pub struct PaymentRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> PaymentRepository<'a> {
    /// Create a new payment repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record a pending payment for an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(
        &self,
        order_id: OrderId,
        amount: Pesos,
        method: &str,
    ) -> Result<Payment, RepositoryError> {
        let row = sqlx::query_as::<_, PaymentRow>(&format!(
            "INSERT INTO payments (order_id, amount, method)
             VALUES ($1, $2, $3)
             RETURNING {PAYMENT_COLUMNS}"
        ))
        .bind(order_id)
        .bind(amount)
        .bind(method)
        .fetch_one(self.pool)
        .await?;

        row.into_payment()
    }

    /// Attach the gateway's token and order number once Flow responds.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the payment does not exist.
    pub async fn set_gateway_refs(
        &self,
        id: PaymentId,
        token: &str,
        flow_order: Option<i64>,
    ) -> Result<Payment, RepositoryError> {
        let row = sqlx::query_as::<_, PaymentRow>(&format!(
            "UPDATE payments
             SET token = $2, flow_order = $3, updated_at = now()
             WHERE id = $1
             RETURNING {PAYMENT_COLUMNS}"
        ))
        .bind(id)
        .bind(token)
        .bind(flow_order)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.into_payment()
    }

    /// Set a payment's status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the payment does not exist.
    pub async fn update_status(
        &self,
        id: PaymentId,
        status: PaymentStatus,
    ) -> Result<Payment, RepositoryError> {
        let row = sqlx::query_as::<_, PaymentRow>(&format!(
            "UPDATE payments
             SET status = $2, updated_at = now()
             WHERE id = $1
             RETURNING {PAYMENT_COLUMNS}"
        ))
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        row.into_payment()
    }

    /// Get a payment by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: PaymentId) -> Result<Option<Payment>, RepositoryError> {
        let row = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(PaymentRow::into_payment).transpose()
    }

    /// Get a payment by its Flow token.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_token(&self, token: &str) -> Result<Option<Payment>, RepositoryError> {
        let row = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE token = $1"
        ))
        .bind(token)
        .fetch_optional(self.pool)
        .await?;

        row.map(PaymentRow::into_payment).transpose()
    }

    /// Get the most recent payment for an order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn latest_for_order(
        &self,
        order_id: OrderId,
    ) -> Result<Option<Payment>, RepositoryError> {
        let row = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments
             WHERE order_id = $1
             ORDER BY created_at DESC
             LIMIT 1"
        ))
        .bind(order_id)
        .fetch_optional(self.pool)
        .await?;

        row.map(PaymentRow::into_payment).transpose()
    }
}
