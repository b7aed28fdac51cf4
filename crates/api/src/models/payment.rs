//! Payment domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use cerveceria_core::{OrderId, PaymentId, PaymentStatus, Pesos};

/// A payment attempt against the Flow gateway.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: PaymentId,
    pub order_id: OrderId,
    /// Flow's opaque transaction token; `None` until the gateway responds.
    pub token: Option<String>,
    /// Flow's numeric order identifier.
    pub flow_order: Option<i64>,
    pub amount: Pesos,
    /// Payment method label, `flow` for gateway payments.
    pub method: String,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
