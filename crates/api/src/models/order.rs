//! Order domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use cerveceria_core::{AddressId, OrderId, OrderStatus, Pesos, ProductId, UserId};

/// A line on an order.
///
/// Product name and unit price are snapshots from checkout time; later
/// catalog edits do not rewrite history.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Pesos,
    pub subtotal: Pesos,
}

/// A placed order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    /// Human-facing order number, `ORD-<unix millis>`.
    pub order_number: String,
    pub user_id: UserId,
    /// Shipping address chosen at checkout.
    pub address_id: AddressId,
    pub items: Vec<OrderItem>,
    pub subtotal: Pesos,
    pub iva: Pesos,
    /// Zero at or above the free-shipping threshold.
    pub shipping_cost: Pesos,
    pub total: Pesos,
    pub status: OrderStatus,
    /// Payment method label chosen at checkout (e.g., "flow").
    pub payment_method: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-status order count for the admin dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub status: OrderStatus,
    pub count: i64,
}

/// Aggregate sales figures for the admin dashboard.
///
/// Revenue and the average ticket count only orders that are not
/// cancelled.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStats {
    pub total_orders: i64,
    pub total_revenue: Pesos,
    pub orders_today: i64,
    pub orders_this_week: i64,
    pub orders_this_month: i64,
    pub average_ticket: Pesos,
    pub by_status: Vec<StatusCount>,
}
