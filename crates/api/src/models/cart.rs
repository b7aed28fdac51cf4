//! Shopping cart domain types.
//!
//! Each user owns at most one cart, created lazily on first access. Totals
//! are denormalized on the cart row and recomputed after every mutation
//! with the helpers in `cerveceria_core::types::money`.

use chrono::{DateTime, Utc};
use serde::Serialize;

use cerveceria_core::{CartId, CartItemId, Pesos, ProductId, UserId};

/// A line in a cart, with enough product detail to render it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Unique line ID.
    pub id: CartItemId,
    /// Referenced product.
    pub product_id: ProductId,
    /// Product name at display time (joined, not snapshotted).
    pub product_name: String,
    /// Product image, if any.
    pub product_image: Option<String>,
    pub quantity: i32,
    /// Unit price captured when the line was last written.
    pub unit_price: Pesos,
    /// `unit_price * quantity`.
    pub subtotal: Pesos,
}

/// A user's cart with its lines and denormalized totals.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: CartId,
    pub user_id: UserId,
    pub items: Vec<CartItem>,
    /// Sum of line subtotals.
    pub subtotal: Pesos,
    /// 19% IVA on the subtotal.
    pub iva: Pesos,
    /// `subtotal + iva`; shipping is added at checkout, not here.
    pub total: Pesos,
    /// Total units across all lines.
    pub item_count: i32,
    pub updated_at: DateTime<Utc>,
}
