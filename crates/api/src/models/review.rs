//! Product review domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use cerveceria_core::{ProductId, ReviewId, UserId};

/// A product review, at most one per (user, product).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub user_id: UserId,
    /// Reviewer display name, joined for rendering.
    pub user_name: String,
    pub product_id: ProductId,
    /// Star rating, 1 to 5.
    pub rating: i32,
    pub comment: Option<String>,
    /// Set when the reviewer has a delivered order containing the product.
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
