//! Product catalog domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use cerveceria_core::{BeerStyle, Pesos, ProductId};

/// A beer in the catalog.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    pub name: String,
    /// Beer style, the `tipo` filter vocabulary.
    pub style: BeerStyle,
    pub description: String,
    /// Unit price in integer CLP.
    pub price: Pesos,
    /// Units available; checkout fails when a line exceeds this.
    pub stock: i32,
    /// Alcohol by volume, percent.
    pub abv: f64,
    /// International bitterness units.
    pub ibu: i32,
    /// Packaging description (e.g., "Botella 330ml").
    pub format: String,
    /// Relative URL of the uploaded image, if any.
    pub image: Option<String>,
    /// Average rating, recomputed on every review change.
    pub rating_avg: f64,
    /// Number of reviews behind the average.
    pub rating_count: i32,
    /// Soft-delete flag; inactive products are hidden from the catalog.
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Whether the requested quantity can currently be fulfilled.
    #[must_use]
    pub const fn has_stock(&self, quantity: i32) -> bool {
        self.stock >= quantity && quantity > 0
    }
}
