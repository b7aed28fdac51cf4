//! Cart route handlers. All of them require authentication.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use tracing::instrument;

use cerveceria_core::ProductId;

use crate::db::{CartRepository, ProductRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{Cart, Product};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub product_id: ProductId,
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct QuantityRequest {
    pub quantity: i32,
}

/// `GET /api/carrito`
#[instrument(skip(state, user), fields(user_id = %user.0.id))]
pub async fn get_cart(user: RequireAuth, State(state): State<AppState>) -> Result<Json<Cart>> {
    let cart = CartRepository::new(state.pool())
        .get_or_create(user.0.id)
        .await?;
    Ok(Json(cart))
}

/// `POST /api/carrito/items`
#[instrument(skip(state, user, request), fields(user_id = %user.0.id, product_id = %request.product_id))]
pub async fn add_item(
    user: RequireAuth,
    State(state): State<AppState>,
    Json(request): Json<AddItemRequest>,
) -> Result<Json<Cart>> {
    let product = sellable_product(&state, request.product_id, request.quantity).await?;

    let cart = CartRepository::new(state.pool())
        .add_item(user.0.id, product.id, request.quantity, product.price)
        .await?;

    Ok(Json(cart))
}

/// `PUT /api/carrito/items/{productoId}`
///
/// A quantity of zero or less removes the line.
#[instrument(skip(state, user, request), fields(user_id = %user.0.id))]
pub async fn set_quantity(
    user: RequireAuth,
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
    Json(request): Json<QuantityRequest>,
) -> Result<Json<Cart>> {
    let carts = CartRepository::new(state.pool());

    if request.quantity <= 0 {
        let cart = carts
            .remove_item(user.0.id, product_id)
            .await
            .map_err(line_not_found)?;
        return Ok(Json(cart));
    }

    let product = sellable_product(&state, product_id, request.quantity).await?;

    let cart = carts
        .set_item_quantity(user.0.id, product.id, request.quantity)
        .await
        .map_err(line_not_found)?;

    Ok(Json(cart))
}

/// `DELETE /api/carrito/items/{productoId}`
#[instrument(skip(state, user), fields(user_id = %user.0.id))]
pub async fn remove_item(
    user: RequireAuth,
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
) -> Result<Json<Cart>> {
    let cart = CartRepository::new(state.pool())
        .remove_item(user.0.id, product_id)
        .await
        .map_err(line_not_found)?;

    Ok(Json(cart))
}

/// `DELETE /api/carrito`
#[instrument(skip(state, user), fields(user_id = %user.0.id))]
pub async fn clear(user: RequireAuth, State(state): State<AppState>) -> Result<Json<Cart>> {
    let cart = CartRepository::new(state.pool()).clear(user.0.id).await?;
    Ok(Json(cart))
}

/// Look up a product and check it can be sold in the requested quantity.
async fn sellable_product(
    state: &AppState,
    product_id: ProductId,
    quantity: i32,
) -> Result<Product> {
    if quantity < 1 {
        return Err(AppError::BadRequest(
            "La cantidad debe ser al menos 1".to_string(),
        ));
    }

    let product = ProductRepository::new(state.pool())
        .get(product_id)
        .await?
        .filter(|p| p.active)
        .ok_or_else(|| AppError::NotFound("Producto no encontrado".to_string()))?;

    if !product.has_stock(quantity) {
        return Err(AppError::BadRequest(format!(
            "Stock insuficiente para {}",
            product.name
        )));
    }

    Ok(product)
}

fn line_not_found(e: RepositoryError) -> AppError {
    match e {
        RepositoryError::NotFound => {
            AppError::NotFound("El producto no está en el carrito".to_string())
        }
        other => AppError::Database(other),
    }
}
