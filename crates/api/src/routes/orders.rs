//! Order route handlers: checkout, history, and admin management.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::instrument;

use cerveceria_core::{AddressId, OrderId, OrderStatus};

use crate::db::OrderRepository;
use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::{Order, OrderStats};
use crate::services::checkout::{CheckoutError, CheckoutService};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub address_id: AddressId,
    #[serde(default = "default_payment_method")]
    pub payment_method: String,
}

fn default_payment_method() -> String {
    "flow".to_string()
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: OrderStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminListQuery {
    /// Status filter, e.g. `?estado=Procesando`.
    pub estado: Option<String>,
    /// Inclusive creation date range, `?fechaInicio=&fechaFin=`.
    pub fecha_inicio: Option<NaiveDate>,
    pub fecha_fin: Option<NaiveDate>,
}

/// `POST /api/pedidos`
///
/// Turns the caller's cart into an order. Stock validation, the order
/// insert, stock decrements, and the cart clear are a single transaction.
#[instrument(skip(state, user, request), fields(user_id = %user.0.id))]
pub async fn checkout(
    user: RequireAuth,
    State(state): State<AppState>,
    Json(request): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<Order>)> {
    let order = CheckoutService::new(state.pool())
        .place_order(user.0.id, request.address_id, &request.payment_method)
        .await
        .map_err(map_checkout_error)?;

    tracing::info!(order_number = %order.order_number, total = %order.total, "order placed");

    Ok((StatusCode::CREATED, Json(order)))
}

/// `GET /api/pedidos`
#[instrument(skip(state, user), fields(user_id = %user.0.id))]
pub async fn list_own(
    user: RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool())
        .list_for_user(user.0.id)
        .await?;
    Ok(Json(orders))
}

/// `GET /api/pedidos/{id}`
///
/// Owners see their own orders; admins see any.
#[instrument(skip(state, user))]
pub async fn detail(
    user: RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    let order = OrderRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Pedido no encontrado".to_string()))?;

    if !user.0.can_access(order.user_id) {
        return Err(AppError::Forbidden(
            "No puedes acceder a este pedido".to_string(),
        ));
    }

    Ok(Json(order))
}

/// `PATCH /api/pedidos/{id}/estado` (admin)
///
/// Only forward transitions are allowed; delivered and cancelled orders
/// are terminal.
#[instrument(skip(state, request))]
pub async fn update_status(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(request): Json<StatusRequest>,
) -> Result<Json<Order>> {
    let repo = OrderRepository::new(state.pool());

    let order = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Pedido no encontrado".to_string()))?;

    if !order.status.can_transition_to(request.status) {
        return Err(AppError::Conflict(format!(
            "Transición de estado inválida: de {} a {}",
            order.status, request.status
        )));
    }

    repo.update_status(id, request.status).await?;
    tracing::info!(order_number = %order.order_number, status = %request.status, "order status updated");

    let updated = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Pedido no encontrado".to_string()))?;
    Ok(Json(updated))
}

/// `GET /api/pedidos/admin/todos` (admin)
///
/// Filters: `estado`, `fechaInicio`, `fechaFin`.
#[instrument(skip(state))]
pub async fn list_all(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<AdminListQuery>,
) -> Result<Json<Vec<Order>>> {
    let status = query
        .estado
        .as_deref()
        .map(str::parse::<OrderStatus>)
        .transpose()
        .map_err(AppError::BadRequest)?;

    let orders = OrderRepository::new(state.pool())
        .list_all(status, query.fecha_inicio, query.fecha_fin)
        .await?;
    Ok(Json(orders))
}

/// `GET /api/pedidos/admin/estadisticas` (admin)
#[instrument(skip(state))]
pub async fn stats(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<OrderStats>> {
    let stats = OrderRepository::new(state.pool()).stats().await?;
    Ok(Json(stats))
}

fn map_checkout_error(e: CheckoutError) -> AppError {
    match e {
        CheckoutError::EmptyCart => AppError::BadRequest("El carrito está vacío".to_string()),
        CheckoutError::AddressNotFound => {
            AppError::NotFound("Dirección no encontrada".to_string())
        }
        CheckoutError::InsufficientStock { product } => {
            AppError::Conflict(format!("Stock insuficiente para {product}"))
        }
        CheckoutError::Repository(err) => AppError::Database(err),
    }
}
