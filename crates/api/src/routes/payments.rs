//! Payment route handlers for the Flow gateway.
//!
//! The payment lifecycle: `flow/crear` opens a gateway session and stores a
//! pending payment, Flow calls `flow/confirm` (webhook) when the customer
//! pays, and the customer lands on `flow/return`, which re-checks the
//! status and bounces to the frontend. `simular` records a paid payment
//! for an order without any gateway round trip.

use axum::{
    Form, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Redirect,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use cerveceria_core::{OrderId, OrderStatus, PaymentId, PaymentStatus, Pesos};

use crate::db::{OrderRepository, PaymentRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::middleware::{CurrentUser, RequireAuth};
use crate::models::Payment;
use crate::services::flow::CreatePayment;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFlowRequest {
    pub order_id: OrderId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowSessionResponse {
    pub success: bool,
    pub payment_id: PaymentId,
    pub token: String,
    /// Where to send the customer to pay.
    pub flow_url: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenForm {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulateRequest {
    pub order_id: OrderId,
    pub method: Option<String>,
    pub amount: Option<i64>,
}

/// `POST /api/pagos/flow/crear`
#[instrument(skip(state, user, request), fields(user_id = %user.0.id, order_id = %request.order_id))]
pub async fn create_flow_payment(
    user: RequireAuth,
    State(state): State<AppState>,
    Json(request): Json<CreateFlowRequest>,
) -> Result<(StatusCode, Json<FlowSessionResponse>)> {
    let order = OrderRepository::new(state.pool())
        .get(request.order_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Pedido no encontrado".to_string()))?;

    if !user.0.can_access(order.user_id) {
        return Err(AppError::Forbidden(
            "No puedes pagar este pedido".to_string(),
        ));
    }

    let payer = UserRepository::new(state.pool())
        .get_by_id(order.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Usuario no encontrado".to_string()))?;

    let payments = PaymentRepository::new(state.pool());
    let payment = payments.create(order.id, order.total, "flow").await?;

    let base_url = &state.config().base_url;
    let session = state
        .flow()
        .create_payment(CreatePayment {
            commerce_order: order.order_number.clone(),
            subject: format!("Pedido {}", order.order_number),
            amount: order.total,
            email: payer.email.as_str().to_string(),
            url_confirmation: format!("{base_url}/api/pagos/flow/confirm"),
            url_return: format!("{base_url}/api/pagos/flow/return"),
        })
        .await?;

    let payment = payments
        .set_gateway_refs(payment.id, &session.token, session.flow_order)
        .await?;

    tracing::info!(payment_id = %payment.id, order_number = %order.order_number, "flow session created");

    Ok((
        StatusCode::CREATED,
        Json(FlowSessionResponse {
            success: true,
            payment_id: payment.id,
            token: session.token,
            flow_url: session.redirect_url,
        }),
    ))
}

/// `GET /api/pagos/flow/confirm?token=`
///
/// Some gateway configurations call the webhook with GET.
#[instrument(skip(state, form))]
pub async fn flow_confirm_get(
    State(state): State<AppState>,
    Query(form): Query<TokenForm>,
) -> Result<()> {
    settle(&state, &form.token).await?;
    Ok(())
}

/// `POST /api/pagos/flow/confirm`
///
/// Flow's server-to-server webhook. Always re-queries the gateway rather
/// than trusting the POST body.
#[instrument(skip(state, form))]
pub async fn flow_confirm(
    State(state): State<AppState>,
    Form(form): Form<TokenForm>,
) -> Result<()> {
    settle(&state, &form.token).await?;
    Ok(())
}

/// `GET /api/pagos/flow/return`
///
/// Customer-facing return from the gateway; redirects to the frontend
/// with the outcome.
#[instrument(skip(state))]
pub async fn flow_return(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> Result<Redirect> {
    return_redirect(&state, query.token).await
}

/// `POST /api/pagos/flow/return`
///
/// Flow POSTs the return in some configurations.
#[instrument(skip(state))]
pub async fn flow_return_post(
    State(state): State<AppState>,
    Form(query): Form<TokenQuery>,
) -> Result<Redirect> {
    return_redirect(&state, query.token).await
}

/// `GET /api/pagos/estado/{pagoId}`
#[instrument(skip(state, user))]
pub async fn detail(
    user: RequireAuth,
    State(state): State<AppState>,
    Path(pago_id): Path<PaymentId>,
) -> Result<Json<Payment>> {
    let payment = PaymentRepository::new(state.pool())
        .get(pago_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Pago no encontrado".to_string()))?;

    authorize_for_payment(&state, &user.0, &payment).await?;
    Ok(Json(payment))
}

/// `GET /api/pagos/pedido/{pedidoId}`
#[instrument(skip(state, user))]
pub async fn for_order(
    user: RequireAuth,
    State(state): State<AppState>,
    Path(pedido_id): Path<OrderId>,
) -> Result<Json<Payment>> {
    let order = OrderRepository::new(state.pool())
        .get(pedido_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Pedido no encontrado".to_string()))?;

    if !user.0.can_access(order.user_id) {
        return Err(AppError::Forbidden(
            "No puedes acceder a este pago".to_string(),
        ));
    }

    let payment = PaymentRepository::new(state.pool())
        .latest_for_order(pedido_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Pago no encontrado".to_string()))?;

    Ok(Json(payment))
}

/// `POST /api/pagos/simular`
///
/// Records a paid payment for an order without a gateway round trip and
/// confirms the order. Meant for development and demos.
#[instrument(skip(state, user, request), fields(user_id = %user.0.id, order_id = %request.order_id))]
pub async fn simulate(
    user: RequireAuth,
    State(state): State<AppState>,
    Json(request): Json<SimulateRequest>,
) -> Result<Json<Payment>> {
    let orders = OrderRepository::new(state.pool());
    let order = orders
        .get(request.order_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Pedido no encontrado".to_string()))?;

    if !user.0.can_access(order.user_id) {
        return Err(AppError::Forbidden(
            "No puedes pagar este pedido".to_string(),
        ));
    }

    let method = request.method.as_deref().unwrap_or("simulado");
    let amount = request.amount.map_or(order.total, Pesos::new);

    let payments = PaymentRepository::new(state.pool());
    let payment = payments.create(order.id, amount, method).await?;
    let payment = payments
        .update_status(payment.id, PaymentStatus::Paid)
        .await?;

    if order.status.can_transition_to(OrderStatus::Confirmed) {
        orders
            .update_status(order.id, OrderStatus::Confirmed)
            .await?;
        tracing::info!(order_number = %order.order_number, "order confirmed by simulated payment");
    }

    Ok(Json(payment))
}

/// Re-check a payment against the gateway and record the outcome.
///
/// A paid payment confirms its order, once.
async fn settle(state: &AppState, token: &str) -> Result<Payment> {
    let payments = PaymentRepository::new(state.pool());
    let payment = payments
        .get_by_token(token)
        .await?
        .ok_or_else(|| AppError::NotFound("Pago no encontrado".to_string()))?;

    let gateway = state.flow().payment_status(token).await?;
    let payment = payments.update_status(payment.id, gateway.status).await?;

    if gateway.status == PaymentStatus::Paid {
        let orders = OrderRepository::new(state.pool());
        if let Some(order) = orders.get(payment.order_id).await? {
            if order.status.can_transition_to(OrderStatus::Confirmed) {
                orders
                    .update_status(order.id, OrderStatus::Confirmed)
                    .await?;
                tracing::info!(order_number = %order.order_number, "order confirmed by payment");
            }
        }
    }

    Ok(payment)
}

/// Bounce the customer back to the storefront checkout with the outcome.
async fn return_redirect(state: &AppState, token: Option<String>) -> Result<Redirect> {
    let frontend = &state.config().frontend_url;
    let error_url = format!("{frontend}/checkout?status=error");

    let Some(token) = token else {
        return Ok(Redirect::to(&error_url));
    };

    let Ok(payment) = settle(state, &token).await else {
        return Ok(Redirect::to(&error_url));
    };

    let order = OrderRepository::new(state.pool())
        .get(payment.order_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Pedido no encontrado".to_string()))?;

    let url = match payment.status {
        PaymentStatus::Paid => format!(
            "{frontend}/checkout/confirmacion?pedido={}&status=success",
            order.order_number
        ),
        PaymentStatus::Pending => format!(
            "{frontend}/checkout/confirmacion?pedido={}&status=pending",
            order.order_number
        ),
        _ => error_url,
    };

    Ok(Redirect::to(&url))
}

async fn authorize_for_payment(
    state: &AppState,
    user: &CurrentUser,
    payment: &Payment,
) -> Result<()> {
    let order = OrderRepository::new(state.pool())
        .get(payment.order_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Pedido no encontrado".to_string()))?;

    if !user.can_access(order.user_id) {
        return Err(AppError::Forbidden(
            "No puedes acceder a este pago".to_string(),
        ));
    }
    Ok(())
}
