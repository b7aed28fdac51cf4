//! HTTP route handlers.
//!
//! All routes are mounted under the `/api` prefix. Route paths keep the
//! Spanish names the storefront frontend calls; JSON bodies use camelCase
//! field names.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                                - Health check
//! GET  /api/health                      - Health check
//! GET  /api/health/ready                - Readiness (checks the database)
//!
//! # Auth
//! POST /api/auth/registro               - Register
//! POST /api/auth/login                  - Login, returns bearer token
//!
//! # Products
//! GET    /api/productos                 - Catalog (?tipo=&precioMin=&precioMax=&abvMin=&abvMax=)
//! GET    /api/productos/buscar?q=       - Search by name/description
//! GET    /api/productos/{id}            - Product detail
//! POST   /api/productos                 - Create (admin)
//! PATCH  /api/productos/{id}            - Update (admin)
//! DELETE /api/productos/{id}            - Soft delete (admin)
//! POST   /api/productos/upload-imagen   - Image upload (admin, multipart, 5 MiB)
//!
//! # Cart (requires auth)
//! GET    /api/carrito                   - Get or create the cart
//! DELETE /api/carrito                   - Empty the cart
//! POST   /api/carrito/items             - Add a product
//! PUT    /api/carrito/items/{productoId}    - Set a line's quantity (0 removes)
//! DELETE /api/carrito/items/{productoId}    - Remove a line
//!
//! # Orders (requires auth)
//! POST  /api/pedidos                    - Checkout the cart
//! GET   /api/pedidos                    - Own order history
//! GET   /api/pedidos/{id}               - Order detail (owner or admin)
//! PATCH /api/pedidos/{id}/estado        - Status transition (admin)
//! GET   /api/pedidos/admin/todos        - All orders (admin; ?estado=&fechaInicio=&fechaFin=)
//! GET   /api/pedidos/admin/estadisticas - Sales stats (admin)
//!
//! # Payments
//! POST /api/pagos/flow/crear            - Create a Flow session (auth)
//! GET  /api/pagos/flow/confirm?token=   - Flow webhook
//! POST /api/pagos/flow/confirm          - Flow also POSTs the webhook
//! GET  /api/pagos/flow/return           - Customer return redirect
//! POST /api/pagos/flow/return           - Flow also POSTs the return
//! GET  /api/pagos/estado/{pagoId}       - Payment detail (auth)
//! GET  /api/pagos/pedido/{pedidoId}     - Latest payment for an order (auth)
//! POST /api/pagos/simular               - Settle a payment without the gateway (auth)
//!
//! # Users (requires auth; own profile or admin)
//! GET    /api/usuarios/{id}             - Profile
//! PATCH  /api/usuarios/{id}             - Update profile
//! DELETE /api/usuarios/{id}             - Disable account (admin)
//! GET    /api/usuarios/{id}/direcciones - List addresses
//! POST   /api/usuarios/{id}/direcciones - Add address
//! DELETE /api/usuarios/{id}/direcciones/{direccionId} - Remove address
//!
//! # Reviews
//! POST   /api/valoraciones                          - Create (auth)
//! GET    /api/valoraciones/producto/{productoId}    - List for a product
//! PATCH  /api/valoraciones/{id}                     - Update own review (auth)
//! DELETE /api/valoraciones/{id}                     - Delete own review (auth)
//! ```

pub mod auth;
pub mod cart;
pub mod orders;
pub mod payments;
pub mod products;
pub mod reviews;
pub mod users;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    routing::{delete, get, patch, post, put},
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::state::AppState;

/// Maximum accepted image upload size.
const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/registro", post(auth::register))
        .route("/login", post(auth::login))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::list).post(products::create))
        .route("/buscar", get(products::search))
        .route(
            "/{id}",
            get(products::detail)
                .patch(products::update)
                .delete(products::remove),
        )
        .route(
            "/upload-imagen",
            post(products::upload_image).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::get_cart).delete(cart::clear))
        .route("/items", post(cart::add_item))
        .route(
            "/items/{producto_id}",
            put(cart::set_quantity).delete(cart::remove_item),
        )
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(orders::checkout).get(orders::list_own))
        .route("/admin/todos", get(orders::list_all))
        .route("/admin/estadisticas", get(orders::stats))
        .route("/{id}", get(orders::detail))
        .route("/{id}/estado", patch(orders::update_status))
}

/// Create the payment routes router.
pub fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/flow/crear", post(payments::create_flow_payment))
        .route(
            "/flow/confirm",
            get(payments::flow_confirm_get).post(payments::flow_confirm),
        )
        .route(
            "/flow/return",
            get(payments::flow_return).post(payments::flow_return_post),
        )
        .route("/estado/{pago_id}", get(payments::detail))
        .route("/pedido/{pedido_id}", get(payments::for_order))
        .route("/simular", post(payments::simulate))
}

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}",
            get(users::profile)
                .patch(users::update_profile)
                .delete(users::remove),
        )
        .route(
            "/{id}/direcciones",
            get(users::list_addresses).post(users::add_address),
        )
        .route(
            "/{id}/direcciones/{direccion_id}",
            delete(users::remove_address),
        )
}

/// Create the review routes router.
pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(reviews::create))
        .route("/producto/{producto_id}", get(reviews::list_for_product))
        .route(
            "/{id}",
            patch(reviews::update).delete(reviews::remove),
        )
}

/// Assemble the `/api` router from the per-resource routers.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/auth", auth_routes())
        .nest("/productos", product_routes())
        .nest("/carrito", cart_routes())
        .nest("/pedidos", order_routes())
        .nest("/pagos", payment_routes())
        .nest("/usuarios", user_routes())
        .nest("/valoraciones", review_routes())
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}

/// Health check endpoint, served at `/` and `/api/health`.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now(),
    })
}

/// Readiness check; verifies database connectivity and answers 503 when
/// the database is unreachable.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
