//! Cervecería API library.
//!
//! This crate provides the REST API as a library, allowing it to be
//! tested and reused. The `cerveceria-api` binary wires it to a socket.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::{Router, routing::get};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the full application router.
///
/// Mounts the JSON API under `/api`, serves uploaded product images from
/// `/uploads`, and wires CORS for the configured frontend origin.
#[must_use]
pub fn app(state: AppState) -> Router {
    let cors = match state
        .config()
        .frontend_url
        .parse::<axum::http::HeaderValue>()
    {
        Ok(origin) => CorsLayer::new()
            .allow_origin([origin])
            .allow_methods(Any)
            .allow_headers(Any),
        Err(_) => CorsLayer::new(),
    };

    Router::new()
        .route("/", get(routes::health))
        .nest("/api", routes::api_routes())
        .nest_service(
            "/uploads",
            ServeDir::new(state.config().uploads_dir.clone()),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
