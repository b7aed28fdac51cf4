//! Auth route handlers: registration and login.

use axum::{Json, extract::State, http::StatusCode};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{Result, set_sentry_user};
use crate::models::User;
use crate::services::auth::{AuthService, Registration, issue_token};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Token plus the authenticated user, returned by both endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// Bearer token, under the OAuth-style `access_token` key.
    #[serde(rename = "access_token")]
    pub access_token: String,
    pub user: User,
}

/// `POST /api/auth/registro`
#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let service = AuthService::new(state.pool());
    let user = service
        .register(Registration {
            name: request.name.trim(),
            email: &request.email,
            password: &request.password,
            phone: request.phone.as_deref(),
            birth_date: request.birth_date,
        })
        .await?;

    let token = issue_token(user.id, user.role, &state.config().jwt_secret)?;
    set_sentry_user(&user.id, Some(user.email.as_str()));

    tracing::info!(user_id = %user.id, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            access_token: token,
            user,
        }),
    ))
}

/// `POST /api/auth/login`
#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let service = AuthService::new(state.pool());
    let user = service.login(&request.email, &request.password).await?;

    let token = issue_token(user.id, user.role, &state.config().jwt_secret)?;
    set_sentry_user(&user.id, Some(user.email.as_str()));

    Ok(Json(AuthResponse {
        access_token: token,
        user,
    }))
}
