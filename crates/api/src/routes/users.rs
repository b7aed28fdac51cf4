//! User profile and address route handlers.
//!
//! Every endpoint is scoped to the profile owner; admins may act on any
//! profile.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::instrument;

use cerveceria_core::{AddressId, UserId};

use crate::db::UserRepository;
use crate::db::users::NewAddress;
use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::{Address, User};
use crate::services::auth;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddAddressRequest {
    pub street: String,
    pub number: String,
    pub comuna: String,
    pub city: String,
    pub region: String,
    pub postal_code: Option<String>,
    pub country: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
}

/// `GET /api/usuarios/{id}`
#[instrument(skip(state, user))]
pub async fn profile(
    user: RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<Json<User>> {
    authorize(&user, id)?;

    let profile = UserRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Usuario no encontrado".to_string()))?;

    Ok(Json(profile))
}

/// `PATCH /api/usuarios/{id}`
///
/// A new password is validated and re-hashed before storage.
#[instrument(skip(state, user, request))]
pub async fn update_profile(
    user: RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<User>> {
    authorize(&user, id)?;

    let password_hash = match request.password.as_deref() {
        Some(password) => {
            auth::validate_password(password)?;
            Some(auth::hash_password(password)?)
        }
        None => None,
    };

    let updated = UserRepository::new(state.pool())
        .update_profile(
            id,
            request.name.as_deref(),
            request.phone.as_deref(),
            request.birth_date,
            password_hash.as_deref(),
        )
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => {
                AppError::NotFound("Usuario no encontrado".to_string())
            }
            other => AppError::Database(other),
        })?;

    Ok(Json(updated))
}

/// `DELETE /api/usuarios/{id}` (admin)
///
/// Soft delete: the account is disabled, not removed.
#[instrument(skip(state, _admin))]
pub async fn remove(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<StatusCode> {
    UserRepository::new(state.pool())
        .soft_delete(id)
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => {
                AppError::NotFound("Usuario no encontrado".to_string())
            }
            other => AppError::Database(other),
        })?;

    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/usuarios/{id}/direcciones`
#[instrument(skip(state, user))]
pub async fn list_addresses(
    user: RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<Json<Vec<Address>>> {
    authorize(&user, id)?;

    let addresses = UserRepository::new(state.pool()).list_addresses(id).await?;
    Ok(Json(addresses))
}

/// `POST /api/usuarios/{id}/direcciones`
#[instrument(skip(state, user, request))]
pub async fn add_address(
    user: RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    Json(request): Json<AddAddressRequest>,
) -> Result<(StatusCode, Json<Address>)> {
    authorize(&user, id)?;

    let address = UserRepository::new(state.pool())
        .add_address(
            id,
            NewAddress {
                street: request.street,
                number: request.number,
                comuna: request.comuna,
                city: request.city,
                region: request.region,
                postal_code: request.postal_code,
                country: request.country,
                is_primary: request.is_primary,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(address)))
}

/// `DELETE /api/usuarios/{id}/direcciones/{direccionId}`
#[instrument(skip(state, user))]
pub async fn remove_address(
    user: RequireAuth,
    State(state): State<AppState>,
    Path((id, direccion_id)): Path<(UserId, AddressId)>,
) -> Result<StatusCode> {
    authorize(&user, id)?;

    UserRepository::new(state.pool())
        .delete_address(id, direccion_id)
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => {
                AppError::NotFound("Dirección no encontrada".to_string())
            }
            other => AppError::Database(other),
        })?;

    Ok(StatusCode::NO_CONTENT)
}

fn authorize(user: &RequireAuth, owner: UserId) -> Result<()> {
    if !user.0.can_access(owner) {
        return Err(AppError::Forbidden(
            "No puedes acceder a este perfil".to_string(),
        ));
    }
    Ok(())
}
