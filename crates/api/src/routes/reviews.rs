//! Review route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use cerveceria_core::{ProductId, ReviewId};

use crate::db::{ProductRepository, RepositoryError, ReviewRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::Review;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    pub product_id: ProductId,
    pub rating: i32,
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateReviewRequest {
    pub rating: i32,
    pub comment: Option<String>,
}

/// `POST /api/valoraciones`
///
/// One review per user and product. `verified` is set when the reviewer
/// has a non-cancelled order containing the product.
#[instrument(skip(state, user, request), fields(user_id = %user.0.id, product_id = %request.product_id))]
pub async fn create(
    user: RequireAuth,
    State(state): State<AppState>,
    Json(request): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<Review>)> {
    validate_rating(request.rating)?;

    ProductRepository::new(state.pool())
        .get(request.product_id)
        .await?
        .filter(|p| p.active)
        .ok_or_else(|| AppError::NotFound("Producto no encontrado".to_string()))?;

    let reviews = ReviewRepository::new(state.pool());
    let verified = reviews
        .has_purchase(user.0.id, request.product_id)
        .await?;

    let review = reviews
        .create(
            user.0.id,
            request.product_id,
            request.rating,
            request.comment.as_deref(),
            verified,
        )
        .await
        .map_err(|e| match e {
            RepositoryError::Conflict(_) => {
                AppError::Conflict("Ya has valorado este producto".to_string())
            }
            other => AppError::Database(other),
        })?;

    Ok((StatusCode::CREATED, Json(review)))
}

/// `GET /api/valoraciones/producto/{productoId}`
#[instrument(skip(state))]
pub async fn list_for_product(
    State(state): State<AppState>,
    Path(producto_id): Path<ProductId>,
) -> Result<Json<Vec<Review>>> {
    let reviews = ReviewRepository::new(state.pool())
        .list_for_product(producto_id)
        .await?;
    Ok(Json(reviews))
}

/// `PATCH /api/valoraciones/{id}`
#[instrument(skip(state, user, request))]
pub async fn update(
    user: RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<ReviewId>,
    Json(request): Json<UpdateReviewRequest>,
) -> Result<Json<Review>> {
    validate_rating(request.rating)?;

    let reviews = ReviewRepository::new(state.pool());
    let existing = reviews
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Valoración no encontrada".to_string()))?;

    if !user.0.can_access(existing.user_id) {
        return Err(AppError::Forbidden(
            "No puedes modificar esta valoración".to_string(),
        ));
    }

    let review = reviews
        .update(id, request.rating, request.comment.as_deref())
        .await?;

    Ok(Json(review))
}

/// `DELETE /api/valoraciones/{id}`
#[instrument(skip(state, user))]
pub async fn remove(
    user: RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<ReviewId>,
) -> Result<StatusCode> {
    let reviews = ReviewRepository::new(state.pool());
    let existing = reviews
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Valoración no encontrada".to_string()))?;

    if !user.0.can_access(existing.user_id) {
        return Err(AppError::Forbidden(
            "No puedes eliminar esta valoración".to_string(),
        ));
    }

    reviews.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn validate_rating(rating: i32) -> Result<()> {
    if !(1..=5).contains(&rating) {
        return Err(AppError::BadRequest(
            "La valoración debe estar entre 1 y 5".to_string(),
        ));
    }
    Ok(())
}
