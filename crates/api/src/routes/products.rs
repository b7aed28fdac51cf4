//! Product catalog route handlers.

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use cerveceria_core::{BeerStyle, Pesos, ProductId};

use crate::db::products::{NewProduct, ProductFilter, ProductPatch, ProductRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::Product;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    /// Beer style filter, e.g. `?tipo=IPA`.
    pub tipo: Option<String>,
    pub precio_min: Option<i64>,
    pub precio_max: Option<i64>,
    pub abv_min: Option<f64>,
    pub abv_max: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    pub style: BeerStyle,
    #[serde(default)]
    pub description: String,
    pub price: i64,
    pub stock: i32,
    #[serde(default)]
    pub abv: f64,
    #[serde(default)]
    pub ibu: i32,
    #[serde(default)]
    pub format: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub style: Option<BeerStyle>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub stock: Option<i32>,
    pub abv: Option<f64>,
    pub ibu: Option<i32>,
    pub format: Option<String>,
    pub image: Option<String>,
    pub active: Option<bool>,
}

/// `GET /api/productos`
///
/// Filters: `tipo`, `precioMin`, `precioMax`, `abvMin`, `abvMax`.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Product>>> {
    let style = query
        .tipo
        .as_deref()
        .map(str::parse::<BeerStyle>)
        .transpose()
        .map_err(AppError::BadRequest)?;

    let products = ProductRepository::new(state.pool())
        .list(ProductFilter {
            style,
            price_min: query.precio_min.map(Pesos::new),
            price_max: query.precio_max.map(Pesos::new),
            abv_min: query.abv_min,
            abv_max: query.abv_max,
        })
        .await?;
    Ok(Json(products))
}

/// `GET /api/productos/buscar?q=`
#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Product>>> {
    let term = query.q.trim();
    if term.is_empty() {
        return Err(AppError::BadRequest(
            "El término de búsqueda no puede estar vacío".to_string(),
        ));
    }

    let products = ProductRepository::new(state.pool()).search(term).await?;
    Ok(Json(products))
}

/// `GET /api/productos/{id}`
#[instrument(skip(state))]
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    let product = ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Producto no encontrado".to_string()))?;

    Ok(Json(product))
}

/// `POST /api/productos` (admin)
#[instrument(skip(state, request), fields(name = %request.name))]
pub async fn create(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(request): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>)> {
    validate_price_and_stock(request.price, request.stock)?;

    let product = ProductRepository::new(state.pool())
        .create(NewProduct {
            name: request.name,
            style: request.style,
            description: request.description,
            price: Pesos::new(request.price),
            stock: request.stock,
            abv: request.abv,
            ibu: request.ibu,
            format: request.format,
        })
        .await?;

    tracing::info!(product_id = %product.id, "product created");

    Ok((StatusCode::CREATED, Json(product)))
}

/// `PATCH /api/productos/{id}` (admin)
#[instrument(skip(state, request))]
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(request): Json<UpdateProductRequest>,
) -> Result<Json<Product>> {
    if let Some(price) = request.price {
        validate_price_and_stock(price, request.stock.unwrap_or(0))?;
    } else if let Some(stock) = request.stock {
        validate_price_and_stock(0, stock)?;
    }

    let product = ProductRepository::new(state.pool())
        .update(
            id,
            ProductPatch {
                name: request.name,
                style: request.style,
                description: request.description,
                price: request.price.map(Pesos::new),
                stock: request.stock,
                abv: request.abv,
                ibu: request.ibu,
                format: request.format,
                image: request.image,
                active: request.active,
            },
        )
        .await
        .map_err(not_found_if_missing)?;

    Ok(Json(product))
}

/// `DELETE /api/productos/{id}` (admin)
///
/// Soft delete: the product disappears from the catalog but stays
/// referenced by historic orders.
#[instrument(skip(state))]
pub async fn remove(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<StatusCode> {
    ProductRepository::new(state.pool())
        .soft_delete(id)
        .await
        .map_err(not_found_if_missing)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Response for an image upload; the SPA saves `url` onto the product
/// with a follow-up `PATCH /productos/{id}`.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
    pub filename: String,
}

/// `POST /api/productos/upload-imagen` (admin, multipart field `imagen`)
///
/// Body size is capped at 5 MiB by the route layer.
#[instrument(skip(state, multipart))]
pub async fn upload_image(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("multipart inválido: {e}")))?
    {
        if field.name() != Some("imagen") {
            continue;
        }

        let Some(extension) = field.content_type().and_then(image_extension) else {
            return Err(AppError::BadRequest(format!(
                "Formato de imagen no soportado: {}",
                field.content_type().unwrap_or("desconocido")
            )));
        };

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("multipart inválido: {e}")))?;

        let filename = format!(
            "{}-{}.{extension}",
            Uuid::new_v4().simple(),
            Utc::now().timestamp_millis()
        );
        let dir = format!("{}/productos", state.config().uploads_dir);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| AppError::Internal(format!("cannot create uploads dir: {e}")))?;
        tokio::fs::write(format!("{dir}/{filename}"), &bytes)
            .await
            .map_err(|e| AppError::Internal(format!("cannot write image: {e}")))?;

        return Ok((
            StatusCode::CREATED,
            Json(UploadResponse {
                url: format!("/uploads/productos/{filename}"),
                filename,
            }),
        ));
    }

    Err(AppError::BadRequest(
        "Falta el campo de archivo 'imagen'".to_string(),
    ))
}

/// Map an image MIME type to the stored file extension.
fn image_extension(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/png" => Some("png"),
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

fn validate_price_and_stock(price: i64, stock: i32) -> Result<()> {
    if price < 0 {
        return Err(AppError::BadRequest(
            "El precio no puede ser negativo".to_string(),
        ));
    }
    if stock < 0 {
        return Err(AppError::BadRequest(
            "El stock no puede ser negativo".to_string(),
        ));
    }
    Ok(())
}

fn not_found_if_missing(e: crate::db::RepositoryError) -> AppError {
    match e {
        crate::db::RepositoryError::NotFound => {
            AppError::NotFound("Producto no encontrado".to_string())
        }
        other => AppError::Database(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_extension_accepts_the_supported_formats() {
        assert_eq!(image_extension("image/png"), Some("png"));
        assert_eq!(image_extension("image/jpeg"), Some("jpg"));
        assert_eq!(image_extension("image/jpg"), Some("jpg"));
        assert_eq!(image_extension("image/gif"), Some("gif"));
        assert_eq!(image_extension("image/webp"), Some("webp"));
    }

    #[test]
    fn test_image_extension_rejects_other_types() {
        assert_eq!(image_extension("image/svg+xml"), None);
        assert_eq!(image_extension("application/pdf"), None);
        assert_eq!(image_extension("text/html"), None);
    }

    #[test]
    fn test_negative_price_and_stock_rejected() {
        assert!(validate_price_and_stock(-1, 0).is_err());
        assert!(validate_price_and_stock(0, -1).is_err());
        assert!(validate_price_and_stock(0, 0).is_ok());
    }
}
