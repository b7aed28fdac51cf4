//! Authentication extractors.
//!
//! Handlers declare their auth requirement through extractors: `RequireAuth`
//! verifies the bearer token, `RequireAdmin` additionally checks the role.
//! Verification is stateless; the claims carry the user ID and role.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;

use cerveceria_core::{UserId, UserRole};

use crate::services::auth::decode_token;
use crate::state::AppState;

/// The authenticated caller, as proven by the bearer token.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    pub id: UserId,
    pub role: UserRole,
}

impl CurrentUser {
    /// Whether the caller may act on resources owned by `owner`.
    ///
    /// Admins may act on anyone's resources.
    #[must_use]
    pub fn can_access(&self, owner: UserId) -> bool {
        self.id == owner || self.role.is_admin()
    }
}

/// Extractor that requires a valid bearer token.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("hello, {}", user.id)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Extractor that requires a valid bearer token with the admin role.
pub struct RequireAdmin(pub CurrentUser);

/// Rejection for failed authentication or authorization.
pub enum AuthRejection {
    /// Missing, malformed, expired, or unverifiable token.
    Unauthorized(String),
    /// Valid token, insufficient role.
    Forbidden,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Unauthorized(message) => (StatusCode::UNAUTHORIZED, message),
            Self::Forbidden => (
                StatusCode::FORBIDDEN,
                "Se requiere rol de administrador".to_string(),
            ),
        };

        let body = json!({
            "message": message,
            "statusCode": status.as_u16(),
        });
        (status, Json(body)).into_response()
    }
}

fn authenticate(parts: &Parts, state: &AppState) -> Result<CurrentUser, AuthRejection> {
    let header_value = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AuthRejection::Unauthorized("Token no proporcionado".to_string()))?;

    let token = header_value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthRejection::Unauthorized("Token no proporcionado".to_string()))?;

    let claims = decode_token(token, &state.config().jwt_secret)
        .map_err(|e| AuthRejection::Unauthorized(e.client_message()))?;

    let id = claims
        .user_id()
        .map_err(|e| AuthRejection::Unauthorized(e.client_message()))?;
    let role = claims
        .role()
        .map_err(|e| AuthRejection::Unauthorized(e.client_message()))?;

    Ok(CurrentUser { id, role })
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authenticate(parts, state).map(Self)
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = authenticate(parts, state)?;
        if !user.role.is_admin() {
            return Err(AuthRejection::Forbidden);
        }
        Ok(Self(user))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_can_access_own_resources() {
        let id = UserId::generate();
        let user = CurrentUser {
            id,
            role: UserRole::Cliente,
        };
        assert!(user.can_access(id));
        assert!(!user.can_access(UserId::generate()));
    }

    #[test]
    fn test_admin_can_access_anyone() {
        let admin = CurrentUser {
            id: UserId::generate(),
            role: UserRole::Admin,
        };
        assert!(admin.can_access(UserId::generate()));
    }

    #[test]
    fn test_rejection_status_codes() {
        let response = AuthRejection::Unauthorized("x".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = AuthRejection::Forbidden.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
