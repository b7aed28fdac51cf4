//! Authentication error types.

use axum::http::StatusCode;
use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] cerveceria_core::EmailError),

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Account has been deactivated.
    #[error("account disabled")]
    AccountDisabled,

    /// Registrant is below the legal drinking age.
    #[error("below legal drinking age")]
    UnderMinimumAge,

    /// Bearer token has expired.
    #[error("token expired")]
    TokenExpired,

    /// Bearer token failed validation.
    #[error("invalid token: {0}")]
    TokenInvalid(String),

    /// Token could not be created.
    #[error("token creation failed: {0}")]
    TokenCreation(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

impl AuthError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidCredentials
            | Self::AccountDisabled
            | Self::TokenExpired
            | Self::TokenInvalid(_) => StatusCode::UNAUTHORIZED,
            Self::UserAlreadyExists => StatusCode::CONFLICT,
            Self::InvalidEmail(_) | Self::WeakPassword(_) | Self::UnderMinimumAge => {
                StatusCode::BAD_REQUEST
            }
            Self::TokenCreation(_) | Self::Repository(_) | Self::PasswordHash => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to show to the client.
    #[must_use]
    pub fn client_message(&self) -> String {
        match self {
            Self::InvalidCredentials => "Credenciales inválidas".to_string(),
            Self::AccountDisabled => "La cuenta está desactivada".to_string(),
            Self::UserAlreadyExists => "El email ya está registrado".to_string(),
            Self::InvalidEmail(_) => "Email inválido".to_string(),
            Self::WeakPassword(msg) => msg.clone(),
            Self::UnderMinimumAge => "Debes ser mayor de 18 años".to_string(),
            Self::TokenExpired => "La sesión ha expirado".to_string(),
            Self::TokenInvalid(_) => "Token inválido".to_string(),
            Self::TokenCreation(_) | Self::Repository(_) | Self::PasswordHash => {
                "Error de autenticación".to_string()
            }
        }
    }
}
