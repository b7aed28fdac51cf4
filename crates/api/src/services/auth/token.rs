//! Bearer token issuance and verification.
//!
//! Tokens are HS256 JWTs signed with the configured secret and are valid
//! for 24 hours. Verification is stateless, no database lookup.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cerveceria_core::{UserId, UserRole};

use super::AuthError;

/// Access token lifetime in seconds (24 hours).
const TOKEN_LIFETIME_SECS: i64 = 24 * 60 * 60;

/// JWT claims embedded in every access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject, the user ID (UUID string).
    pub sub: String,
    /// User role, `cliente` or `admin`.
    pub role: String,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
    /// Unique token ID (UUID string).
    pub jti: String,
}

/// Issue a signed HS256 access token for a user.
///
/// # Errors
///
/// Returns `AuthError::TokenCreation` if encoding fails.
pub fn issue_token(
    user_id: UserId,
    role: UserRole,
    secret: &SecretString,
) -> Result<String, AuthError> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user_id.to_string(),
        role: role.to_string(),
        iat: now,
        exp: now + TOKEN_LIFETIME_SECS,
        jti: Uuid::new_v4().to_string(),
    };

    let key = EncodingKey::from_secret(secret.expose_secret().as_bytes());
    jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &key)
        .map_err(|e| AuthError::TokenCreation(e.to_string()))
}

/// Decode and verify an access token.
///
/// # Errors
///
/// Returns `AuthError::TokenExpired` for expired tokens and
/// `AuthError::TokenInvalid` for any other validation failure.
pub fn decode_token(token: &str, secret: &SecretString) -> Result<ValidatedClaims, AuthError> {
    let key = DecodingKey::from_secret(secret.expose_secret().as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_required_spec_claims(&["sub", "exp", "iat"]);

    jsonwebtoken::decode::<Claims>(token, &key, &validation)
        .map(|data| ValidatedClaims(data.claims))
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::TokenInvalid(e.to_string()),
        })
}

/// Verified JWT claims, a newtype proving the signature was checked.
#[derive(Debug, Clone)]
pub struct ValidatedClaims(pub Claims);

impl ValidatedClaims {
    /// The authenticated user's ID.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenInvalid` if the subject is not a UUID.
    pub fn user_id(&self) -> Result<UserId, AuthError> {
        self.0
            .sub
            .parse::<UserId>()
            .map_err(|e| AuthError::TokenInvalid(format!("bad subject: {e}")))
    }

    /// The role baked into the token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenInvalid` if the role is unknown.
    pub fn role(&self) -> Result<UserRole, AuthError> {
        self.0
            .role
            .parse::<UserRole>()
            .map_err(AuthError::TokenInvalid)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_secret() -> SecretString {
        SecretString::from("k9#mP2$vX7@qL4!wN8%zR5^tB1&yF3*d")
    }

    #[test]
    fn test_issue_and_decode_roundtrip() {
        let user_id = UserId::generate();
        let token = issue_token(user_id, UserRole::Cliente, &test_secret()).unwrap();

        let claims = decode_token(&token, &test_secret()).unwrap();
        assert_eq!(claims.user_id().unwrap(), user_id);
        assert_eq!(claims.role().unwrap(), UserRole::Cliente);
    }

    #[test]
    fn test_admin_role_survives_roundtrip() {
        let token = issue_token(UserId::generate(), UserRole::Admin, &test_secret()).unwrap();
        let claims = decode_token(&token, &test_secret()).unwrap();
        assert!(claims.role().unwrap().is_admin());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issue_token(UserId::generate(), UserRole::Cliente, &test_secret()).unwrap();
        let other = SecretString::from("a completely different signing key!!");
        let result = decode_token(&token, &other);
        assert!(matches!(result, Err(AuthError::TokenInvalid(_))));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let result = decode_token("not.a.jwt", &test_secret());
        assert!(matches!(result, Err(AuthError::TokenInvalid(_))));
    }

    #[test]
    fn test_expiry_is_24_hours_out() {
        let token = issue_token(UserId::generate(), UserRole::Cliente, &test_secret()).unwrap();
        let claims = decode_token(&token, &test_secret()).unwrap();
        assert_eq!(claims.0.exp - claims.0.iat, TOKEN_LIFETIME_SECS);
    }
}
