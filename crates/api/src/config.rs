//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CERVECERIA_DATABASE_URL` - `PostgreSQL` connection string
//! - `CERVECERIA_BASE_URL` - Public URL of the API (used for Flow callbacks)
//! - `CERVECERIA_JWT_SECRET` - JWT signing secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `CERVECERIA_HOST` - Bind address (default: 127.0.0.1)
//! - `CERVECERIA_PORT` - Listen port (default: 3000)
//! - `CERVECERIA_FRONTEND_URL` - Storefront URL for CORS and payment redirects
//!   (default: <http://localhost:3001>)
//! - `CERVECERIA_UPLOADS_DIR` - Directory for product images (default: uploads)
//! - `FLOW_API_KEY` / `FLOW_SECRET_KEY` - Flow gateway credentials; when both
//!   are absent the gateway runs in mock mode
//! - `FLOW_SANDBOX` - Use the Flow sandbox endpoint (default: true)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_JWT_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

const FLOW_PRODUCTION_API: &str = "https://www.flow.cl/api";
const FLOW_SANDBOX_API: &str = "https://sandbox.flow.cl/api";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// API application configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of the API
    pub base_url: String,
    /// Storefront URL, used for CORS and post-payment redirects
    pub frontend_url: String,
    /// JWT signing secret
    pub jwt_secret: SecretString,
    /// Directory where uploaded product images are stored
    pub uploads_dir: String,
    /// Flow payment gateway configuration
    pub flow: FlowConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Flow payment gateway configuration.
///
/// Implements `Debug` manually to redact the secret key.
#[derive(Clone)]
pub struct FlowConfig {
    /// Flow merchant API key, `None` in mock mode
    pub api_key: Option<String>,
    /// Flow HMAC signing key, `None` in mock mode
    pub secret_key: Option<SecretString>,
    /// Flow REST endpoint (sandbox or production)
    pub api_url: String,
}

impl FlowConfig {
    /// Whether the gateway should simulate payments instead of calling Flow.
    #[must_use]
    pub const fn is_mock(&self) -> bool {
        self.api_key.is_none() || self.secret_key.is_none()
    }
}

impl std::fmt::Debug for FlowConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowConfig")
            .field("api_key", &self.api_key)
            .field(
                "secret_key",
                &self.secret_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("CERVECERIA_DATABASE_URL")?;
        let host = get_env_or_default("CERVECERIA_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("CERVECERIA_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("CERVECERIA_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("CERVECERIA_PORT".to_string(), e.to_string())
            })?;
        let base_url = get_required_env("CERVECERIA_BASE_URL")?;
        let frontend_url =
            get_env_or_default("CERVECERIA_FRONTEND_URL", "http://localhost:3001");
        let jwt_secret = get_validated_secret("CERVECERIA_JWT_SECRET")?;
        validate_jwt_secret(&jwt_secret, "CERVECERIA_JWT_SECRET")?;
        let uploads_dir = get_env_or_default("CERVECERIA_UPLOADS_DIR", "uploads");

        let flow = FlowConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            frontend_url,
            jwt_secret,
            uploads_dir,
            flow,
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl FlowConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let api_key = get_optional_env("FLOW_API_KEY");
        let secret_key = match get_optional_env("FLOW_SECRET_KEY") {
            Some(value) => {
                validate_secret_strength(&value, "FLOW_SECRET_KEY")?;
                Some(SecretString::from(value))
            }
            None => None,
        };
        let sandbox = get_env_or_default("FLOW_SANDBOX", "true")
            .parse::<bool>()
            .map_err(|e| ConfigError::InvalidEnvVar("FLOW_SANDBOX".to_string(), e.to_string()))?;
        let api_url = if sandbox {
            FLOW_SANDBOX_API.to_string()
        } else {
            FLOW_PRODUCTION_API.to_string()
        };

        Ok(Self {
            api_key,
            secret_key,
            api_url,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate that a JWT secret meets minimum length requirements.
fn validate_jwt_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_JWT_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_JWT_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real secrets like API keys have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        // All same character = 0 entropy
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_high() {
        let entropy = shannon_entropy("aB3$xY9!mK2@nL5#");
        assert!(entropy > 3.3);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-api-key-here", "TEST_VAR");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        // High-entropy random string
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_jwt_secret_too_short() {
        let secret = SecretString::from("short");
        let result = validate_jwt_secret(&secret, "TEST_JWT");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_jwt_secret_valid_length() {
        let secret = SecretString::from("a".repeat(32));
        let result = validate_jwt_secret(&secret, "TEST_JWT");
        assert!(result.is_ok());
    }

    #[test]
    fn test_flow_config_mock_without_credentials() {
        let config = FlowConfig {
            api_key: None,
            secret_key: None,
            api_url: FLOW_SANDBOX_API.to_string(),
        };
        assert!(config.is_mock());

        let config = FlowConfig {
            api_key: Some("key".to_string()),
            secret_key: None,
            api_url: FLOW_SANDBOX_API.to_string(),
        };
        assert!(config.is_mock());
    }

    #[test]
    fn test_flow_config_debug_redacts_secret_key() {
        let config = FlowConfig {
            api_key: Some("merchant-key".to_string()),
            secret_key: Some(SecretString::from("super_secret_signing_key")),
            api_url: FLOW_SANDBOX_API.to_string(),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("merchant-key"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_signing_key"));
    }

    #[test]
    fn test_socket_addr() {
        let config = ApiConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            frontend_url: "http://localhost:3001".to_string(),
            jwt_secret: SecretString::from("x".repeat(32)),
            uploads_dir: "uploads".to_string(),
            flow: FlowConfig {
                api_key: None,
                secret_key: None,
                api_url: FLOW_SANDBOX_API.to_string(),
            },
            sentry_dsn: None,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }
}
