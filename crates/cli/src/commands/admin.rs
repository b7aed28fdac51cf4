//! Admin user management commands.
//!
//! # Usage
//!
//! ```bash
//! # Create a new admin user (generates and prints a one-time password)
//! cerveceria admin create -e admin@craftandbeer.cl -n "Admin"
//! ```

use argon2::Argon2;
use argon2::password_hash::{PasswordHasher, SaltString, rand_core::OsRng};
use rand::Rng;
use rand::distributions::Alphanumeric;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use cerveceria_core::{Email, UserRole};

/// Length of the generated one-time password.
const GENERATED_PASSWORD_LENGTH: usize = 20;

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Required environment variable is missing.
    #[error(transparent)]
    MissingEnvVar(#[from] super::MissingEnvVar),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// User already exists.
    #[error("User already exists with email: {0}")]
    UserExists(String),

    /// Password hashing failed.
    #[error("Password hashing failed")]
    PasswordHash,
}

/// Create a new admin user with a generated one-time password.
///
/// The password is printed once; the user should change it after the
/// first login.
///
/// # Returns
///
/// The ID of the created admin user.
pub async fn create_user(email: &str, name: &str) -> Result<Uuid, AdminError> {
    let email = Email::parse(email).map_err(|e| AdminError::InvalidEmail(e.to_string()))?;

    let database_url = super::database_url()?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(&database_url).await?;

    tracing::info!("Creating admin user: {}", email.as_str());

    let existing: Option<Uuid> = sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
        .bind(email.as_str())
        .fetch_optional(&pool)
        .await?;

    if existing.is_some() {
        return Err(AdminError::UserExists(email.as_str().to_owned()));
    }

    let password: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_PASSWORD_LENGTH)
        .map(char::from)
        .collect();

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| AdminError::PasswordHash)?
        .to_string();

    let user_id: Uuid = sqlx::query_scalar(
        r"
        INSERT INTO users (name, email, password_hash, role)
        VALUES ($1, $2, $3, $4)
        RETURNING id
        ",
    )
    .bind(name)
    .bind(email.as_str())
    .bind(password_hash)
    .bind(UserRole::Admin.to_string())
    .fetch_one(&pool)
    .await?;

    tracing::info!(
        "Admin user created successfully! ID: {}, Email: {}",
        user_id,
        email.as_str()
    );
    tracing::warn!("One-time password (change it after first login): {password}");

    Ok(user_id)
}
