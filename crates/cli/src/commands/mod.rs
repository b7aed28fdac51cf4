//! CLI command implementations.

pub mod admin;
pub mod migrate;
pub mod seed;

/// Resolve the database connection string from the environment.
///
/// Prefers `CERVECERIA_DATABASE_URL` and falls back to `DATABASE_URL`.
pub fn database_url() -> Result<String, MissingEnvVar> {
    dotenvy::dotenv().ok();

    std::env::var("CERVECERIA_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| MissingEnvVar("CERVECERIA_DATABASE_URL"))
}

/// Required environment variable is missing.
#[derive(Debug, thiserror::Error)]
#[error("Missing environment variable: {0}")]
pub struct MissingEnvVar(pub &'static str);
