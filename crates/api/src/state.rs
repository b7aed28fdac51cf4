//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;
use url::Url;

use crate::config::ApiConfig;
use crate::services::flow::FlowClient;

/// Error building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("invalid URL in configuration: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    pool: PgPool,
    flow: FlowClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns `StateError::InvalidUrl` if `base_url` or `frontend_url`
    /// do not parse as absolute URLs.
    pub fn new(config: ApiConfig, pool: PgPool) -> Result<Self, StateError> {
        Url::parse(&config.base_url)?;
        Url::parse(&config.frontend_url)?;

        let flow = FlowClient::new(config.flow.clone());

        Ok(Self {
            inner: Arc::new(AppStateInner { config, pool, flow }),
        })
    }

    /// Get a reference to the API configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the Flow gateway client.
    #[must_use]
    pub fn flow(&self) -> &FlowClient {
        &self.inner.flow
    }
}
