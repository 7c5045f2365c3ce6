use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::Response;
use tracing::error;

use lablink_infra::config::AdminCredentials;
use lablink_infra::{LendingEngine, LendingError};

use crate::app::errors;

/// Everything the handlers need, shared behind one `Arc`.
#[derive(Debug)]
pub struct AppServices {
    engine: Arc<LendingEngine>,
    admin: AdminCredentials,
}

impl AppServices {
    pub fn new(engine: Arc<LendingEngine>, admin: AdminCredentials) -> Self {
        Self { engine, admin }
    }

    /// In-memory engine with default admin credentials (dev/test).
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(LendingEngine::in_memory()),
            lablink_infra::Config::default().admin,
        )
    }

    pub fn admin(&self) -> &AdminCredentials {
        &self.admin
    }

    /// Run an engine operation off the async workers.
    ///
    /// Mutations hold the state lock across a snapshot write (file IO), so
    /// they go through `spawn_blocking`. Errors come back as HTTP responses.
    pub async fn run<T, F>(&self, op: F) -> Result<T, Response>
    where
        F: FnOnce(&LendingEngine) -> Result<T, LendingError> + Send + 'static,
        T: Send + 'static,
    {
        let engine = Arc::clone(&self.engine);
        match tokio::task::spawn_blocking(move || op(&engine)).await {
            Ok(result) => result.map_err(errors::lending_error_to_response),
            Err(join_err) => {
                error!(error = %join_err, "engine task failed");
                Err(errors::json_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "internal error",
                ))
            }
        }
    }
}
