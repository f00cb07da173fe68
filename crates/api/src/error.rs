//! API error types and their HTTP mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use storage::StorageError;
use thiserror::Error;
use tracing::error;

/// Errors raised while starting or serving the API
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Invalid rate limit: {0}")]
    RateLimit(String),
    #[error("Metrics recorder error: {0}")]
    Metrics(String),
    #[error("Logging setup failed: {0}")]
    Logging(String),
    #[error("Server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
    pub message: String,
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Storage(StorageError::DateNotFound(_)) => {
                (StatusCode::NOT_FOUND, "not_found")
            }
            ApiError::Storage(StorageError::EmptyWindow { .. }) => {
                (StatusCode::BAD_REQUEST, "empty_window")
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        metrics::counter!("climate_request_errors_total", "kind" => code).increment(1);

        let message = if status.is_server_error() {
            error!("Request failed: {}", self);
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(ErrorResponse { error: code, message })).into_response()
    }
}
