/// Server error types
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    /// yt-dlp failed; carries its stderr
    #[error("Extractor error: {0}")]
    Extractor(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    /// A feature needs configuration that is missing
    #[error("Not configured: {0}")]
    NotConfigured(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ServerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ServerError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ServerError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ServerError::Timeout(msg) => (StatusCode::REQUEST_TIMEOUT, msg),
            ServerError::Extractor(msg) => {
                tracing::error!("Extractor error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
            ServerError::Upstream(ref msg) => {
                tracing::error!("Upstream error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to fetch playlist".to_string(),
                )
            }
            ServerError::NotConfigured(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ServerError::Config(ref msg) => {
                tracing::error!("Config error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Configuration error".to_string(),
                )
            }
            ServerError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ServerError::Io(ref e) => {
                tracing::error!("IO error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "IO error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
