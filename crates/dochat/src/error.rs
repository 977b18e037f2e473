//! Error types for the dochat service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for dochat operations
pub type Result<T> = std::result::Result<T, Error>;

/// Service errors
#[derive(Debug, Error)]
pub enum Error {
    /// Referenced discussion or file does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// A required field was empty or malformed
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// File extension is not in the allowed set
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// File exceeds the configured byte-size limit
    #[error("File too large: {0}")]
    TooLarge(String),

    /// Adding files would exceed the per-discussion count limit
    #[error("File limit exceeded: {0}")]
    LimitExceeded(String),

    /// Chunker configured with overlap >= chunk size
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Discussion has no chunks to ground a chat on
    #[error("No document context: {0}")]
    NoContext(String),

    /// Extraction or chunking produced nothing or failed
    #[error("Failed to process file '{filename}': {message}")]
    Processing { filename: String, message: String },

    /// Completion service unreachable or returned an error
    #[error("Completion service error: {0}")]
    Upstream(String),

    /// Database-layer failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Create a processing error for a named file
    pub fn processing(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Processing {
            filename: filename.into(),
            message: message.into(),
        }
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Storage(err.to_string())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            Error::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            Error::InvalidInput(msg) => (StatusCode::BAD_REQUEST, "invalid_input", msg.clone()),
            Error::UnsupportedFormat(ext) => (
                StatusCode::BAD_REQUEST,
                "unsupported_format",
                format!("Unsupported file format: {}", ext),
            ),
            Error::TooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, "too_large", msg.clone()),
            Error::LimitExceeded(msg) => {
                (StatusCode::BAD_REQUEST, "limit_exceeded", msg.clone())
            }
            Error::InvalidConfiguration(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "invalid_configuration",
                msg.clone(),
            ),
            Error::NoContext(msg) => (StatusCode::BAD_REQUEST, "no_context", msg.clone()),
            Error::Processing { filename, message } => (
                StatusCode::BAD_REQUEST,
                "processing_failure",
                format!("Failed to process '{}': {}", filename, message),
            ),
            Error::Upstream(msg) => {
                // Full detail goes to the log, not to the client
                tracing::error!("Upstream completion service failure: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    "upstream_error",
                    "Failed to generate AI response. Please try again.".to_string(),
                )
            }
            Error::Storage(msg) => {
                tracing::error!("Storage failure: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "storage_error",
                    "Internal storage error".to_string(),
                )
            }
            Error::Io(err) => {
                tracing::error!("IO failure: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "io_error",
                    "Internal IO error".to_string(),
                )
            }
            Error::Json(err) => (StatusCode::BAD_REQUEST, "json_error", err.to_string()),
            Error::Http(err) => {
                tracing::error!("HTTP client failure: {}", err);
                (
                    StatusCode::BAD_GATEWAY,
                    "http_error",
                    "Upstream request failed".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}
