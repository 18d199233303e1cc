use asan_storage::StorageError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    /// Rendered as `{}` when there is no message.
    #[error("not found")]
    NotFound(Option<String>),
    #[error("storage operation failed: {0}")]
    Storage(
        #[from]
        #[source]
        StorageError,
    ),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, json!({ "error": message })),
            AppError::Unauthorized(message) => {
                (StatusCode::UNAUTHORIZED, json!({ "error": message }))
            }
            AppError::NotFound(None) => (StatusCode::NOT_FOUND, json!({})),
            AppError::NotFound(Some(message)) => {
                (StatusCode::NOT_FOUND, json!({ "error": message }))
            }
            AppError::Storage(source) => {
                error!(error = %source, "storage operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": source.to_string() }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
