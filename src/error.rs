use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    PermissionDenied(String),

    #[error("{0}")]
    Command(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Map a filesystem failure onto the API taxonomy, naming the resource
    /// the caller was after.
    pub fn from_io(err: std::io::Error, what: &str) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => {
                ApiError::NotFound(format!("{} not found", what))
            }
            std::io::ErrorKind::PermissionDenied => {
                ApiError::PermissionDenied(format!("Permission denied: {}", what))
            }
            _ => {
                tracing::error!("I/O error on {}: {}", what, err);
                ApiError::Internal("Internal server error".to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::PermissionDenied(msg) => (StatusCode::FORBIDDEN, msg),
            ApiError::Command(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::Internal(_) => (
                // Root cause is logged where it happens; never leaked here.
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": true,
            "message": message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
