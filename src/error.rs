use axum::{
    http::StatusCode,
    response::{IntoResponse, Json as RespJson, Response},
};
use serde_json::json;

use crate::store::StoreError;

/// Failure taxonomy for the whole API. Handlers and stores return typed
/// errors; this module is the only place they become HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("store unavailable")]
    StoreUnavailable,
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        AppError::Conflict(msg.into())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            // Callers that care which key collided match on Duplicate before
            // this conversion runs; this default names the field generically.
            StoreError::Duplicate(field) => {
                AppError::Conflict(format!("An account with that {} already exists.", field))
            }
            StoreError::Unavailable(detail) => {
                eprintln!("❌ Store unavailable: {}", detail);
                AppError::StoreUnavailable
            }
            StoreError::Backend(detail) => AppError::Internal(detail),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Conflict(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::InvalidCredentials => {
                (StatusCode::BAD_REQUEST, "Invalid credentials".to_string())
            }
            AppError::StoreUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Database not connected. Please start the database and ensure the backend can reach it.".to_string(),
            ),
            AppError::Internal(detail) => {
                // Detail goes to the operator log, never to the client.
                eprintln!("❌ Internal error: {}", detail);
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error".to_string())
            }
        };
        (status, RespJson(json!({ "success": false, "message": message }))).into_response()
    }
}
