//! Error handling for the gateway.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use romvault_core::ErrorKind;
use thiserror::Error;

use crate::json::ErrorResponse;

/// Application error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Save service error.
    #[error(transparent)]
    Save(#[from] romvault_core::Error),

    /// Bad request.
    #[error("{0}")]
    BadRequest(String),

    /// Not found.
    #[error("not found")]
    NotFound,

    /// Request body over the configured limit.
    #[error("payload too large")]
    PayloadTooLarge,

    /// Internal server error.
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::Save(err) => match err {
                romvault_core::Error::InvalidEncoding(_) => {
                    (StatusCode::BAD_REQUEST, "invalid base64".to_string())
                }
                romvault_core::Error::InvalidIdentifier(_) => {
                    (StatusCode::BAD_REQUEST, "invalid id".to_string())
                }
                romvault_core::Error::InvalidSlot(_) => {
                    (StatusCode::BAD_REQUEST, "invalid slot".to_string())
                }
                romvault_core::Error::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, err.to_string()),
                _ => match err.kind() {
                    ErrorKind::Validation => (StatusCode::BAD_REQUEST, err.to_string()),
                    ErrorKind::NotFound => (StatusCode::NOT_FOUND, "not found".to_string()),
                    ErrorKind::Store | ErrorKind::Schema => {
                        (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
                    }
                },
            },
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound => (StatusCode::NOT_FOUND, "not found".to_string()),
            AppError::PayloadTooLarge => (StatusCode::PAYLOAD_TOO_LARGE, self.to_string()),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = self.status_and_message();
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "Request failed");
        }

        (status, Json(ErrorResponse { error })).into_response()
    }
}

impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return AppError::PayloadTooLarge;
        }
        AppError::BadRequest(rejection.body_text())
    }
}
