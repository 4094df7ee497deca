//! API error handling.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rocr_core::RocrError;
use serde::Serialize;
use thiserror::Error;

/// API error.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Empty or unreadable upload.
    #[error("{0}")]
    BadRequest(String),

    /// Anything else, including engine configuration errors.
    #[error("{0}")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub status: u16,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = ErrorResponse {
            error: message,
            status: status.as_u16(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<RocrError> for ApiError {
    fn from(err: RocrError) -> Self {
        if err.is_invalid_input() {
            ApiError::BadRequest(err.to_string())
        } else {
            ApiError::Internal(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let bad: ApiError = RocrError::InvalidInput("empty file".to_string()).into();
        assert_eq!(bad.into_response().status(), StatusCode::BAD_REQUEST);

        let engine: ApiError = RocrError::UnsupportedEngine("paddle".to_string()).into();
        assert_eq!(engine.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);

        let timeout: ApiError = RocrError::Timeout(60).into();
        assert_eq!(timeout.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_message_kept() {
        let err: ApiError = RocrError::UnsupportedEngine("paddle".to_string()).into();
        assert_eq!(err.to_string(), "unsupported OCR engine: paddle");
    }
}
