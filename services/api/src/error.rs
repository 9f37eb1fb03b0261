//! HTTP error type of the API service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::service::ServiceError;

/// Error returned by the HTTP handlers
///
/// Only `BadRequest` carries caller-facing text; server-side classes render a
/// fixed message so no internal cause reaches the response body.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed identifier or body
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("User not found")]
    NotFound,

    #[error("User already exists")]
    AlreadyExists,

    /// The request deadline passed or the request was cancelled
    #[error("Request timed out")]
    Timeout,

    #[error("Internal server error")]
    InternalServerError,
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound { .. } => ApiError::NotFound,
            ServiceError::AlreadyExists { .. } => ApiError::AlreadyExists,
            ServiceError::Cancelled { .. } => ApiError::Timeout,
            ServiceError::Internal { .. } => ApiError::InternalServerError,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound => (StatusCode::NOT_FOUND, "user not found".to_string()),
            ApiError::AlreadyExists => (StatusCode::CONFLICT, "user already exists".to_string()),
            ApiError::Timeout => (
                StatusCode::GATEWAY_TIMEOUT,
                "request timed out".to_string(),
            ),
            ApiError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
