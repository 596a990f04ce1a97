//! Application error handling
//!
//! This module provides unified error handling for the API,
//! converting internal errors to appropriate HTTP responses.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use nutriweb_shared::validation::ValidationError;
use nutriweb_shared::EngineError;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// API error type that can be converted to HTTP responses
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Engine(#[from] EngineError),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

/// Error response body
///
/// Flat `{"error": ...}` body; `field` and `label` are set for input errors
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Form label of `field`, for display next to the input
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, field) = match &self {
            ApiError::Engine(err) if err.is_validation() => {
                warn!(code = err.code(), field = err.field(), "Rejected input: {}", err);
                (
                    StatusCode::BAD_REQUEST,
                    err.code(),
                    err.to_string(),
                    err.field().map(|_| ValidationError::from(err)),
                )
            }
            ApiError::Engine(err) => {
                error!(code = err.code(), "Calculation failed: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, err.code(), err.to_string(), None)
            }
            ApiError::BadRequest(msg) => {
                warn!("Bad request: {}", msg);
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone(), None)
            }
            ApiError::Internal(err) => {
                error!("Internal error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let (field, label) = match field {
            Some(v) => (Some(v.field), Some(v.display_label)),
            None => (None, None),
        };
        let body = Json(ErrorResponse {
            error: message,
            code: code.to_string(),
            field,
            label,
        });

        (status, body).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_is_bad_request() {
        let error = ApiError::from(EngineError::MissingField { field: "weight_kg" });
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_invalid_ideal_weight_is_bad_request() {
        let response = ApiError::from(EngineError::InvalidIdealWeight).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_division_guard_is_internal() {
        let error = ApiError::from(EngineError::DivisionGuard { quantity: "bmi" });
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_internal_error_status() {
        let response = ApiError::Internal(anyhow::anyhow!("boom")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
