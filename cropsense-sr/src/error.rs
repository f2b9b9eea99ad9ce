//! HTTP error types for cropsense-sr
//!
//! Every failure leaves the service as a JSON body of the form
//! `{"error": {"code": ..., "message": ...}}`. Validation failures also
//! carry the per-field violations so the client can show them inline.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::ValidationError;
use crate::services::{EnrichmentError, PredictionError};
use crate::workflow::SubmissionError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Sample failed validation (422)
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Weather lookup failed (502)
    #[error(transparent)]
    Enrichment(#[from] EnrichmentError),

    /// Prediction call failed (502, or 504 on timeout/unreachable)
    #[error(transparent)]
    Prediction(#[from] PredictionError),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),
}

impl From<SubmissionError> for ApiError {
    fn from(err: SubmissionError) -> Self {
        match err {
            SubmissionError::Validation(e) => ApiError::Validation(e),
            SubmissionError::Enrichment(e) => ApiError::Enrichment(e),
            SubmissionError::Prediction(e) => ApiError::Prediction(e),
        }
    }
}

impl ApiError {
    /// Status code and stable machine-readable code
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Validation(ValidationError::UnknownField(_)) => {
                (StatusCode::BAD_REQUEST, "UNKNOWN_FIELD")
            }
            ApiError::Validation(ValidationError::GovernedByLocation(_)) => {
                (StatusCode::CONFLICT, "FIELD_GOVERNED_BY_LOCATION")
            }
            ApiError::Validation(ValidationError::Invalid(_)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_FAILED")
            }
            ApiError::Enrichment(_) => (StatusCode::BAD_GATEWAY, "ENRICHMENT_FAILED"),
            ApiError::Prediction(PredictionError::NetworkError(_)) => {
                (StatusCode::GATEWAY_TIMEOUT, "NETWORK_ERROR")
            }
            ApiError::Prediction(PredictionError::ServerError { .. }) => {
                (StatusCode::BAD_GATEWAY, "SERVER_ERROR")
            }
            ApiError::Prediction(PredictionError::MalformedResponse(_)) => {
                (StatusCode::BAD_GATEWAY, "MALFORMED_RESPONSE")
            }
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.status_and_code();
        let message = self.to_string();

        let body = match &self {
            ApiError::Validation(e) if !e.violations().is_empty() => json!({
                "error": {
                    "code": error_code,
                    "message": message,
                    "violations": e.violations(),
                }
            }),
            _ => json!({
                "error": {
                    "code": error_code,
                    "message": message,
                }
            }),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
