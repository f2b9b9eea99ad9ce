//! Crop prediction API client
//!
//! Submits one feature vector plus categorical context to the inference
//! endpoint: `POST <url>` with `{"features": [..7], "soilType": .., "location": ..}`.
//!
//! Accepted response shapes:
//! - `{"prediction": "rice", "probabilities": {"rice": 80.0, ..}}`
//! - `{"probabilities": {..}}` or `{"prediction": "rice"}` alone
//! - `{"prediction": {"rice": 80.0, ..}}` (map-shaped label field, treated
//!   as the probability map)
//!
//! Every call is a fresh request. Nothing is retried or cached here; the
//! caller decides whether to resubmit.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

use super::feature_vector::FeatureVector;
use crate::models::PredictionResponse;

const USER_AGENT: &str = concat!("CropSense/", env!("CARGO_PKG_VERSION"));

/// Longest upstream error text carried into an error message
const MAX_ERROR_TEXT: usize = 200;

/// Prediction call failure
#[derive(Debug, Error)]
pub enum PredictionError {
    /// Request never reached the server, no response arrived, or it timed out
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Server answered with a non-success status
    #[error("Server error {status}: {message}")]
    ServerError { status: u16, message: String },

    /// Success status but the body is not a usable prediction
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

/// Categorical context sent alongside the feature vector
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoricalContext {
    pub soil_type: String,
    pub location: String,
}

/// Predictor request body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictRequest<'a> {
    features: &'a FeatureVector,
    soil_type: &'a str,
    location: &'a str,
}

/// Predictor response body as received
#[derive(Debug, Deserialize)]
struct RawPredictBody {
    #[serde(default)]
    prediction: Option<Value>,
    #[serde(default)]
    probabilities: Option<Value>,
}

/// Predictor error body, e.g. `{"error": "Missing 'features' key in request."}`
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Anything that can turn a feature vector into a prediction
#[async_trait]
pub trait CropPredictor: Send + Sync {
    async fn submit(
        &self,
        features: &FeatureVector,
        context: &CategoricalContext,
    ) -> Result<PredictionResponse, PredictionError>;
}

/// HTTP prediction client
pub struct PredictionClient {
    http_client: reqwest::Client,
    endpoint: String,
}

impl PredictionClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, PredictionError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| PredictionError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CropPredictor for PredictionClient {
    async fn submit(
        &self,
        features: &FeatureVector,
        context: &CategoricalContext,
    ) -> Result<PredictionResponse, PredictionError> {
        let request = PredictRequest {
            features,
            soil_type: &context.soil_type,
            location: &context.location,
        };

        tracing::debug!(
            endpoint = %self.endpoint,
            features = ?features.values(),
            soil_type = %context.soil_type,
            "Submitting feature vector to predictor"
        );

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PredictionError::NetworkError(format!("request timed out: {}", e))
                } else {
                    PredictionError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PredictionError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            return Err(PredictionError::ServerError {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let prediction = parse_body(&body)?;

        tracing::info!(
            endpoint = %self.endpoint,
            prediction = prediction.prediction.as_deref().unwrap_or("-"),
            labels = prediction.probabilities.as_ref().map(|p| p.len()).unwrap_or(0),
            "Received prediction"
        );

        Ok(prediction)
    }
}

/// Normalize a success body into a [`PredictionResponse`]
fn parse_body(body: &str) -> Result<PredictionResponse, PredictionError> {
    let raw: RawPredictBody = serde_json::from_str(body)
        .map_err(|e| PredictionError::MalformedResponse(e.to_string()))?;

    let mut probabilities = match raw.probabilities {
        None | Some(Value::Null) => None,
        Some(Value::Object(map)) => Some(map.into_iter().collect::<BTreeMap<_, _>>()),
        Some(other) => {
            return Err(PredictionError::MalformedResponse(format!(
                "'probabilities' must be an object, got {}",
                json_kind(&other)
            )))
        }
    };

    let prediction = match raw.prediction {
        None | Some(Value::Null) => None,
        Some(Value::String(label)) => Some(label),
        Some(Value::Object(map)) if probabilities.is_none() => {
            probabilities = Some(map.into_iter().collect());
            None
        }
        Some(Value::Object(_)) => None,
        Some(other) => {
            return Err(PredictionError::MalformedResponse(format!(
                "'prediction' must be a string, got {}",
                json_kind(&other)
            )))
        }
    };

    if prediction.is_none() && probabilities.is_none() {
        return Err(PredictionError::MalformedResponse(
            "response has neither 'prediction' nor 'probabilities'".to_string(),
        ));
    }

    Ok(PredictionResponse {
        prediction,
        probabilities,
    })
}

/// Best human-readable message from a non-success body
fn error_message(body: &str) -> String {
    if let Ok(ErrorBody { error }) = serde_json::from_str::<ErrorBody>(body) {
        return error;
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "no response body".to_string()
    } else {
        trimmed.chars().take(MAX_ERROR_TEXT).collect()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
