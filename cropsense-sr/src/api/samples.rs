//! JSON endpoints for sample validation, enrichment and recommendations

use axum::{extract::State, http::HeaderMap, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

use super::CallerIp;
use crate::error::{ApiError, ApiResult};
use crate::models::{
    AmbientConditions, FieldViolation, PredictionResponse, RankedRecommendation,
    TransitionContext, ValidationError,
};
use crate::services::location_hint;
use crate::workflow::{InputMode, IntakeSession, SubmissionError};
use crate::AppState;

/// A sample as sent by API clients
///
/// Field values may be JSON strings or numbers; `null` means "not entered".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SampleRequest {
    #[serde(default)]
    pub mode: InputMode,
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
    /// Conditions from an earlier `/api/enrichment` call for this sample
    #[serde(default)]
    pub conditions: Option<AmbientConditions>,
}

impl SampleRequest {
    /// Load the request into a fresh intake session
    ///
    /// In location mode, supplying an ambient field is a conflict: those
    /// values come from the weather lookup.
    pub fn into_session(self) -> Result<IntakeSession, ValidationError> {
        let mut session = IntakeSession::new();
        session.set_mode(self.mode);

        for (name, value) in self.fields {
            let raw = match value {
                Value::Null => continue,
                Value::String(s) => s,
                other => other.to_string(),
            };
            session.set_field(&name, raw)?;
        }

        if let (InputMode::Location, Some(conditions)) = (self.mode, self.conditions.as_ref()) {
            session.apply_previewed(conditions);
        }

        Ok(session)
    }
}

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub violations: Vec<FieldViolation>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EnrichmentRequest {
    /// Location hint; empty means "locate by the caller's public address"
    #[serde(default)]
    pub location: String,
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub submission_id: Uuid,
    pub prediction: PredictionResponse,
    pub recommendations: Vec<RankedRecommendation>,
    pub context: TransitionContext,
}

/// POST /api/samples/validate
pub async fn validate_sample(Json(request): Json<SampleRequest>) -> ApiResult<Json<ValidateResponse>> {
    let session = request.into_session()?;
    let violations = session.validate();

    Ok(Json(ValidateResponse {
        valid: violations.is_empty(),
        violations,
    }))
}

/// POST /api/enrichment
///
/// Looks up current ambient conditions without touching any sample.
pub async fn lookup_ambient(
    State(state): State<AppState>,
    CallerIp(caller_ip): CallerIp,
    Json(request): Json<EnrichmentRequest>,
) -> ApiResult<Json<AmbientConditions>> {
    let hint = location_hint(&request.location, caller_ip);
    match state.ambient.fetch_ambient_conditions(&hint).await {
        Ok(conditions) => {
            state.clear_error().await;
            Ok(Json(conditions))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Ambient conditions lookup failed");
            state.record_error(e.to_string()).await;
            Err(e.into())
        }
    }
}

/// POST /api/recommendations
pub async fn create_recommendations(
    State(state): State<AppState>,
    CallerIp(caller_ip): CallerIp,
    headers: HeaderMap,
    Json(request): Json<SampleRequest>,
) -> ApiResult<Json<RecommendationResponse>> {
    log_session_token(&headers);

    let mut session = request.into_session()?.with_caller_ip(caller_ip);
    let outcome = match session
        .submit(state.predictor.as_ref(), state.ambient.as_ref())
        .await
    {
        Ok(outcome) => {
            state.clear_error().await;
            outcome
        }
        Err(e) => {
            if !matches!(e, SubmissionError::Validation(_)) {
                state.record_error(e.to_string()).await;
            }
            return Err(ApiError::from(e));
        }
    };

    Ok(Json(RecommendationResponse {
        submission_id: outcome.submission_id,
        prediction: outcome.prediction,
        recommendations: outcome.recommendations,
        context: outcome.context,
    }))
}

/// Record whether the caller sent a session token; it is never validated
pub(crate) fn log_session_token(headers: &HeaderMap) {
    let present = headers.contains_key(axum::http::header::AUTHORIZATION);
    tracing::debug!(authorization_present = present, "Sample submission received");
}

/// Build JSON sample routes
pub fn sample_routes() -> Router<AppState> {
    Router::new()
        .route("/api/samples/validate", post(validate_sample))
        .route("/api/enrichment", post(lookup_ambient))
        .route("/api/recommendations", post(create_recommendations))
}
