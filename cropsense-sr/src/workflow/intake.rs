//! Intake session: one caller-owned sample plus its input mode
//!
//! The session owns its [`SampleMeasurement`] for the lifetime of one
//! submission. Nothing here is shared between submissions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    build_context, AmbientConditions, FieldViolation, MeasurementField, PredictionResponse,
    RankedRecommendation, SampleMeasurement, TransitionContext, ValidationError,
};
use crate::services::{
    enrich, feature_vector, rank_response, AmbientConditionsSource, CategoricalContext,
    CropPredictor, EnrichmentError, FeatureVector, PredictionError,
};

/// Which source governs temperature, humidity and rainfall
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    /// User types the ambient fields
    #[default]
    Manual,
    /// Ambient fields come from the weather lookup
    Location,
}

impl InputMode {
    pub fn as_str(self) -> &'static str {
        match self {
            InputMode::Manual => "manual",
            InputMode::Location => "location",
        }
    }
}

impl fmt::Display for InputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "manual" => Ok(InputMode::Manual),
            "location" => Ok(InputMode::Location),
            other => Err(format!("unknown input mode '{}'", other)),
        }
    }
}

/// Why a submission attempt produced no recommendations
#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Enrichment(#[from] EnrichmentError),

    #[error(transparent)]
    Prediction(#[from] PredictionError),
}

/// Everything the results view needs from one successful submission
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionOutcome {
    pub submission_id: Uuid,
    pub features: FeatureVector,
    pub prediction: PredictionResponse,
    pub recommendations: Vec<RankedRecommendation>,
    pub context: TransitionContext,
}

/// One sample being filled in and submitted
#[derive(Debug, Clone)]
pub struct IntakeSession {
    submission_id: Uuid,
    measurement: SampleMeasurement,
    mode: InputMode,
    enriched: bool,
    caller_ip: Option<IpAddr>,
}

impl Default for IntakeSession {
    fn default() -> Self {
        Self::new()
    }
}

impl IntakeSession {
    /// Empty sample in manual mode
    pub fn new() -> Self {
        Self::with_measurement(SampleMeasurement::new(), InputMode::Manual)
    }

    pub fn with_measurement(measurement: SampleMeasurement, mode: InputMode) -> Self {
        Self {
            submission_id: Uuid::new_v4(),
            measurement,
            mode,
            enriched: false,
            caller_ip: None,
        }
    }

    /// Address of the person submitting; locates a sample with no location text
    pub fn with_caller_ip(mut self, caller_ip: Option<IpAddr>) -> Self {
        self.caller_ip = caller_ip;
        self
    }

    pub fn submission_id(&self) -> Uuid {
        self.submission_id
    }

    pub fn measurement(&self) -> &SampleMeasurement {
        &self.measurement
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    /// Ambient fields already hold looked-up conditions
    pub fn is_enriched(&self) -> bool {
        self.enriched
    }

    /// Switch input mode; values already present are kept
    pub fn set_mode(&mut self, mode: InputMode) {
        if self.mode != mode {
            tracing::debug!(submission_id = %self.submission_id, from = %self.mode, to = %mode, "Input mode changed");
            self.mode = mode;
            self.enriched = false;
        }
    }

    /// Set one field by name
    ///
    /// In location mode the ambient fields belong to the weather lookup and
    /// cannot be edited by hand.
    pub fn set_field(&mut self, name: &str, raw_value: impl Into<String>) -> Result<(), ValidationError> {
        let field: MeasurementField = name.parse()?;
        if self.mode == InputMode::Location && field.is_ambient() {
            return Err(ValidationError::GovernedByLocation(field));
        }
        self.measurement.set(field, raw_value);
        Ok(())
    }

    pub fn validate(&self) -> Vec<FieldViolation> {
        self.measurement.validate()
    }

    /// Switch to location mode and fill the ambient fields from `source`
    ///
    /// On failure the measurement is untouched and the session stays in
    /// location mode; the caller may retry or switch back to manual.
    pub async fn enrich(
        &mut self,
        source: &dyn AmbientConditionsSource,
    ) -> Result<AmbientConditions, EnrichmentError> {
        self.set_mode(InputMode::Location);

        match enrich(source, &mut self.measurement, self.caller_ip).await {
            Ok(conditions) => {
                self.enriched = true;
                Ok(conditions)
            }
            Err(e) => {
                tracing::warn!(submission_id = %self.submission_id, error = %e, "Location enrichment failed");
                Err(e)
            }
        }
    }

    /// Adopt conditions the caller already looked up for this sample
    ///
    /// Switches to location mode; the submission then uses these values
    /// instead of running a second lookup.
    pub fn apply_previewed(&mut self, conditions: &AmbientConditions) {
        self.set_mode(InputMode::Location);
        self.measurement.apply_ambient(conditions);
        self.enriched = true;
        tracing::debug!(submission_id = %self.submission_id, "Using previewed ambient conditions");
    }

    /// Run the full submission flow
    ///
    /// Enrichment (location mode, not yet enriched) completes before the
    /// feature vector is built. Failures are terminal for this attempt: no
    /// partial or default recommendation is produced.
    pub async fn submit(
        &mut self,
        predictor: &dyn CropPredictor,
        ambient: &dyn AmbientConditionsSource,
    ) -> Result<SubmissionOutcome, SubmissionError> {
        if self.mode == InputMode::Location && !self.enriched {
            self.enrich(ambient).await?;
        }

        let features = feature_vector::build(&self.measurement).map_err(|e| {
            tracing::info!(
                submission_id = %self.submission_id,
                violations = e.violations().len(),
                "Submission blocked by validation"
            );
            e
        })?;

        let categorical = CategoricalContext {
            soil_type: self
                .measurement
                .soil_type()
                .map(|s| s.as_str().to_string())
                .unwrap_or_default(),
            location: self.measurement.location().to_string(),
        };

        // Prediction and context projection read disjoint data and mutate nothing
        let measurement = &self.measurement;
        let (prediction, context) = tokio::join!(
            predictor.submit(&features, &categorical),
            async { build_context(measurement) }
        );

        let prediction = prediction.map_err(|e| {
            tracing::warn!(submission_id = %self.submission_id, error = %e, "Prediction failed");
            e
        })?;

        let recommendations = rank_response(&prediction);

        tracing::info!(
            submission_id = %self.submission_id,
            mode = %self.mode,
            recommendations = recommendations.len(),
            top = recommendations.first().map(|r| r.crop.as_str()).unwrap_or("-"),
            "Submission completed"
        );

        Ok(SubmissionOutcome {
            submission_id: self.submission_id,
            features,
            prediction,
            recommendations,
            context,
        })
    }
}
