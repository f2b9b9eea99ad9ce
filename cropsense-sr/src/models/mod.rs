//! Data models for cropsense-sr (Sample Recommender)
//!
//! - Soil sample measurement record and its validation
//! - Predictor response and ranked recommendations
//! - Context carried to the results view

pub mod measurement;
pub mod recommendation;
pub mod transition;

pub use measurement::{
    AmbientConditions, FieldViolation, MeasurementField, SampleMeasurement, SoilType,
    ValidationError, ViolationReason,
};
pub use recommendation::{Confidence, PredictionResponse, RankedRecommendation};
pub use transition::{build_context, SampleSummary, TransitionContext, UNAVAILABLE};
