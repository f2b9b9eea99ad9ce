//! Feature vector builder
//!
//! Maps a validated [`SampleMeasurement`] to the fixed-order numeric vector
//! the predictor was trained on. The predictor cannot detect a transposed
//! vector, so [`FEATURE_ORDER`] is the only place the order is written down.

use serde::Serialize;

use crate::models::{MeasurementField, SampleMeasurement, ValidationError};

/// Number of features the predictor expects
pub const FEATURE_COUNT: usize = 7;

/// Predictor input order: N, P, K, temperature, humidity, pH, rainfall
pub const FEATURE_ORDER: [MeasurementField; FEATURE_COUNT] = [
    MeasurementField::Nitrogen,
    MeasurementField::Phosphorus,
    MeasurementField::Potassium,
    MeasurementField::Temperature,
    MeasurementField::Humidity,
    MeasurementField::Ph,
    MeasurementField::Rainfall,
];

/// Ordered, finite feature values; serializes as a plain JSON array
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.0
    }

    /// Value for one named feature
    pub fn get(&self, field: MeasurementField) -> Option<f64> {
        FEATURE_ORDER
            .iter()
            .position(|f| *f == field)
            .map(|index| self.0[index])
    }
}

/// Build the predictor vector, failing closed on any invalid field
pub fn build(measurement: &SampleMeasurement) -> Result<FeatureVector, ValidationError> {
    let violations = measurement.validate();
    if !violations.is_empty() {
        return Err(ValidationError::Invalid(violations));
    }

    let mut values = [0.0; FEATURE_COUNT];
    for (slot, field) in values.iter_mut().zip(FEATURE_ORDER) {
        // validate() guarantees every numeric field parses to a finite value
        *slot = measurement
            .numeric(field)
            .ok_or_else(|| ValidationError::Invalid(measurement.validate()))?;
    }

    Ok(FeatureVector(values))
}
