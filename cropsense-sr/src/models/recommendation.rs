//! Prediction response and ranked recommendation types

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Normalized predictor result
///
/// At least one of `prediction` / `probabilities` is present once the
/// prediction client has accepted a response. Confidence values are kept as
/// raw JSON so the ranker decides how each one coerces to a number.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    /// Top-line crop label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction: Option<String>,

    /// Crop label → confidence (percentage convention, 0-100)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probabilities: Option<BTreeMap<String, Value>>,
}

/// Confidence attached to one recommendation
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Confidence {
    /// Predictor-reported percentage
    Score(f64),
    /// Predictor named the crop without a probability map
    Unknown,
}

impl Confidence {
    pub fn score(self) -> Option<f64> {
        match self {
            Confidence::Score(value) => Some(value),
            Confidence::Unknown => None,
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::Score(value) => write!(f, "{:.2}%", value),
            Confidence::Unknown => f.write_str("unknown"),
        }
    }
}

/// One displayable (crop, confidence) entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedRecommendation {
    pub crop: String,
    pub confidence: Confidence,
}

impl RankedRecommendation {
    pub fn scored(crop: impl Into<String>, confidence: f64) -> Self {
        Self {
            crop: crop.into(),
            confidence: Confidence::Score(confidence),
        }
    }

    pub fn unscored(crop: impl Into<String>) -> Self {
        Self {
            crop: crop.into(),
            confidence: Confidence::Unknown,
        }
    }

    /// Bar width for the results view, clamped to 0-100
    pub fn bar_width(&self) -> f64 {
        self.confidence.score().map(|v| v.clamp(0.0, 100.0)).unwrap_or(0.0)
    }
}
