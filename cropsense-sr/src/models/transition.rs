//! Context carried from the sampling form to the results view
//!
//! The context travels only inside the response that renders the results
//! view. Nothing is stored server-side, so a results view reached any other
//! way (direct URL, reload) has no context and must show [`UNAVAILABLE`].

use serde::{Deserialize, Serialize};

use super::measurement::{MeasurementField, SampleMeasurement};

/// Marker rendered for any context field that did not arrive
pub const UNAVAILABLE: &str = "N/A";

/// Minimal sample subset handed to the results view
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionContext {
    #[serde(default)]
    pub ph: Option<String>,
    #[serde(default)]
    pub moisture: Option<String>,
    #[serde(default)]
    pub texture: Option<String>,
}

/// Project pH, humidity (as moisture) and soil type (as texture)
pub fn build_context(measurement: &SampleMeasurement) -> TransitionContext {
    let copy = |field| measurement.get(field).map(str::to_string);
    TransitionContext {
        ph: copy(MeasurementField::Ph),
        moisture: copy(MeasurementField::Humidity),
        texture: copy(MeasurementField::SoilType),
    }
}

/// Display-ready sample summary for the results view
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampleSummary {
    pub ph: String,
    pub moisture: String,
    pub texture: String,
}

impl SampleSummary {
    /// Resolve a possibly-absent context; blank or missing fields become "N/A"
    pub fn from_received(context: Option<&TransitionContext>) -> Self {
        let resolve = |value: Option<&String>| {
            value
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .unwrap_or(UNAVAILABLE)
                .to_string()
        };

        match context {
            Some(ctx) => Self {
                ph: resolve(ctx.ph.as_ref()),
                moisture: resolve(ctx.moisture.as_ref()),
                texture: resolve(ctx.texture.as_ref()),
            },
            None => Self::unavailable(),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            ph: UNAVAILABLE.to_string(),
            moisture: UNAVAILABLE.to_string(),
            texture: UNAVAILABLE.to_string(),
        }
    }
}
