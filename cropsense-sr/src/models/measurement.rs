//! Soil sample measurement record
//!
//! A [`SampleMeasurement`] holds exactly what the user typed, keyed by field.
//! Nothing is coerced when a field is set; [`SampleMeasurement::validate`] is
//! the single place where text becomes numbers, and it reports every problem
//! at once so a form can highlight all offending inputs together.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Named fields of a soil sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MeasurementField {
    Nitrogen,
    Phosphorus,
    Potassium,
    Temperature,
    Humidity,
    Ph,
    Rainfall,
    SoilType,
    Location,
}

impl MeasurementField {
    pub const ALL: [MeasurementField; 9] = [
        MeasurementField::Nitrogen,
        MeasurementField::Phosphorus,
        MeasurementField::Potassium,
        MeasurementField::Temperature,
        MeasurementField::Humidity,
        MeasurementField::Ph,
        MeasurementField::Rainfall,
        MeasurementField::SoilType,
        MeasurementField::Location,
    ];

    /// Fields the location enrichment adapter may overwrite
    pub const AMBIENT: [MeasurementField; 3] = [
        MeasurementField::Temperature,
        MeasurementField::Humidity,
        MeasurementField::Rainfall,
    ];

    /// Wire/form name of the field
    pub fn name(self) -> &'static str {
        match self {
            MeasurementField::Nitrogen => "nitrogen",
            MeasurementField::Phosphorus => "phosphorus",
            MeasurementField::Potassium => "potassium",
            MeasurementField::Temperature => "temperature",
            MeasurementField::Humidity => "humidity",
            MeasurementField::Ph => "ph",
            MeasurementField::Rainfall => "rainfall",
            MeasurementField::SoilType => "soilType",
            MeasurementField::Location => "location",
        }
    }

    /// Human-readable label used in forms and violation messages
    pub fn label(self) -> &'static str {
        match self {
            MeasurementField::Nitrogen => "Nitrogen (N)",
            MeasurementField::Phosphorus => "Phosphorus (P)",
            MeasurementField::Potassium => "Potassium (K)",
            MeasurementField::Temperature => "Temperature (°C)",
            MeasurementField::Humidity => "Humidity (%)",
            MeasurementField::Ph => "pH Level",
            MeasurementField::Rainfall => "Rainfall (mm)",
            MeasurementField::SoilType => "Soil Type",
            MeasurementField::Location => "Location",
        }
    }

    /// Inclusive [min, max] domain for numeric fields, `None` otherwise
    pub fn range(self) -> Option<(f64, f64)> {
        match self {
            MeasurementField::Nitrogen => Some((0.0, 200.0)),
            MeasurementField::Phosphorus => Some((0.0, 100.0)),
            MeasurementField::Potassium => Some((0.0, 200.0)),
            MeasurementField::Temperature => Some((0.0, 50.0)),
            MeasurementField::Humidity => Some((0.0, 100.0)),
            MeasurementField::Ph => Some((0.0, 14.0)),
            MeasurementField::Rainfall => Some((0.0, 500.0)),
            MeasurementField::SoilType | MeasurementField::Location => None,
        }
    }

    pub fn is_ambient(self) -> bool {
        Self::AMBIENT.contains(&self)
    }
}

impl fmt::Display for MeasurementField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MeasurementField {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.name() == s)
            .ok_or_else(|| ValidationError::UnknownField(s.to_string()))
    }
}

/// Soil texture classes accepted by the predictor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoilType {
    Sandy,
    Clay,
    Silt,
    Peat,
    Chalk,
    Loam,
}

impl SoilType {
    pub const ALL: [SoilType; 6] = [
        SoilType::Sandy,
        SoilType::Clay,
        SoilType::Silt,
        SoilType::Peat,
        SoilType::Chalk,
        SoilType::Loam,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SoilType::Sandy => "sandy",
            SoilType::Clay => "clay",
            SoilType::Silt => "silt",
            SoilType::Peat => "peat",
            SoilType::Chalk => "chalk",
            SoilType::Loam => "loam",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            SoilType::Sandy => "Sandy",
            SoilType::Clay => "Clay",
            SoilType::Silt => "Silt",
            SoilType::Peat => "Peat",
            SoilType::Chalk => "Chalk",
            SoilType::Loam => "Loam",
        }
    }
}

impl fmt::Display for SoilType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SoilType {
    type Err = ();

    /// Only the lowercase wire names are accepted
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|soil| soil.as_str() == s)
            .ok_or(())
    }
}

/// Why a single field failed validation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViolationReason {
    /// Required field left empty
    Missing,
    /// Text does not parse to a finite number
    NotANumber,
    /// Number outside the field's declared domain
    OutOfRange { min: f64, max: f64 },
    /// Soil type is not one of the enumerated classes
    UnknownSoilType,
}

/// One field-level validation failure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldViolation {
    pub field: MeasurementField,
    pub value: String,
    pub reason: ViolationReason,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = self.field.label();
        match &self.reason {
            ViolationReason::Missing => write!(f, "{} is required", label),
            ViolationReason::NotANumber => {
                write!(f, "{} must be a number (got '{}')", label, self.value)
            }
            ViolationReason::OutOfRange { min, max } => write!(
                f,
                "{} must be between {:.2} and {:.2} (got {})",
                label, min, max, self.value
            ),
            ViolationReason::UnknownSoilType => write!(
                f,
                "{} must be one of sandy, clay, silt, peat, chalk, loam (got '{}')",
                label, self.value
            ),
        }
    }
}

/// Input rejected before it could reach the predictor
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Unknown measurement field: {0}")]
    UnknownField(String),

    #[error("{0} is governed by location data; switch to manual entry to edit it")]
    GovernedByLocation(MeasurementField),

    #[error("{} field(s) failed validation", .0.len())]
    Invalid(Vec<FieldViolation>),
}

impl ValidationError {
    /// Field-level violations carried by this error (empty for non-field errors)
    pub fn violations(&self) -> &[FieldViolation] {
        match self {
            ValidationError::Invalid(violations) => violations,
            _ => &[],
        }
    }
}

/// Current temperature, humidity and rainfall reported for a location
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmbientConditions {
    pub temperature: f64,
    pub humidity: f64,
    pub rainfall: f64,
}

/// User-authored soil sample, stored verbatim as entered
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleMeasurement {
    values: BTreeMap<MeasurementField, String>,
}

impl SampleMeasurement {
    /// Empty record, as on form open
    pub fn new() -> Self {
        Self::default()
    }

    /// Store raw text for a named field
    ///
    /// Unknown names are rejected; the value itself is not checked here.
    pub fn set_field(&mut self, name: &str, raw_value: impl Into<String>) -> Result<(), ValidationError> {
        let field: MeasurementField = name.parse()?;
        self.set(field, raw_value);
        Ok(())
    }

    /// Store raw text for a known field
    pub fn set(&mut self, field: MeasurementField, raw_value: impl Into<String>) {
        self.values.insert(field, raw_value.into());
    }

    /// Raw text of a field, `None` if never set
    pub fn get(&self, field: MeasurementField) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    /// Parsed value of a numeric field, if it is a finite number
    pub fn numeric(&self, field: MeasurementField) -> Option<f64> {
        self.get(field).and_then(parse_finite)
    }

    pub fn soil_type(&self) -> Option<SoilType> {
        self.get(MeasurementField::SoilType)
            .and_then(|raw| raw.parse().ok())
    }

    /// Free-form location hint; empty when not provided
    pub fn location(&self) -> &str {
        self.get(MeasurementField::Location).map(str::trim).unwrap_or("")
    }

    /// Overwrite exactly the three ambient fields
    pub fn apply_ambient(&mut self, conditions: &AmbientConditions) {
        self.set(MeasurementField::Temperature, conditions.temperature.to_string());
        self.set(MeasurementField::Humidity, conditions.humidity.to_string());
        self.set(MeasurementField::Rainfall, conditions.rainfall.to_string());
    }

    /// Check every field, returning all violations (empty = valid)
    pub fn validate(&self) -> Vec<FieldViolation> {
        let mut violations = Vec::new();

        for field in MeasurementField::ALL {
            let raw = self.get(field).unwrap_or("");

            if let Some((min, max)) = field.range() {
                if raw.trim().is_empty() {
                    violations.push(violation(field, raw, ViolationReason::Missing));
                    continue;
                }
                match parse_finite(raw) {
                    None => violations.push(violation(field, raw, ViolationReason::NotANumber)),
                    Some(value) if value < min || value > max => violations.push(violation(
                        field,
                        raw,
                        ViolationReason::OutOfRange { min, max },
                    )),
                    Some(_) => {}
                }
            } else if field == MeasurementField::SoilType {
                if raw.trim().is_empty() {
                    violations.push(violation(field, raw, ViolationReason::Missing));
                } else if raw.parse::<SoilType>().is_err() {
                    violations.push(violation(field, raw, ViolationReason::UnknownSoilType));
                }
            }
        }

        violations
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

fn violation(field: MeasurementField, raw: &str, reason: ViolationReason) -> FieldViolation {
    FieldViolation {
        field,
        value: raw.to_string(),
        reason,
    }
}

fn parse_finite(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
