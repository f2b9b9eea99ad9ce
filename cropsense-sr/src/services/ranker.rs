//! Recommendation ranker
//!
//! Turns the predictor's probability map into the ordered list the results
//! view displays. Map iteration order is never relied on: entries are sorted
//! by descending confidence, ties broken by ascending crop label.

use serde_json::Value;
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::models::{PredictionResponse, RankedRecommendation};

/// Rank a probability map, dropping entries with confidence ≤ 0
///
/// Values coerce to numbers the way a browser would read them: JSON numbers
/// as-is, numeric strings parsed, anything else (or non-finite) discarded.
pub fn rank(probabilities: &BTreeMap<String, Value>) -> Vec<RankedRecommendation> {
    let mut scored: Vec<(&str, f64)> = probabilities
        .iter()
        .filter_map(|(crop, value)| coerce(value).map(|score| (crop.as_str(), score)))
        .filter(|(_, score)| *score > 0.0)
        .collect();

    scored.sort_by(|(crop_a, score_a), (crop_b, score_b)| {
        score_b
            .partial_cmp(score_a)
            .unwrap_or(Ordering::Equal)
            .then_with(|| crop_a.cmp(crop_b))
    });

    scored
        .into_iter()
        .map(|(crop, score)| RankedRecommendation::scored(crop, score))
        .collect()
}

/// Rank a full predictor response
///
/// Uses the probability map when present. A response carrying only a
/// top-line label yields that single crop with unknown confidence.
pub fn rank_response(response: &PredictionResponse) -> Vec<RankedRecommendation> {
    match (&response.probabilities, &response.prediction) {
        (Some(probabilities), _) => rank(probabilities),
        (None, Some(label)) => vec![RankedRecommendation::unscored(label.clone())],
        (None, None) => Vec::new(),
    }
}

fn coerce(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|v| v.is_finite())
}
