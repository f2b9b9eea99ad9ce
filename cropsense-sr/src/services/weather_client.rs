//! Ambient-conditions (weather) API client
//!
//! Queries a weatherapi.com-compatible `current.json` endpoint:
//! `GET <url>?key=<api key>&q=<location>` answering
//! `{"current": {"temp_c": .., "humidity": .., "precip_mm": ..}}`.
//! Values may arrive as numbers or numeric strings.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::enrichment::{AmbientConditionsSource, EnrichmentError};
use crate::models::AmbientConditions;

const USER_AGENT: &str = concat!("CropSense/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct WeatherResponse {
    current: CurrentConditions,
}

#[derive(Debug, Deserialize)]
struct CurrentConditions {
    temp_c: NumberLike,
    humidity: NumberLike,
    precip_mm: NumberLike,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberLike {
    Number(f64),
    Text(String),
}

impl NumberLike {
    fn to_f64(&self, name: &str) -> Result<f64, EnrichmentError> {
        let value = match self {
            NumberLike::Number(n) => Some(*n),
            NumberLike::Text(s) => s.trim().parse::<f64>().ok(),
        };
        value
            .filter(|v| v.is_finite())
            .ok_or_else(|| EnrichmentError::ParseError(format!("{} is not a number", name)))
    }
}

/// Weather provider client
pub struct WeatherClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl WeatherClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, EnrichmentError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| EnrichmentError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into(),
            api_key,
        })
    }
}

#[async_trait]
impl AmbientConditionsSource for WeatherClient {
    async fn fetch_ambient_conditions(
        &self,
        location_hint: &str,
    ) -> Result<AmbientConditions, EnrichmentError> {
        let api_key = self.api_key.as_deref().ok_or(EnrichmentError::MissingApiKey)?;

        let query = location_hint.trim();
        if query.is_empty() {
            return Err(EnrichmentError::LocationRequired);
        }

        tracing::debug!(location = %query, url = %self.base_url, "Querying weather API");

        let response = self
            .http_client
            .get(&self.base_url)
            .query(&[("key", api_key), ("q", query)])
            .send()
            .await
            .map_err(|e| EnrichmentError::NetworkError(e.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(EnrichmentError::ApiError(status.as_u16(), error_text));
        }

        let body: WeatherResponse = response
            .json()
            .await
            .map_err(|e| EnrichmentError::ParseError(e.to_string()))?;

        let conditions = AmbientConditions {
            temperature: body.current.temp_c.to_f64("temp_c")?,
            humidity: body.current.humidity.to_f64("humidity")?,
            rainfall: body.current.precip_mm.to_f64("precip_mm")?,
        };

        tracing::info!(
            location = %query,
            temperature = conditions.temperature,
            humidity = conditions.humidity,
            rainfall = conditions.rainfall,
            "Retrieved ambient conditions"
        );

        Ok(conditions)
    }
}
