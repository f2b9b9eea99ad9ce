//! Location enrichment
//!
//! Substitutes temperature, humidity and rainfall from an ambient-conditions
//! source in place of manual entry. The measurement is only touched after
//! the lookup fully succeeds; a failed lookup leaves it exactly as it was.

use async_trait::async_trait;
use std::net::IpAddr;
use thiserror::Error;

use crate::models::{AmbientConditions, SampleMeasurement};

/// Ambient-conditions lookup failure
#[derive(Debug, Error)]
pub enum EnrichmentError {
    #[error("Enrichment failed: network error: {0}")]
    NetworkError(String),

    #[error("Enrichment failed: provider returned {0}: {1}")]
    ApiError(u16, String),

    #[error("Enrichment failed: malformed provider payload: {0}")]
    ParseError(String),

    #[error("Enrichment failed: no weather API key configured")]
    MissingApiKey,

    #[error("Enrichment failed: no location given and the caller's address cannot be geolocated; enter a location")]
    LocationRequired,
}

/// Source of current conditions for a location
#[async_trait]
pub trait AmbientConditionsSource: Send + Sync {
    /// Look up current conditions; performs one outbound call
    ///
    /// An empty hint fails with [`EnrichmentError::LocationRequired`]
    /// without any outbound call.
    async fn fetch_ambient_conditions(
        &self,
        location_hint: &str,
    ) -> Result<AmbientConditions, EnrichmentError>;
}

/// Whether a weather provider can place this address
///
/// Loopback, private, link-local and unspecified addresses would be
/// geolocated as nowhere or as the service host.
pub fn is_geolocatable(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            !(v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_unspecified()
                || v4.is_broadcast())
        }
        IpAddr::V6(v6) => {
            if let Some(v4) = v6.to_ipv4_mapped() {
                return is_geolocatable(IpAddr::V4(v4));
            }
            let first = v6.segments()[0];
            !(v6.is_loopback()
                || v6.is_unspecified()
                || (first & 0xfe00) == 0xfc00
                || (first & 0xffc0) == 0xfe80)
        }
    }
}

/// Query for the weather lookup: typed location first, else the caller's
/// public address, else empty
pub fn location_hint(location: &str, caller_ip: Option<IpAddr>) -> String {
    let location = location.trim();
    if !location.is_empty() {
        return location.to_string();
    }
    caller_ip
        .filter(|ip| is_geolocatable(*ip))
        .map(|ip| ip.to_string())
        .unwrap_or_default()
}

/// Fetch conditions for the sample's location and overwrite its ambient fields
pub async fn enrich(
    source: &dyn AmbientConditionsSource,
    measurement: &mut SampleMeasurement,
    caller_ip: Option<IpAddr>,
) -> Result<AmbientConditions, EnrichmentError> {
    let hint = location_hint(measurement.location(), caller_ip);
    let conditions = source.fetch_ambient_conditions(&hint).await?;

    measurement.apply_ambient(&conditions);

    tracing::info!(
        temperature = conditions.temperature,
        humidity = conditions.humidity,
        rainfall = conditions.rainfall,
        "Applied location-derived ambient conditions"
    );

    Ok(conditions)
}
