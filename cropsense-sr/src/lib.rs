//! cropsense-sr library interface
//!
//! Exposes the sample intake workflow and the HTTP router for integration
//! testing and for the binary.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod workflow;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;

use crate::config::ServiceConfig;
use crate::services::{AmbientConditionsSource, CropPredictor, PredictionClient, WeatherClient};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Prediction service client
    pub predictor: Arc<dyn CropPredictor>,
    /// Ambient-conditions lookup used in location mode
    pub ambient: Arc<dyn AmbientConditionsSource>,
    /// Maximum recommendations rendered on the results page
    pub display_limit: Option<usize>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last upstream failure, for diagnostics
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(
        predictor: Arc<dyn CropPredictor>,
        ambient: Arc<dyn AmbientConditionsSource>,
    ) -> Self {
        Self {
            predictor,
            ambient,
            display_limit: None,
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }

    pub fn with_display_limit(mut self, limit: Option<usize>) -> Self {
        self.display_limit = limit;
        self
    }

    /// Build state with real HTTP clients from resolved configuration
    pub fn from_config(config: &ServiceConfig) -> Result<Self, ApiError> {
        let predictor = PredictionClient::new(config.predictor_url.clone(), config.request_timeout)?;
        let weather = WeatherClient::new(
            config.weather_url.clone(),
            config.weather_api_key.clone(),
            config.request_timeout,
        )?;

        Ok(Self::new(Arc::new(predictor), Arc::new(weather))
            .with_display_limit(config.display_limit))
    }

    /// Remember an upstream failure for the health endpoint
    pub async fn record_error(&self, message: impl Into<String>) {
        *self.last_error.write().await = Some(message.into());
    }

    /// Forget the last upstream failure once an upstream call succeeds again
    pub async fn clear_error(&self) {
        let mut last_error = self.last_error.write().await;
        if last_error.take().is_some() {
            tracing::info!("Upstream services recovered");
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // UI routes (HTML pages)
        .merge(api::ui_routes())
        // JSON API routes
        .merge(api::sample_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
