//! Service modules for the sample recommendation flow
//!
//! Leaves first: feature vector builder, enrichment (plus its weather
//! client), prediction client, ranker.

pub mod enrichment;
pub mod feature_vector;
pub mod prediction_client;
pub mod ranker;
pub mod weather_client;

pub use enrichment::{enrich, location_hint, AmbientConditionsSource, EnrichmentError};
pub use feature_vector::{FeatureVector, FEATURE_COUNT, FEATURE_ORDER};
pub use prediction_client::{CategoricalContext, CropPredictor, PredictionClient, PredictionError};
pub use ranker::{rank, rank_response};
pub use weather_client::WeatherClient;
