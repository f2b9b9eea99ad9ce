//! Prediction and weather clients against stub servers

mod helpers;

use serde_json::json;
use std::time::Duration;

use cropsense_sr::models::{MeasurementField, SampleMeasurement};
use cropsense_sr::services::{
    feature_vector, AmbientConditionsSource, CategoricalContext, CropPredictor, EnrichmentError,
    FeatureVector, PredictionClient, PredictionError, WeatherClient,
};

fn loam_features() -> FeatureVector {
    let mut measurement = SampleMeasurement::new();
    for (field, value) in [
        (MeasurementField::Nitrogen, "50"),
        (MeasurementField::Phosphorus, "40"),
        (MeasurementField::Potassium, "45"),
        (MeasurementField::Temperature, "25"),
        (MeasurementField::Humidity, "60"),
        (MeasurementField::Ph, "6.5"),
        (MeasurementField::Rainfall, "120"),
        (MeasurementField::SoilType, "loam"),
    ] {
        measurement.set(field, value);
    }
    feature_vector::build(&measurement).unwrap()
}

fn loam_context() -> CategoricalContext {
    CategoricalContext {
        soil_type: "loam".to_string(),
        location: "Pune".to_string(),
    }
}

async fn submit_to(url: &str, timeout: Duration) -> Result<cropsense_sr::models::PredictionResponse, PredictionError> {
    let client = PredictionClient::new(url, timeout).unwrap();
    client.submit(&loam_features(), &loam_context()).await
}

#[tokio::test]
async fn test_predictor_receives_features_in_fixed_order() {
    let (url, recorded) = helpers::predictor(200, json!({"prediction": "rice"})).await;

    submit_to(&url, Duration::from_secs(2)).await.unwrap();

    let requests = recorded.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0],
        json!({
            "features": [50.0, 40.0, 45.0, 25.0, 60.0, 6.5, 120.0],
            "soilType": "loam",
            "location": "Pune"
        })
    );
}

#[tokio::test]
async fn test_probabilities_response() {
    let (url, _) = helpers::predictor(
        200,
        json!({"prediction": "rice", "probabilities": {"rice": 80, "maize": 15, "cotton": 0}}),
    )
    .await;

    let response = submit_to(&url, Duration::from_secs(2)).await.unwrap();

    assert_eq!(response.prediction.as_deref(), Some("rice"));
    let probabilities = response.probabilities.unwrap();
    assert_eq!(probabilities.len(), 3);
    assert_eq!(probabilities["rice"], json!(80));
}

#[tokio::test]
async fn test_map_shaped_prediction_becomes_probabilities() {
    let (url, _) = helpers::predictor(200, json!({"prediction": {"rice": 0.7, "jute": 0.3}})).await;

    let response = submit_to(&url, Duration::from_secs(2)).await.unwrap();

    assert_eq!(response.prediction, None);
    assert_eq!(response.probabilities.unwrap().len(), 2);
}

#[tokio::test]
async fn test_server_error_surfaces_upstream_message() {
    let (url, _) =
        helpers::predictor(400, json!({"error": "Missing 'features' key in request."})).await;

    let err = submit_to(&url, Duration::from_secs(2)).await.unwrap_err();

    match err {
        PredictionError::ServerError { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Missing 'features' key in request.");
        }
        other => panic!("expected ServerError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_server_error_without_body() {
    let (url, _) = helpers::predictor_raw(500, "", Duration::ZERO).await;

    let err = submit_to(&url, Duration::from_secs(2)).await.unwrap_err();
    assert!(matches!(
        err,
        PredictionError::ServerError { status: 500, ref message } if message == "no response body"
    ));
}

#[tokio::test]
async fn test_malformed_responses() {
    let (url, _) = helpers::predictor_raw(200, "<html>oops</html>", Duration::ZERO).await;
    assert!(matches!(
        submit_to(&url, Duration::from_secs(2)).await,
        Err(PredictionError::MalformedResponse(_))
    ));

    let (url, _) = helpers::predictor(200, json!({"result": "rice"})).await;
    assert!(matches!(
        submit_to(&url, Duration::from_secs(2)).await,
        Err(PredictionError::MalformedResponse(_))
    ));

    let (url, _) = helpers::predictor(200, json!({"probabilities": [80, 15]})).await;
    assert!(matches!(
        submit_to(&url, Duration::from_secs(2)).await,
        Err(PredictionError::MalformedResponse(_))
    ));
}

#[tokio::test]
async fn test_timeout_is_network_error() {
    let (url, _) =
        helpers::predictor_raw(200, r#"{"prediction": "rice"}"#, Duration::from_millis(800)).await;

    let err = submit_to(&url, Duration::from_millis(100)).await.unwrap_err();
    assert!(matches!(err, PredictionError::NetworkError(_)));
}

#[tokio::test]
async fn test_unreachable_predictor_is_network_error() {
    let url = format!("{}/predict", helpers::UNREACHABLE);

    let err = submit_to(&url, Duration::from_secs(2)).await.unwrap_err();
    assert!(matches!(err, PredictionError::NetworkError(_)));
}

#[tokio::test]
async fn test_weather_lookup_sends_key_and_location() {
    let (url, recorded) = helpers::weather(200, helpers::weather_payload(31.2, 74.0, 2.5)).await;
    let client = WeatherClient::new(&url, Some("secret".to_string()), Duration::from_secs(2)).unwrap();

    let conditions = client.fetch_ambient_conditions("  Nashik ").await.unwrap();

    assert_eq!(conditions.temperature, 31.2);
    assert_eq!(conditions.humidity, 74.0);
    assert_eq!(conditions.rainfall, 2.5);
    let queries = recorded.lock().unwrap();
    assert_eq!(queries[0], json!({"key": "secret", "q": "Nashik"}));
}

#[tokio::test]
async fn test_weather_lookup_accepts_numeric_strings() {
    let (url, recorded) = helpers::weather(
        200,
        json!({"current": {"temp_c": "18", "humidity": "55", "precip_mm": "0.1"}}),
    )
    .await;
    let client = WeatherClient::new(&url, Some("secret".to_string()), Duration::from_secs(2)).unwrap();

    let conditions = client.fetch_ambient_conditions("Pune").await.unwrap();

    assert_eq!(conditions.temperature, 18.0);
    assert_eq!(conditions.rainfall, 0.1);
    assert_eq!(recorded.lock().unwrap()[0]["q"], json!("Pune"));
}

#[tokio::test]
async fn test_weather_lookup_without_location_makes_no_request() {
    let (url, recorded) = helpers::weather(200, helpers::weather_payload(18.0, 55.0, 0.0)).await;
    let client = WeatherClient::new(&url, Some("secret".to_string()), Duration::from_secs(2)).unwrap();

    assert!(matches!(
        client.fetch_ambient_conditions("   ").await,
        Err(EnrichmentError::LocationRequired)
    ));
    assert!(recorded.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_weather_provider_errors() {
    let (url, _) = helpers::weather(401, json!({"error": {"code": 2006, "message": "API key is invalid."}})).await;
    let client = WeatherClient::new(&url, Some("bad".to_string()), Duration::from_secs(2)).unwrap();
    assert!(matches!(
        client.fetch_ambient_conditions("Pune").await,
        Err(EnrichmentError::ApiError(401, _))
    ));

    let (url, _) = helpers::weather(200, json!({"location": {"name": "Pune"}})).await;
    let client = WeatherClient::new(&url, Some("key".to_string()), Duration::from_secs(2)).unwrap();
    assert!(matches!(
        client.fetch_ambient_conditions("Pune").await,
        Err(EnrichmentError::ParseError(_))
    ));
}
