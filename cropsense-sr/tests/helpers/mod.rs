//! Test helpers: stub upstream services on ephemeral ports
//!
//! Each stub is a real axum server bound to 127.0.0.1:0 so the production
//! reqwest clients are exercised end to end.

#![allow(dead_code)]

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cropsense_sr::services::{PredictionClient, WeatherClient};
use cropsense_sr::AppState;

/// Requests seen by a stub, in arrival order
pub type Recorded = Arc<Mutex<Vec<Value>>>;

/// Address that refuses connections (nothing listens on port 1)
pub const UNREACHABLE: &str = "http://127.0.0.1:1";

/// Serve `router` on an ephemeral local port
pub async fn spawn(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

#[derive(Clone)]
struct StubReply {
    status: StatusCode,
    body: String,
    delay: Duration,
    recorded: Recorded,
}

async fn predict_handler(
    State(reply): State<StubReply>,
    Json(request): Json<Value>,
) -> (StatusCode, [(&'static str, &'static str); 1], String) {
    reply.recorded.lock().unwrap().push(request);
    tokio::time::sleep(reply.delay).await;
    (reply.status, [("content-type", "application/json")], reply.body)
}

async fn weather_handler(
    State(reply): State<StubReply>,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, [(&'static str, &'static str); 1], String) {
    reply.recorded.lock().unwrap().push(json!(params));
    (reply.status, [("content-type", "application/json")], reply.body)
}

/// Prediction stub answering POST /predict with a raw body
pub async fn predictor_raw(status: u16, body: &str, delay: Duration) -> (String, Recorded) {
    let recorded: Recorded = Arc::default();
    let reply = StubReply {
        status: StatusCode::from_u16(status).unwrap(),
        body: body.to_string(),
        delay,
        recorded: recorded.clone(),
    };
    let router = Router::new()
        .route("/predict", post(predict_handler))
        .with_state(reply);
    let addr = spawn(router).await;
    (format!("http://{}/predict", addr), recorded)
}

/// Prediction stub answering POST /predict with JSON
pub async fn predictor(status: u16, body: Value) -> (String, Recorded) {
    predictor_raw(status, &body.to_string(), Duration::ZERO).await
}

/// Weather stub answering GET /v1/current.json; records the query string
pub async fn weather(status: u16, body: Value) -> (String, Recorded) {
    let recorded: Recorded = Arc::default();
    let reply = StubReply {
        status: StatusCode::from_u16(status).unwrap(),
        body: body.to_string(),
        delay: Duration::ZERO,
        recorded: recorded.clone(),
    };
    let router = Router::new()
        .route("/v1/current.json", get(weather_handler))
        .with_state(reply);
    let addr = spawn(router).await;
    (format!("http://{}/v1/current.json", addr), recorded)
}

/// Typical weatherapi.com payload
pub fn weather_payload(temp_c: f64, humidity: f64, precip_mm: f64) -> Value {
    json!({
        "location": {"name": "Pune"},
        "current": {"temp_c": temp_c, "humidity": humidity, "precip_mm": precip_mm}
    })
}

/// App state wired to real clients against the given URLs
pub fn app_state(predictor_url: &str, weather_url: &str) -> AppState {
    let predictor = PredictionClient::new(predictor_url, Duration::from_secs(2)).unwrap();
    let weather =
        WeatherClient::new(weather_url, Some("test-key".to_string()), Duration::from_secs(2)).unwrap();
    AppState::new(Arc::new(predictor), Arc::new(weather))
}

/// App state whose upstreams are unreachable
pub fn offline_state() -> AppState {
    app_state(
        &format!("{}/predict", UNREACHABLE),
        &format!("{}/v1/current.json", UNREACHABLE),
    )
}

/// The reference loam sample as JSON API fields
pub fn loam_fields() -> Value {
    json!({
        "nitrogen": 50,
        "phosphorus": 40,
        "potassium": 45,
        "temperature": 25,
        "humidity": 60,
        "ph": 6.5,
        "rainfall": 120,
        "soilType": "loam"
    })
}

/// The reference loam sample as an url-encoded form body
pub fn loam_form(mode: &str) -> String {
    format!(
        "mode={}&nitrogen=50&phosphorus=40&potassium=45&temperature=25&humidity=60&ph=6.5&rainfall=120&soilType=loam&location=",
        mode
    )
}
