//! Static asset handlers, embedded at compile time

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

const CROPSENSE_CSS: &str = include_str!("../../../static/cropsense.css");
const SAMPLING_FORM_JS: &str = include_str!("../../../static/sampling-form.js");

/// GET /static/cropsense.css
pub async fn serve_css() -> Response {
    (
        StatusCode::OK,
        [
            ("content-type", "text/css"),
            ("cache-control", "no-cache, no-store, must-revalidate"),
        ],
        CROPSENSE_CSS,
    )
        .into_response()
}

/// GET /static/sampling-form.js
pub async fn serve_form_js() -> Response {
    (
        StatusCode::OK,
        [
            ("content-type", "application/javascript"),
            ("cache-control", "no-cache, no-store, must-revalidate"),
        ],
        SAMPLING_FORM_JS,
    )
        .into_response()
}
