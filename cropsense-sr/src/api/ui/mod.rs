//! UI routes: HTML pages for the sample recommender
//!
//! - **Static Assets** (`static_assets`): CSS/JS served from the binary
//! - **Sampling Form** (`form`): the one form rendering, plus its POST handler
//! - **Results** (`results`): summary and ranked recommendations

use askama_escape::{escape, Html};
use axum::{
    routing::{get, post},
    Router,
};

use crate::AppState;

mod form;
mod results;
mod static_assets;

pub use form::{render_form, FormView, Notice};
pub use results::render_results;

/// Build UI routes
pub fn ui_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(form::form_page))
        .route("/samples", post(form::submit_form))
        .route("/results", get(results::results_page))
        .route("/static/cropsense.css", get(static_assets::serve_css))
        .route("/static/sampling-form.js", get(static_assets::serve_form_js))
}

/// Escape text for inclusion in HTML element content or quoted attributes
pub fn escape_html(text: &str) -> String {
    escape(text, Html).to_string()
}

/// Wrap page content in the shared shell (head, header with build info)
fn page(title: &str, content: &str, script: Option<&str>) -> String {
    let script_tag = script
        .map(|src| format!(r#"<script src="{}"></script>"#, src))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>CropSense - {title}</title>
    <link rel="stylesheet" href="/static/cropsense.css">
    {script_tag}
</head>
<body>
    <header>
        <div class="header-content">
            <div>
                <h1>CropSense</h1>
                <div class="subtitle">{title}</div>
            </div>
            <div class="header-right">
                <div>v{version} [{git_hash}]</div>
                <div>{build_timestamp}</div>
                <div>({build_profile})</div>
            </div>
        </div>
    </header>
    <main>
{content}
    </main>
</body>
</html>
"#,
        title = escape_html(title),
        script_tag = script_tag,
        version = env!("CARGO_PKG_VERSION"),
        git_hash = env!("GIT_HASH"),
        build_timestamp = env!("BUILD_TIMESTAMP"),
        build_profile = env!("BUILD_PROFILE"),
        content = content,
    )
}
