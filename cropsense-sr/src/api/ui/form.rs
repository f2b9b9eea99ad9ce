//! Soil sampling form: the single canonical rendering and its submission

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
    Form,
};
use std::collections::HashMap;

use super::{escape_html, page, render_results};
use crate::api::samples::log_session_token;
use crate::api::CallerIp;
use crate::error::ApiError;
use crate::models::{
    AmbientConditions, FieldViolation, MeasurementField, SampleMeasurement, SampleSummary, SoilType,
};
use crate::workflow::{InputMode, IntakeSession, SubmissionError};
use crate::AppState;

/// Banner shown above the form
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// Submission failed; the attempt is over
    Error(String),
    /// Location lookup failed; the user can retry or go manual
    Retryable(String),
}

/// Everything needed to render the form
#[derive(Debug, Clone, Default)]
pub struct FormView {
    pub measurement: SampleMeasurement,
    pub mode: InputMode,
    pub violations: Vec<FieldViolation>,
    pub notice: Option<Notice>,
    /// Ambient values on the form came from a location lookup
    pub enriched: bool,
}

/// Form fields that are not sample measurements
const CONTROL_FIELDS: [&str; 2] = ["mode", "enriched"];

/// GET /
pub async fn form_page() -> impl IntoResponse {
    Html(render_form(&FormView::default()))
}

/// POST /samples
///
/// Runs the whole submission flow. Success renders the results view with
/// the transition context; any failure re-renders the form with the
/// entered values intact. Conditions already shown by "Use Location" are
/// submitted as they are, without a second lookup.
pub async fn submit_form(
    State(state): State<AppState>,
    CallerIp(caller_ip): CallerIp,
    headers: HeaderMap,
    Form(fields): Form<HashMap<String, String>>,
) -> Result<Response, ApiError> {
    log_session_token(&headers);

    let mode: InputMode = fields
        .get("mode")
        .map(|m| m.parse::<InputMode>())
        .transpose()
        .map_err(ApiError::BadRequest)?
        .unwrap_or_default();

    let mut entered = SampleMeasurement::new();
    for (name, value) in fields
        .iter()
        .filter(|(name, _)| !CONTROL_FIELDS.contains(&name.as_str()))
    {
        entered.set_field(name, value.as_str())?;
    }

    let previewed = (mode == InputMode::Location
        && fields.get("enriched").map(String::as_str) == Some("1"))
    .then(|| previewed_conditions(&entered))
    .flatten();

    let mut session = IntakeSession::with_measurement(entered, mode).with_caller_ip(caller_ip);
    if let Some(conditions) = previewed {
        session.apply_previewed(&conditions);
    }

    let result = session
        .submit(state.predictor.as_ref(), state.ambient.as_ref())
        .await;

    let (status, notice, violations) = match result {
        Ok(outcome) => {
            state.clear_error().await;
            let summary = SampleSummary::from_received(Some(&outcome.context));
            let html = render_results(&summary, &outcome.recommendations, state.display_limit);
            return Ok(Html(html).into_response());
        }
        Err(SubmissionError::Validation(e)) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Notice::Error("Please correct the highlighted fields.".to_string()),
            e.violations().to_vec(),
        ),
        Err(SubmissionError::Enrichment(e)) => {
            state.record_error(e.to_string()).await;
            (
                StatusCode::BAD_GATEWAY,
                Notice::Retryable(format!("{}. Retry, or switch to manual entry.", e)),
                Vec::new(),
            )
        }
        Err(SubmissionError::Prediction(e)) => {
            let message = e.to_string();
            state.record_error(message.clone()).await;
            let (status, _) = ApiError::Prediction(e).status_and_code();
            (
                status,
                Notice::Error(format!("Could not get a recommendation: {}", message)),
                Vec::new(),
            )
        }
    };

    let view = FormView {
        measurement: session.measurement().clone(),
        mode,
        violations,
        notice: Some(notice),
        enriched: session.is_enriched(),
    };
    Ok((status, Html(render_form(&view))).into_response())
}

/// Ambient values posted alongside the `enriched` marker
fn previewed_conditions(measurement: &SampleMeasurement) -> Option<AmbientConditions> {
    Some(AmbientConditions {
        temperature: measurement.numeric(MeasurementField::Temperature)?,
        humidity: measurement.numeric(MeasurementField::Humidity)?,
        rainfall: measurement.numeric(MeasurementField::Rainfall)?,
    })
}

/// Render the sampling form
pub fn render_form(view: &FormView) -> String {
    let mut content = String::new();

    match &view.notice {
        Some(Notice::Error(message)) => {
            content.push_str(&format!(
                r#"<div class="notice error">{}"#,
                escape_html(message)
            ));
            if !view.violations.is_empty() {
                content.push_str("<ul>");
                for violation in &view.violations {
                    content.push_str(&format!("<li>{}</li>", escape_html(&violation.to_string())));
                }
                content.push_str("</ul>");
            }
            content.push_str("</div>\n");
        }
        Some(Notice::Retryable(message)) => {
            content.push_str(&format!(
                r#"<div class="notice warning">{}</div>
"#,
                escape_html(message)
            ));
        }
        None => {}
    }

    let checked = |mode: InputMode| if view.mode == mode { " checked" } else { "" };
    content.push_str(&format!(
        r#"<form class="card" method="post" action="/samples">
    <h2>Soil Sample</h2>
    <div class="mode-selector">
        <label><input type="radio" name="mode" value="manual"{manual}> Manual entry</label>
        <label><input type="radio" name="mode" value="location"{location}> Use location for weather</label>
    </div>
    <input type="hidden" id="enriched" name="enriched" value="{enriched}">
    <div class="grid">
"#,
        manual = checked(InputMode::Manual),
        location = checked(InputMode::Location),
        enriched = if view.enriched { "1" } else { "" },
    ));

    for field in MeasurementField::ALL {
        content.push_str(&render_field(view, field));
    }

    content.push_str(
        r#"    </div>
    <p id="location-status" class="range-hint"></p>
    <div class="actions">
        <button type="button" id="use-location" class="secondary">Use Location</button>
        <button type="submit">Get Recommendations</button>
    </div>
</form>
"#,
    );

    page("Soil Sampling", &content, Some("/static/sampling-form.js"))
}

fn render_field(view: &FormView, field: MeasurementField) -> String {
    let value = view.measurement.get(field).unwrap_or("");
    let name = field.name();

    let input = match field {
        MeasurementField::SoilType => {
            let selected = value.parse::<SoilType>().ok();
            let mut options = String::from(r#"<option value="">Select soil type</option>"#);
            for soil in SoilType::ALL {
                options.push_str(&format!(
                    r#"<option value="{}"{}>{}</option>"#,
                    soil.as_str(),
                    if selected == Some(soil) { " selected" } else { "" },
                    soil.display_name()
                ));
            }
            format!(r#"<select id="{name}" name="{name}">{options}</select>"#)
        }
        MeasurementField::Location => format!(
            r#"<input type="text" id="{name}" name="{name}" value="{value}" placeholder="City or coordinates (optional)">"#,
            value = escape_html(value),
        ),
        _ => {
            let readonly = if field.is_ambient() && view.mode == InputMode::Location {
                " readonly"
            } else {
                ""
            };
            format!(
                r#"<input type="text" inputmode="decimal" id="{name}" name="{name}" value="{value}"{readonly}>"#,
                value = escape_html(value),
            )
        }
    };

    let hint = field
        .range()
        .map(|(min, max)| format!(r#" <span class="range-hint">({} - {})</span>"#, min, max))
        .unwrap_or_default();

    format!(
        r#"        <div>
            <label for="{name}">{label}{hint}</label>
            {input}
        </div>
"#,
        label = escape_html(field.label()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_form_lists_every_field() {
        let html = render_form(&FormView::default());
        for field in MeasurementField::ALL {
            assert!(html.contains(&format!(r#"name="{}""#, field.name())), "{}", field);
        }
        for soil in SoilType::ALL {
            assert!(html.contains(soil.display_name()));
        }
        assert!(html.contains(r#"value="manual" checked"#));
    }

    #[test]
    fn test_entered_values_are_escaped_and_kept() {
        let mut measurement = SampleMeasurement::new();
        measurement.set(MeasurementField::Location, r#""><script>"#);
        measurement.set(MeasurementField::SoilType, "clay");
        let view = FormView {
            measurement,
            ..Default::default()
        };

        let html = render_form(&view);
        assert!(!html.contains(r#""><script>"#));
        assert!(html.contains("&quot;&gt;&lt;script&gt;"));
        assert!(html.contains(r#"<option value="clay" selected>"#));
    }

    #[test]
    fn test_location_mode_marks_ambient_readonly() {
        let view = FormView {
            mode: InputMode::Location,
            ..Default::default()
        };
        let html = render_form(&view);
        assert!(html.contains(r#"name="humidity" value="" readonly"#));
        assert!(!html.contains(r#"name="nitrogen" value="" readonly"#));
    }

    #[test]
    fn test_enriched_marker_rendered() {
        assert!(render_form(&FormView::default()).contains(r#"name="enriched" value="""#));

        let view = FormView {
            mode: InputMode::Location,
            enriched: true,
            ..Default::default()
        };
        assert!(render_form(&view).contains(r#"name="enriched" value="1""#));
    }

    #[test]
    fn test_previewed_conditions_need_all_three_values() {
        let mut measurement = SampleMeasurement::new();
        measurement.set(MeasurementField::Temperature, "25");
        measurement.set(MeasurementField::Humidity, "60");
        assert_eq!(previewed_conditions(&measurement), None);

        measurement.set(MeasurementField::Rainfall, "120.5");
        assert_eq!(
            previewed_conditions(&measurement),
            Some(AmbientConditions {
                temperature: 25.0,
                humidity: 60.0,
                rainfall: 120.5,
            })
        );
    }

    #[test]
    fn test_violations_rendered() {
        let mut measurement = SampleMeasurement::new();
        measurement.set(MeasurementField::Ph, "15");
        let violations = measurement.validate();
        let view = FormView {
            measurement,
            violations,
            notice: Some(Notice::Error("Please correct the highlighted fields.".to_string())),
            ..Default::default()
        };

        let html = render_form(&view);
        assert!(html.contains("pH Level must be between 0.00 and 14.00 (got 15)"));
        assert!(html.contains("Nitrogen (N) is required"));
    }
}
