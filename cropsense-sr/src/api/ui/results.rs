//! Results view: sample summary and ranked recommendations

use axum::response::{Html, IntoResponse};

use super::{escape_html, page};
use crate::models::{RankedRecommendation, SampleSummary};

/// GET /results
///
/// Reached without a submission, so no context arrived: every summary
/// field shows N/A and there are no recommendations.
pub async fn results_page() -> impl IntoResponse {
    Html(render_results(&SampleSummary::from_received(None), &[], None))
}

/// Render the results view
///
/// `display_limit` truncates what is shown, never what was ranked.
pub fn render_results(
    summary: &SampleSummary,
    recommendations: &[RankedRecommendation],
    display_limit: Option<usize>,
) -> String {
    let shown = display_limit
        .map(|limit| limit.min(recommendations.len()))
        .unwrap_or(recommendations.len());

    let mut items = String::new();
    for recommendation in &recommendations[..shown] {
        items.push_str(&format!(
            r#"        <div class="recommendation">
            <div class="row"><span>{crop}</span><span>{confidence}</span></div>
            <div class="bar"><div class="bar-fill" style="width: {width:.2}%"></div></div>
        </div>
"#,
            crop = escape_html(&recommendation.crop),
            confidence = recommendation.confidence,
            width = recommendation.bar_width(),
        ));
    }
    if items.is_empty() {
        items.push_str(r#"        <p class="empty">No recommendations available.</p>
"#);
    }

    let content = format!(
        r#"<section class="card">
    <h2>Sample Summary</h2>
    <dl class="summary">
        <div><dt>pH</dt><dd>{ph}</dd></div>
        <div><dt>Moisture</dt><dd>{moisture}</dd></div>
        <div><dt>Texture</dt><dd>{texture}</dd></div>
    </dl>
</section>
<section class="card">
    <h2>Recommended Crops</h2>
{items}</section>
<div class="actions"><a href="/"><button type="button">New Sample</button></a></div>
"#,
        ph = escape_html(&summary.ph),
        moisture = escape_html(&summary.moisture),
        texture = escape_html(&summary.texture),
        items = items,
    );

    page("Recommendations", &content, None)
}
