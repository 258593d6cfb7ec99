use crate::insights::Insight;
use crate::metrics::ExtractedMetrics;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Identity of the model whose report is being restyled. All fields are
/// caller-supplied so rendering stays a pure function.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelIdentity {
    pub folder: String,
    pub created_at: String,
    pub period_start: Option<String>,
    pub period_end: Option<String>,
}

pub struct RenderContext<'a> {
    pub identity: &'a ModelIdentity,
    pub metrics: &'a ExtractedMetrics,
    pub model_fit_chart: Option<&'a str>,
    pub contribution_chart: Option<&'a str>,
    pub insights: &'a [Insight],
}

/// Assembles the final standalone document. Every absent datum renders
/// a placeholder fragment; identical inputs yield identical bytes.
pub fn render(ctx: &RenderContext) -> String {
    let mut out = String::with_capacity(32 * 1024);

    out.push_str("<!doctype html>\n<html lang=\"en\">\n  <head>\n    <meta charset=\"utf-8\" />\n");
    out.push_str(&format!(
        "    <title>MMM Report - {}</title>\n",
        ctx.identity.folder
    ));
    out.push_str(
        "    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\" />\n\
         \x20   <link rel=\"preconnect\" href=\"https://fonts.googleapis.com\" />\n\
         \x20   <link rel=\"preconnect\" href=\"https://fonts.gstatic.com\" crossorigin />\n\
         \x20   <link href=\"https://fonts.googleapis.com/css2?family=Inter:wght@300;400;500;600;700;800&display=swap\" rel=\"stylesheet\">\n\
         \x20   <script src=\"https://cdn.jsdelivr.net/npm/vega@5\"></script>\n\
         \x20   <script src=\"https://cdn.jsdelivr.net/npm/vega-lite@5\"></script>\n\
         \x20   <script src=\"https://cdn.jsdelivr.net/npm/vega-embed@6\"></script>\n\
         \x20   <style>\n",
    );
    out.push_str(STYLE);
    out.push_str("    </style>\n  </head>\n  <body>\n    <div class=\"container\">\n");

    render_header(&mut out, ctx);

    // Overview: fit stat card + ROI list.
    out.push_str("      <div class=\"section\">\n        <h2 class=\"section-title\">Overview</h2>\n        <div class=\"grid\">\n");
    out.push_str("          <div class=\"card\">\n            <div class=\"card-header\"><div class=\"card-icon\">⚡</div><h2>Model Performance</h2></div>\n            <div class=\"card-content\">\n");
    out.push_str(&render_fit_card(ctx.metrics.fit_score));
    out.push_str("            </div>\n          </div>\n");
    out.push_str("          <div class=\"card\">\n            <div class=\"card-header\"><div class=\"card-icon\">💹</div><h2>ROI by Media Channel</h2></div>\n            <div class=\"card-content\">\n              <p>Return on investment for each dollar spent per channel</p>\n");
    out.push_str(&render_roi_list(ctx.metrics));
    out.push_str("            </div>\n          </div>\n        </div>\n      </div>\n");

    // Visualizations: the two transformed chart blocks.
    out.push_str("      <div class=\"section\">\n        <h2 class=\"section-title\">Visualizations</h2>\n        <div class=\"grid vertical\">\n");
    render_chart_card(
        &mut out,
        "📈",
        "Model Fit",
        "Comparison between expected revenues from the model and observed actual revenues, allowing to evaluate prediction accuracy.",
        ctx.model_fit_chart,
        "Model fit charts will be displayed here",
    );
    render_chart_card(
        &mut out,
        "📊",
        "Contribution Channel",
        "Breakdown of each media channel's contribution (baseline and marketing channels) to overall performance, showing the relative impact of each source.",
        ctx.contribution_chart,
        "Contribution charts will be displayed here",
    );
    out.push_str("        </div>\n      </div>\n");

    // Insights.
    out.push_str("      <div class=\"section\">\n        <h2 class=\"section-title\">Insights</h2>\n        <div class=\"card\">\n          <div class=\"card-header\"><div class=\"card-icon\">💡</div><h2>Actionable Recommendations</h2></div>\n          <div class=\"card-content\">\n            <p>Actionable recommendations based on your MMM model analysis to optimize your marketing decisions.</p>\n");
    out.push_str(&render_insights(ctx.insights));
    out.push_str("          </div>\n        </div>\n      </div>\n");

    out.push_str("    </div>\n  </body>\n</html>\n");
    out
}

fn render_header(out: &mut String, ctx: &RenderContext) {
    out.push_str("      <div class=\"header\">\n        <h1>Media Mix Modeling Report</h1>\n        <p class=\"subtitle\">Detailed analysis of model performance</p>\n        <div class=\"header-meta\">\n");
    out.push_str(&format!(
        "          <div class=\"badge\"><span class=\"badge-icon\">🏷️</span><span>Model: {}</span></div>\n",
        ctx.identity.folder
    ));
    out.push_str(&format!(
        "          <div class=\"badge\"><span class=\"badge-icon\">🕒</span><span>Created: {}</span></div>\n",
        ctx.identity.created_at
    ));
    if let (Some(start), Some(end)) = (&ctx.identity.period_start, &ctx.identity.period_end) {
        out.push_str(&format!(
            "          <div class=\"badge\"><span class=\"badge-icon\">📅</span><span>Period: {start} → {end}</span></div>\n"
        ));
    }
    out.push_str("        </div>\n      </div>\n");
}

fn render_chart_card(
    out: &mut String,
    icon: &str,
    title: &str,
    blurb: &str,
    chart: Option<&str>,
    placeholder_text: &str,
) {
    out.push_str(&format!(
        "          <div class=\"card chart-card\">\n            <div class=\"card-header\"><div class=\"card-icon\">{icon}</div><h2>{title}</h2></div>\n            <div class=\"card-content\">\n              <p>{blurb}</p>\n"
    ));
    match chart {
        Some(block) => {
            out.push_str(block);
            out.push('\n');
        }
        None => out.push_str(&placeholder(placeholder_text)),
    }
    out.push_str("            </div>\n          </div>\n");
}

fn placeholder(text: &str) -> String {
    format!("              <div class=\"placeholder\">{text}</div>\n")
}

fn fit_quality(score: f64) -> (&'static str, &'static str, String) {
    if score >= 0.75 {
        (
            "excellent",
            "Excellent",
            format!(
                "<strong>R² = {score:.3} (≥ 0.75)</strong>: The model explains at least 75% of \
                 the variation in your data. This is an <strong>excellent</strong> fit."
            ),
        )
    } else if score >= 0.5 {
        (
            "good",
            "Good",
            format!(
                "<strong>R² = {score:.3} (0.5 - 0.75)</strong>: The model explains between 50% \
                 and 75% of the variation in your data. This is a <strong>good</strong> fit, but \
                 there is still room for improvement."
            ),
        )
    } else {
        (
            "improve",
            "Needs Improvement",
            format!(
                "<strong>R² = {score:.3} (&lt; 0.5)</strong>: The model explains less than 50% of \
                 the variation in your data. The fit <strong>needs improvement</strong>."
            ),
        )
    }
}

fn render_fit_card(fit_score: Option<f64>) -> String {
    let Some(score) = fit_score else {
        return placeholder("Results will be displayed here");
    };
    let (class, label, interpretation) = fit_quality(score);
    format!(
        "              <div class=\"stat-card\">\n                <div class=\"stat-value\">{score:.3}</div>\n                <div class=\"stat-label\">R² Score</div>\n                <div class=\"quality-badge {class}\">✓ {label}</div>\n              </div>\n              <div class=\"stat-note\">\n                <p>The <strong>R² (coefficient of determination)</strong> measures the quality of the model's fit to observed data.</p>\n                <p>{interpretation}</p>\n              </div>\n"
    )
}

fn render_roi_list(metrics: &ExtractedMetrics) -> String {
    // Entries with an absent ROI stay internal; only valued channels are
    // displayed, sorted descending.
    let mut with_roi: Vec<(&str, f64)> = metrics
        .roi_by_channel
        .iter()
        .filter_map(|e| e.roi.map(|r| (e.channel.as_str(), r)))
        .collect();

    if with_roi.is_empty() {
        return placeholder("Results will be displayed here");
    }

    with_roi.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    let mut out = String::from("              <div class=\"roi-visualization\">\n");
    for (channel, roi) in with_roi {
        out.push_str(&format!(
            "                <div class=\"roi-item\">\n                  <div class=\"roi-item-content\">\n                    <div class=\"roi-channel-name\">{channel}</div>\n                    <div class=\"roi-description\">For <strong>$1 invested</strong> in {channel} → ROI = <strong>${roi:.2}</strong></div>\n                  </div>\n                  <div class=\"roi-value-container\">\n                    <div class=\"roi-value\">{roi:.2}</div>\n                    <div class=\"roi-label\">ROI</div>\n                  </div>\n                </div>\n"
        ));
    }
    out.push_str("              </div>\n");
    out
}

fn render_insights(insights: &[Insight]) -> String {
    if insights.is_empty() {
        return placeholder(
            "No insights available at the moment. Insights will be automatically generated from model data.",
        );
    }

    let mut out = String::from("              <div class=\"insights-container\">\n");
    for insight in insights {
        out.push_str(&format!(
            "                <div class=\"insight-item {}\">\n                  <div class=\"insight-title\">{}</div>\n                  <div class=\"insight-description\">{}</div>\n                  <div class=\"insight-action\">{}</div>\n                </div>\n",
            insight.kind.css_class(),
            insight.title,
            insight.description,
            insight.action
        ));
    }
    out.push_str("              </div>\n");
    out
}

const STYLE: &str = r#"      :root {
        --primary: #6366f1;
        --primary-light: #818cf8;
        --secondary: #8b5cf6;
        --success: #10b981;
        --warning: #f59e0b;
        --danger: #ef4444;
        --info: #3b82f6;
        --bg: #f8fafc;
        --text: #1e293b;
        --text-muted: #64748b;
        --border: #e2e8f0;
        --radius: 12px;
        --radius-lg: 16px;
        --shadow: 0 4px 6px -1px rgb(0 0 0 / 0.1), 0 2px 4px -2px rgb(0 0 0 / 0.1);
      }
      * { margin: 0; padding: 0; box-sizing: border-box; }
      body {
        font-family: 'Inter', -apple-system, 'Segoe UI', Roboto, Arial, sans-serif;
        background: linear-gradient(135deg, #667eea 0%, #764ba2 50%, #4facfe 100%);
        background-attachment: fixed;
        color: var(--text);
        line-height: 1.6;
        min-height: 100vh;
        padding: 2rem 1rem;
      }
      .container { max-width: 1400px; margin: 0 auto; }
      .header {
        background: rgba(255, 255, 255, 0.95);
        border-radius: var(--radius-lg);
        padding: 3rem 2.5rem;
        margin-bottom: 2rem;
        box-shadow: var(--shadow);
        border-top: 6px solid var(--primary);
      }
      .header h1 {
        font-size: 2.5rem;
        font-weight: 800;
        color: var(--primary);
        margin-bottom: 0.5rem;
      }
      .subtitle { font-size: 1.1rem; color: var(--text-muted); margin-bottom: 1.5rem; }
      .header-meta { display: flex; gap: 1rem; flex-wrap: wrap; }
      .badge {
        display: inline-flex;
        align-items: center;
        gap: 0.5rem;
        background: linear-gradient(135deg, var(--primary-light) 0%, var(--primary) 100%);
        color: white;
        padding: 0.6rem 1.25rem;
        border-radius: var(--radius);
        font-size: 0.875rem;
        font-weight: 600;
      }
      .section { margin-bottom: 2.5rem; }
      .section-title {
        font-size: 1.875rem;
        font-weight: 800;
        color: white;
        margin-bottom: 1.5rem;
      }
      .grid { display: grid; gap: 1.5rem; }
      .grid.vertical { grid-template-columns: 1fr; }
      @media (min-width: 768px) {
        .grid:not(.vertical) { grid-template-columns: repeat(2, 1fr); }
      }
      .card {
        background: rgba(255, 255, 255, 0.95);
        border-radius: var(--radius-lg);
        box-shadow: var(--shadow);
        overflow: hidden;
      }
      .card-header {
        display: flex;
        align-items: center;
        gap: 1rem;
        padding: 1.5rem 2rem;
        border-bottom: 2px solid var(--border);
      }
      .card-icon { font-size: 1.75rem; }
      .card-header h2 { font-size: 1.375rem; font-weight: 700; }
      .card-content { padding: 2rem; }
      .card-content > p { color: var(--text-muted); margin-bottom: 1.5rem; }
      .chart-card .card-content { display: flex; flex-direction: column; align-items: center; }
      .chart-card .card-content > div { width: 100%; max-width: 1000px; margin: 0 auto; }
      .stat-card {
        padding: 2rem;
        border-radius: var(--radius-lg);
        border: 2px solid var(--border);
        text-align: center;
      }
      .stat-value { font-size: 3.5rem; font-weight: 900; color: var(--primary); }
      .stat-label {
        font-size: 0.875rem;
        color: var(--text-muted);
        font-weight: 600;
        text-transform: uppercase;
        letter-spacing: 1px;
      }
      .quality-badge {
        display: inline-block;
        margin-top: 1rem;
        padding: 0.5rem 1rem;
        border-radius: var(--radius);
        font-size: 0.75rem;
        font-weight: 700;
        text-transform: uppercase;
        color: white;
      }
      .quality-badge.excellent { background: var(--success); }
      .quality-badge.good { background: var(--info); }
      .quality-badge.improve { background: var(--warning); }
      .stat-note { margin-top: 1.5rem; color: var(--text-muted); font-size: 0.9rem; }
      .stat-note p { margin-bottom: 0.75rem; }
      .roi-visualization { display: flex; flex-direction: column; gap: 1rem; }
      .roi-item {
        display: flex;
        align-items: center;
        justify-content: space-between;
        padding: 1.5rem 1.75rem;
        border: 2px solid var(--border);
        border-left: 5px solid var(--success);
        border-radius: var(--radius-lg);
      }
      .roi-channel-name { font-size: 1.25rem; font-weight: 700; }
      .roi-description { font-size: 0.9375rem; color: var(--text-muted); }
      .roi-value-container { text-align: center; padding-left: 2rem; }
      .roi-value { font-size: 2.5rem; font-weight: 900; color: var(--success); }
      .roi-label {
        font-size: 0.75rem;
        color: var(--text-muted);
        font-weight: 700;
        text-transform: uppercase;
        letter-spacing: 1.5px;
      }
      .insights-container { display: flex; flex-direction: column; gap: 1.25rem; }
      .insight-item {
        padding: 1.75rem;
        border-radius: var(--radius-lg);
        border-left: 5px solid;
        background: var(--bg);
      }
      .insight-item.success { border-left-color: var(--success); }
      .insight-item.info { border-left-color: var(--info); }
      .insight-item.warning { border-left-color: var(--warning); }
      .insight-item.danger { border-left-color: var(--danger); }
      .insight-title { font-size: 1.25rem; font-weight: 700; margin-bottom: 0.75rem; }
      .insight-description { font-size: 0.9375rem; color: var(--text-muted); margin-bottom: 1rem; }
      .insight-action {
        font-size: 0.875rem;
        font-weight: 600;
        padding: 0.875rem 1.25rem;
        background: rgba(255, 255, 255, 0.8);
        border-radius: var(--radius);
        border: 1px solid var(--border);
      }
      .placeholder {
        padding: 4rem 2rem;
        text-align: center;
        color: var(--text-muted);
        font-style: italic;
        border: 2px dashed var(--border);
        border-radius: var(--radius-lg);
      }
"#;
