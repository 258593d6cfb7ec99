use crate::metrics::RoiEntry;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Success,
    Info,
    Warning,
    Danger,
}

impl InsightKind {
    pub fn css_class(self) -> &'static str {
        match self {
            InsightKind::Success => "success",
            InsightKind::Info => "info",
            InsightKind::Warning => "warning",
            InsightKind::Danger => "danger",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub title: String,
    pub description: String,
    pub action: String,
}

/// Deterministic rule engine over the extracted metrics. Emission order
/// is fixed: fit score, best channel, worst channel, diversification,
/// portfolio.
pub fn generate(fit_score: Option<f64>, roi_by_channel: &[RoiEntry]) -> Vec<Insight> {
    let mut insights = Vec::new();

    if let Some(score) = fit_score {
        if score >= 0.75 {
            // Excellent fit needs no recommendation.
        } else if score >= 0.5 {
            let potential = floor_i64((0.75 - score) * 100.0);
            insights.push(Insight {
                kind: InsightKind::Warning,
                title: "⚠️ Model needs improvement for better accuracy".to_string(),
                description: format!(
                    "With an R² of {score:.3}, the model explains a significant portion of the \
                     variation but can be improved by approximately {potential} points."
                ),
                action: "Enrich your data (external variables, seasonality, events) to improve \
                         model accuracy."
                    .to_string(),
            });
        } else {
            let needed = floor_i64((0.5 - score) * 100.0);
            insights.push(Insight {
                kind: InsightKind::Danger,
                title: "🔴 Model requires revision".to_string(),
                description: format!(
                    "With an R² of {score:.3}, the model explains less than half of the \
                     variation. It requires approximately {needed} points of improvement to be \
                     reliable."
                ),
                action: "Review model variables and collect more data to improve prediction \
                         quality."
                    .to_string(),
            });
        }
    }

    // Descending by ROI; ties keep discovery order (stable sort).
    let mut ranked: Vec<(&str, f64)> = roi_by_channel
        .iter()
        .filter_map(|e| e.roi.map(|r| (e.channel.as_str(), r)))
        .collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    if let (Some(&(best_channel, best_roi)), Some(&(worst_channel, worst_roi))) =
        (ranked.first(), ranked.last())
    {
        if best_roi > 1.5 {
            let increase = clamp(floor_i64((best_roi - 1.0) * 20.0), 10, 30);
            insights.push(Insight {
                kind: InsightKind::Success,
                title: format!("🚀 {best_channel}: High-performing channel to prioritize"),
                description: format!(
                    "With a ROI of {best_roi:.2}, every dollar invested in {best_channel} \
                     generates ${best_roi:.2} in revenue. This is your most profitable channel."
                ),
                action: format!(
                    "Gradually increase the budget allocated to {best_channel} by {increase}% to \
                     maximize return on investment."
                ),
            });
        } else if best_roi > 1.0 {
            let increase = clamp(floor_i64((best_roi - 1.0) * 30.0), 5, 15);
            insights.push(Insight {
                kind: InsightKind::Info,
                title: format!("📈 {best_channel}: Profitable channel"),
                description: format!(
                    "With a ROI of {best_roi:.2}, {best_channel} generates a positive return on \
                     investment."
                ),
                action: format!(
                    "Maintain or slightly increase the {best_channel} budget by {increase}% while \
                     testing new creative approaches."
                ),
            });
        } else {
            insights.push(Insight {
                kind: InsightKind::Warning,
                title: "⚠️ All channels underperforming".to_string(),
                description: format!(
                    "Even the best channel ({best_channel}) has a ROI of {best_roi:.2}, below 1.0."
                ),
                action: "Review your creative strategies, targets, and messaging. Test new \
                         approaches before increasing budgets."
                    .to_string(),
            });
        }

        if ranked.len() > 1 {
            let gap = best_roi - worst_roi;
            let ratio = if best_roi > 0.0 { worst_roi / best_roi } else { 0.0 };

            if ratio < 0.7 {
                let reduction = clamp(floor_i64((1.0 - ratio) * 50.0), 15, 40);
                let reallocation = clamp(floor_i64(gap * 25.0), 20, 35);
                let less_pct = floor_i64((1.0 - ratio) * 100.0);
                insights.push(Insight {
                    kind: InsightKind::Warning,
                    title: format!("🔍 {worst_channel}: Channel to optimize"),
                    description: format!(
                        "With a ROI of {worst_roi:.2}, {worst_channel} is {gap:.2} points below \
                         {best_channel} (ROI: {best_roi:.2}), {less_pct}% less performant."
                    ),
                    action: format!(
                        "Analyze {worst_channel} performance: targeted audiences, creatives, \
                         placements. Reduce budget by {reduction}% and reallocate {reallocation}% \
                         to {best_channel}."
                    ),
                });
            }
        }

        if ranked.len() >= 3 {
            let spread = best_roi - worst_roi;
            let range_pct = if best_roi > 0.0 {
                floor_i64(spread / best_roi * 100.0)
            } else {
                0
            };

            if spread > 0.3 {
                let reallocation = clamp(range_pct / 3, 10, 30);
                insights.push(Insight {
                    kind: InsightKind::Info,
                    title: "💼 Channel diversification".to_string(),
                    description: format!(
                        "Your channels show varied ROI (from {worst_roi:.2} to {best_roi:.2}), \
                         with a gap of {spread:.2} points ({range_pct}% variation), indicating \
                         optimization opportunities."
                    ),
                    action: format!(
                        "Reallocate {reallocation}% of budget from underperforming channels to \
                         the most profitable ones, while maintaining minimal presence to test new \
                         opportunities."
                    ),
                });
            }
        }
    }

    if !ranked.is_empty() {
        let total = ranked.len();
        let avg: f64 = ranked.iter().map(|(_, r)| r).sum::<f64>() / total as f64;
        let above_one = ranked.iter().filter(|(_, r)| *r > 1.0).count();
        let success_rate = floor_i64(above_one as f64 / total as f64 * 100.0);

        if avg > 1.2 {
            insights.push(Insight {
                kind: InsightKind::Success,
                title: "💰 Positive overall performance".to_string(),
                description: format!(
                    "Your media mix generates on average ${avg:.2} in revenue for every dollar \
                     invested. {success_rate}% of your channels ({above_one}/{total}) are \
                     profitable."
                ),
                action: "Maintain this performance by continuing to optimize budgets toward the \
                         most performing channels and regularly testing new approaches."
                    .to_string(),
            });
        } else if avg > 1.0 {
            let target = avg * 1.1;
            insights.push(Insight {
                kind: InsightKind::Info,
                title: "📊 Moderate overall performance".to_string(),
                description: format!(
                    "Your media mix generates on average ${avg:.2} in revenue for every dollar \
                     invested. {success_rate}% of your channels ({above_one}/{total}) are \
                     profitable."
                ),
                action: format!(
                    "Optimize your budgets by reallocating to the most performing channels to \
                     improve the overall average to ${target:.2}."
                ),
            });
        }
    }

    insights
}

fn floor_i64(v: f64) -> i64 {
    v.floor() as i64
}

fn clamp(v: i64, lo: i64, hi: i64) -> i64 {
    v.max(lo).min(hi)
}
