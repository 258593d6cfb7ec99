use crate::config::Config;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Scalar and relational metrics pulled out of a source report.
///
/// Extraction never fails: anything that cannot be located or parsed is
/// simply absent. `roi_by_channel` preserves discovery order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedMetrics {
    pub fit_score: Option<f64>,
    pub roi_by_channel: Vec<RoiEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoiEntry {
    pub channel: String,
    pub roi: Option<f64>,
}

impl ExtractedMetrics {
    pub fn roi(&self, channel: &str) -> Option<f64> {
        self.roi_by_channel
            .iter()
            .find(|e| e.channel == channel)
            .and_then(|e| e.roi)
    }
}

pub fn extract(cfg: &Config, source: &str) -> ExtractedMetrics {
    ExtractedMetrics {
        fit_score: extract_fit_score(cfg, source),
        roi_by_channel: extract_roi_by_channel(cfg, source),
    }
}

/// Table-row lookup for the goodness-of-fit score. The primary pattern
/// anchors on the exact header cell; the fallback relaxes to a
/// case-insensitive label match anywhere before the value cell.
fn extract_fit_score(cfg: &Config, source: &str) -> Option<f64> {
    let label = regex::escape(&cfg.extraction.fit_label);
    let primary = format!(r"(?s)<th>{label}</th>.*?<td[^>]*>([0-9.]+)</td>");
    let fallback = format!(r"(?is){label}.*?<td[^>]*>([0-9.]+)</td>");

    for pat in [primary, fallback] {
        let Ok(re) = Regex::new(&pat) else { continue };
        if let Some(cap) = re.captures(source) {
            if let Ok(v) = cap[1].parse::<f64>() {
                if v.is_finite() {
                    return Some(v);
                }
            }
        }
    }
    None
}

// Channel/ROI fragments appear in the report either raw or with
// backslash-escaped quotes, and with the two keys in either order.
const ROI_PATTERNS: [&str; 4] = [
    r#"\\"channel\\":\s*\\"([^\\"]+)\\"[^}]*\\"roi\\":\s*([0-9.]+)"#,
    r#""channel":\s*"([^"]+)"[^}]*"roi":\s*([0-9.]+)"#,
    r#"\\"roi\\":\s*([0-9.]+)[^}]*\\"channel\\":\s*\\"([^\\"]+)\\""#,
    r#""roi":\s*([0-9.]+)[^}]*"channel":\s*"([^"]+)""#,
];

const CHANNEL_PATTERNS: [&str; 2] = [
    r#"\\"channel\\":\s*\\"([^\\"]+)\\""#,
    r#""channel":\s*"([^"]+)""#,
];

fn extract_roi_by_channel(cfg: &Config, source: &str) -> Vec<RoiEntry> {
    let sentinel = cfg.extraction.sentinel_category.as_str();
    let mut order: Vec<String> = Vec::new();
    let mut values: HashMap<String, f64> = HashMap::new();

    for pat in ROI_PATTERNS {
        let Ok(re) = Regex::new(pat) else { continue };
        for cap in re.captures_iter(source) {
            let g1 = cap[1].trim().to_string();
            let g2 = cap[2].trim().to_string();
            // The channel group is whichever starts with a letter.
            let (channel, roi_raw) = if g1.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
            {
                (g1, g2)
            } else {
                (g2, g1)
            };

            if channel.eq_ignore_ascii_case(sentinel) {
                continue;
            }

            if !order.iter().any(|c| *c == channel) {
                order.push(channel.clone());
            }
            if let Ok(v) = clean_numeric(&roi_raw).parse::<f64>() {
                if v.is_finite() {
                    // First match wins per channel; later hits are ignored.
                    values.entry(channel).or_insert(v);
                }
            }
        }
    }

    // Independent discovery pass: channels mentioned anywhere, even with
    // no ROI attached, still show up with an absent value.
    for pat in CHANNEL_PATTERNS {
        let Ok(re) = Regex::new(pat) else { continue };
        for cap in re.captures_iter(source) {
            let channel = cap[1].trim();
            if channel.eq_ignore_ascii_case(sentinel) {
                continue;
            }
            if !order.iter().any(|c| c == channel) {
                order.push(channel.to_string());
            }
        }
    }

    order
        .into_iter()
        .map(|channel| RoiEntry {
            roi: values.get(&channel).copied(),
            channel,
        })
        .collect()
}

fn clean_numeric(raw: &str) -> String {
    raw.trim_end_matches('.')
        .trim_end_matches(',')
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect()
}
