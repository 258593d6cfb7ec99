use crate::config::Config;
use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartKind {
    ModelFit,
    ContributionChannel,
}

impl ChartKind {
    /// Marker token that identifies the block in the source report.
    pub fn marker(self) -> &'static str {
        match self {
            ChartKind::ModelFit => "expected-actual-outcome-chart",
            ChartKind::ContributionChannel => "channel-drivers-chart",
        }
    }

    /// Element id the block is renamed to in the rendered report.
    pub fn target_id(self) -> &'static str {
        match self {
            ChartKind::ModelFit => "model-fit-chart",
            ChartKind::ContributionChannel => "contribution-channel-chart",
        }
    }
}

/// Locates the scripting block for `kind` and returns a restyled copy.
/// Any failure inside the transformation degrades to `None`; the source
/// text is never modified.
pub fn locate_and_transform(cfg: &Config, source: &str, kind: ChartKind) -> Option<String> {
    let block = locate_block(source, kind)?;
    match transform_block(cfg, &block, kind) {
        Ok(section) => Some(section),
        Err(err) => {
            warn!("chart transform failed for {:?}: {err:#}", kind);
            None
        }
    }
}

/// Boundary search: first marker occurrence, nearest block-start tag
/// before it (two alternative spellings), nearest `</script>` after it.
fn locate_block(source: &str, kind: ChartKind) -> Option<String> {
    let pos = source.find(kind.marker())?;

    let start = source[..pos]
        .rfind("<chart>")
        .or_else(|| source[..pos].rfind("<chart-embed"))?;

    let end = pos + source[pos..].find("</script>")? + "</script>".len();

    debug!("located {:?} block at {start}..{end}", kind);
    Some(source[start..end].to_string())
}

fn transform_block(cfg: &Config, block: &str, kind: ChartKind) -> Result<String> {
    let mut section = block.to_string();

    let spec_re = Regex::new(r#"(?s)const spec = JSON\.parse\("(.*?)"\);"#)?;
    let literal = spec_re.captures(&section).map(|cap| cap[1].to_string());
    if let Some(escaped) = literal {
        let decoded = unescape_spec(&escaped);
        let mut spec: Value =
            serde_json::from_str(&decoded).with_context(|| "parsing embedded chart spec")?;

        match kind {
            ChartKind::ModelFit => restyle_model_fit(cfg, &mut spec),
            ChartKind::ContributionChannel => restyle_contribution(cfg, &mut spec),
        }

        let new_escaped = escape_spec(&serde_json::to_string(&spec)?);
        section = section.replace(&escaped, &new_escaped);
    }

    let desc_re = Regex::new(r"(?s)<chart-description>.*?</chart-description>")?;
    let stripped = desc_re.replace_all(&section, "").into_owned();
    section = stripped;

    // Rename all three reference forms so cross-references inside the
    // block stay consistent.
    let old = kind.marker();
    let new = kind.target_id();
    section = section.replace(&format!("id=\"{old}\""), &format!("id=\"{new}\""));
    section = section.replace(&format!("#{old}"), &format!("#{new}"));
    section = section.replace(old, new);

    Ok(section)
}

/// Strict JSON-string unescape, with a manual pass as fallback that
/// reverses escaped backslashes, quotes and newlines, in that order.
fn unescape_spec(escaped: &str) -> String {
    match serde_json::from_str::<String>(&format!("\"{escaped}\"")) {
        Ok(s) => s,
        Err(_) => escaped
            .replace("\\\\", "\\")
            .replace("\\\"", "\"")
            .replace("\\n", "\n"),
    }
}

fn escape_spec(raw: &str) -> String {
    raw.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

/// Contribution chart: recolor to the report palette, keep the sentinel
/// bucket visible but in the secondary color, drop the title.
fn restyle_contribution(cfg: &Config, spec: &mut Value) {
    let sentinel = cfg.extraction.sentinel_category.to_uppercase();
    let keyword_colors: [(String, &str); 4] = [
        (sentinel.clone(), cfg.palette.secondary.as_str()),
        ("FACEBOOK".into(), cfg.palette.primary.as_str()),
        ("GOOGLE ADS".into(), cfg.palette.primary_light.as_str()),
        ("TIKTOK".into(), cfg.palette.success.as_str()),
    ];

    if let Some(layers) = spec.get_mut("layer").and_then(Value::as_array_mut) {
        for layer in layers {
            let Some(color) = layer.pointer_mut("/encoding/color") else {
                continue;
            };

            if color.get("condition").is_some() {
                let test_hits_sentinel = color
                    .pointer("/condition/test")
                    .and_then(Value::as_str)
                    .is_some_and(|t| t.contains(&sentinel));
                if test_hits_sentinel {
                    color["condition"]["value"] = json!(cfg.palette.secondary);
                }
                if color.get("value").is_some() {
                    color["value"] = json!(cfg.palette.primary);
                }
            } else if color.pointer("/scale/range").is_some() {
                let domain: Vec<String> = color
                    .pointer("/scale/domain")
                    .and_then(Value::as_array)
                    .map(|a| a.iter().map(domain_label).collect())
                    .unwrap_or_default();

                let new_range: Vec<Value> = domain
                    .iter()
                    .map(|d| {
                        let up = d.to_uppercase();
                        keyword_colors
                            .iter()
                            .find(|(kw, _)| up.contains(kw.as_str()))
                            .map(|(_, c)| *c)
                            .unwrap_or(cfg.palette.primary.as_str())
                    })
                    .map(|c| Value::String(c.to_string()))
                    .collect();

                if !new_range.is_empty() {
                    color["scale"]["range"] = Value::Array(new_range);
                }
            }
        }
    }

    clear_title(spec);
}

/// Model-fit chart: drop the sentinel series entirely, then recolor the
/// expected/actual pair.
fn restyle_model_fit(cfg: &Config, spec: &mut Value) {
    let sentinel = cfg.extraction.sentinel_category.to_lowercase();

    if let Some(datasets) = spec.get_mut("datasets").and_then(Value::as_object_mut) {
        for rows in datasets.values_mut() {
            if let Some(arr) = rows.as_array_mut() {
                arr.retain(|row| {
                    row.get("type").and_then(Value::as_str) != Some(sentinel.as_str())
                });
            }
        }
    }

    if let Some(layers) = spec.get_mut("layer").and_then(Value::as_array_mut) {
        for layer in layers {
            let Some(color) = layer.pointer_mut("/encoding/color") else {
                continue;
            };

            if color.pointer("/scale/domain").is_some() {
                let mut domain_labels: Vec<String> = Vec::new();
                if let Some(domain) = color.pointer_mut("/scale/domain").and_then(Value::as_array_mut)
                {
                    domain.retain(|d| d.as_str() != Some(sentinel.as_str()));
                    domain_labels = domain.iter().map(domain_label).collect();
                }
                if color.pointer("/scale/range").is_some() {
                    // Rebuilt range stays aligned to the filtered domain.
                    let new_range: Vec<Value> = domain_labels
                        .iter()
                        .map(|d| {
                            let low = d.to_lowercase();
                            let c = if low.contains("expected") {
                                &cfg.palette.primary
                            } else if low.contains("actual") {
                                &cfg.palette.success
                            } else {
                                &cfg.palette.primary
                            };
                            Value::String(c.clone())
                        })
                        .collect();
                    color["scale"]["range"] = Value::Array(new_range);
                }
            } else if color.get("condition").is_some() {
                if color.get("value").is_some() {
                    color["value"] = json!(cfg.palette.primary);
                }
                if color.pointer("/condition/value").is_some() {
                    let test = color
                        .pointer("/condition/test")
                        .and_then(Value::as_str)
                        .unwrap_or("")
                        .to_lowercase();
                    if test.contains("expected") {
                        color["condition"]["value"] = json!(cfg.palette.primary);
                    } else if test.contains("actual") {
                        color["condition"]["value"] = json!(cfg.palette.success);
                    }
                }
            }
        }
    }

    clear_title(spec);
}

fn domain_label(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn clear_title(spec: &mut Value) {
    if let Some(obj) = spec.as_object_mut() {
        if obj.contains_key("title") {
            obj.insert("title".to_string(), Value::Null);
        }
    }
}
