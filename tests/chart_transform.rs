use mmm_report::charts::{locate_and_transform, ChartKind};
use mmm_report::config::Config;
use regex::Regex;
use serde_json::Value;

fn escape(raw: &str) -> String {
    raw.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

fn wrap_block(marker: &str, spec: &Value) -> String {
    let escaped = escape(&spec.to_string());
    format!(
        "<html><body><chart><div id=\"{marker}\"></div>\
         <chart-description>raw modeling output</chart-description>\
         <script>const spec = JSON.parse(\"{escaped}\");\
         vegaEmbed(\"#{marker}\", spec);</script></body></html>"
    )
}

fn embedded_spec(block: &str) -> Value {
    let re = Regex::new(r#"(?s)const spec = JSON\.parse\("(.*?)"\);"#).unwrap();
    let escaped = re.captures(block).expect("spec literal present")[1].to_string();
    let decoded: String = serde_json::from_str(&format!("\"{escaped}\"")).expect("valid escape");
    serde_json::from_str(&decoded).expect("valid JSON")
}

#[test]
fn model_fit_drops_baseline_everywhere() {
    let cfg = Config::default();
    let spec = serde_json::json!({
        "title": "Expected vs actual",
        "datasets": {
            "d0": [
                {"type": "baseline", "v": 1},
                {"type": "expected", "v": 2},
                {"type": "actual", "v": 3}
            ]
        },
        "layer": [{
            "encoding": {"color": {"scale": {
                "domain": ["baseline", "expected", "actual"],
                "range": ["#000000", "#111111", "#222222"]
            }}}
        }]
    });
    let source = wrap_block("expected-actual-outcome-chart", &spec);

    let out = locate_and_transform(&cfg, &source, ChartKind::ModelFit).expect("block found");
    let new_spec = embedded_spec(&out);

    let rows = new_spec["datasets"]["d0"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r["type"] != "baseline"));

    let scale = &new_spec["layer"][0]["encoding"]["color"]["scale"];
    assert_eq!(scale["domain"], serde_json::json!(["expected", "actual"]));
    assert_eq!(scale["range"], serde_json::json!(["#6366f1", "#10b981"]));

    assert!(new_spec["title"].is_null());
}

#[test]
fn model_fit_conditional_color() {
    let cfg = Config::default();
    let spec = serde_json::json!({
        "layer": [{
            "encoding": {"color": {
                "condition": {"test": "datum.type === 'actual'", "value": "#abcdef"},
                "value": "#fedcba"
            }}
        }]
    });
    let source = wrap_block("expected-actual-outcome-chart", &spec);

    let out = locate_and_transform(&cfg, &source, ChartKind::ModelFit).unwrap();
    let new_spec = embedded_spec(&out);
    let color = &new_spec["layer"][0]["encoding"]["color"];
    assert_eq!(color["value"], "#6366f1");
    assert_eq!(color["condition"]["value"], "#10b981");
}

#[test]
fn contribution_recolors_domain_by_keyword() {
    let cfg = Config::default();
    let spec = serde_json::json!({
        "title": "Drivers",
        "layer": [{
            "encoding": {"color": {"scale": {
                "domain": ["Baseline", "Facebook Ads", "Google Ads", "Door hangers"],
                "range": ["#000000", "#111111", "#222222", "#333333"]
            }}}
        }]
    });
    let source = wrap_block("channel-drivers-chart", &spec);

    let out =
        locate_and_transform(&cfg, &source, ChartKind::ContributionChannel).expect("block found");
    let new_spec = embedded_spec(&out);

    let scale = &new_spec["layer"][0]["encoding"]["color"]["scale"];
    // Domain order preserved, sentinel kept but recolored.
    assert_eq!(
        scale["domain"],
        serde_json::json!(["Baseline", "Facebook Ads", "Google Ads", "Door hangers"])
    );
    assert_eq!(
        scale["range"],
        serde_json::json!(["#8b5cf6", "#6366f1", "#818cf8", "#6366f1"])
    );
    assert!(new_spec["title"].is_null());
}

#[test]
fn contribution_conditional_sentinel_branch() {
    let cfg = Config::default();
    let spec = serde_json::json!({
        "layer": [{
            "encoding": {"color": {
                "condition": {"test": "datum.channel === 'BASELINE'", "value": "#000000"},
                "value": "#111111"
            }}
        }]
    });
    let source = wrap_block("channel-drivers-chart", &spec);

    let out = locate_and_transform(&cfg, &source, ChartKind::ContributionChannel).unwrap();
    let new_spec = embedded_spec(&out);
    let color = &new_spec["layer"][0]["encoding"]["color"];
    assert_eq!(color["condition"]["value"], "#8b5cf6");
    assert_eq!(color["value"], "#6366f1");
}

#[test]
fn block_identifier_renamed_in_all_forms() {
    let cfg = Config::default();
    let spec = serde_json::json!({"layer": []});
    let source = wrap_block("channel-drivers-chart", &spec);

    let out = locate_and_transform(&cfg, &source, ChartKind::ContributionChannel).unwrap();
    assert!(out.contains("id=\"contribution-channel-chart\""));
    assert!(out.contains("#contribution-channel-chart"));
    assert!(!out.contains("channel-drivers-chart"));
}

#[test]
fn description_element_stripped() {
    let cfg = Config::default();
    let spec = serde_json::json!({"layer": []});
    let source = wrap_block("expected-actual-outcome-chart", &spec);

    let out = locate_and_transform(&cfg, &source, ChartKind::ModelFit).unwrap();
    assert!(!out.contains("chart-description"));
    assert!(!out.contains("raw modeling output"));
}

#[test]
fn missing_marker_yields_absent() {
    let cfg = Config::default();
    let source = "<html><chart><script>const spec = 1;</script></html>";
    assert!(locate_and_transform(&cfg, source, ChartKind::ModelFit).is_none());
}

#[test]
fn missing_start_tag_yields_absent() {
    let cfg = Config::default();
    let source = "<html><div id=\"channel-drivers-chart\"></div><script>x</script></html>";
    assert!(locate_and_transform(&cfg, source, ChartKind::ContributionChannel).is_none());
}

#[test]
fn malformed_spec_yields_absent() {
    let cfg = Config::default();
    let source = "<chart><div id=\"channel-drivers-chart\"></div>\
                  <script>const spec = JSON.parse(\"{{{not json\");</script>";
    assert!(locate_and_transform(&cfg, source, ChartKind::ContributionChannel).is_none());
}

#[test]
fn raw_control_char_in_literal_recovered_by_manual_unescape() {
    let cfg = Config::default();
    // A raw tab inside the literal is rejected by the strict JSON-string
    // decoder; the manual unescape pass still recovers the spec because
    // the tab sits between tokens.
    let source = "<chart><div id=\"channel-drivers-chart\"></div>\
                  <script>const spec = JSON.parse(\"{\\\"title\\\":\t\\\"Drivers\\\", \\\"layer\\\": []}\");\
                  vegaEmbed(\"#channel-drivers-chart\", spec);</script>";

    let out = locate_and_transform(&cfg, source, ChartKind::ContributionChannel)
        .expect("block found");
    let new_spec = embedded_spec(&out);
    assert!(new_spec["title"].is_null());
    assert!(out.contains("id=\"contribution-channel-chart\""));
}

#[test]
fn block_without_spec_literal_still_renamed() {
    let cfg = Config::default();
    let source = "<chart><div id=\"channel-drivers-chart\"></div>\
                  <script>render(\"#channel-drivers-chart\");</script>";
    let out = locate_and_transform(&cfg, source, ChartKind::ContributionChannel).unwrap();
    assert!(out.contains("#contribution-channel-chart"));
    assert!(!out.contains("channel-drivers-chart"));
}

#[test]
fn alternative_start_tag_spelling() {
    let cfg = Config::default();
    let spec = serde_json::json!({"layer": []});
    let escaped = escape(&spec.to_string());
    let source = format!(
        "<chart-embed data-x=\"1\"><div id=\"channel-drivers-chart\"></div>\
         <script>const spec = JSON.parse(\"{escaped}\");</script>"
    );
    let out = locate_and_transform(&cfg, &source, ChartKind::ContributionChannel).unwrap();
    assert!(out.starts_with("<chart-embed"));
}
