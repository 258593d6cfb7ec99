use mmm_report::insights::{Insight, InsightKind};
use mmm_report::metrics::{ExtractedMetrics, RoiEntry};
use mmm_report::render::{render, ModelIdentity, RenderContext};

fn identity() -> ModelIdentity {
    ModelIdentity {
        folder: "2024-06-01_120000".to_string(),
        created_at: "2024-06-01T12:00:00".to_string(),
        period_start: Some("2024-01-01".to_string()),
        period_end: Some("2024-05-31".to_string()),
    }
}

#[test]
fn empty_inputs_render_placeholders() {
    let identity = identity();
    let metrics = ExtractedMetrics::default();
    let ctx = RenderContext {
        identity: &identity,
        metrics: &metrics,
        model_fit_chart: None,
        contribution_chart: None,
        insights: &[],
    };
    let html = render(&ctx);

    assert!(html.contains("Results will be displayed here"));
    assert!(html.contains("Model fit charts will be displayed here"));
    assert!(html.contains("Contribution charts will be displayed here"));
    assert!(html.contains("No insights available"));
    assert!(html.contains("2024-06-01_120000"));
}

#[test]
fn render_is_idempotent() {
    let identity = identity();
    let metrics = ExtractedMetrics {
        fit_score: Some(0.81),
        roi_by_channel: vec![RoiEntry {
            channel: "TV".to_string(),
            roi: Some(1.4),
        }],
    };
    let insights = vec![Insight {
        kind: InsightKind::Info,
        title: "t".to_string(),
        description: "d".to_string(),
        action: "a".to_string(),
    }];
    let ctx = RenderContext {
        identity: &identity,
        metrics: &metrics,
        model_fit_chart: Some("<chart><script>x</script>"),
        contribution_chart: None,
        insights: &insights,
    };
    assert_eq!(render(&ctx), render(&ctx));
}

#[test]
fn roi_list_sorted_descending_and_absent_excluded() {
    let identity = identity();
    let metrics = ExtractedMetrics {
        fit_score: None,
        roi_by_channel: vec![
            RoiEntry {
                channel: "Low".to_string(),
                roi: Some(0.5),
            },
            RoiEntry {
                channel: "High".to_string(),
                roi: Some(2.0),
            },
            RoiEntry {
                channel: "Unknown".to_string(),
                roi: None,
            },
        ],
    };
    let ctx = RenderContext {
        identity: &identity,
        metrics: &metrics,
        model_fit_chart: None,
        contribution_chart: None,
        insights: &[],
    };
    let html = render(&ctx);

    let high = html.find("High").expect("High rendered");
    let low = html.find("Low").expect("Low rendered");
    assert!(high < low);
    assert!(!html.contains("Unknown"));
}

#[test]
fn fit_quality_badge_tracks_score() {
    let identity = identity();
    let metrics = ExtractedMetrics {
        fit_score: Some(0.9),
        roi_by_channel: vec![],
    };
    let ctx = RenderContext {
        identity: &identity,
        metrics: &metrics,
        model_fit_chart: None,
        contribution_chart: None,
        insights: &[],
    };
    let html = render(&ctx);
    assert!(html.contains("0.900"));
    assert!(html.contains("quality-badge excellent"));
}

#[test]
fn chart_block_embedded_verbatim() {
    let identity = identity();
    let metrics = ExtractedMetrics::default();
    let block = "<chart><div id=\"model-fit-chart\"></div><script>spec</script>";
    let ctx = RenderContext {
        identity: &identity,
        metrics: &metrics,
        model_fit_chart: Some(block),
        contribution_chart: None,
        insights: &[],
    };
    let html = render(&ctx);
    assert!(html.contains(block));
    assert!(!html.contains("Model fit charts will be displayed here"));
}

#[test]
fn insight_kinds_map_to_css_classes() {
    let identity = identity();
    let metrics = ExtractedMetrics::default();
    let insights = vec![
        Insight {
            kind: InsightKind::Success,
            title: "s".into(),
            description: "d".into(),
            action: "a".into(),
        },
        Insight {
            kind: InsightKind::Danger,
            title: "x".into(),
            description: "y".into(),
            action: "z".into(),
        },
    ];
    let ctx = RenderContext {
        identity: &identity,
        metrics: &metrics,
        model_fit_chart: None,
        contribution_chart: None,
        insights: &insights,
    };
    let html = render(&ctx);
    assert!(html.contains("insight-item success"));
    assert!(html.contains("insight-item danger"));
}
