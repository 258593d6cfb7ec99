use mmm_report::{config::Config, metrics};

#[test]
fn fit_score_absent_without_table_row() {
    let cfg = Config::default();
    let m = metrics::extract(&cfg, "<html><body>no metrics table here</body></html>");
    assert!(m.fit_score.is_none());
}

#[test]
fn fit_score_primary_pattern() {
    let cfg = Config::default();
    let html = "<table><tr><th>R-squared</th><td class=\"num\">0.732</td></tr></table>";
    let m = metrics::extract(&cfg, html);
    assert!((m.fit_score.unwrap() - 0.732).abs() < 1e-9);
}

#[test]
fn fit_score_fallback_is_case_insensitive() {
    let cfg = Config::default();
    let html = "<span>r-squared</span> <td>0.5</td>";
    let m = metrics::extract(&cfg, html);
    assert_eq!(m.fit_score, Some(0.5));
}

#[test]
fn roi_mixed_key_order() {
    let cfg = Config::default();
    let html = r#"{"channel":"Facebook","roi":2.10} {"roi":0.55,"channel":"TikTok"}"#;
    let m = metrics::extract(&cfg, html);
    assert_eq!(m.roi("Facebook"), Some(2.10));
    assert_eq!(m.roi("TikTok"), Some(0.55));
}

#[test]
fn roi_escaped_quote_form() {
    let cfg = Config::default();
    let html = r#"{\"channel\": \"Radio\", \"roi\": 1.25} {\"roi\": 0.9, \"channel\": \"Print\"}"#;
    let m = metrics::extract(&cfg, html);
    assert_eq!(m.roi("Radio"), Some(1.25));
    assert_eq!(m.roi("Print"), Some(0.9));
}

#[test]
fn sentinel_never_appears_as_channel() {
    let cfg = Config::default();
    let html = r#"{"channel":"Baseline","roi":3.0} {"channel":"baseline","roi":1.0} {"channel":"TV","roi":1.1}"#;
    let m = metrics::extract(&cfg, html);
    assert_eq!(m.roi_by_channel.len(), 1);
    assert_eq!(m.roi_by_channel[0].channel, "TV");
}

#[test]
fn first_match_wins_per_channel() {
    let cfg = Config::default();
    let html = r#"{"channel":"TV","roi":1.5} later: {"channel":"TV","roi":9.9}"#;
    let m = metrics::extract(&cfg, html);
    assert_eq!(m.roi("TV"), Some(1.5));
    assert_eq!(m.roi_by_channel.len(), 1);
}

#[test]
fn bare_channel_discovered_without_roi() {
    let cfg = Config::default();
    let html = r#"{"channel":"TV","roi":1.5} and elsewhere "channel": "Podcast" alone"#;
    let m = metrics::extract(&cfg, html);
    assert_eq!(m.roi("TV"), Some(1.5));
    let podcast = m
        .roi_by_channel
        .iter()
        .find(|e| e.channel == "Podcast")
        .expect("Podcast discovered");
    assert!(podcast.roi.is_none());
}

#[test]
fn roi_value_cleanup_strips_trailing_punctuation() {
    let cfg = Config::default();
    let html = r#"{"channel":"TV","roi":1.50.} next"#;
    let m = metrics::extract(&cfg, html);
    // Trailing dot captured by the numeric class is stripped before parse.
    assert_eq!(m.roi("TV"), Some(1.50));
}

#[test]
fn extraction_never_panics_on_noise() {
    let cfg = Config::default();
    let m = metrics::extract(&cfg, "\"channel\": \"\u{0000}weird\" {{{ not html ");
    assert!(m.fit_score.is_none());
}
