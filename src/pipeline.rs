use crate::{
    charts::{self, ChartKind},
    config::Config,
    insights,
    metrics,
    render::{self, RenderContext},
    report::GenerationReport,
    store::ModelRecord,
    util::sha256_hex,
};
use anyhow::{Context, Result};
use tracing::info;

pub struct Pipeline {
    cfg: Config,
}

pub struct PipelineOutput {
    pub html: String,
    pub summary: GenerationReport,
}

impl Pipeline {
    pub fn new(cfg: &Config) -> Self {
        Self { cfg: cfg.clone() }
    }

    /// Runs the whole extract/transform/insight/render chain for one
    /// model. Failure to read the source report is fatal; every step
    /// past that degrades to absent values instead of erroring.
    pub fn run(&self, record: &ModelRecord, generated_at: &str) -> Result<PipelineOutput> {
        let source = record
            .load_report_text(&self.cfg)
            .with_context(|| format!("loading report for model {}", record.folder))?;

        let extracted = metrics::extract(&self.cfg, &source);
        let model_fit = charts::locate_and_transform(&self.cfg, &source, ChartKind::ModelFit);
        let contribution =
            charts::locate_and_transform(&self.cfg, &source, ChartKind::ContributionChannel);
        let insight_list = insights::generate(extracted.fit_score, &extracted.roi_by_channel);

        info!(
            "extracted fit_score={:?} channels={} model_fit_chart={} contribution_chart={} insights={}",
            extracted.fit_score,
            extracted.roi_by_channel.len(),
            model_fit.is_some(),
            contribution.is_some(),
            insight_list.len()
        );

        let identity = record.identity();
        let html = render::render(&RenderContext {
            identity: &identity,
            metrics: &extracted,
            model_fit_chart: model_fit.as_deref(),
            contribution_chart: contribution.as_deref(),
            insights: &insight_list,
        });

        let summary = GenerationReport {
            model: record.folder.clone(),
            generated_at: generated_at.to_string(),
            source_bytes: source.len(),
            source_sha256: sha256_hex(source.as_bytes()),
            fit_score: extracted.fit_score,
            channels: extracted.roi_by_channel.len(),
            channels_with_roi: extracted
                .roi_by_channel
                .iter()
                .filter(|e| e.roi.is_some())
                .count(),
            model_fit_chart: model_fit.is_some(),
            contribution_chart: contribution.is_some(),
            insights: insight_list.len(),
        };

        Ok(PipelineOutput { html, summary })
    }
}
