use serde::{Deserialize, Serialize};

/// Machine-readable summary of one generation run, written alongside
/// the rendered document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub model: String,
    pub generated_at: String,
    pub source_bytes: usize,
    pub source_sha256: String,
    pub fit_score: Option<f64>,
    pub channels: usize,
    pub channels_with_roi: usize,
    pub model_fit_chart: bool,
    pub contribution_chart: bool,
    pub insights: usize,
}
