use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub global: Global,
    #[serde(default)]
    pub paths: Paths,
    #[serde(default)]
    pub extraction: Extraction,
    #[serde(default)]
    pub palette: Palette,
    #[serde(default)]
    pub output: Output,
    #[serde(default)]
    pub logging: Logging,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw).with_context(|| "parsing TOML")?;
        Ok(cfg)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            global: Default::default(),
            paths: Default::default(),
            extraction: Default::default(),
            palette: Default::default(),
            output: Default::default(),
            logging: Default::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Global {
    pub overwrite: bool,
    pub print_summary: bool,
}
impl Default for Global {
    fn default() -> Self {
        Self {
            overwrite: true,
            print_summary: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paths {
    pub models_dir: String,
}
impl Default for Paths {
    fn default() -> Self {
        Self {
            models_dir: "outputs/models".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Extraction {
    /// Header-cell label of the goodness-of-fit row in the source report.
    pub fit_label: String,
    /// Contribution bucket excluded from channel-level ROI and insights.
    pub sentinel_category: String,
}
impl Default for Extraction {
    fn default() -> Self {
        Self {
            fit_label: "R-squared".into(),
            sentinel_category: "BASELINE".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Palette {
    pub primary: String,
    pub primary_light: String,
    pub secondary: String,
    pub success: String,
}
impl Default for Palette {
    fn default() -> Self {
        Self {
            primary: "#6366f1".into(),
            primary_light: "#818cf8".into(),
            secondary: "#8b5cf6".into(),
            success: "#10b981".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Output {
    pub source_filename: String,
    pub report_filename: String,
    pub write_summary_json: bool,
    pub summary_filename: String,
}
impl Default for Output {
    fn default() -> Self {
        Self {
            source_filename: "report_data.html".into(),
            report_filename: "custom_report.html".into(),
            write_summary_json: true,
            summary_filename: "custom_report.json".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
            write_to_file: false,
            file_path: "".into(),
        }
    }
}
