use crate::config::Config;
use crate::render::ModelIdentity;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Metadata sidecar written by the training layer. Every field is
/// optional; a missing or unreadable sidecar degrades to folder-derived
/// defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelMetadata {
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub date_range: Option<DateRange>,
    #[serde(default)]
    pub data_shape: Option<Vec<u64>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ModelRecord {
    pub folder: String,
    pub path: PathBuf,
    pub metadata: ModelMetadata,
}

impl ModelRecord {
    pub fn identity(&self) -> ModelIdentity {
        let range = self.metadata.date_range.clone().unwrap_or_default();
        ModelIdentity {
            folder: self.folder.clone(),
            created_at: self
                .metadata
                .created_at
                .clone()
                .unwrap_or_else(|| self.folder.clone()),
            period_start: range.start.as_deref().map(date_part),
            period_end: range.end.as_deref().map(date_part),
        }
    }

    pub fn report_path(&self, cfg: &Config) -> PathBuf {
        source_report_path(cfg, &self.path)
    }

    pub fn load_report_text(&self, cfg: &Config) -> Result<String> {
        let path = self.report_path(cfg);
        std::fs::read_to_string(&path)
            .with_context(|| format!("reading source report: {}", path.display()))
    }
}

/// Lists saved models under `paths.models_dir`, newest first. Folders
/// without the source report artifact are skipped.
pub fn list_models(cfg: &Config) -> Result<Vec<ModelRecord>> {
    let dir = Path::new(&cfg.paths.models_dir);
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut records = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("listing models_dir: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let folder = entry.file_name().to_string_lossy().to_string();

        if !source_report_path(cfg, &path).exists() {
            debug!("skipping {folder}: no {}", cfg.output.source_filename);
            continue;
        }

        let metadata = load_metadata(&path).unwrap_or_else(|err| {
            warn!("unreadable metadata for {folder}: {err:#}");
            ModelMetadata::default()
        });
        let metadata = if metadata.created_at.is_some() {
            metadata
        } else {
            ModelMetadata {
                created_at: Some(folder.clone()),
                ..metadata
            }
        };

        records.push(ModelRecord {
            folder,
            path,
            metadata,
        });
    }

    records.sort_by(|a, b| b.folder.cmp(&a.folder));
    Ok(records)
}

/// Resolves a record by folder name, or the newest one when no name is
/// given.
pub fn find_model(cfg: &Config, name: Option<&str>) -> Result<ModelRecord> {
    let records = list_models(cfg)?;
    match name {
        Some(name) => records
            .into_iter()
            .find(|r| r.folder == name)
            .ok_or_else(|| anyhow!("no saved model named: {name}")),
        None => records
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("no saved models in {}", cfg.paths.models_dir)),
    }
}

fn source_report_path(cfg: &Config, model_path: &Path) -> PathBuf {
    model_path.join(&cfg.output.source_filename)
}

fn load_metadata(model_path: &Path) -> Result<ModelMetadata> {
    let path = model_path.join("metadata.toml");
    if !path.exists() {
        return Ok(ModelMetadata::default());
    }
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("reading metadata: {}", path.display()))?;
    toml::from_str(&raw).with_context(|| "parsing metadata TOML")
}

fn date_part(s: &str) -> String {
    s.get(..10).unwrap_or(s).to_string()
}
