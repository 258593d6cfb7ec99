use crate::{
    config::Config,
    insights, metrics,
    pipeline::Pipeline,
    store,
    util::{ensure_dir, now_rfc3339},
};
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser, Debug)]
#[command(name = "mmm-report")]
#[command(about = "Deterministic MMM report post-processor (metrics + chart restyle + insights)")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config TOML. If omitted, uses ./mmm-report.toml if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List saved models, newest first.
    List {},
    /// Print extracted metrics and derived insights for one model.
    Inspect {
        #[arg(long)]
        model: Option<String>,
    },
    /// Render the restyled report next to the source report.
    Generate {
        #[arg(long)]
        model: Option<String>,
        /// Write the document here instead of next to the source.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

pub fn dispatch(args: Args) -> Result<()> {
    let cfg_path = resolve_config_path(args.config.as_deref())?;
    let cfg = Config::load(&cfg_path)?;
    let _guard = init_logging(&args, &cfg)?;

    match &args.cmd {
        Command::List {} => list(&cfg),
        Command::Inspect { model } => inspect(&cfg, model.as_deref()),
        Command::Generate { model, out } => generate(&cfg, model.as_deref(), out.as_deref()),
    }
}

fn resolve_config_path(user: Option<&Path>) -> Result<PathBuf> {
    if let Some(p) = user {
        return Ok(p.to_path_buf());
    }
    let default = PathBuf::from("mmm-report.toml");
    if default.exists() {
        Ok(default)
    } else {
        Ok(PathBuf::from("mmm-report.example.toml"))
    }
}

fn init_logging(args: &Args, cfg: &Config) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let stdout_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .boxed()
    };

    let (file_layer, guard) = if let Some(path) = resolve_log_path(cfg) {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        ensure_dir(parent)?;
        let file = std::fs::File::create(&path)
            .with_context(|| format!("create log file: {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn resolve_log_path(cfg: &Config) -> Option<PathBuf> {
    if !cfg.logging.write_to_file {
        return None;
    }
    if !cfg.logging.file_path.is_empty() {
        return Some(PathBuf::from(&cfg.logging.file_path));
    }
    Some(PathBuf::from(&cfg.paths.models_dir).join("mmm-report.log"))
}

fn list(cfg: &Config) -> Result<()> {
    let records = store::list_models(cfg)?;
    let rows: Vec<serde_json::Value> = records
        .iter()
        .map(|r| {
            let identity = r.identity();
            serde_json::json!({
                "folder": r.folder,
                "created_at": identity.created_at,
                "period_start": identity.period_start,
                "period_end": identity.period_end,
                "data_shape": r.metadata.data_shape,
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

fn inspect(cfg: &Config, model: Option<&str>) -> Result<()> {
    let record = store::find_model(cfg, model)?;
    let source = record.load_report_text(cfg)?;
    let extracted = metrics::extract(cfg, &source);
    let insight_list = insights::generate(extracted.fit_score, &extracted.roi_by_channel);
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "model": record.folder,
            "metrics": extracted,
            "insights": insight_list,
        }))?
    );
    Ok(())
}

fn generate(cfg: &Config, model: Option<&str>, out_override: Option<&Path>) -> Result<()> {
    let record = store::find_model(cfg, model)?;
    info!("model={} path={}", record.folder, record.path.display());

    let pipeline = Pipeline::new(cfg);
    let generated_at = now_rfc3339();
    let result = pipeline.run(&record, &generated_at)?;

    let out_path = out_override
        .map(Path::to_path_buf)
        .unwrap_or_else(|| record.path.join(&cfg.output.report_filename));

    if out_path.exists() && !cfg.global.overwrite {
        return Err(anyhow!(
            "output already exists and overwrite=false: {}",
            out_path.display()
        ));
    }

    std::fs::write(&out_path, &result.html)
        .with_context(|| format!("writing report: {}", out_path.display()))?;

    if cfg.output.write_summary_json {
        let summary_path = record.path.join(&cfg.output.summary_filename);
        std::fs::write(&summary_path, serde_json::to_string_pretty(&result.summary)?)
            .with_context(|| format!("writing summary: {}", summary_path.display()))?;
    }

    if cfg.global.print_summary {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "model": record.folder,
                "output": out_path,
                "status": "ok",
            }))?
        );
    }

    Ok(())
}
