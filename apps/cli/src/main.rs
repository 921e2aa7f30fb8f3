mod pipeline;

use anyhow::{Context, Result};
use clap::Parser;
use std::{fs, path::PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use analysis::TrackingConfig;

/// Annotate a GPS telemetry log with track position, lap count and lap times.
#[derive(Parser, Debug)]
#[command(name = "lapcalc", version)]
pub struct Args {
    /// Track directory holding track.txt, points.csv and optionally corners.json
    pub track_dir: PathBuf,
    /// Telemetry log (CSV with a header row)
    pub log: PathBuf,
    /// Annotated CSV to write
    pub out: PathBuf,
    /// JSON file overriding the tracking thresholds
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Also write completed laps as NDJSON
    #[arg(long)]
    pub laps: Option<PathBuf>,
}

fn load_config(path: Option<&PathBuf>) -> Result<TrackingConfig> {
    let Some(path) = path else {
        return Ok(TrackingConfig::default());
    };
    let s = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg = serde_json::from_str(&s).with_context(|| format!("parse {}", path.display()))?;
    info!(path = %path.display(), "tracking config loaded");
    Ok(cfg)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("lapcalc=info,analysis=info,lapcalc_io=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_ref())?;
    let summary = pipeline::run(&args, config)?;
    info!(%summary, "done");
    Ok(())
}
