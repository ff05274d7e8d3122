//! Weather overlay daemon.
//!
//! Runs one full recompute of area groups, grouping boundaries, flight
//! category tiles and the vector grid, then exits.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use overlay_daemon::{OverlayConfig, Pipeline};

#[derive(Parser, Debug)]
#[command(name = "overlay-daemon")]
#[command(about = "Flight-category map overlays and area groupings")]
struct Args {
    /// Configuration file path (YAML)
    #[arg(short, long, env = "OVERLAY_CONFIG")]
    config: Option<PathBuf>,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Lowest zoom level to render
    #[arg(long)]
    zoom_min: Option<u32>,

    /// Highest zoom level to render
    #[arg(long)]
    zoom_max: Option<u32>,

    /// Tile rendering threads
    #[arg(short, long)]
    workers: Option<usize>,

    /// Weather snapshot JSON
    #[arg(long)]
    weather: Option<PathBuf>,

    /// Airport table JSON
    #[arg(long)]
    airports: Option<PathBuf>,

    /// Restrict confinement to these ARTCC codes (comma separated)
    #[arg(long, value_delimiter = ',')]
    artcc: Option<Vec<String>>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

impl Args {
    fn apply(&self, config: &mut OverlayConfig) {
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(z) = self.zoom_min {
            config.zoom_min = z;
        }
        if let Some(z) = self.zoom_max {
            config.zoom_max = z;
        }
        if let Some(n) = self.workers {
            config.tile_workers = n;
        }
        if let Some(path) = &self.weather {
            config.weather_path = Some(path.clone());
        }
        if let Some(path) = &self.airports {
            config.airport_path = Some(path.clone());
        }
        if let Some(codes) = &self.artcc {
            config.artcc_filter = Some(codes.clone());
        }
    }
}

fn init_tracing(log_level: &str, json: bool) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder().with_max_level(level).with_target(true);
    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level, args.json_logs)?;

    info!("Starting overlay daemon");

    let mut config = match &args.config {
        Some(path) => OverlayConfig::from_yaml_file(path)?,
        None => OverlayConfig::default(),
    };
    config.apply_env();
    args.apply(&mut config);
    config
        .validate()
        .map_err(anyhow::Error::msg)
        .context("Invalid configuration")?;

    info!(
        output = %config.output_dir.display(),
        zooms = ?config.zoom_levels(),
        workers = config.tile_workers,
        "Loaded configuration"
    );

    let report = Pipeline::new(config).run()?;
    info!(
        tiles = report.tiles.total_written(),
        cells = report.grid_cells,
        groups = report.area_groups,
        "Overlay daemon finished"
    );
    Ok(())
}
