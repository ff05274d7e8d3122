//! Daemon configuration.
//!
//! Loaded from an optional YAML file, then overridden from `OVERLAY_*`
//! environment variables, then from command-line flags in `main`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use boundaries::MergeConfig;
use clustering::ClusterConfig;
use renderer::{GridConfig, RasterConfig};
pub use renderer::MAX_ZOOM;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Top-level configuration for one batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Root for every output artifact.
    pub output_dir: PathBuf,

    /// Tile pyramid directory, relative to `output_dir` unless absolute.
    pub tile_subdir: PathBuf,

    /// Grid GeoJSON path, relative to `output_dir` unless absolute.
    pub grid_output: PathBuf,

    /// Inclusive zoom range.
    pub zoom_min: u32,
    pub zoom_max: u32,

    /// Nearest-weather validity radius in degrees.
    pub validity_radius_deg: f64,

    /// Grid cell size in degrees.
    pub grid_step_deg: f64,

    pub adjacency_threshold_deg: f64,
    pub fallback_buffer_nm: f64,
    pub tower_radius_nm: f64,
    pub tower_points: usize,

    /// Tile rendering threads.
    pub tile_workers: usize,

    /// Directory of per-facility `{FACILITY}.json` archives.
    pub boundary_archive_dir: Option<PathBuf>,

    /// Root of a SimAware-style `{FACILITY}/.../{BOUNDARY}.json` tree.
    pub simaware_dir: Option<PathBuf>,

    /// Directory holding `artcc_boundaries_{date}.json` cache files.
    pub boundary_cache_dir: Option<PathBuf>,

    /// Directory of preset grouping files.
    pub grouping_dir: Option<PathBuf>,

    /// Weather snapshot: ICAO → `{lat, lon, category?}`.
    pub weather_path: Option<PathBuf>,

    /// Airport table: ICAO → `{lat?, lon?, tower_type?, city?, state?, has_atis?}`.
    pub airport_path: Option<PathBuf>,

    /// ARTCC codes that confine tiles and grid; CONUS when unset.
    pub artcc_filter: Option<Vec<String>>,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        let merge = MergeConfig::default();
        let raster = RasterConfig::default();
        Self {
            output_dir: PathBuf::from("./output"),
            tile_subdir: PathBuf::from("tiles"),
            grid_output: PathBuf::from("weather_grid.geojson"),
            zoom_min: 4,
            zoom_max: 10,
            validity_radius_deg: renderer::DEFAULT_VALIDITY_RADIUS_DEG,
            grid_step_deg: GridConfig::default().step_deg,
            adjacency_threshold_deg: merge.adjacency_threshold_deg,
            fallback_buffer_nm: merge.fallback_buffer_nm,
            tower_radius_nm: merge.tower_radius_nm,
            tower_points: merge.tower_points,
            tile_workers: raster.workers,
            boundary_archive_dir: None,
            simaware_dir: None,
            boundary_cache_dir: None,
            grouping_dir: None,
            weather_path: None,
            airport_path: None,
            artcc_filter: None,
        }
    }
}

impl OverlayConfig {
    /// Parse a YAML file; missing keys keep their defaults.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).with_context(|| format!("Failed to read config: {:?}", path))?;
        serde_yaml::from_str(&text).with_context(|| format!("Failed to parse config: {:?}", path))
    }

    /// Defaults overridden from the process environment.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Apply `OVERLAY_*` variables from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from `lookup`. Unparseable values are ignored with a
    /// warning.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("OVERLAY_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(val);
        }

        if let Some(val) = lookup("OVERLAY_ZOOM_MIN") {
            match val.trim().parse() {
                Ok(z) => self.zoom_min = z,
                Err(_) => warn!(value = %val, "ignoring invalid OVERLAY_ZOOM_MIN"),
            }
        }

        if let Some(val) = lookup("OVERLAY_ZOOM_MAX") {
            match val.trim().parse() {
                Ok(z) => self.zoom_max = z,
                Err(_) => warn!(value = %val, "ignoring invalid OVERLAY_ZOOM_MAX"),
            }
        }

        if let Some(val) = lookup("OVERLAY_TILE_WORKERS") {
            match val.trim().parse() {
                Ok(n) => self.tile_workers = n,
                Err(_) => warn!(value = %val, "ignoring invalid OVERLAY_TILE_WORKERS"),
            }
        }

        if let Some(val) = lookup("OVERLAY_VALIDITY_RADIUS_DEG") {
            match val.trim().parse() {
                Ok(r) => self.validity_radius_deg = r,
                Err(_) => warn!(value = %val, "ignoring invalid OVERLAY_VALIDITY_RADIUS_DEG"),
            }
        }
    }

    /// Validate the configuration, including every derived stage config.
    pub fn validate(&self) -> Result<(), String> {
        if self.zoom_min > self.zoom_max {
            return Err(format!(
                "zoom range is empty: min {} > max {}",
                self.zoom_min, self.zoom_max
            ));
        }
        if self.zoom_max > MAX_ZOOM {
            return Err(format!("zoom_max must be <= {}, got {}", MAX_ZOOM, self.zoom_max));
        }
        if !(self.validity_radius_deg.is_finite() && self.validity_radius_deg > 0.0) {
            return Err(format!(
                "validity_radius_deg must be > 0, got {}",
                self.validity_radius_deg
            ));
        }
        if self.tile_workers == 0 {
            return Err("tile_workers must be > 0".to_string());
        }
        self.grid_config().validate()?;
        self.merge_config().validate()?;
        self.raster_config().validate()?;
        self.cluster_config().validate()?;
        Ok(())
    }

    pub fn zoom_levels(&self) -> Vec<u32> {
        (self.zoom_min..=self.zoom_max).collect()
    }

    /// Directory tiles are written under.
    pub fn tile_root(&self) -> PathBuf {
        self.under_output(&self.tile_subdir)
    }

    pub fn grid_path(&self) -> PathBuf {
        self.under_output(&self.grid_output)
    }

    pub fn groups_path(&self) -> PathBuf {
        self.output_dir.join("area_groups.json")
    }

    pub fn boundaries_path(&self) -> PathBuf {
        self.output_dir.join("grouping_boundaries.geojson")
    }

    fn under_output(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.output_dir.join(path)
        }
    }

    pub fn cluster_config(&self) -> ClusterConfig {
        ClusterConfig::default()
    }

    pub fn merge_config(&self) -> MergeConfig {
        MergeConfig {
            adjacency_threshold_deg: self.adjacency_threshold_deg,
            tower_radius_nm: self.tower_radius_nm,
            tower_points: self.tower_points,
            fallback_buffer_nm: self.fallback_buffer_nm,
        }
    }

    pub fn raster_config(&self) -> RasterConfig {
        RasterConfig {
            zoom_levels: self.zoom_levels(),
            workers: self.tile_workers,
        }
    }

    pub fn grid_config(&self) -> GridConfig {
        GridConfig {
            step_deg: self.grid_step_deg,
        }
    }
}
