//! Web Mercator tile rasterization.
//!
//! Each tile is rendered fully in memory, encoded, then written through a
//! temporary file and rename, so a reader never sees a partial PNG. Tiles
//! with nothing painted are not written at all.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use geometry::PreparedPolygon;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use wx_common::tile::{latlon_to_tile, pixel_to_latlon};
use wx_common::{BoundingBox, GeoPoint, OverlayError, OverlayResult, Polygon, TileCoord, TILE_SIZE};

use crate::nearest::WeatherIndex;
use crate::palette::category_rgba;
use crate::png::{encode_png, PngError};

/// Deepest zoom the Web Mercator scheme addresses here.
pub const MAX_ZOOM: u32 = 22;

/// Tile generation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterConfig {
    pub zoom_levels: Vec<u32>,

    /// Size of the tile worker pool.
    pub workers: usize,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            zoom_levels: (4..=10).collect(),
            workers: 2,
        }
    }
}

impl RasterConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.zoom_levels.is_empty() {
            return Err("zoom_levels must not be empty".to_string());
        }
        if let Some(z) = self.zoom_levels.iter().find(|&&z| z > MAX_ZOOM) {
            return Err(format!("zoom level {} exceeds {}", z, MAX_ZOOM));
        }
        if self.workers == 0 {
            return Err("workers must be > 0".to_string());
        }
        Ok(())
    }
}

/// The union of rings that tiles and grid cells are confined to.
#[derive(Debug, Clone, Default)]
pub struct Confinement {
    rings: Vec<PreparedPolygon>,
    bbox: Option<BoundingBox>,
}

impl Confinement {
    /// Degenerate rings are dropped.
    pub fn new(rings: Vec<Polygon>) -> Self {
        let rings: Vec<PreparedPolygon> = rings.into_iter().filter_map(PreparedPolygon::new).collect();
        let bbox = rings
            .iter()
            .map(|r| *r.bbox())
            .reduce(|a, b| a.union(&b));
        Self { rings, bbox }
    }

    pub fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rings.len()
    }

    pub fn bbox(&self) -> Option<&BoundingBox> {
        self.bbox.as_ref()
    }

    /// Latitude used for the nearest-weather longitude scaling.
    pub fn reference_lat(&self) -> Option<f64> {
        self.bbox.map(|b| b.mid_lat())
    }

    pub fn contains(&self, pt: &GeoPoint) -> bool {
        match &self.bbox {
            Some(bbox) if bbox.contains(pt.lat, pt.lon) => self.rings.iter().any(|r| r.contains(pt)),
            _ => false,
        }
    }
}

/// Inclusive tile index range `(x_min, x_max, y_min, y_max)` covering `bbox`.
pub fn tile_range(bbox: &BoundingBox, zoom: u32) -> (u32, u32, u32, u32) {
    let nw = latlon_to_tile(bbox.max_y, bbox.min_x, zoom);
    let se = latlon_to_tile(bbox.min_y, bbox.max_x, zoom);
    (nw.x, se.x, nw.y, se.y)
}

/// Pixel step between samples: full resolution from zoom 7 up.
pub fn sample_stride(zoom: u32) -> u32 {
    match zoom {
        7.. => 1,
        5 | 6 => 2,
        _ => 4,
    }
}

/// A painted tile held in memory.
#[derive(Debug, Clone)]
pub struct RenderedTile {
    pub coord: TileCoord,
    /// `TILE_SIZE * TILE_SIZE` RGBA pixels, row-major from the north-west.
    pub pixels: Vec<u8>,
    /// Number of painted pixels.
    pub painted: usize,
}

impl RenderedTile {
    pub fn encode(&self) -> Result<Vec<u8>, PngError> {
        encode_png(&self.pixels, TILE_SIZE as usize, TILE_SIZE as usize)
    }

    /// RGBA at pixel (px, py); `None` outside the tile.
    pub fn pixel(&self, px: u32, py: u32) -> Option<[u8; 4]> {
        if px >= TILE_SIZE || py >= TILE_SIZE {
            return None;
        }
        let i = ((py * TILE_SIZE + px) * 4) as usize;
        self.pixels.get(i..i + 4).map(|p| [p[0], p[1], p[2], p[3]])
    }
}

/// Render one tile; `None` when nothing would be painted.
///
/// Each sample is taken at the centre of its `stride x stride` block and
/// colours the whole block. Samples outside the confinement, or with no
/// weather in range, stay fully transparent.
pub fn render_tile(coord: TileCoord, confinement: &Confinement, index: &WeatherIndex) -> Option<RenderedTile> {
    let bbox = confinement.bbox()?;
    if index.is_empty() || !coord.bounds().intersects(bbox) {
        return None;
    }

    let size = TILE_SIZE as usize;
    let stride = sample_stride(coord.z) as usize;
    let half = stride as f64 / 2.0;
    let mut pixels = vec![0u8; size * size * 4];
    let mut painted = 0;

    for sy in (0..size).step_by(stride) {
        for sx in (0..size).step_by(stride) {
            let pt = pixel_to_latlon(&coord, sx as f64 + half, sy as f64 + half);
            if !confinement.contains(&pt) {
                continue;
            }
            let Some((r, g, b, a)) = index.nearest(&pt).and_then(category_rgba) else {
                continue;
            };
            for y in sy..(sy + stride).min(size) {
                for x in sx..(sx + stride).min(size) {
                    let i = (y * size + x) * 4;
                    pixels[i..i + 4].copy_from_slice(&[r, g, b, a]);
                    painted += 1;
                }
            }
        }
    }

    (painted > 0).then_some(RenderedTile { coord, pixels, painted })
}

/// Write `bytes` to `path` through a sibling temp file and rename.
///
/// Parent directories are created as needed.
pub fn write_file_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Write `bytes` to `{root}/{z}/{x}/{y}.png` atomically.
pub fn write_tile_atomic(root: &Path, coord: &TileCoord, bytes: &[u8]) -> OverlayResult<PathBuf> {
    let path = coord.png_path(root);
    write_file_atomic(&path, bytes).map_err(|e| OverlayError::render_io(coord.to_string(), e.to_string()))?;
    Ok(path)
}

/// Counts from one generation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TileStats {
    /// Tiles written per zoom level.
    pub written: BTreeMap<u32, usize>,
    pub skipped_empty: usize,
    pub failed: usize,
}

impl TileStats {
    pub fn total_written(&self) -> usize {
        self.written.values().sum()
    }

    pub fn merge(&mut self, other: TileStats) {
        for (z, n) in other.written {
            *self.written.entry(z).or_default() += n;
        }
        self.skipped_empty += other.skipped_empty;
        self.failed += other.failed;
    }
}

enum TileOutcome {
    Written,
    Empty,
    Failed,
}

/// Renders and writes tiles for every configured zoom level.
#[derive(Debug, Clone)]
pub struct TileRasterizer {
    config: RasterConfig,
    output_dir: PathBuf,
}

impl TileRasterizer {
    pub fn new(config: RasterConfig, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            output_dir: output_dir.into(),
        }
    }

    pub fn config(&self) -> &RasterConfig {
        &self.config
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Tiles overlapping the confinement bounding box at `zoom`.
    pub fn candidate_tiles(&self, confinement: &Confinement, zoom: u32) -> Vec<TileCoord> {
        let Some(bbox) = confinement.bbox() else {
            return Vec::new();
        };
        let (x_min, x_max, y_min, y_max) = tile_range(bbox, zoom);
        (x_min..=x_max)
            .flat_map(|x| (y_min..=y_max).map(move |y| TileCoord::new(zoom, x, y)))
            .collect()
    }

    fn pool(&self) -> OverlayResult<rayon::ThreadPool> {
        rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.workers)
            .thread_name(|i| format!("tile-worker-{}", i))
            .build()
            .map_err(|e| OverlayError::Config(format!("tile worker pool: {}", e)))
    }

    /// Generate one zoom level.
    pub fn generate_zoom(
        &self,
        zoom: u32,
        confinement: &Confinement,
        index: &WeatherIndex,
    ) -> OverlayResult<TileStats> {
        let pool = self.pool()?;
        Ok(self.run_zoom(&pool, zoom, confinement, index))
    }

    /// Generate every configured zoom level on one worker pool.
    pub fn generate_all(&self, confinement: &Confinement, index: &WeatherIndex) -> OverlayResult<TileStats> {
        if confinement.is_empty() {
            warn!("no confinement rings, skipping tile generation");
            return Ok(TileStats::default());
        }
        if index.is_empty() {
            warn!("no weather points with a known category, skipping tile generation");
            return Ok(TileStats::default());
        }

        let pool = self.pool()?;
        let mut stats = TileStats::default();
        for &zoom in &self.config.zoom_levels {
            stats.merge(self.run_zoom(&pool, zoom, confinement, index));
        }

        info!(
            written = stats.total_written(),
            empty = stats.skipped_empty,
            failed = stats.failed,
            zooms = self.config.zoom_levels.len(),
            "tile generation complete"
        );
        Ok(stats)
    }

    fn run_zoom(
        &self,
        pool: &rayon::ThreadPool,
        zoom: u32,
        confinement: &Confinement,
        index: &WeatherIndex,
    ) -> TileStats {
        let tiles = self.candidate_tiles(confinement, zoom);
        debug!(zoom, candidates = tiles.len(), workers = self.config.workers, "rendering zoom level");

        let outcomes: Vec<TileOutcome> = pool.install(|| {
            tiles
                .par_iter()
                .map(|coord| self.process_tile(*coord, confinement, index))
                .collect()
        });

        let mut stats = TileStats::default();
        let mut written = 0;
        for outcome in outcomes {
            match outcome {
                TileOutcome::Written => written += 1,
                TileOutcome::Empty => stats.skipped_empty += 1,
                TileOutcome::Failed => stats.failed += 1,
            }
        }
        stats.written.insert(zoom, written);

        info!(zoom, written, empty = stats.skipped_empty, failed = stats.failed, "generated zoom level");
        stats
    }

    fn process_tile(&self, coord: TileCoord, confinement: &Confinement, index: &WeatherIndex) -> TileOutcome {
        let Some(tile) = render_tile(coord, confinement, index) else {
            return TileOutcome::Empty;
        };

        let result = tile
            .encode()
            .map_err(|e| OverlayError::render_io(coord.to_string(), e.to_string()))
            .and_then(|bytes| write_tile_atomic(&self.output_dir, &coord, &bytes));

        match result {
            Ok(_) => TileOutcome::Written,
            Err(e) => {
                warn!(tile = %coord, error = %e, "failed to write tile");
                TileOutcome::Failed
            }
        }
    }
}
