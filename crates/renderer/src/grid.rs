//! Coarse vector grid of category-coloured cells.
//!
//! Cells are aligned to multiples of the step from (0, 0), so regions that
//! overlap share cells instead of emitting offset copies; a cell claimed
//! by an earlier region is not repeated. Category comes from the same
//! [`WeatherIndex`] the tile renderer uses.

use std::collections::HashSet;
use std::path::Path;

use geometry::PreparedPolygon;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use wx_common::{FlightCategory, GeoPoint, OverlayError, OverlayResult, Polygon};

use crate::geojson::{Feature, FeatureCollection, Geometry};
use crate::nearest::WeatherIndex;
use crate::palette::category_hex;
use crate::tiles::write_file_atomic;

/// Default cell size in degrees.
pub const DEFAULT_GRID_STEP_DEG: f64 = 0.15;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    pub step_deg: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            step_deg: DEFAULT_GRID_STEP_DEG,
        }
    }
}

impl GridConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(self.step_deg.is_finite() && self.step_deg > 0.0) {
            return Err(format!("grid step must be > 0, got {}", self.step_deg));
        }
        Ok(())
    }
}

/// A named confining ring, e.g. one ARTCC.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub name: String,
    pub ring: Polygon,
}

impl Region {
    pub fn new(name: impl Into<String>, ring: Polygon) -> Self {
        Self {
            name: name.into(),
            ring,
        }
    }
}

/// One coloured cell; `row`/`col` index the global grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GridCell {
    pub region: String,
    pub row: i64,
    pub col: i64,
    pub step: f64,
    pub category: FlightCategory,
}

impl GridCell {
    pub fn south(&self) -> f64 {
        self.row as f64 * self.step
    }

    pub fn west(&self) -> f64 {
        self.col as f64 * self.step
    }

    pub fn north(&self) -> f64 {
        (self.row + 1) as f64 * self.step
    }

    pub fn east(&self) -> f64 {
        (self.col + 1) as f64 * self.step
    }

    pub fn center(&self) -> GeoPoint {
        cell_center(self.row, self.col, self.step)
    }
}

fn cell_center(row: i64, col: i64, step: f64) -> GeoPoint {
    GeoPoint::new((row as f64 + 0.5) * step, (col as f64 + 0.5) * step)
}

/// Cells whose centre lies inside a region and has weather in range.
///
/// Output is ordered by region, then south to north, then west to east.
pub fn build_cells(regions: &[Region], index: &WeatherIndex, config: &GridConfig) -> Vec<GridCell> {
    let step = config.step_deg;
    let mut claimed: HashSet<(i64, i64)> = HashSet::new();
    let mut cells = Vec::new();

    if index.is_empty() {
        return cells;
    }

    for region in regions {
        let Some(prepared) = PreparedPolygon::new(region.ring.clone()) else {
            debug!(region = %region.name, "skipping degenerate region");
            continue;
        };
        let bbox = *prepared.bbox();
        let (row_min, row_max) = ((bbox.min_y / step).floor() as i64, (bbox.max_y / step).floor() as i64);
        let (col_min, col_max) = ((bbox.min_x / step).floor() as i64, (bbox.max_x / step).floor() as i64);

        let before = cells.len();
        for row in row_min..=row_max {
            for col in col_min..=col_max {
                let center = cell_center(row, col, step);
                if !prepared.contains(&center) || claimed.contains(&(row, col)) {
                    continue;
                }
                let Some(category) = index.nearest(&center) else {
                    continue;
                };
                claimed.insert((row, col));
                cells.push(GridCell {
                    region: region.name.clone(),
                    row,
                    col,
                    step,
                    category,
                });
            }
        }
        debug!(region = %region.name, cells = cells.len() - before, "gridded region");
    }

    info!(regions = regions.len(), cells = cells.len(), step, "built weather grid");
    cells
}

/// One square Polygon feature per cell.
pub fn build_feature_collection(cells: &[GridCell]) -> FeatureCollection {
    let features = cells
        .iter()
        .map(|cell| {
            let mut feature = Feature::new(Geometry::rectangle(cell.west(), cell.south(), cell.east(), cell.north()))
                .with_property("category", cell.category.as_str())
                .with_property("region", cell.region.as_str());
            if let Some(color) = category_hex(cell.category) {
                feature = feature.with_property("color", color);
            }
            feature
        })
        .collect();
    FeatureCollection::new().with_features(features)
}

/// Serialize `collection` to `path` atomically.
pub fn write_geojson(path: &Path, collection: &FeatureCollection) -> OverlayResult<()> {
    let bytes = serde_json::to_vec(collection)?;
    write_file_atomic(path, &bytes).map_err(|e| OverlayError::Io(format!("{}: {}", path.display(), e)))?;
    info!(path = %path.display(), features = collection.len(), "wrote grid GeoJSON");
    Ok(())
}
