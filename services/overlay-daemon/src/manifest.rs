//! `tiles.json` index written beside the tile pyramid.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use renderer::{write_file_atomic, TileStats};
use serde::{Deserialize, Serialize};
use wx_common::{AiracCycle, BoundingBox, OverlayError, OverlayResult};

pub const MANIFEST_FILE: &str = "tiles.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileManifest {
    pub min_zoom: u32,
    pub max_zoom: u32,
    /// `[west, south, east, north]` of the confinement, if any.
    pub bounds: Option<[f64; 4]>,
    /// Tiles written per zoom level.
    pub tiles: BTreeMap<u32, usize>,
    pub failed: usize,
    /// Boundary data cycle the confinement was taken from.
    pub airac_cycle: String,
    pub generated_at: DateTime<Utc>,
}

impl TileManifest {
    pub fn new(zoom_levels: &[u32], bounds: Option<&BoundingBox>, stats: &TileStats, cycle: &AiracCycle) -> Self {
        Self {
            min_zoom: zoom_levels.iter().copied().min().unwrap_or(0),
            max_zoom: zoom_levels.iter().copied().max().unwrap_or(0),
            bounds: bounds.map(BoundingBox::to_array),
            tiles: stats.written.clone(),
            failed: stats.failed,
            airac_cycle: cycle.ident(),
            generated_at: Utc::now(),
        }
    }

    pub fn total_tiles(&self) -> usize {
        self.tiles.values().sum()
    }

    /// Write to `{tile_root}/tiles.json` atomically.
    pub fn write(&self, tile_root: &Path) -> OverlayResult<PathBuf> {
        let path = tile_root.join(MANIFEST_FILE);
        let bytes = serde_json::to_vec_pretty(self)?;
        write_file_atomic(&path, &bytes).map_err(|e| OverlayError::Io(format!("{}: {}", path.display(), e)))?;
        Ok(path)
    }

    pub fn read(tile_root: &Path) -> OverlayResult<Self> {
        let text = std::fs::read_to_string(tile_root.join(MANIFEST_FILE))?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_write_read() {
        let dir = tempfile::tempdir().unwrap();
        let mut stats = TileStats::default();
        stats.written.insert(4, 3);
        stats.written.insert(5, 7);
        stats.failed = 1;
        let bbox = BoundingBox::new(-125.0, 24.0, -66.0, 50.0);
        let cycle = AiracCycle::current();

        let manifest = TileManifest::new(&[4, 5], Some(&bbox), &stats, &cycle);
        let path = manifest.write(dir.path()).unwrap();
        assert!(path.ends_with("tiles.json"));

        let back = TileManifest::read(dir.path()).unwrap();
        assert_eq!(back, manifest);
        assert_eq!(back.min_zoom, 4);
        assert_eq!(back.max_zoom, 5);
        assert_eq!(back.total_tiles(), 10);
        assert_eq!(back.bounds, Some([-125.0, 24.0, -66.0, 50.0]));
    }
}
