//! Web Mercator (slippy map) tile addressing.
//!
//! Tiles are addressed XYZ-style with a top-left origin, as consumed by
//! Leaflet/OSM clients.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::{BoundingBox, GeoPoint};

/// Tile edge length in pixels.
pub const TILE_SIZE: u32 = 256;

/// Latitude limit of the Web Mercator square.
pub const MAX_MERCATOR_LAT: f64 = 85.051_128_779_806_59;

/// A tile coordinate (z/x/y).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    /// Zoom level
    pub z: u32,
    /// Column (x)
    pub x: u32,
    /// Row (y)
    pub y: u32,
}

impl TileCoord {
    pub fn new(z: u32, x: u32, y: u32) -> Self {
        Self { z, x, y }
    }

    /// Number of tiles along one axis at this zoom.
    pub fn tiles_per_axis(zoom: u32) -> u32 {
        1u32 << zoom
    }

    /// Output path `{root}/{z}/{x}/{y}.png`.
    pub fn png_path(&self, root: &Path) -> PathBuf {
        root.join(self.z.to_string())
            .join(self.x.to_string())
            .join(format!("{}.png", self.y))
    }

    /// Geographic bounds of this tile.
    pub fn bounds(&self) -> BoundingBox {
        tile_to_latlon_bounds(self)
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}

/// Fractional tile column for a longitude: `((lon + 180) / 360) * 2^z`.
pub fn lon_to_tile_x(lon: f64, zoom: u32) -> f64 {
    let n = TileCoord::tiles_per_axis(zoom) as f64;
    (lon + 180.0) / 360.0 * n
}

/// Fractional tile row for a latitude: `(1 - asinh(tan(lat)) / pi) / 2 * 2^z`.
pub fn lat_to_tile_y(lat: f64, zoom: u32) -> f64 {
    let n = TileCoord::tiles_per_axis(zoom) as f64;
    let lat_rad = lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians();
    (1.0 - lat_rad.tan().asinh() / PI) / 2.0 * n
}

/// Longitude at a fractional tile column.
pub fn tile_x_to_lon(x: f64, zoom: u32) -> f64 {
    let n = TileCoord::tiles_per_axis(zoom) as f64;
    x / n * 360.0 - 180.0
}

/// Latitude at a fractional tile row.
pub fn tile_y_to_lat(y: f64, zoom: u32) -> f64 {
    let n = TileCoord::tiles_per_axis(zoom) as f64;
    (PI * (1.0 - 2.0 * y / n)).sinh().atan().to_degrees()
}

/// Convert lat/lon to the containing Web Mercator tile.
pub fn latlon_to_tile(lat: f64, lon: f64, zoom: u32) -> TileCoord {
    let max_index = (TileCoord::tiles_per_axis(zoom) - 1) as f64;

    let x = lon_to_tile_x(lon, zoom).floor().clamp(0.0, max_index) as u32;
    let y = lat_to_tile_y(lat, zoom).floor().clamp(0.0, max_index) as u32;

    TileCoord { z: zoom, x, y }
}

/// Convert Web Mercator tile coordinates to lat/lon bounds.
pub fn tile_to_latlon_bounds(coord: &TileCoord) -> BoundingBox {
    let lon_min = tile_x_to_lon(coord.x as f64, coord.z);
    let lon_max = tile_x_to_lon((coord.x + 1) as f64, coord.z);
    let lat_max = tile_y_to_lat(coord.y as f64, coord.z);
    let lat_min = tile_y_to_lat((coord.y + 1) as f64, coord.z);

    BoundingBox::new(lon_min, lat_min, lon_max, lat_max)
}

/// Geographic position of a (possibly fractional) pixel inside a tile.
pub fn pixel_to_latlon(coord: &TileCoord, px: f64, py: f64) -> GeoPoint {
    let size = TILE_SIZE as f64;
    let x = coord.x as f64 + px / size;
    let y = coord.y as f64 + py / size;
    GeoPoint::new(tile_y_to_lat(y, coord.z), tile_x_to_lon(x, coord.z))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latlon_to_tile() {
        let coord = latlon_to_tile(0.0, 0.0, 0);
        assert_eq!(coord, TileCoord { z: 0, x: 0, y: 0 });

        let coord = latlon_to_tile(40.7128, -74.0060, 10); // NYC
        assert_eq!(coord.z, 10);
        // x should be around 301, y around 384
        assert!(coord.x > 290 && coord.x < 310);
        assert!(coord.y > 370 && coord.y < 400);
    }

    #[test]
    fn test_latlon_to_tile_clamps_edges() {
        let coord = latlon_to_tile(-90.0, 180.0, 3);
        assert_eq!(coord, TileCoord { z: 3, x: 7, y: 7 });
    }

    #[test]
    fn test_tile_bounds_roundtrip() {
        let coord = TileCoord::new(7, 20, 49);
        let bbox = coord.bounds();
        let inside = latlon_to_tile(bbox.mid_lat(), (bbox.min_x + bbox.max_x) / 2.0, 7);
        assert_eq!(inside, coord);
    }

    #[test]
    fn test_pixel_to_latlon_corners() {
        let coord = TileCoord::new(4, 2, 6);
        let bbox = coord.bounds();

        let nw = pixel_to_latlon(&coord, 0.0, 0.0);
        assert!((nw.lat - bbox.max_y).abs() < 1e-9);
        assert!((nw.lon - bbox.min_x).abs() < 1e-9);

        let se = pixel_to_latlon(&coord, TILE_SIZE as f64, TILE_SIZE as f64);
        assert!((se.lat - bbox.min_y).abs() < 1e-9);
        assert!((se.lon - bbox.max_x).abs() < 1e-9);
    }

    #[test]
    fn test_png_path() {
        let path = TileCoord::new(5, 3, 12).png_path(Path::new("/tmp/tiles"));
        assert_eq!(path, PathBuf::from("/tmp/tiles/5/3/12.png"));
        assert_eq!(TileCoord::new(5, 3, 12).to_string(), "5/3/12");
    }
}
