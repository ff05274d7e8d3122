//! Geographic points and polygon rings.

use serde::{Deserialize, Serialize};

use crate::error::{OverlayError, OverlayResult};
use crate::BoundingBox;

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Build a point, rejecting coordinates outside the valid range.
    pub fn checked(lat: f64, lon: f64) -> OverlayResult<Self> {
        let point = Self::new(lat, lon);
        if point.is_valid() {
            Ok(point)
        } else {
            Err(OverlayError::InvalidInput(format!("coordinate ({}, {}) out of range", lat, lon)))
        }
    }

    /// Check that the point lies in the valid lat/lon range.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    /// Build from a `[lat, lon]` pair as stored in boundary archives.
    pub fn from_lat_lon(pair: [f64; 2]) -> Self {
        Self {
            lat: pair[0],
            lon: pair[1],
        }
    }

    /// Build from a GeoJSON `[lon, lat]` position.
    pub fn from_lon_lat(pair: [f64; 2]) -> Self {
        Self {
            lat: pair[1],
            lon: pair[0],
        }
    }

    /// GeoJSON position order.
    pub fn to_lon_lat(&self) -> [f64; 2] {
        [self.lon, self.lat]
    }

    /// Exact bitwise key, used for de-duplicating vertices.
    pub fn key(&self) -> (u64, u64) {
        (self.lat.to_bits(), self.lon.to_bits())
    }
}

/// A single outer ring. Holes are not modeled.
///
/// The ring may or may not repeat its first point at the end; every
/// consumer treats the ring as implicitly closed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polygon {
    pub points: Vec<GeoPoint>,
}

impl Polygon {
    pub fn new(points: Vec<GeoPoint>) -> Self {
        Self { points }
    }

    /// Build from `[lat, lon]` pairs.
    pub fn from_lat_lon_pairs(pairs: &[[f64; 2]]) -> Self {
        Self {
            points: pairs.iter().copied().map(GeoPoint::from_lat_lon).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GeoPoint> {
        self.points.iter()
    }

    /// Number of distinct vertices.
    pub fn distinct_count(&self) -> usize {
        let mut keys: Vec<(u64, u64)> = self.points.iter().map(GeoPoint::key).collect();
        keys.sort_unstable();
        keys.dedup();
        keys.len()
    }

    /// A ring needs at least 3 distinct points to enclose any area.
    pub fn is_degenerate(&self) -> bool {
        self.distinct_count() < 3
    }

    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(&self.points)
    }
}

impl From<Vec<GeoPoint>> for Polygon {
    fn from(points: Vec<GeoPoint>) -> Self {
        Self { points }
    }
}
