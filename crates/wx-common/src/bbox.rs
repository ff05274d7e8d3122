//! Bounding box types and operations.

use serde::{Deserialize, Serialize};

use crate::GeoPoint;

/// A geographic bounding box in degrees.
///
/// `x` is longitude and `y` is latitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from corner coordinates.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Smallest box covering every point, or `None` for an empty slice.
    pub fn from_points(points: &[GeoPoint]) -> Option<Self> {
        let first = points.first()?;
        let mut bbox = Self::new(first.lon, first.lat, first.lon, first.lat);
        for p in &points[1..] {
            bbox.include(p);
        }
        Some(bbox)
    }

    /// Grow the box to include a point.
    pub fn include(&mut self, p: &GeoPoint) {
        self.min_x = self.min_x.min(p.lon);
        self.max_x = self.max_x.max(p.lon);
        self.min_y = self.min_y.min(p.lat);
        self.max_y = self.max_y.max(p.lat);
    }

    /// Smallest box covering both boxes.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Width of the bounding box in degrees of longitude.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Height of the bounding box in degrees of latitude.
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Center latitude.
    pub fn mid_lat(&self) -> f64 {
        (self.min_y + self.max_y) / 2.0
    }

    /// Check if this bbox intersects another. Touching edges count.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    /// Compute the intersection of two bounding boxes.
    pub fn intersection(&self, other: &BoundingBox) -> Option<BoundingBox> {
        if !self.intersects(other) {
            return None;
        }

        Some(BoundingBox {
            min_x: self.min_x.max(other.min_x),
            min_y: self.min_y.max(other.min_y),
            max_x: self.max_x.min(other.max_x),
            max_y: self.max_y.min(other.max_y),
        })
    }

    /// Check if a point is contained within this bbox.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lon >= self.min_x && lon <= self.max_x && lat >= self.min_y && lat <= self.max_y
    }

    /// `[west, south, east, north]`, the order used by tile manifests.
    pub fn to_array(&self) -> [f64; 4] {
        [self.min_x, self.min_y, self.max_x, self.max_y]
    }
}
