//! GeoJSON types for the vector outputs.
//!
//! Only what the overlay emits is modelled: Polygon and MultiPolygon
//! features with free-form properties. Coordinates are `[lon, lat]`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use wx_common::Polygon;

/// A GeoJSON FeatureCollection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureCollection {
    /// Always `"FeatureCollection"`.
    #[serde(rename = "type")]
    pub type_: String,

    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new() -> Self {
        Self {
            type_: "FeatureCollection".to_string(),
            features: Vec::new(),
        }
    }

    pub fn with_features(mut self, features: Vec<Feature>) -> Self {
        self.features.extend(features);
        self
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl Default for FeatureCollection {
    fn default() -> Self {
        Self::new()
    }
}

/// A GeoJSON Feature.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Feature {
    /// Always `"Feature"`.
    #[serde(rename = "type")]
    pub type_: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub geometry: Geometry,

    /// Sorted so serialized output is stable.
    pub properties: BTreeMap<String, Value>,
}

impl Feature {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            type_: "Feature".to_string(),
            id: None,
            geometry,
            properties: BTreeMap::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

/// Supported geometry types.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Geometry {
    /// Exterior ring first; each ring closed.
    Polygon { coordinates: Vec<Vec<[f64; 2]>> },

    MultiPolygon { coordinates: Vec<Vec<Vec<[f64; 2]>>> },
}

impl Geometry {
    /// Axis-aligned rectangle, closed, counter-clockwise from the south-west.
    pub fn rectangle(west: f64, south: f64, east: f64, north: f64) -> Self {
        Geometry::Polygon {
            coordinates: vec![vec![
                [west, south],
                [east, south],
                [east, north],
                [west, north],
                [west, south],
            ]],
        }
    }

    /// Single-ring polygon from a lat/lon ring.
    pub fn from_ring(ring: &Polygon) -> Self {
        Geometry::Polygon {
            coordinates: vec![closed_lon_lat(ring)],
        }
    }

    /// One polygon per ring.
    pub fn from_rings(rings: &[Polygon]) -> Self {
        Geometry::MultiPolygon {
            coordinates: rings.iter().map(|r| vec![closed_lon_lat(r)]).collect(),
        }
    }
}

/// `[lon, lat]` positions with the first repeated at the end.
fn closed_lon_lat(ring: &Polygon) -> Vec<[f64; 2]> {
    let mut coords: Vec<[f64; 2]> = ring.iter().map(|p| p.to_lon_lat()).collect();
    if let (Some(&first), Some(&last)) = (coords.first(), coords.last()) {
        if first != last {
            coords.push(first);
        }
    }
    coords
}
