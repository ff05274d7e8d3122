//! Containment, bounding boxes and centroids.

use wx_common::{BoundingBox, GeoPoint, Polygon};

/// Even-odd ray casting test.
///
/// A horizontal ray is cast from `pt` towards +longitude and edge crossings
/// are counted. Each edge is evaluated with its lower-latitude endpoint
/// first, so the result is bit-for-bit identical under cyclic rotation of
/// the ring and under reversal of its winding.
///
/// Points exactly on an edge or vertex have implementation-defined
/// inclusion: with the half-open latitude rule used here, bottom and left
/// edges tend to be inside and top and right edges outside. Rings with
/// fewer than 3 vertices contain nothing.
pub fn point_in_polygon(pt: &GeoPoint, ring: &Polygon) -> bool {
    let points = &ring.points;
    let n = points.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (lo, hi) = if points[i].lat <= points[j].lat {
            (&points[i], &points[j])
        } else {
            (&points[j], &points[i])
        };

        if (lo.lat > pt.lat) != (hi.lat > pt.lat) {
            let x_cross = (hi.lon - lo.lon) * (pt.lat - lo.lat) / (hi.lat - lo.lat) + lo.lon;
            if pt.lon < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }

    inside
}

/// Bounding box of a ring, `None` when empty.
pub fn bounding_box(ring: &Polygon) -> Option<BoundingBox> {
    ring.bounding_box()
}

/// Arithmetic mean of the ring's vertices.
///
/// A repeated closing vertex is ignored so closed and open rings give the
/// same answer. This is the vertex centroid, not the area centroid; it is
/// what outward buffering projects away from.
pub fn centroid(ring: &Polygon) -> Option<GeoPoint> {
    let points = open_ring(&ring.points);
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let (sum_lat, sum_lon) = points
        .iter()
        .fold((0.0, 0.0), |(la, lo), p| (la + p.lat, lo + p.lon));
    Some(GeoPoint::new(sum_lat / n, sum_lon / n))
}

/// Slice without the closing vertex, if the ring repeats its first point.
pub(crate) fn open_ring(points: &[GeoPoint]) -> &[GeoPoint] {
    match (points.first(), points.last()) {
        (Some(first), Some(last)) if points.len() > 1 && first == last => {
            &points[..points.len() - 1]
        }
        _ => points,
    }
}

/// A ring bundled with its bounding box for repeated containment tests.
///
/// Rendering tests tens of thousands of samples per tile; the bbox check
/// rejects most of them before the edge loop runs.
#[derive(Debug, Clone)]
pub struct PreparedPolygon {
    ring: Polygon,
    bbox: BoundingBox,
}

impl PreparedPolygon {
    /// Returns `None` for degenerate rings, which contain nothing.
    pub fn new(ring: Polygon) -> Option<Self> {
        if ring.is_degenerate() {
            return None;
        }
        let bbox = ring.bounding_box()?;
        Some(Self { ring, bbox })
    }

    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    pub fn ring(&self) -> &Polygon {
        &self.ring
    }

    pub fn contains(&self, pt: &GeoPoint) -> bool {
        self.bbox.contains(pt.lat, pt.lon) && point_in_polygon(pt, &self.ring)
    }
}
