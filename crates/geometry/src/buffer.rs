//! Outward buffering and circle synthesis in approximate nautical miles.
//!
//! Distances are converted to degrees with 1 degree of latitude = 60 nm and
//! longitude degrees scaled by cos(latitude).

use std::f64::consts::PI;

use wx_common::{GeoPoint, Polygon};

use crate::distance::NM_PER_DEG_LAT;
use crate::polygon::{centroid, open_ring};

/// Vertices used for the octagon around a single point.
const OCTAGON_POINTS: usize = 8;

/// Segments in each rounded end cap of a two-point buffer.
const CAP_SEGMENTS: usize = 4;

/// Floor for cos(lat) so polar inputs do not divide by zero.
const MIN_COS_LAT: f64 = 1e-6;

fn cos_lat(lat: f64) -> f64 {
    lat.to_radians().cos().max(MIN_COS_LAT)
}

/// Offset `origin` by `(east_nm, north_nm)`.
fn offset_nm(origin: &GeoPoint, east_nm: f64, north_nm: f64) -> GeoPoint {
    GeoPoint::new(
        origin.lat + north_nm / NM_PER_DEG_LAT,
        origin.lon + east_nm / (NM_PER_DEG_LAT * cos_lat(origin.lat)),
    )
}

/// A `num_points`-vertex circle of radius `radius_nm` around `center`.
///
/// The ring is open (the first vertex is not repeated) and starts due east,
/// proceeding counter-clockwise.
pub fn circle_polygon(center: &GeoPoint, radius_nm: f64, num_points: usize) -> Polygon {
    let radius_lat = radius_nm / NM_PER_DEG_LAT;
    let radius_lon = radius_nm / (NM_PER_DEG_LAT * cos_lat(center.lat));

    let points = (0..num_points)
        .map(|i| {
            let angle = 2.0 * PI * i as f64 / num_points as f64;
            GeoPoint::new(
                center.lat + radius_lat * angle.sin(),
                center.lon + radius_lon * angle.cos(),
            )
        })
        .collect();

    Polygon::new(points)
}

/// Push every vertex of `polygon` away from its centroid by `nm`.
///
/// Small inputs are handled explicitly instead of failing:
/// - empty input returns an empty ring
/// - one distinct point becomes an octagon of radius `nm`
/// - two distinct points become a rounded rectangle (a capsule) `nm` wide
///   on every side of the segment
///
/// For 3+ points the buffer is only truly outward for star-shaped rings
/// around the centroid, which holds for the convex hulls it is applied to.
pub fn buffer_outward(polygon: &Polygon, nm: f64) -> Polygon {
    let points = open_ring(&polygon.points);

    let mut distinct: Vec<GeoPoint> = Vec::with_capacity(points.len());
    for p in points {
        if !distinct.iter().any(|d| d.key() == p.key()) {
            distinct.push(*p);
        }
        if distinct.len() >= 3 {
            break;
        }
    }

    match distinct.len() {
        0 => Polygon::default(),
        1 => circle_polygon(&distinct[0], nm, OCTAGON_POINTS),
        2 => capsule(&distinct[0], &distinct[1], nm),
        _ => {
            let Some(center) = centroid(polygon) else {
                return Polygon::default();
            };
            // One longitude scale for the whole ring keeps every moved
            // vertex on its ray from the centroid.
            let ref_cos = cos_lat(center.lat);
            let moved = points
                .iter()
                .map(|p| {
                    let north = (p.lat - center.lat) * NM_PER_DEG_LAT;
                    let east = (p.lon - center.lon) * NM_PER_DEG_LAT * ref_cos;
                    let len = (north * north + east * east).sqrt();
                    if len == 0.0 {
                        return *p;
                    }
                    GeoPoint::new(
                        p.lat + north / len * nm / NM_PER_DEG_LAT,
                        p.lon + east / len * nm / (NM_PER_DEG_LAT * ref_cos),
                    )
                })
                .collect();
            Polygon::new(moved)
        }
    }
}

/// Rounded rectangle around the segment `a`-`b`.
fn capsule(a: &GeoPoint, b: &GeoPoint, nm: f64) -> Polygon {
    let ref_cos = cos_lat((a.lat + b.lat) / 2.0);
    let east = (b.lon - a.lon) * NM_PER_DEG_LAT * ref_cos;
    let north = (b.lat - a.lat) * NM_PER_DEG_LAT;
    let heading = north.atan2(east);

    let mut points = Vec::with_capacity(2 * (CAP_SEGMENTS + 1));

    // Half circle around `b`, from the right-hand side through the tip.
    for i in 0..=CAP_SEGMENTS {
        let angle = heading - PI / 2.0 + PI * i as f64 / CAP_SEGMENTS as f64;
        points.push(offset_nm(b, nm * angle.cos(), nm * angle.sin()));
    }
    // Half circle around `a`, continuing from the left-hand side.
    for i in 0..=CAP_SEGMENTS {
        let angle = heading + PI / 2.0 + PI * i as f64 / CAP_SEGMENTS as f64;
        points.push(offset_nm(a, nm * angle.cos(), nm * angle.sin()));
    }

    Polygon::new(points)
}
