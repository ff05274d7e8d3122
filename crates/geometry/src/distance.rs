//! Distance measures.

use wx_common::{GeoPoint, Polygon};

/// Mean earth radius in nautical miles.
pub const EARTH_RADIUS_NM: f64 = 3440.065;

/// Nautical miles per degree of latitude.
pub const NM_PER_DEG_LAT: f64 = 60.0;

/// Haversine great-circle distance in nautical miles.
pub fn great_circle_nm(p1: &GeoPoint, p2: &GeoPoint) -> f64 {
    let lat1 = p1.lat.to_radians();
    let lat2 = p2.lat.to_radians();
    let dlat = lat2 - lat1;
    let dlon = (p2.lon - p1.lon).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    // Rounding can push `a` a hair past 1 for antipodal points.
    let c = 2.0 * a.clamp(0.0, 1.0).sqrt().asin();
    c * EARTH_RADIUS_NM
}

/// Minimum Euclidean distance, in degrees, between any vertex of `a` and any
/// vertex of `b`.
///
/// This is an adjacency heuristic: it ignores edges entirely and is not
/// corrected for latitude, so the same nautical-mile gap spans different
/// degree distances at different latitudes. Returns `f64::INFINITY` when
/// either ring is empty.
pub fn min_vertex_distance(a: &Polygon, b: &Polygon) -> f64 {
    let mut best_sq = f64::INFINITY;
    for p in a.iter() {
        for q in b.iter() {
            let dlat = p.lat - q.lat;
            let dlon = p.lon - q.lon;
            let d_sq = dlat * dlat + dlon * dlon;
            if d_sq < best_sq {
                best_sq = d_sq;
            }
        }
    }
    best_sq.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_great_circle_zero() {
        let p = GeoPoint::new(37.6, -122.4);
        assert_eq!(great_circle_nm(&p, &p), 0.0);
    }

    #[test]
    fn test_great_circle_one_degree_latitude() {
        let a = GeoPoint::new(10.0, 20.0);
        let b = GeoPoint::new(11.0, 20.0);
        let d = great_circle_nm(&a, &b);
        // One degree of arc on a 3440.065 nm sphere.
        assert!((d - 60.04).abs() < 0.05, "got {}", d);
    }

    #[test]
    fn test_great_circle_sfo_lax() {
        let sfo = GeoPoint::new(37.6189, -122.3750);
        let lax = GeoPoint::new(33.9425, -118.4081);
        let d = great_circle_nm(&sfo, &lax);
        assert!((d - 293.0).abs() < 3.0, "got {}", d);
        assert_eq!(d, great_circle_nm(&lax, &sfo));
    }

    #[test]
    fn test_great_circle_antipodal() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(0.0, 180.0);
        let d = great_circle_nm(&a, &b);
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_NM).abs() < 1e-6);
    }

    #[test]
    fn test_min_vertex_distance() {
        let a = Polygon::from_lat_lon_pairs(&[[0.0, 0.0], [0.0, 1.0], [1.0, 1.0]]);
        let b = Polygon::from_lat_lon_pairs(&[[0.0, 1.3], [5.0, 5.0], [1.0, 1.4]]);
        let d = min_vertex_distance(&a, &b);
        assert!((d - 0.3).abs() < 1e-12);
        assert_eq!(d, min_vertex_distance(&b, &a));
    }

    #[test]
    fn test_min_vertex_distance_empty() {
        let a = Polygon::default();
        let b = Polygon::from_lat_lon_pairs(&[[0.0, 0.0]]);
        assert!(min_vertex_distance(&a, &b).is_infinite());
    }
}
