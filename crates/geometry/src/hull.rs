//! Convex hull via Andrew's monotone chain.

use wx_common::{GeoPoint, OverlayError, OverlayResult, Polygon};

/// Z-component of (a - o) x (b - o), with longitude as x and latitude as y.
fn cross(o: &GeoPoint, a: &GeoPoint, b: &GeoPoint) -> f64 {
    (a.lon - o.lon) * (b.lat - o.lat) - (a.lat - o.lat) * (b.lon - o.lon)
}

/// Compute the convex hull of a point set.
///
/// Duplicate points are removed first. With fewer than 3 distinct points
/// the input is returned unchanged. Otherwise the hull is returned
/// counter-clockwise (in lon/lat space), open (no repeated closing vertex),
/// starting from the point with the smallest longitude (ties: smallest
/// latitude). Collinear points on the hull boundary are dropped, so an
/// entirely collinear input yields its two extreme endpoints.
pub fn convex_hull(points: &[GeoPoint]) -> Vec<GeoPoint> {
    let mut sorted: Vec<GeoPoint> = points.to_vec();
    sorted.sort_by(|a, b| a.lon.total_cmp(&b.lon).then(a.lat.total_cmp(&b.lat)));
    sorted.dedup_by(|a, b| a.key() == b.key());

    if sorted.len() < 3 {
        return points.to_vec();
    }

    let mut lower: Vec<GeoPoint> = Vec::with_capacity(sorted.len());
    for p in &sorted {
        while lower.len() >= 2 && cross(&lower[lower.len() - 2], &lower[lower.len() - 1], p) <= 0.0 {
            lower.pop();
        }
        lower.push(*p);
    }

    let mut upper: Vec<GeoPoint> = Vec::with_capacity(sorted.len());
    for p in sorted.iter().rev() {
        while upper.len() >= 2 && cross(&upper[upper.len() - 2], &upper[upper.len() - 1], p) <= 0.0 {
            upper.pop();
        }
        upper.push(*p);
    }

    // Last point of each chain is the first point of the other.
    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

/// Hull as a ring.
///
/// Fails with `DegenerateGeometry` when fewer than 3 distinct vertices
/// remain, i.e. all points coincide or lie on one line.
pub fn hull_polygon(points: &[GeoPoint]) -> OverlayResult<Polygon> {
    let hull = convex_hull(points);
    if hull.len() < 3 {
        return Err(OverlayError::DegenerateGeometry(format!(
            "hull of {} points has {} vertices",
            points.len(),
            hull.len()
        )));
    }
    Ok(Polygon::new(hull))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hull_polygon_degenerate() {
        let line = [GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 1.0), GeoPoint::new(2.0, 2.0)];
        let err = hull_polygon(&line).unwrap_err();
        assert!(matches!(err, OverlayError::DegenerateGeometry(_)));
        assert!(err.is_recoverable());

        let tri = [GeoPoint::new(0.0, 0.0), GeoPoint::new(0.0, 1.0), GeoPoint::new(1.0, 0.0)];
        assert_eq!(hull_polygon(&tri).unwrap().len(), 3);
    }

    fn pts(pairs: &[(f64, f64)]) -> Vec<GeoPoint> {
        pairs.iter().map(|&(lat, lon)| GeoPoint::new(lat, lon)).collect()
    }

    #[test]
    fn test_square_with_interior_points() {
        let input = pts(&[
            (0.0, 0.0),
            (0.0, 2.0),
            (2.0, 2.0),
            (2.0, 0.0),
            (1.0, 1.0),
            (0.5, 1.5),
        ]);
        let hull = convex_hull(&input);
        assert_eq!(hull.len(), 4);
        assert!(!hull.contains(&GeoPoint::new(1.0, 1.0)));
        assert_eq!(hull[0], GeoPoint::new(0.0, 0.0));
    }

    #[test]
    fn test_small_inputs_unchanged() {
        assert!(convex_hull(&[]).is_empty());

        let one = pts(&[(1.0, 1.0)]);
        assert_eq!(convex_hull(&one), one);

        // Three points but only two distinct.
        let two = pts(&[(1.0, 1.0), (2.0, 2.0), (1.0, 1.0)]);
        assert_eq!(convex_hull(&two), two);
    }

    #[test]
    fn test_collinear_points() {
        let input = pts(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (3.0, 3.0)]);
        let hull = convex_hull(&input);
        assert_eq!(hull, pts(&[(0.0, 0.0), (3.0, 3.0)]));
    }

    #[test]
    fn test_counter_clockwise() {
        let input = pts(&[(0.0, 0.0), (2.0, 1.0), (0.0, 2.0), (1.0, 1.0)]);
        let hull = convex_hull(&input);
        assert_eq!(hull.len(), 3);
        for i in 0..hull.len() {
            let o = &hull[i];
            let a = &hull[(i + 1) % hull.len()];
            let b = &hull[(i + 2) % hull.len()];
            assert!(cross(o, a, b) > 0.0);
        }
    }

    #[test]
    fn test_duplicates_removed() {
        let input = pts(&[(0.0, 0.0), (0.0, 0.0), (0.0, 4.0), (4.0, 0.0), (4.0, 0.0)]);
        let hull = convex_hull(&input);
        assert_eq!(hull.len(), 3);
    }
}
