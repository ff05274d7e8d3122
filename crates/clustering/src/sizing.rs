//! Choosing the number of clusters.

use geometry::great_circle_nm;
use wx_common::{BoundingBox, GeoPoint};

/// Extent assumed when fewer than two airports are located.
pub const DEFAULT_EXTENT_NM: f64 = 50.0;

/// Great-circle length of the diagonal of the points' bounding box, in nm.
pub fn grouping_extent_nm(coords: &[GeoPoint]) -> f64 {
    if coords.len() < 2 {
        return DEFAULT_EXTENT_NM;
    }
    match BoundingBox::from_points(coords) {
        Some(bbox) => great_circle_nm(
            &GeoPoint::new(bbox.min_y, bbox.min_x),
            &GeoPoint::new(bbox.max_y, bbox.max_x),
        ),
        None => DEFAULT_EXTENT_NM,
    }
}

/// Number of clusters for `num_towered` towered airports spread over
/// `extent_nm`.
///
/// | towered | k |
/// |---------|---|
/// | <= 1    | 1 |
/// | <= 3    | min(n, 2) |
/// | <= 6    | min(n, 3) |
/// | <= 12   | 3 / 4 / 5 for extent < 200 / < 500 / >= 500 nm |
/// | > 12    | 4 / 5 / 6 / 8 for extent < 200 / < 500 / < 1000 / >= 1000 nm |
pub fn optimal_k(num_towered: usize, extent_nm: f64) -> usize {
    match num_towered {
        0 | 1 => 1,
        2..=3 => num_towered.min(2),
        4..=6 => num_towered.min(3),
        7..=12 => {
            if extent_nm < 200.0 {
                3
            } else if extent_nm < 500.0 {
                4
            } else {
                5
            }
        }
        _ => {
            if extent_nm < 200.0 {
                4
            } else if extent_nm < 500.0 {
                5
            } else if extent_nm < 1000.0 {
                6
            } else {
                8
            }
        }
    }
}
