//! Merging touching boundary rings.

use geometry::{convex_hull, min_vertex_distance};
use tracing::trace;
use wx_common::Polygon;

use crate::union_find::adjacency_groups;

fn distance_matrix(polygons: &[Polygon]) -> Vec<Vec<f64>> {
    let n = polygons.len();
    let mut m = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let d = min_vertex_distance(&polygons[i], &polygons[j]);
            m[i][j] = d;
            m[j][i] = d;
        }
    }
    m
}

/// Collapse adjacent rings into convex hulls.
///
/// Rings are adjacent when `min_vertex_distance <= threshold_deg`. Each
/// connected component of two or more rings becomes the hull of all their
/// vertices; isolated rings pass through untouched. Hull vertices are a
/// subset of the component's vertices, so no output is adjacent to another.
/// Disconnected pieces are never dropped.
pub fn combine_polygons(polygons: Vec<Polygon>, threshold_deg: f64) -> Vec<Polygon> {
    if polygons.len() < 2 {
        return polygons;
    }
    let groups = adjacency_groups(&distance_matrix(&polygons), threshold_deg);
    trace!(from = polygons.len(), to = groups.len(), "merging adjacent boundaries");

    let mut slots: Vec<Option<Polygon>> = polygons.into_iter().map(Some).collect();
    groups
        .into_iter()
        .map(|group| {
            if let [only] = group.as_slice() {
                return slots[*only].take().unwrap_or_default();
            }
            let points: Vec<_> = group
                .iter()
                .filter_map(|&i| slots[i].take())
                .flat_map(|p| p.points)
                .collect();
            Polygon::new(convex_hull(&points))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wx_common::GeoPoint;

    fn square(lat: f64, lon: f64, half: f64) -> Polygon {
        Polygon::from_lat_lon_pairs(&[
            [lat - half, lon - half],
            [lat - half, lon + half],
            [lat + half, lon + half],
            [lat + half, lon - half],
        ])
    }

    #[test]
    fn test_empty_and_single() {
        assert!(combine_polygons(vec![], 0.05).is_empty());
        let one = square(0.0, 0.0, 1.0);
        assert_eq!(combine_polygons(vec![one.clone()], 0.05), vec![one]);
    }

    #[test]
    fn test_touching_pair_becomes_hull() {
        // Edges 0.01 deg apart.
        let a = square(0.0, 0.0, 0.5);
        let b = square(0.0, 1.01, 0.5);
        let merged = combine_polygons(vec![a, b], 0.05);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].len(), 4);
        assert!(merged[0].points.contains(&GeoPoint::new(-0.5, -0.5)));
        assert!(merged[0].points.contains(&GeoPoint::new(0.5, 1.51)));
    }

    #[test]
    fn test_distant_pair_unchanged() {
        let a = square(0.0, 0.0, 0.5);
        let b = square(0.0, 2.0, 0.5);
        let merged = combine_polygons(vec![a.clone(), b.clone()], 0.05);
        assert_eq!(merged, vec![a, b]);
    }

    #[test]
    fn test_chain_merges_transitively() {
        // a touches b, b touches c, a and c are far apart.
        let a = square(0.0, 0.0, 0.5);
        let b = square(0.0, 1.02, 0.5);
        let c = square(0.0, 2.04, 0.5);
        let d = square(5.0, 5.0, 0.5);
        let merged = combine_polygons(vec![a, b, c, d.clone()], 0.05);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[1], d);
        for i in 0..merged.len() {
            for j in (i + 1)..merged.len() {
                assert!(min_vertex_distance(&merged[i], &merged[j]) > 0.05);
            }
        }
    }
}
