//! Seeded Lloyd's k-means over great-circle distance.

use geometry::great_circle_nm;
use wx_common::GeoPoint;

use crate::AirportInfo;

/// An airport that has coordinates.
#[derive(Debug, Clone, Copy)]
pub struct Located<'a> {
    pub airport: &'a AirportInfo,
    pub coord: GeoPoint,
}

impl<'a> Located<'a> {
    pub fn from_airport(airport: &'a AirportInfo) -> Option<Self> {
        airport.coord.map(|coord| Self { airport, coord })
    }
}

/// Index of the centroid closest to `p`; ties go to the lower index.
fn nearest(centroids: &[GeoPoint], p: &GeoPoint) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (i, c) in centroids.iter().enumerate() {
        let d = great_circle_nm(p, c);
        if d < best_dist {
            best_dist = d;
            best = i;
        }
    }
    best
}

/// Arithmetic mean of the given points.
pub fn mean_point<'a>(points: impl IntoIterator<Item = &'a GeoPoint>) -> Option<GeoPoint> {
    let (mut lat, mut lon, mut n) = (0.0, 0.0, 0usize);
    for p in points {
        lat += p.lat;
        lon += p.lon;
        n += 1;
    }
    (n > 0).then(|| GeoPoint::new(lat / n as f64, lon / n as f64))
}

/// Farthest-point seeding.
///
/// The first seed is the most significant airport (lowest size priority,
/// then lowest ICAO). Each next seed is the remaining airport whose
/// distance to its closest chosen seed is largest; ties keep the earlier
/// airport in (priority, ICAO) order. Returns at most `k` seeds.
pub fn seed_centroids(airports: &[Located<'_>], k: usize) -> Vec<GeoPoint> {
    let mut remaining: Vec<&Located<'_>> = airports.iter().collect();
    remaining.sort_by(|a, b| {
        (a.airport.size_priority, &a.airport.icao).cmp(&(b.airport.size_priority, &b.airport.icao))
    });

    let mut seeds = Vec::with_capacity(k);
    if k == 0 || remaining.is_empty() {
        return seeds;
    }
    seeds.push(remaining.remove(0).coord);

    while seeds.len() < k && !remaining.is_empty() {
        let mut best_idx = 0;
        let mut best_dist = f64::NEG_INFINITY;
        for (i, candidate) in remaining.iter().enumerate() {
            let d = seeds
                .iter()
                .map(|s| great_circle_nm(&candidate.coord, s))
                .fold(f64::INFINITY, f64::min);
            if d > best_dist {
                best_dist = d;
                best_idx = i;
            }
        }
        seeds.push(remaining.remove(best_idx).coord);
    }

    seeds
}

/// Cluster `points` starting from `seeds`.
///
/// Runs until the membership stops changing or `max_iterations` passes
/// have been made. Empty clusters keep their previous centroid while
/// iterating and are dropped from the result. Each returned cluster lists
/// indices into `points` in ascending order.
///
/// With no more points than seeds every point becomes its own cluster.
pub fn kmeans(points: &[GeoPoint], seeds: Vec<GeoPoint>, max_iterations: usize) -> Vec<Vec<usize>> {
    if points.is_empty() || seeds.is_empty() {
        return Vec::new();
    }
    if points.len() <= seeds.len() {
        return (0..points.len()).map(|i| vec![i]).collect();
    }

    let mut centroids = seeds;
    let mut assignment: Option<Vec<usize>> = None;

    for iteration in 0..max_iterations {
        let next: Vec<usize> = points.iter().map(|p| nearest(&centroids, p)).collect();
        if assignment.as_ref() == Some(&next) {
            tracing::trace!(iteration, "k-means converged");
            break;
        }

        for (ci, centroid) in centroids.iter_mut().enumerate() {
            let members = next
                .iter()
                .zip(points)
                .filter(|&(&a, _)| a == ci)
                .map(|(_, p)| p);
            if let Some(mean) = mean_point(members) {
                *centroid = mean;
            }
        }
        assignment = Some(next);
    }

    let assignment =
        assignment.unwrap_or_else(|| points.iter().map(|p| nearest(&centroids, p)).collect());

    let mut clusters = vec![Vec::new(); centroids.len()];
    for (i, &c) in assignment.iter().enumerate() {
        clusters[c].push(i);
    }
    clusters.retain(|c| !c.is_empty());
    clusters
}

/// For each point, the index of the nearest centroid.
///
/// Used to attach non-towered airports after clustering; the centroids are
/// not updated.
pub fn assign_non_towered(centroids: &[GeoPoint], points: &[GeoPoint]) -> Vec<usize> {
    points.iter().map(|p| nearest(centroids, p)).collect()
}
