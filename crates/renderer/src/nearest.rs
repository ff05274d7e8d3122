//! Nearest in-range weather lookup shared by the tile and grid renderers.
//!
//! Distance is Euclidean in degrees with longitude scaled by
//! cos(reference latitude), so validity regions are roughly circular on
//! the ground instead of stretched east-west. Points are bucketed into
//! square cells one radius wide; a query only scans the 3x3 block of
//! cells around it, which is exact because nothing further away can be
//! in range.

use std::collections::HashMap;

use tracing::debug;
use wx_common::{FlightCategory, GeoPoint, WeatherPoint};

/// Default validity radius in degrees.
pub const DEFAULT_VALIDITY_RADIUS_DEG: f64 = 0.7;

#[derive(Debug, Clone)]
struct Entry {
    lat: f64,
    /// Longitude pre-scaled by cos(reference latitude).
    x: f64,
    category: FlightCategory,
}

type CellKey = (i64, i64);

/// Weather points of known category, indexed for nearest-neighbour queries.
#[derive(Debug, Clone)]
pub struct WeatherIndex {
    entries: Vec<Entry>,
    cells: HashMap<CellKey, Vec<usize>>,
    reference_lat: f64,
    cos_ref: f64,
    radius_deg: f64,
    cell_size: f64,
}

impl WeatherIndex {
    /// Index `points`, skipping `Unknown` categories and invalid coordinates.
    pub fn new(points: &[WeatherPoint], reference_lat: f64, radius_deg: f64) -> Self {
        let cos_ref = reference_lat.to_radians().cos().max(1e-6);
        let cell_size = radius_deg.max(1e-6);

        let entries: Vec<Entry> = points
            .iter()
            .filter(|p| p.category.is_known() && p.coord.is_valid())
            .map(|p| Entry {
                lat: p.coord.lat,
                x: p.coord.lon * cos_ref,
                category: p.category,
            })
            .collect();

        let mut cells: HashMap<CellKey, Vec<usize>> = HashMap::new();
        for (i, e) in entries.iter().enumerate() {
            cells.entry(cell_key(e.lat, e.x, cell_size)).or_default().push(i);
        }

        debug!(
            points = entries.len(),
            skipped = points.len() - entries.len(),
            reference_lat,
            "built weather index"
        );

        Self {
            entries,
            cells,
            reference_lat,
            cos_ref,
            radius_deg,
            cell_size,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn reference_lat(&self) -> f64 {
        self.reference_lat
    }

    pub fn radius_deg(&self) -> f64 {
        self.radius_deg
    }

    /// Category of the nearest point within the validity radius.
    ///
    /// Equidistant points resolve to the one that came first in the input.
    pub fn nearest(&self, pt: &GeoPoint) -> Option<FlightCategory> {
        let x = pt.lon * self.cos_ref;
        let (row, col) = cell_key(pt.lat, x, self.cell_size);

        let mut best: Option<(f64, usize)> = None;
        for dr in -1..=1 {
            for dc in -1..=1 {
                let Some(bucket) = self.cells.get(&(row + dr, col + dc)) else {
                    continue;
                };
                for &i in bucket {
                    let d = self.distance_sq(i, pt.lat, x);
                    if best.map_or(true, |(bd, bi)| d < bd || (d == bd && i < bi)) {
                        best = Some((d, i));
                    }
                }
            }
        }
        self.in_range(best)
    }

    /// Same result as [`WeatherIndex::nearest`] by scanning every point.
    pub fn nearest_by_scan(&self, pt: &GeoPoint) -> Option<FlightCategory> {
        let x = pt.lon * self.cos_ref;
        let mut best: Option<(f64, usize)> = None;
        for i in 0..self.entries.len() {
            let d = self.distance_sq(i, pt.lat, x);
            if best.map_or(true, |(bd, _)| d < bd) {
                best = Some((d, i));
            }
        }
        self.in_range(best)
    }

    fn distance_sq(&self, i: usize, lat: f64, x: f64) -> f64 {
        let e = &self.entries[i];
        let dlat = e.lat - lat;
        let dx = e.x - x;
        dlat * dlat + dx * dx
    }

    fn in_range(&self, best: Option<(f64, usize)>) -> Option<FlightCategory> {
        let (d, i) = best?;
        (d <= self.radius_deg * self.radius_deg).then(|| self.entries[i].category)
    }
}

fn cell_key(lat: f64, x: f64, size: f64) -> CellKey {
    ((lat / size).floor() as i64, (x / size).floor() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wp(icao: &str, lat: f64, lon: f64, category: FlightCategory) -> WeatherPoint {
        WeatherPoint::new(icao, GeoPoint::new(lat, lon), category)
    }

    #[test]
    fn test_nearest_within_radius() {
        let index = WeatherIndex::new(
            &[
                wp("KAAA", 40.0, -100.0, FlightCategory::Ifr),
                wp("KBBB", 40.0, -99.0, FlightCategory::Vfr),
            ],
            40.0,
            0.7,
        );
        assert_eq!(index.nearest(&GeoPoint::new(40.0, -99.9)), Some(FlightCategory::Ifr));
        assert_eq!(index.nearest(&GeoPoint::new(40.0, -99.1)), Some(FlightCategory::Vfr));
        assert_eq!(index.nearest(&GeoPoint::new(45.0, -99.5)), None);
    }

    #[test]
    fn test_cos_correction_extends_east_west() {
        // At 60N one degree of longitude scales to half a degree.
        let index = WeatherIndex::new(&[wp("K1", 60.0, 0.0, FlightCategory::Mvfr)], 60.0, 0.7);
        assert_eq!(index.nearest(&GeoPoint::new(60.0, 1.3)), Some(FlightCategory::Mvfr));
        assert_eq!(index.nearest(&GeoPoint::new(60.8, 0.0)), None);
    }

    #[test]
    fn test_unknown_points_skipped() {
        let index = WeatherIndex::new(
            &[
                wp("KUNK", 40.0, -100.0, FlightCategory::Unknown),
                wp("KFAR", 40.0, -99.5, FlightCategory::Lifr),
            ],
            40.0,
            0.7,
        );
        assert_eq!(index.len(), 1);
        assert_eq!(index.nearest(&GeoPoint::new(40.0, -100.0)), Some(FlightCategory::Lifr));
    }

    #[test]
    fn test_tie_goes_to_first_point() {
        let index = WeatherIndex::new(
            &[
                wp("KW", 40.0, -100.5, FlightCategory::Ifr),
                wp("KE", 40.0, -99.5, FlightCategory::Vfr),
            ],
            0.0,
            0.7,
        );
        let mid = GeoPoint::new(40.0, -100.0);
        assert_eq!(index.nearest(&mid), Some(FlightCategory::Ifr));
        assert_eq!(index.nearest_by_scan(&mid), Some(FlightCategory::Ifr));
    }

    #[test]
    fn test_empty_index() {
        let index = WeatherIndex::new(&[], 40.0, 0.7);
        assert!(index.is_empty());
        assert_eq!(index.nearest(&GeoPoint::new(40.0, -100.0)), None);
    }
}
