//! Upstream snapshot loading.
//!
//! Both inputs are JSON objects keyed by ICAO. Output is ordered by ICAO
//! so every later stage sees the same input order on every run.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use clustering::{AirportInfo, SizePriority};
use serde::Deserialize;
use tracing::{debug, info, warn};
use wx_common::{FlightCategory, GeoPoint, OverlayError, OverlayResult, WeatherPoint};

/// One entry of the weather snapshot.
#[derive(Debug, Clone, Deserialize)]
pub struct WeatherRecord {
    pub lat: f64,
    pub lon: f64,
    #[serde(default, alias = "flight_category")]
    pub category: Option<String>,
}

/// One entry of the airport table.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AirportRecord {
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub tower_type: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub has_atis: bool,
}

impl AirportRecord {
    pub fn coord(&self) -> Option<GeoPoint> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)).filter(GeoPoint::is_valid),
            _ => None,
        }
    }
}

pub type AirportTable = BTreeMap<String, AirportRecord>;

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path, what: &str) -> OverlayResult<T> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| OverlayError::missing_data(what, format!("{}: {}", path.display(), e)))?;
    serde_json::from_str(&text).map_err(|e| OverlayError::Json(format!("{}: {}", path.display(), e)))
}

/// Parse a weather snapshot. Missing or unrecognised categories become
/// [`FlightCategory::Unknown`]; entries with out-of-range coordinates are
/// dropped.
pub fn parse_weather(snapshot: BTreeMap<String, WeatherRecord>) -> Vec<WeatherPoint> {
    let mut points = Vec::with_capacity(snapshot.len());
    for (icao, record) in snapshot {
        let coord = match GeoPoint::checked(record.lat, record.lon) {
            Ok(coord) => coord,
            Err(e) => {
                debug!(icao = %icao, error = %e, "dropping weather point");
                continue;
            }
        };
        let category = record
            .category
            .as_deref()
            .map(FlightCategory::parse_lenient)
            .unwrap_or(FlightCategory::Unknown);
        points.push(WeatherPoint::new(icao.trim().to_uppercase(), coord, category));
    }
    points
}

pub fn load_weather(path: &Path) -> OverlayResult<Vec<WeatherPoint>> {
    let points = parse_weather(read_json(path, "weather snapshot")?);
    let known = points.iter().filter(|p| p.category.is_known()).count();
    info!(path = %path.display(), points = points.len(), known, "loaded weather snapshot");
    Ok(points)
}

pub fn load_airports(path: &Path) -> OverlayResult<AirportTable> {
    let raw: AirportTable = read_json(path, "airport table")?;
    let table: AirportTable = raw.into_iter().map(|(k, v)| (k.trim().to_uppercase(), v)).collect();
    info!(path = %path.display(), airports = table.len(), "loaded airport table");
    Ok(table)
}

/// Clustering input: one entry per weather point with a known category,
/// enriched from the airport table when the ICAO is listed there.
pub fn airport_infos(weather: &[WeatherPoint], table: &AirportTable) -> Vec<AirportInfo> {
    let mut infos = Vec::new();
    let mut unlisted = 0;
    for point in weather.iter().filter(|p| p.category.is_known()) {
        let mut info = AirportInfo::new(point.icao.clone(), point.category).with_coord(point.coord);
        match table.get(&point.icao) {
            Some(record) => {
                info = info
                    .with_priority(SizePriority::from_tower_type(&record.tower_type))
                    .with_atis(record.has_atis)
                    .with_location(record.city.clone(), record.state.clone());
            }
            None => unlisted += 1,
        }
        infos.push(info);
    }
    if unlisted > 0 {
        warn!(unlisted, "weather points missing from the airport table");
    }
    infos
}

/// ICAO → location for boundary fallbacks, table entries first and
/// weather coordinates filling the gaps.
pub fn airport_coords(weather: &[WeatherPoint], table: &AirportTable) -> HashMap<String, GeoPoint> {
    let mut coords: HashMap<String, GeoPoint> = weather.iter().map(|p| (p.icao.clone(), p.coord)).collect();
    for (icao, record) in table {
        if let Some(coord) = record.coord() {
            coords.insert(icao.clone(), coord);
        }
    }
    coords
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(json: &str) -> BTreeMap<String, WeatherRecord> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_parse_weather() {
        let points = parse_weather(snapshot(
            r#"{
                "KSFO": {"lat": 37.62, "lon": -122.38, "category": "VFR"},
                "koak": {"lat": 37.72, "lon": -122.22, "flight_category": "ifr"},
                "KXXX": {"lat": 37.0, "lon": -122.0},
                "KBAD": {"lat": 137.0, "lon": -122.0, "category": "VFR"}
            }"#,
        ));
        assert_eq!(points.len(), 3);
        let by_icao: HashMap<_, _> = points.iter().map(|p| (p.icao.as_str(), p.category)).collect();
        assert_eq!(by_icao["KSFO"], FlightCategory::Vfr);
        assert_eq!(by_icao["KOAK"], FlightCategory::Ifr);
        assert_eq!(by_icao["KXXX"], FlightCategory::Unknown);
    }

    #[test]
    fn test_airport_infos_enrich_and_skip_unknown() {
        let weather = parse_weather(snapshot(
            r#"{
                "KSFO": {"lat": 37.62, "lon": -122.38, "category": "VFR"},
                "KHAF": {"lat": 37.51, "lon": -122.50, "category": "MVFR"},
                "KXXX": {"lat": 37.0, "lon": -122.0}
            }"#,
        ));
        let table: AirportTable = serde_json::from_str(
            r#"{"KSFO": {"tower_type": "ATCT-TRACON", "city": "San Francisco", "state": "CA", "has_atis": true}}"#,
        )
        .unwrap();

        let infos = airport_infos(&weather, &table);
        assert_eq!(infos.len(), 2);
        let sfo = infos.iter().find(|i| i.icao == "KSFO").unwrap();
        assert_eq!(sfo.size_priority, SizePriority::from_tower_type("ATCT-TRACON"));
        assert!(sfo.has_atis);
        assert_eq!(sfo.city, "San Francisco");
        let haf = infos.iter().find(|i| i.icao == "KHAF").unwrap();
        assert!(!haf.is_towered());
    }

    #[test]
    fn test_airport_coords_prefer_table() {
        let weather = vec![WeatherPoint::new("KSFO", GeoPoint::new(37.0, -122.0), FlightCategory::Vfr)];
        let table: AirportTable =
            serde_json::from_str(r#"{"KSFO": {"lat": 37.62, "lon": -122.38}, "KKIX": {"lat": 36.0, "lon": -86.0}, "KNOP": {}}"#)
                .unwrap();
        let coords = airport_coords(&weather, &table);
        assert_eq!(coords["KSFO"], GeoPoint::new(37.62, -122.38));
        assert_eq!(coords["KKIX"], GeoPoint::new(36.0, -86.0));
        assert!(!coords.contains_key("KNOP"));
    }

    #[test]
    fn test_missing_file_is_missing_data() {
        let err = load_weather(Path::new("/nonexistent/weather.json")).unwrap_err();
        assert!(matches!(err, OverlayError::MissingData { .. }));
        assert!(err.is_recoverable());
    }
}
