//! Common test fixtures for wx-overlay tests.
//!
//! Rings and airports here are small and hand-checkable; coordinates are
//! close to the real fields so distances behave plausibly.

use std::path::{Path, PathBuf};

use serde_json::{json, Value};
use wx_common::{FlightCategory, GeoPoint, Polygon, WeatherPoint};

/// Common bounding boxes as (min_lon, min_lat, max_lon, max_lat).
pub mod bbox {
    /// Contiguous United States.
    pub const CONUS: (f64, f64, f64, f64) = (-125.0, 24.0, -66.0, 50.0);

    /// San Francisco Bay Area.
    pub const BAY_AREA: (f64, f64, f64, f64) = (-123.0, 37.0, -121.5, 38.5);

    /// A small square used by raster tests (about one zoom-8 tile).
    pub const SMALL_TILE: (f64, f64, f64, f64) = (-100.0, 40.0, -99.0, 41.0);
}

/// Round to 1e-9 degrees so corners print as short decimals and survive
/// a JSON round trip exactly.
fn snap(v: f64) -> f64 {
    (v * 1e9).round() / 1e9
}

/// Axis-aligned square ring centred on (lat, lon), as `[lat, lon]` pairs.
pub fn square_pairs(lat: f64, lon: f64, half: f64) -> Vec<[f64; 2]> {
    vec![
        [snap(lat - half), snap(lon - half)],
        [snap(lat - half), snap(lon + half)],
        [snap(lat + half), snap(lon + half)],
        [snap(lat + half), snap(lon - half)],
    ]
}

/// Axis-aligned square ring centred on (lat, lon).
pub fn square(lat: f64, lon: f64, half: f64) -> Polygon {
    Polygon::from_lat_lon_pairs(&square_pairs(lat, lon, half))
}

/// Square with corners (0,0) and (10,10).
pub fn unit_square() -> Polygon {
    Polygon::from_lat_lon_pairs(&[[0.0, 0.0], [0.0, 10.0], [10.0, 10.0], [10.0, 0.0]])
}

/// Right triangle with legs along the axes.
pub fn triangle() -> Polygon {
    Polygon::from_lat_lon_pairs(&[[0.0, 0.0], [0.0, 4.0], [4.0, 0.0]])
}

/// An airport record as an upstream table would supply it.
#[derive(Debug, Clone, Copy)]
pub struct AirportFixture {
    pub icao: &'static str,
    pub lat: f64,
    pub lon: f64,
    pub category: FlightCategory,
    pub tower_type: &'static str,
    pub city: &'static str,
    pub state: &'static str,
}

impl AirportFixture {
    pub fn coord(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }

    pub fn weather_point(&self) -> WeatherPoint {
        WeatherPoint::new(self.icao, self.coord(), self.category)
    }
}

const fn airport(
    icao: &'static str,
    lat: f64,
    lon: f64,
    category: FlightCategory,
    tower_type: &'static str,
    city: &'static str,
    state: &'static str,
) -> AirportFixture {
    AirportFixture {
        icao,
        lat,
        lon,
        category,
        tower_type,
        city,
        state,
    }
}

/// Three Bay Area fields with distinct categories.
pub const BAY_AREA_AIRPORTS: [AirportFixture; 3] = [
    airport("KSFO", 37.6, -122.4, FlightCategory::Vfr, "ATCT-TRACON", "San Francisco", "CA"),
    airport("KOAK", 37.7, -122.2, FlightCategory::Ifr, "ATCT-A/C", "Oakland", "CA"),
    airport("KCCR", 37.8, -122.1, FlightCategory::Mvfr, "ATCT", "Concord", "CA"),
];

/// Bay Area plus Los Angeles fields, with one non-towered field in each.
pub const TWO_REGION_AIRPORTS: [AirportFixture; 8] = [
    airport("KSFO", 37.62, -122.38, FlightCategory::Vfr, "ATCT-TRACON", "San Francisco", "CA"),
    airport("KOAK", 37.72, -122.22, FlightCategory::Ifr, "ATCT-A/C", "Oakland", "CA"),
    airport("KSJC", 37.36, -121.93, FlightCategory::Vfr, "ATCT", "San Jose", "CA"),
    airport("KLAX", 33.94, -118.41, FlightCategory::Mvfr, "ATCT-TRACON", "Los Angeles", "CA"),
    airport("KBUR", 34.20, -118.36, FlightCategory::Vfr, "ATCT", "Burbank", "CA"),
    airport("KSNA", 33.68, -117.87, FlightCategory::Lifr, "ATCT-A/C", "Santa Ana", "CA"),
    airport("KHAF", 37.51, -122.50, FlightCategory::Vfr, "NON-ATCT", "Half Moon Bay", "CA"),
    airport("KWHP", 34.26, -118.41, FlightCategory::Ifr, "NON-ATCT", "Los Angeles", "CA"),
];

/// Weather points for [`BAY_AREA_AIRPORTS`].
pub fn bay_area_weather() -> Vec<WeatherPoint> {
    BAY_AREA_AIRPORTS.iter().map(|a| a.weather_point()).collect()
}

fn boundary_entry(name: &str, pairs: Vec<[f64; 2]>) -> Value {
    json!({ "coordinates": pairs, "name": name })
}

/// NCT facility archive.
///
/// - `SMF` and `RNO` are far apart (never adjacent)
/// - `OAK` and `MOD` touch within 0.01 degrees
/// - `SFO_DEP` exists next to `SFO`
/// - `NCT` is the facility's own top-level boundary
pub fn nct_archive_json() -> Value {
    let mut mod_ring = square_pairs(37.6, -121.0, 0.3);
    // Pull one vertex to within 0.01 deg of OAK's north-east corner (37.9, -121.9).
    mod_ring[3] = [37.9, -121.89];

    json!({
        "SMF": boundary_entry("Sacramento", square_pairs(38.7, -121.6, 0.3)),
        "RNO": boundary_entry("Reno", square_pairs(39.5, -119.8, 0.3)),
        "SFO": boundary_entry("San Francisco", square_pairs(37.6, -122.4, 0.2)),
        "SFO_DEP": boundary_entry("San Francisco Departure", square_pairs(37.5, -122.5, 0.25)),
        "OAK": boundary_entry("Oakland", square_pairs(37.7, -122.1, 0.2)),
        "MOD": boundary_entry("Modesto", mod_ring),
        "NCT": boundary_entry("NorCal", square_pairs(38.0, -121.5, 1.5)),
    })
}


/// Grouping presets matching [`nct_archive_json`].
pub fn nct_groupings_json() -> Value {
    json!({
        "NCT C": {
            "airports": ["KOAK", "KMOD"],
            "position_prefixes": ["OAK", "MOD"],
            "position_suffixes": ["APP"],
            "facility_id": "NCT"
        },
        "NCT D": {
            "airports": ["KSFO", "KSQL"],
            "position_prefixes": ["SFO"],
            "position_suffixes": ["DEP"],
            "facility_id": "NCT"
        },
        "NCT E": {
            "airports": ["KSMF", "KSAC"],
            "position_prefixes": ["SMF"],
            "position_suffixes": ["APP"],
            "facility_id": "NCT"
        },
        "NCT R": {
            "airports": ["KRNO", "KRTS"],
            "position_prefixes": ["RNO"],
            "position_suffixes": ["APP"],
            "facility_id": "NCT"
        },
        "NCT Combined": {
            "airports": ["KSFO", "KOAK", "KSMF"],
            "facility_id": "NCT"
        },
        "O90 SFO": {
            "airports": ["KSFO", "KOAK"],
            "position_prefixes": ["SFO"],
            "facility_id": "O90"
        },
        "Bay Legacy": ["KSFO", "KOAK"],
        "Lone Field": ["KXYZ"],
        "KSFO Tower": ["KSFO"]
    })
}

/// Write `value` to `dir/name` as pretty JSON and return the path.
pub fn write_json(dir: &Path, name: &str, value: &Value) -> PathBuf {
    let path = dir.join(name);
    let text = serde_json::to_string_pretty(value).expect("fixture serializes");
    std::fs::write(&path, text).expect("fixture written");
    path
}

/// Write `NCT.json` into `dir`.
pub fn write_nct_archive(dir: &Path) -> PathBuf {
    write_json(dir, "NCT.json", &nct_archive_json())
}

/// Write `nct_groupings.json` into `dir`.
pub fn write_nct_groupings(dir: &Path) -> PathBuf {
    write_json(dir, "nct_groupings.json", &nct_groupings_json())
}
