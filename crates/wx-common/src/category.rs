//! Flight categories and per-airport weather points.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::GeoPoint;

/// Coarse ceiling/visibility classification.
///
/// Variants are declared from most to least restrictive, so the derived
/// ordering sorts by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FlightCategory {
    Lifr,
    Ifr,
    Mvfr,
    Vfr,
    #[serde(alias = "UNK")]
    Unknown,
}

impl FlightCategory {
    /// The four categories that are clustered and rendered.
    pub const KNOWN: [FlightCategory; 4] = [
        FlightCategory::Lifr,
        FlightCategory::Ifr,
        FlightCategory::Mvfr,
        FlightCategory::Vfr,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FlightCategory::Lifr => "LIFR",
            FlightCategory::Ifr => "IFR",
            FlightCategory::Mvfr => "MVFR",
            FlightCategory::Vfr => "VFR",
            FlightCategory::Unknown => "UNKNOWN",
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, FlightCategory::Unknown)
    }

    /// Parse leniently: anything unrecognised is `Unknown`.
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or(FlightCategory::Unknown)
    }
}

impl fmt::Display for FlightCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlightCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "LIFR" => Ok(FlightCategory::Lifr),
            "IFR" => Ok(FlightCategory::Ifr),
            "MVFR" => Ok(FlightCategory::Mvfr),
            "VFR" => Ok(FlightCategory::Vfr),
            "UNK" | "UNKNOWN" => Ok(FlightCategory::Unknown),
            other => Err(format!("unknown flight category: {}", other)),
        }
    }
}

/// One airport's weather for the current run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherPoint {
    pub icao: String,
    pub coord: GeoPoint,
    pub category: FlightCategory,
}

impl WeatherPoint {
    pub fn new(icao: impl Into<String>, coord: GeoPoint, category: FlightCategory) -> Self {
        Self {
            icao: icao.into(),
            coord,
            category,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_categories() {
        assert_eq!("lifr".parse::<FlightCategory>(), Ok(FlightCategory::Lifr));
        assert_eq!(" VFR ".parse::<FlightCategory>(), Ok(FlightCategory::Vfr));
        assert_eq!("UNK".parse::<FlightCategory>(), Ok(FlightCategory::Unknown));
        assert!("SVFR".parse::<FlightCategory>().is_err());
        assert_eq!(FlightCategory::parse_lenient("SVFR"), FlightCategory::Unknown);
    }

    #[test]
    fn test_severity_order() {
        let mut cats = vec![FlightCategory::Vfr, FlightCategory::Lifr, FlightCategory::Mvfr];
        cats.sort();
        assert_eq!(
            cats,
            vec![FlightCategory::Lifr, FlightCategory::Mvfr, FlightCategory::Vfr]
        );
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&FlightCategory::Mvfr).unwrap();
        assert_eq!(json, "\"MVFR\"");
        let unk: FlightCategory = serde_json::from_str("\"UNK\"").unwrap();
        assert_eq!(unk, FlightCategory::Unknown);
    }
}
