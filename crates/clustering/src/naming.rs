//! Human-readable area names.

use crate::AirportInfo;

const CITY_SUFFIXES: [&str; 4] = [" area", " metro", " metropolitan", " region"];

/// Lower-cased city with trailing area-like words removed, for comparison.
pub(crate) fn normalize_city(city: &str) -> String {
    let mut normalized = city.trim().to_lowercase();
    for suffix in CITY_SUFFIXES {
        if let Some(stripped) = normalized.strip_suffix(suffix) {
            normalized = stripped.trim().to_string();
        }
    }
    normalized
}

/// Name a cluster from its leading members' cities.
///
/// Cities are de-duplicated after normalization; a member without a city
/// contributes its ICAO.
/// - one city: `"{City} Area"`
/// - two: `"{A} / {B} Area"`
/// - more: `"{A} / {B}+ Area"`
pub fn area_name(centers: &[&AirportInfo]) -> String {
    let mut cities: Vec<&str> = Vec::new();
    let mut seen: Vec<String> = Vec::new();

    for airport in centers {
        let city = match airport.city.trim() {
            "" => airport.icao.as_str(),
            city => city,
        };
        let key = normalize_city(city);
        if !seen.contains(&key) {
            seen.push(key);
            cities.push(city);
        }
    }

    match cities.as_slice() {
        [] => "Unknown Area".to_string(),
        [one] => format!("{} Area", one),
        [a, b] => format!("{} / {} Area", a, b),
        [a, b, ..] => format!("{} / {}+ Area", a, b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wx_common::FlightCategory;

    fn at(icao: &str, city: &str) -> AirportInfo {
        AirportInfo::new(icao, FlightCategory::Vfr).with_location(city, "CA")
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize_city(" Sacramento Metro "), "sacramento");
        assert_eq!(normalize_city("Bay Area"), "bay");
        assert_eq!(normalize_city("Reno"), "reno");
    }

    #[test]
    fn test_single_city_deduplicated() {
        let a = at("KSMF", "Sacramento");
        let b = at("KSAC", "Sacramento Metro");
        assert_eq!(area_name(&[&a, &b]), "Sacramento Area");
    }

    #[test]
    fn test_two_and_three_cities() {
        let a = at("KSFO", "San Francisco");
        let b = at("KOAK", "Oakland");
        let c = at("KSJC", "San Jose");
        assert_eq!(area_name(&[&a, &b]), "San Francisco / Oakland Area");
        assert_eq!(area_name(&[&a, &b, &c]), "San Francisco / Oakland+ Area");
    }

    #[test]
    fn test_missing_city_uses_icao() {
        let a = AirportInfo::new("KXYZ", FlightCategory::Vfr);
        assert_eq!(area_name(&[&a]), "KXYZ Area");
        assert_eq!(area_name(&[]), "Unknown Area");
    }
}
