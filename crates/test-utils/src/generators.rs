//! Deterministic generators for property-style tests.
//!
//! A tiny linear congruential generator keeps the crate free of an RNG
//! dependency while giving every test a reproducible input for a seed.

use std::f64::consts::PI;

use wx_common::{FlightCategory, GeoPoint, Polygon, WeatherPoint};

/// Knuth's MMIX LCG.
#[derive(Debug, Clone)]
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed ^ 0x9E37_79B9_7F4A_7C15)
    }

    pub fn next_u64(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        self.0
    }

    /// Uniform in [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform in [lo, hi).
    pub fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }
}

/// `n` points uniformly scattered over a (min_lon, min_lat, max_lon, max_lat) box.
pub fn random_points(seed: u64, n: usize, bbox: (f64, f64, f64, f64)) -> Vec<GeoPoint> {
    let (min_lon, min_lat, max_lon, max_lat) = bbox;
    let mut rng = Lcg::new(seed);
    (0..n)
        .map(|_| GeoPoint::new(rng.range(min_lat, max_lat), rng.range(min_lon, max_lon)))
        .collect()
}

/// A star-shaped (usually concave) ring of `n` vertices around `center`.
///
/// Angles are evenly spaced with jittered radii between `0.3 * radius`
/// and `radius` degrees, so the ring never self-intersects.
pub fn random_star_polygon(seed: u64, center: GeoPoint, radius: f64, n: usize) -> Polygon {
    let mut rng = Lcg::new(seed);
    let points = (0..n)
        .map(|i| {
            let angle = 2.0 * PI * i as f64 / n as f64;
            let r = rng.range(0.3 * radius, radius);
            GeoPoint::new(center.lat + r * angle.sin(), center.lon + r * angle.cos())
        })
        .collect();
    Polygon::new(points)
}

/// `n` weather points with known categories scattered over a box.
pub fn random_weather(seed: u64, n: usize, bbox: (f64, f64, f64, f64)) -> Vec<WeatherPoint> {
    let mut rng = Lcg::new(seed.wrapping_add(1));
    random_points(seed, n, bbox)
        .into_iter()
        .enumerate()
        .map(|(i, coord)| {
            let category = FlightCategory::KNOWN[(rng.next_u64() % 4) as usize];
            WeatherPoint::new(format!("K{:03}", i), coord, category)
        })
        .collect()
}
