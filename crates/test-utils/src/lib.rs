//! Shared test utilities for the wx-overlay workspace.
//!
//! This crate provides:
//! - Approximate float and coordinate assertions
//! - Deterministic point, ring and weather generators
//! - Fixed airport, ring and boundary-archive fixtures
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::*;
pub use generators::*;

/// Creates a temporary directory for test output.
///
/// The directory is removed when the returned `TempDir` is dropped.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::Builder::new()
        .prefix("wx_overlay_test")
        .tempdir()
        .expect("Failed to create temporary test directory")
}

/// Macro for approximate floating-point equality assertions.
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64); // passes
/// assert_approx_eq!(1.1_f64, 1.0_f64, 0.001_f64);    // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}

/// Macro for approximate equality of coordinate pairs.
///
/// ```ignore
/// use test_utils::assert_coords_approx_eq;
///
/// assert_coords_approx_eq!((37.6001, -122.4), (37.6, -122.4), 0.001);
/// ```
#[macro_export]
macro_rules! assert_coords_approx_eq {
    (($x1:expr, $y1:expr), ($x2:expr, $y2:expr), $epsilon:expr) => {{
        $crate::assert_approx_eq!($x1, $x2, $epsilon);
        $crate::assert_approx_eq!($y1, $y2, $epsilon);
    }};
}

/// Approximate equality of two `GeoPoint`s, componentwise.
///
/// ```ignore
/// use test_utils::assert_point_approx_eq;
///
/// assert_point_approx_eq!(GeoPoint::new(1.0001, 2.0), GeoPoint::new(1.0, 2.0), 0.001);
/// ```
#[macro_export]
macro_rules! assert_point_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let l = $left;
        let r = $right;
        $crate::assert_approx_eq!(l.lat, r.lat, $epsilon);
        $crate::assert_approx_eq!(l.lon, r.lon, $epsilon);
    }};
}
