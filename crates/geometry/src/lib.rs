//! Geometry primitives over lat/lon degree space.
//!
//! Implemented from scratch without external dependencies:
//! - Point-in-polygon (even-odd ray casting)
//! - Convex hull (Andrew's monotone chain)
//! - Haversine great-circle distance
//! - Bounding box / centroid
//! - Outward polygon buffering and circle synthesis
//!
//! Planar operations treat longitude as `x` and latitude as `y` with no
//! projection. That is adequate for the adjacency and containment tests
//! the pipeline needs but is not geodesically exact.

pub mod buffer;
pub mod distance;
pub mod hull;
pub mod polygon;

pub use buffer::{buffer_outward, circle_polygon};
pub use distance::{great_circle_nm, min_vertex_distance, EARTH_RADIUS_NM, NM_PER_DEG_LAT};
pub use hull::{convex_hull, hull_polygon};
pub use polygon::{bounding_box, centroid, point_in_polygon, PreparedPolygon};
