//! Common types shared by every stage of the weather overlay pipeline.

pub mod airac;
pub mod bbox;
pub mod category;
pub mod error;
pub mod point;
pub mod tile;

pub use airac::AiracCycle;
pub use bbox::BoundingBox;
pub use category::{FlightCategory, WeatherPoint};
pub use error::{OverlayError, OverlayResult};
pub use point::{GeoPoint, Polygon};
pub use tile::{TileCoord, TILE_SIZE};
