//! Flight-category overlays: raster map tiles and a vector cell grid.
//!
//! Both outputs are confined to a set of rings and coloured by the nearest
//! in-range weather point, looked up through one shared [`WeatherIndex`]
//! so they always agree.

pub mod geojson;
pub mod grid;
pub mod nearest;
pub mod palette;
pub mod png;
pub mod tiles;

pub use geojson::{Feature, FeatureCollection, Geometry};
pub use grid::{build_cells, build_feature_collection, write_geojson, GridCell, GridConfig, Region};
pub use nearest::{WeatherIndex, DEFAULT_VALIDITY_RADIUS_DEG};
pub use palette::{category_hex, category_rgba, OVERLAY_ALPHA};
pub use tiles::{
    render_tile, sample_stride, tile_range, write_file_atomic, write_tile_atomic, Confinement,
    RasterConfig, RenderedTile, TileRasterizer, TileStats, MAX_ZOOM,
};
pub use wx_common::tile::pixel_to_latlon;
