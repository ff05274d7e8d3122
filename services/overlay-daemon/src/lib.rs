//! Overlay daemon library.
//!
//! Wires clustering, boundary resolution, tile rendering and the vector
//! grid into one batch recompute driven by [`OverlayConfig`].

pub mod config;
pub mod inputs;
pub mod manifest;
pub mod pipeline;

pub use config::OverlayConfig;
pub use manifest::TileManifest;
pub use pipeline::{Pipeline, RunReport};
