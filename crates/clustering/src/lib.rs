//! Area clustering for airport weather reports.
//!
//! Significant ("towered") airports are clustered with seeded k-means over
//! great-circle distance; every other airport is attached to the nearest
//! resulting cluster afterwards. When no towered airport is present the
//! airports are grouped by city, then state.

pub mod airport;
pub mod clusterer;
pub mod config;
pub mod kmeans;
pub mod naming;
pub mod sizing;
pub mod summary;

pub use airport::{AirportInfo, SizePriority};
pub use clusterer::{fallback_groups, partition, AreaClusterer, AreaGroup};
pub use config::ClusterConfig;
pub use kmeans::{assign_non_towered, kmeans, seed_centroids};
pub use naming::area_name;
pub use sizing::{grouping_extent_nm, optimal_k};
pub use summary::{count_categories, summary_line, CategoryCounts};
