//! Boundary resolution for named airport groupings.
//!
//! A grouping name is resolved to facility boundary rings through its
//! position-prefix metadata, then rings that touch are merged into convex
//! hulls. Everything is read from an explicitly constructed
//! [`BoundaryContext`]; nothing is loaded lazily or held globally.

pub mod archive;
pub mod artcc;
pub mod config;
pub mod context;
pub mod hierarchy;
pub mod lookup;
pub mod merge;
pub mod metadata;
pub mod union_find;

pub use archive::{load_archive_dir, load_archive_file, load_simaware_tree, Boundary, FacilityBoundarySet};
pub use artcc::{artcc_center, ArtccBoundaries, ArtccCache, RawArtccMap, CONUS_ARTCCS};
pub use config::MergeConfig;
pub use context::BoundaryContext;
pub use hierarchy::FacilityHierarchy;
pub use lookup::{
    boundary_candidates, expand_plus_pattern, find_boundary_for_prefix, map_grouping_to_boundaries,
    tower_circle, BoundaryProbe,
};
pub use merge::combine_polygons;
pub use metadata::{load_grouping_dir, GroupingCatalog, GroupingMetadata};
pub use union_find::{adjacency_groups, UnionFind};
