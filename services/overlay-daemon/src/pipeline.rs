//! One full recompute: inputs → area groups → grouping boundaries →
//! confinement → tiles and grid.
//!
//! Every stage degrades to empty output when its input is absent; only an
//! unwritable output directory aborts the run.

use std::path::Path;

use anyhow::{Context, Result};
use boundaries::{
    load_archive_dir, load_grouping_dir, load_simaware_tree, ArtccBoundaries, ArtccCache, BoundaryContext,
    FacilityBoundarySet, GroupingCatalog,
};
use clustering::{count_categories, summary_line, AreaClusterer, AreaGroup, CategoryCounts};
use renderer::{
    build_cells, build_feature_collection, write_file_atomic, write_geojson, Confinement, Feature,
    FeatureCollection, Geometry, Region, TileRasterizer, TileStats, WeatherIndex,
};
use serde::Serialize;
use tracing::{info, warn};
use wx_common::{AiracCycle, OverlayResult, WeatherPoint};

use crate::config::OverlayConfig;
use crate::inputs::{airport_coords, airport_infos, load_airports, load_weather, AirportTable};
use crate::manifest::TileManifest;

/// Counts from one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunReport {
    pub weather_points: usize,
    pub area_groups: usize,
    pub groupings_resolved: usize,
    pub groupings_empty: usize,
    pub confinement_rings: usize,
    pub tiles: TileStats,
    pub grid_cells: usize,
}

/// Area group as written to `area_groups.json`.
#[derive(Debug, Serialize)]
struct GroupRecord<'a> {
    #[serde(flatten)]
    group: &'a AreaGroup,
    counts: CategoryCounts,
    summary: String,
}

pub struct Pipeline {
    config: OverlayConfig,
    cycle: AiracCycle,
}

impl Pipeline {
    pub fn new(config: OverlayConfig) -> Self {
        Self {
            config,
            cycle: AiracCycle::current(),
        }
    }

    /// Pin the boundary cycle instead of using today's.
    pub fn with_cycle(mut self, cycle: AiracCycle) -> Self {
        self.cycle = cycle;
        self
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    pub fn run(&self) -> Result<RunReport> {
        let config = &self.config;
        std::fs::create_dir_all(&config.output_dir)
            .with_context(|| format!("Failed to create output directory: {:?}", config.output_dir))?;

        let mut report = RunReport::default();

        // Inputs are loaded in full before any stage runs.
        let weather = optional_input(config.weather_path.as_deref(), "weather snapshot", load_weather);
        let airports = optional_input(config.airport_path.as_deref(), "airport table", load_airports);
        report.weather_points = weather.len();

        let groups = self.cluster(&weather, &airports)?;
        report.area_groups = groups.len();

        let context = self.boundary_context(&weather, &airports);
        let (resolved, empty) = self.resolve_groupings(&context)?;
        report.groupings_resolved = resolved;
        report.groupings_empty = empty;

        let regions = self.confinement_regions();
        let confinement = Confinement::new(regions.iter().map(|r| r.ring.clone()).collect());
        report.confinement_rings = confinement.len();

        let reference_lat = confinement.reference_lat().unwrap_or(0.0);
        let index = WeatherIndex::new(&weather, reference_lat, config.validity_radius_deg);
        info!(
            stations = index.len(),
            reference_lat,
            radius_deg = config.validity_radius_deg,
            "built weather index"
        );

        report.tiles = self.render_tiles(&confinement, &index)?;
        report.grid_cells = self.render_grid(&regions, &index)?;

        info!(
            weather = report.weather_points,
            groups = report.area_groups,
            groupings = report.groupings_resolved,
            tiles = report.tiles.total_written(),
            failed_tiles = report.tiles.failed,
            cells = report.grid_cells,
            "overlay run complete"
        );
        Ok(report)
    }

    fn cluster(&self, weather: &[WeatherPoint], airports: &AirportTable) -> Result<Vec<AreaGroup>> {
        let infos = airport_infos(weather, airports);
        let groups = AreaClusterer::new(self.config.cluster_config()).create_area_groups(&infos);

        let records: Vec<GroupRecord<'_>> = groups
            .iter()
            .map(|group| {
                let counts = count_categories(&group.members);
                GroupRecord {
                    group,
                    counts,
                    summary: summary_line(&counts),
                }
            })
            .collect();

        let path = self.config.groups_path();
        let bytes = serde_json::to_vec_pretty(&records)?;
        write_file_atomic(&path, &bytes).with_context(|| format!("Failed to write area groups: {:?}", path))?;
        info!(groups = groups.len(), airports = infos.len(), path = %path.display(), "wrote area groups");
        Ok(groups)
    }

    fn boundary_context(&self, weather: &[WeatherPoint], airports: &AirportTable) -> BoundaryContext {
        let config = &self.config;
        let mut set = optional_input(config.boundary_archive_dir.as_deref(), "boundary archives", load_archive_dir);
        set.extend(optional_input::<FacilityBoundarySet>(
            config.simaware_dir.as_deref(),
            "boundary tree",
            load_simaware_tree,
        ));
        let catalog: GroupingCatalog =
            optional_input(config.grouping_dir.as_deref(), "grouping presets", load_grouping_dir);

        info!(
            facilities = set.len(),
            boundaries = set.boundary_count(),
            groupings = catalog.len(),
            "loaded boundary context"
        );

        BoundaryContext::new(set, catalog)
            .with_airports(airport_coords(weather, airports))
            .with_config(config.merge_config())
    }

    /// Resolve every preset grouping and write one MultiPolygon feature per
    /// grouping that produced rings.
    fn resolve_groupings(&self, context: &BoundaryContext) -> Result<(usize, usize)> {
        let mut features = Vec::new();
        let mut empty = 0;
        for name in context.groupings().names() {
            let rings = context.polygons_or_fallback(name);
            if rings.is_empty() {
                empty += 1;
                continue;
            }
            features.push(
                Feature::new(Geometry::from_rings(&rings))
                    .with_id(name)
                    .with_property("name", name)
                    .with_property("polygons", rings.len()),
            );
        }
        let resolved = features.len();

        let path = self.config.boundaries_path();
        write_geojson(&path, &FeatureCollection::new().with_features(features))
            .with_context(|| format!("Failed to write grouping boundaries: {:?}", path))?;
        info!(resolved, empty, "resolved grouping boundaries");
        Ok((resolved, empty))
    }

    fn confinement_regions(&self) -> Vec<Region> {
        let artccs = match &self.config.boundary_cache_dir {
            Some(dir) => ArtccCache::new(dir).resolve(&self.cycle),
            None => {
                info!("no boundary cache configured, using embedded ARTCC outlines");
                ArtccBoundaries::embedded()
            }
        };
        let regions: Vec<Region> = artccs
            .select(self.config.artcc_filter.as_deref())
            .into_iter()
            .map(|(code, ring)| Region::new(code, ring))
            .collect();
        info!(cycle = %self.cycle, rings = regions.len(), "selected confinement");
        regions
    }

    fn render_tiles(&self, confinement: &Confinement, index: &WeatherIndex) -> Result<TileStats> {
        let tile_root = self.config.tile_root();
        let stats = TileRasterizer::new(self.config.raster_config(), &tile_root).generate_all(confinement, index)?;

        let manifest = TileManifest::new(&self.config.zoom_levels(), confinement.bbox(), &stats, &self.cycle);
        let path = manifest
            .write(&tile_root)
            .with_context(|| format!("Failed to write tile manifest under {:?}", tile_root))?;
        info!(path = %path.display(), tiles = manifest.total_tiles(), "wrote tile manifest");
        Ok(stats)
    }

    fn render_grid(&self, regions: &[Region], index: &WeatherIndex) -> Result<usize> {
        let cells = build_cells(regions, index, &self.config.grid_config());
        let path = self.config.grid_path();
        write_geojson(&path, &build_feature_collection(&cells))
            .with_context(|| format!("Failed to write grid: {:?}", path))?;
        Ok(cells.len())
    }
}

/// Load an optional input; absent or unreadable input becomes empty.
fn optional_input<T: Default>(path: Option<&Path>, what: &str, load: impl FnOnce(&Path) -> OverlayResult<T>) -> T {
    let Some(path) = path else {
        warn!(input = what, "input not configured, stage output will be empty");
        return T::default();
    };
    match load(path) {
        Ok(value) => value,
        Err(e) => {
            warn!(input = what, path = %path.display(), error = %e, "input unavailable, stage output will be empty");
            T::default()
        }
    }
}
