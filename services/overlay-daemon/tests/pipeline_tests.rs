//! End-to-end runs of the overlay pipeline over fixture inputs.

use std::fs;
use std::path::Path;

use boundaries::{ArtccBoundaries, ArtccCache};
use chrono::NaiveDate;
use overlay_daemon::{OverlayConfig, Pipeline, TileManifest};
use serde_json::{json, Value};
use test_utils::{square, temp_test_dir, write_json, write_nct_archive, write_nct_groupings};
use wx_common::AiracCycle;

// ============================================================================
// Helper functions
// ============================================================================

fn cycle() -> AiracCycle {
    AiracCycle::containing(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap())
}

/// Inputs for the Bay Area under a single ZOA ring, written below `root`.
fn bay_area_config(root: &Path) -> OverlayConfig {
    let inputs = root.join("inputs");
    let archives = root.join("archives");
    let presets = root.join("presets");
    let cache = root.join("cache");
    for dir in [&inputs, &archives, &presets] {
        fs::create_dir_all(dir).unwrap();
    }

    let weather = write_json(
        &inputs,
        "weather.json",
        &json!({
            "KSFO": {"lat": 37.62, "lon": -122.38, "category": "VFR"},
            "KOAK": {"lat": 37.72, "lon": -122.22, "category": "IFR"},
            "KCCR": {"lat": 37.99, "lon": -122.06, "category": "MVFR"},
            "KSMF": {"lat": 38.70, "lon": -121.59, "category": "LIFR"},
            "KHAF": {"lat": 37.51, "lon": -122.50, "category": "VFR"},
            "KXXX": {"lat": 37.90, "lon": -122.90}
        }),
    );
    let airports = write_json(
        &inputs,
        "airports.json",
        &json!({
            "KSFO": {"lat": 37.62, "lon": -122.38, "tower_type": "ATCT-TRACON", "city": "San Francisco", "state": "CA"},
            "KOAK": {"lat": 37.72, "lon": -122.22, "tower_type": "ATCT-A/C", "city": "Oakland", "state": "CA"},
            "KCCR": {"lat": 37.99, "lon": -122.06, "tower_type": "ATCT", "city": "Concord", "state": "CA"},
            "KSMF": {"lat": 38.70, "lon": -121.59, "tower_type": "ATCT", "city": "Sacramento", "state": "CA"},
            "KHAF": {"lat": 37.51, "lon": -122.50, "tower_type": "NON-ATCT", "city": "Half Moon Bay", "state": "CA"},
            "KMOD": {"lat": 37.63, "lon": -120.95},
            "KRNO": {"lat": 39.50, "lon": -119.77},
            "KSQL": {"lat": 37.51, "lon": -122.25}
        }),
    );
    write_nct_archive(&archives);
    write_nct_groupings(&presets);

    let mut zoa = ArtccBoundaries::new();
    zoa.insert("ZOA", vec![square(38.0, -122.0, 1.0)]);
    ArtccCache::new(&cache).store(&cycle(), &zoa).unwrap();

    OverlayConfig {
        output_dir: root.join("out"),
        zoom_min: 6,
        zoom_max: 7,
        tile_workers: 2,
        boundary_archive_dir: Some(archives),
        boundary_cache_dir: Some(cache),
        grouping_dir: Some(presets),
        weather_path: Some(weather),
        airport_path: Some(airports),
        artcc_filter: Some(vec!["ZOA".to_string()]),
        ..Default::default()
    }
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn count_pngs(dir: &Path) -> usize {
    let mut count = 0;
    let mut stack = vec![dir.to_path_buf()];
    while let Some(d) = stack.pop() {
        for entry in fs::read_dir(&d).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                stack.push(path);
            } else if path.extension().and_then(|e| e.to_str()) == Some("png") {
                count += 1;
            }
        }
    }
    count
}

// ============================================================================
// Full run
// ============================================================================

#[test]
fn test_full_run_writes_every_artifact() {
    let root = temp_test_dir();
    let config = bay_area_config(root.path());
    let pipeline = Pipeline::new(config.clone()).with_cycle(cycle());

    let report = pipeline.run().unwrap();
    assert_eq!(report.weather_points, 6);
    assert_eq!(report.confinement_rings, 1);
    assert_eq!(report.groupings_resolved, 8);
    assert_eq!(report.groupings_empty, 0);
    assert!(report.area_groups >= 1 && report.area_groups <= 3);
    assert!(report.tiles.written[&6] >= 1);
    assert!(report.tiles.written[&7] >= 1);
    assert_eq!(report.tiles.failed, 0);
    assert!(report.grid_cells > 0);

    // Area groups cover every airport with a known category exactly once.
    let groups = read_json(&config.groups_path());
    let groups = groups.as_array().unwrap();
    assert_eq!(groups.len(), report.area_groups);
    let mut members: Vec<String> = groups
        .iter()
        .flat_map(|g| g["members"].as_array().unwrap().iter())
        .map(|m| m["icao"].as_str().unwrap().to_string())
        .collect();
    members.sort();
    assert_eq!(members, vec!["KCCR", "KHAF", "KOAK", "KSFO", "KSMF"]);
    for g in groups {
        assert!(!g["summary"].as_str().unwrap().is_empty());
        assert!(!g["representative_icao"].as_str().unwrap().is_empty());
    }

    // One feature per preset grouping.
    let boundaries = read_json(&config.boundaries_path());
    let features = boundaries["features"].as_array().unwrap();
    assert_eq!(features.len(), 8);
    let er = features.iter().find(|f| f["id"] == "NCT E").unwrap();
    assert_eq!(er["geometry"]["type"], "MultiPolygon");
    assert_eq!(er["properties"]["polygons"], 1);

    // Tiles and manifest agree.
    let tile_root = config.tile_root();
    let manifest = TileManifest::read(&tile_root).unwrap();
    assert_eq!(manifest.min_zoom, 6);
    assert_eq!(manifest.max_zoom, 7);
    assert_eq!(manifest.tiles, report.tiles.written);
    assert_eq!(manifest.airac_cycle, cycle().ident());
    assert_eq!(manifest.bounds, Some([-123.0, 37.0, -121.0, 39.0]));
    assert_eq!(count_pngs(&tile_root), manifest.total_tiles());

    // Grid cells carry the categories of the input.
    let grid = read_json(&config.grid_path());
    let cells = grid["features"].as_array().unwrap();
    assert_eq!(cells.len(), report.grid_cells);
    assert!(cells.iter().all(|c| c["properties"]["region"] == "ZOA"));
    assert!(cells.iter().any(|c| c["properties"]["category"] == "IFR"));
}

#[test]
fn test_rerun_is_stable() {
    let root = temp_test_dir();
    let config = bay_area_config(root.path());

    let first = Pipeline::new(config.clone()).with_cycle(cycle()).run().unwrap();
    let tile_root = config.tile_root();
    let sample = fs::read_dir(tile_root.join("7")).unwrap().next().unwrap().unwrap().path();
    let sample = fs::read_dir(&sample).unwrap().next().unwrap().unwrap().path();
    let before = fs::read(&sample).unwrap();

    let second = Pipeline::new(config).with_cycle(cycle()).run().unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read(&sample).unwrap(), before);
}

// ============================================================================
// Degraded inputs
// ============================================================================

#[test]
fn test_no_inputs_yields_empty_outputs() {
    let root = temp_test_dir();
    let config = OverlayConfig {
        output_dir: root.path().join("out"),
        zoom_min: 4,
        zoom_max: 4,
        ..Default::default()
    };

    let report = Pipeline::new(config.clone()).run().unwrap();
    assert_eq!(report.weather_points, 0);
    assert_eq!(report.area_groups, 0);
    assert_eq!(report.groupings_resolved, 0);
    // Embedded CONUS outlines still confine, but nothing is painted.
    assert_eq!(report.confinement_rings, 20);
    assert_eq!(report.tiles.total_written(), 0);
    assert_eq!(report.grid_cells, 0);

    assert_eq!(read_json(&config.groups_path()), json!([]));
    assert_eq!(read_json(&config.grid_path())["features"], json!([]));
    assert_eq!(count_pngs(&config.tile_root()), 0);
}

#[test]
fn test_missing_weather_file_does_not_abort() {
    let root = temp_test_dir();
    let mut config = bay_area_config(root.path());
    config.weather_path = Some(root.path().join("inputs").join("missing.json"));

    let report = Pipeline::new(config).with_cycle(cycle()).run().unwrap();
    assert_eq!(report.weather_points, 0);
    assert_eq!(report.tiles.total_written(), 0);
    // Boundaries only need the airport table.
    assert_eq!(report.groupings_resolved, 8);
}

#[test]
fn test_unknown_artcc_filter_confines_nothing() {
    let root = temp_test_dir();
    let mut config = bay_area_config(root.path());
    config.artcc_filter = Some(vec!["ZZZ".to_string()]);

    let report = Pipeline::new(config.clone()).with_cycle(cycle()).run().unwrap();
    assert_eq!(report.confinement_rings, 0);
    assert_eq!(report.tiles.total_written(), 0);
    assert_eq!(report.grid_cells, 0);
    assert_eq!(TileManifest::read(&config.tile_root()).unwrap().bounds, None);
}
