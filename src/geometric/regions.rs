//! Region layer: the labeled areas drawn on every frame.
//!
//! The WFS may deliver a region as several features (islands, enclaves);
//! they are dissolved into one multipolygon per name. Outlines are then
//! simplified for rendering and sliver parts are dropped.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use geo::{Area, BooleanOps, MultiPolygon, Simplify};
use log::{debug, info};

use crate::animate::labels::display_label;
use crate::collect::pdok::pdok_collect::PdokCollect;
use crate::error::TourResult;
use crate::geo_core::GeoCore;
use crate::geometric::{parse_named_features, NamedGeometry};

/// One region: name, multi-line display label, and cleaned outline.
#[derive(Debug, Clone)]
pub struct RegionFeature {
    pub name: String,
    pub label: String,
    pub geometry: MultiPolygon<f64>,
}

/// Provides methods to collect region outlines from the PDOK territorial-
/// divisions service (or a local GeoJSON file) and clean them for rendering.
pub struct Regions {
    /// Optional GeoJSON file path; set for offline runs and tests
    filepath_geojson: Option<PathBuf>,
    /// PdokCollect instance for WFS requests
    pdok_collect: PdokCollect,
    /// CRS handling
    pub geo_core: GeoCore,
    /// Ramer-Douglas-Peucker tolerance in CRS meters; None disables
    simplify_tolerance: Option<f64>,
    /// Parts below this area (m2) are dropped after dissolving
    min_part_area: f64,
    /// Cleaned features, populated by `run`
    features: Vec<RegionFeature>,
}

impl Regions {
    pub fn new(filepath_geojson: Option<PathBuf>) -> Self {
        Regions {
            filepath_geojson,
            pdok_collect: PdokCollect::new(),
            geo_core: GeoCore::default(),
            simplify_tolerance: Some(50.0),
            min_part_area: 1.0e4,
            features: Vec::new(),
        }
    }

    pub fn set_simplify_tolerance(&mut self, tolerance: Option<f64>) {
        self.simplify_tolerance = tolerance;
    }

    /// Request features in another CRS than RD New.
    pub fn set_crs(&mut self, epsg: i32) {
        self.geo_core.set_epsg(epsg);
        self.pdok_collect.geo_core.set_epsg(epsg);
    }

    pub fn set_min_part_area(&mut self, min_part_area: f64) {
        self.min_part_area = min_part_area;
    }

    /// Fetch (or read), parse, dissolve by name, and clean the region layer.
    pub fn run(mut self) -> TourResult<Self> {
        let raw = match &self.filepath_geojson {
            Some(path) => fs::read_to_string(path)?,
            None => {
                self.pdok_collect.execute_pdok("regions")?;
                self.pdok_collect.content_as_string()?
            }
        };

        let name_attribute = self
            .pdok_collect
            .get_entry("regions")
            .map(|e| e.name_attribute.clone())
            .unwrap_or_else(|| "statnaam".to_string());

        let named = parse_named_features(&raw, "regions", &name_attribute)?;
        let feature_count = named.len();
        let dissolved = dissolve_by_name(named);
        info!(
            "loaded {} region features, {} regions after dissolve",
            feature_count,
            dissolved.len()
        );

        let tolerance = self.simplify_tolerance;
        let min_part_area = self.min_part_area;
        self.features = dissolved
            .into_iter()
            .map(|(name, mut geometry)| {
                if let Some(tolerance) = tolerance {
                    geometry = geometry.simplify(&tolerance);
                }
                geometry = drop_slivers(geometry, min_part_area);
                let label = display_label(&name);
                RegionFeature {
                    name,
                    label,
                    geometry,
                }
            })
            .collect();
        Ok(self)
    }

    pub fn features(&self) -> &[RegionFeature] {
        &self.features
    }

    /// Outlines of all regions, in layer order.
    pub fn geometries(&self) -> Vec<MultiPolygon<f64>> {
        self.features.iter().map(|f| f.geometry.clone()).collect()
    }
}

/// Union all features that share a name, preserving first-seen order.
fn dissolve_by_name(named: Vec<NamedGeometry>) -> Vec<(String, MultiPolygon<f64>)> {
    let mut order: Vec<String> = Vec::new();
    let mut merged: HashMap<String, MultiPolygon<f64>> = HashMap::new();

    for feature in named {
        match merged.get_mut(&feature.name) {
            Some(existing) => {
                let unioned = existing.union(&feature.geometry);
                *existing = unioned;
            }
            None => {
                order.push(feature.name.clone());
                merged.insert(feature.name, feature.geometry);
            }
        }
    }

    order
        .into_iter()
        .filter_map(|name| merged.remove(&name).map(|geometry| (name, geometry)))
        .collect()
}

/// Drop polygon parts below `min_area`. If every part is below the
/// threshold the largest one is kept, so a region never vanishes.
fn drop_slivers(geometry: MultiPolygon<f64>, min_area: f64) -> MultiPolygon<f64> {
    if geometry.0.len() <= 1 || min_area <= 0.0 {
        return geometry;
    }

    let mut kept: Vec<_> = geometry
        .0
        .iter()
        .filter(|p| p.unsigned_area() >= min_area)
        .cloned()
        .collect();

    if kept.is_empty() {
        if let Some(largest) = geometry
            .0
            .iter()
            .max_by(|a, b| a.unsigned_area().total_cmp(&b.unsigned_area()))
        {
            kept.push(largest.clone());
        }
    }

    if kept.len() < geometry.0.len() {
        debug!("dropped {} sliver part(s)", geometry.0.len() - kept.len());
    }
    MultiPolygon(kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, Polygon};

    fn square(x0: f64, y0: f64, size: f64) -> Polygon<f64> {
        polygon![
            (x: x0, y: y0),
            (x: x0 + size, y: y0),
            (x: x0 + size, y: y0 + size),
            (x: x0, y: y0 + size),
            (x: x0, y: y0),
        ]
    }

    #[test]
    fn test_dissolve_merges_same_name() {
        let named = vec![
            NamedGeometry {
                name: "A".to_string(),
                geometry: MultiPolygon(vec![square(0.0, 0.0, 2.0)]),
            },
            NamedGeometry {
                name: "B".to_string(),
                geometry: MultiPolygon(vec![square(10.0, 0.0, 2.0)]),
            },
            NamedGeometry {
                name: "A".to_string(),
                geometry: MultiPolygon(vec![square(1.0, 0.0, 2.0)]),
            },
        ];

        let dissolved = dissolve_by_name(named);
        assert_eq!(dissolved.len(), 2);
        assert_eq!(dissolved[0].0, "A");
        assert_eq!(dissolved[1].0, "B");
        // The two overlapping squares fuse into one part of area 2x3.
        assert_eq!(dissolved[0].1 .0.len(), 1);
        assert!((dissolved[0].1.unsigned_area() - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_drop_slivers_keeps_large_parts() {
        let geometry = MultiPolygon(vec![square(0.0, 0.0, 10.0), square(20.0, 0.0, 0.5)]);
        let cleaned = drop_slivers(geometry, 1.0);
        assert_eq!(cleaned.0.len(), 1);
        assert!((cleaned.unsigned_area() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_drop_slivers_never_empties_a_region() {
        let geometry = MultiPolygon(vec![square(0.0, 0.0, 0.5), square(2.0, 0.0, 0.4)]);
        let cleaned = drop_slivers(geometry, 1.0);
        assert_eq!(cleaned.0.len(), 1);
        assert!((cleaned.unsigned_area() - 0.25).abs() < 1e-9);
    }
}
