//! Province layer: the focus targets of the camera tour.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use geo::{BoundingRect, MultiPolygon};
use log::info;

use crate::collect::pdok::pdok_collect::PdokCollect;
use crate::error::{TourError, TourResult};
use crate::geo_core::{BoundingBox, GeoCore};
use crate::geometric::{layer_extent, parse_named_features};

/// One province: its name and its outline.
#[derive(Debug, Clone)]
pub struct ProvinceFeature {
    pub name: String,
    pub geometry: MultiPolygon<f64>,
}

/// Provides methods to collect province outlines from the PDOK
/// administrative-boundaries service, or from a local GeoJSON file.
pub struct Provinces {
    /// Optional GeoJSON file path; set for offline runs and tests
    filepath_geojson: Option<PathBuf>,
    /// PdokCollect instance for WFS requests
    pdok_collect: PdokCollect,
    /// CRS handling
    pub geo_core: GeoCore,
    /// Parsed features, populated by `run`
    features: Vec<ProvinceFeature>,
}

impl Provinces {
    pub fn new(filepath_geojson: Option<PathBuf>) -> Self {
        Provinces {
            filepath_geojson,
            pdok_collect: PdokCollect::new(),
            geo_core: GeoCore::default(),
            features: Vec::new(),
        }
    }

    /// Restrict the fetch to a bounding box. The default (no box) fetches
    /// the whole country, which is the normal case.
    pub fn set_bbox(&mut self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) {
        self.pdok_collect.set_bbox(min_x, min_y, max_x, max_y);
    }

    /// Request features in another CRS than RD New.
    pub fn set_crs(&mut self, epsg: i32) {
        self.geo_core.set_epsg(epsg);
        self.pdok_collect.geo_core.set_epsg(epsg);
    }

    /// Fetch (or read) and parse the province layer.
    pub fn run(mut self) -> TourResult<Self> {
        let raw = match &self.filepath_geojson {
            Some(path) => fs::read_to_string(path)?,
            None => {
                self.pdok_collect.execute_pdok("provinces")?;
                self.pdok_collect.content_as_string()?
            }
        };

        let name_attribute = self
            .pdok_collect
            .get_entry("provinces")
            .map(|e| e.name_attribute.clone())
            .unwrap_or_else(|| "naam".to_string());

        let named = parse_named_features(&raw, "provinces", &name_attribute)?;
        info!("loaded {} provinces", named.len());

        self.features = named
            .into_iter()
            .map(|f| ProvinceFeature {
                name: f.name,
                geometry: f.geometry,
            })
            .collect();
        Ok(self)
    }

    pub fn features(&self) -> &[ProvinceFeature] {
        &self.features
    }

    /// Name-to-bounding-box mapping used to resolve focus targets.
    pub fn bbox_lookup(&self) -> HashMap<String, BoundingBox> {
        self.features
            .iter()
            .filter_map(|f| {
                f.geometry
                    .bounding_rect()
                    .map(|rect| (f.name.clone(), BoundingBox::from_rect(rect)))
            })
            .collect()
    }

    /// Bounding box covering every province.
    pub fn full_extent(&self) -> TourResult<BoundingBox> {
        layer_extent(self.features.iter().map(|f| &f.geometry))
            .ok_or_else(|| TourError::geometry("provinces", "layer has no extent"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROVINCES: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"naam": "Utrecht"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0], [0.0, 0.0]]]
                }
            },
            {
                "type": "Feature",
                "properties": {"naam": "Flevoland"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[10.0, 0.0], [30.0, 0.0], [30.0, 10.0], [10.0, 10.0], [10.0, 0.0]]]
                }
            }
        ]
    }"#;

    fn provinces_from_fixture() -> Provinces {
        let path = std::env::temp_dir().join(format!(
            "provtour_provinces_test_{}.geojson",
            std::process::id()
        ));
        fs::write(&path, PROVINCES).unwrap();
        Provinces::new(Some(path)).run().unwrap()
    }

    #[test]
    fn test_bbox_lookup_and_extent() {
        let provinces = provinces_from_fixture();
        assert_eq!(provinces.features().len(), 2);

        let lookup = provinces.bbox_lookup();
        assert_eq!(
            lookup.get("Utrecht"),
            Some(&BoundingBox::new(0.0, 0.0, 10.0, 10.0))
        );
        assert_eq!(
            lookup.get("Flevoland"),
            Some(&BoundingBox::new(10.0, 0.0, 30.0, 10.0))
        );

        let extent = provinces.full_extent().unwrap();
        assert_eq!(extent, BoundingBox::new(0.0, 0.0, 30.0, 10.0));
    }
}
