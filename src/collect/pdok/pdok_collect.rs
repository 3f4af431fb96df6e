use log::debug;
use reqwest::blocking::Client;
use std::collections::HashMap;
use url::Url;

use crate::error::{TourError, TourResult};
use crate::geo_core::{BoundingBox, GeoCore};

/// WFS endpoint of the Kadaster administrative-boundaries service
/// (provinces, municipalities).
const BESTUURLIJKE_GEBIEDEN_WFS: &str =
    "https://service.pdok.nl/kadaster/bestuurlijkegebieden/wfs/v1_0";

/// WFS endpoint of the CBS territorial-divisions service (COROP areas and
/// other statistical regions).
const GEBIEDSINDELINGEN_WFS: &str = "https://service.pdok.nl/cbs/gebiedsindelingen/2023/wfs/v1_0";

/// Page size for WFS GetFeature requests. Both layers are far smaller than
/// this (12 provinces, 40 COROP areas), so a single page always suffices.
const MAX_FEATURES: u32 = 10_000;

/// One resolvable PDOK layer: where to ask, which typename, and which
/// feature attribute carries the display name.
#[derive(Debug, Clone)]
pub struct PdokServiceEntry {
    pub url: String,
    pub typename: String,
    pub name_attribute: String,
}

/// Base struct for PDOK data collection.
/// Provides methods to query PDOK WFS services and fetch feature collections
/// as GeoJSON.
pub struct PdokCollect {
    pub content: Option<Vec<u8>>,
    pub bbox: Option<BoundingBox>,
    pub pdok_keys: HashMap<String, PdokServiceEntry>,
    pub geo_core: GeoCore,
}

impl PdokCollect {
    pub fn new() -> Self {
        let mut pdok_keys = HashMap::new();
        pdok_keys.insert(
            "provinces".to_string(),
            PdokServiceEntry {
                url: BESTUURLIJKE_GEBIEDEN_WFS.to_string(),
                typename: "bestuurlijkegebieden:Provinciegebied".to_string(),
                name_attribute: "naam".to_string(),
            },
        );
        pdok_keys.insert(
            "regions".to_string(),
            PdokServiceEntry {
                url: GEBIEDSINDELINGEN_WFS.to_string(),
                typename: "gebiedsindelingen:coropgebied_gegeneraliseerd".to_string(),
                name_attribute: "statnaam".to_string(),
            },
        );

        PdokCollect {
            content: None,
            bbox: None,
            pdok_keys,
            geo_core: GeoCore::default(),
        }
    }

    /// Get the service entry for a layer key.
    pub fn get_entry(&self, key: &str) -> Option<&PdokServiceEntry> {
        self.pdok_keys.get(key)
    }

    /// Set bounding box from coordinates. Requests without one fetch the
    /// whole collection, which is the normal case for national layers.
    pub fn set_bbox(&mut self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) {
        self.bbox = Some(BoundingBox::new(min_x, min_y, max_x, max_y));
    }

    /// Execute a WFS GetFeature request for the given layer key and store
    /// the response body. Failures abort the run; there are no retries.
    pub fn execute_pdok(&mut self, key: &str) -> TourResult<()> {
        let entry = self
            .pdok_keys
            .get(key)
            .ok_or_else(|| TourError::fetch(key, "unknown PDOK layer key"))?
            .clone();

        let request_url = self.build_getfeature_url(&entry)?;
        debug!("WFS GetFeature: {}", request_url);

        let client = Client::new();
        let response = client
            .get(request_url.as_str())
            .send()
            .map_err(|e| TourError::fetch(&entry.typename, e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(TourError::fetch(
                &entry.typename,
                format!("PDOK returned {}: {}", status, body),
            ));
        }

        let content_bytes = response
            .bytes()
            .map_err(|e| TourError::fetch(&entry.typename, e.to_string()))?
            .to_vec();

        self.content = Some(content_bytes);
        Ok(())
    }

    /// Build an OGC WFS 2.0.0 GetFeature URL for one layer.
    fn build_getfeature_url(&self, entry: &PdokServiceEntry) -> TourResult<Url> {
        let srs = format!("EPSG:{}", self.geo_core.epsg);
        let count = MAX_FEATURES.to_string();
        let mut params: Vec<(&str, String)> = vec![
            ("SERVICE", "WFS".to_string()),
            ("VERSION", "2.0.0".to_string()),
            ("REQUEST", "GetFeature".to_string()),
            ("TYPENAMES", entry.typename.clone()),
            ("OUTPUTFORMAT", "application/json".to_string()),
            ("SRSNAME", srs.clone()),
            ("STARTINDEX", "0".to_string()),
            ("COUNT", count),
        ];
        // EPSG:28992 is an x,y (easting, northing) CRS, so BBOX axis order
        // is min_x,min_y,max_x,max_y.
        if let Some(bbox) = self.bbox {
            params.push((
                "BBOX",
                format!(
                    "{},{},{},{},{}",
                    bbox.min_x, bbox.min_y, bbox.max_x, bbox.max_y, srs
                ),
            ));
        }

        Url::parse_with_params(&entry.url, params.iter().map(|(k, v)| (*k, v.as_str())))
            .map_err(|e| TourError::fetch(&entry.typename, format!("bad service URL: {}", e)))
    }

    /// Get the response content as a string.
    pub fn content_as_string(&self) -> TourResult<String> {
        let content = self
            .content
            .as_ref()
            .ok_or_else(|| TourError::fetch("pdok", "no content available"))?;
        String::from_utf8(content.clone())
            .map_err(|e| TourError::fetch("pdok", format!("content is not valid UTF-8: {}", e)))
    }
}

impl Default for PdokCollect {
    fn default() -> Self {
        Self::new()
    }
}
