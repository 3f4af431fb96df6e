pub mod coloring;
pub mod provinces;
pub mod regions;

use geo::{BoundingRect, MultiPolygon};
use geojson::GeoJson;

use crate::error::{TourError, TourResult};
use crate::geo_core::BoundingBox;

/// An areal feature with its display name, as parsed from a WFS response.
#[derive(Debug, Clone)]
pub struct NamedGeometry {
    pub name: String,
    pub geometry: MultiPolygon<f64>,
}

/// Parse a GeoJSON FeatureCollection into named multipolygons, reading the
/// display name from `name_attribute`. Non-areal features and features
/// without the attribute are skipped; an empty result is an error since an
/// empty layer cannot anchor the animation.
pub fn parse_named_features(
    raw: &str,
    layer: &str,
    name_attribute: &str,
) -> TourResult<Vec<NamedGeometry>> {
    let geojson: GeoJson = raw
        .parse()
        .map_err(|e| TourError::fetch(layer, format!("GeoJSON parse failed: {}", e)))?;

    let GeoJson::FeatureCollection(collection) = geojson else {
        return Err(TourError::geometry(layer, "expected a FeatureCollection"));
    };

    let mut features = Vec::new();
    for feature in collection.features {
        let Some(name) = feature
            .properties
            .as_ref()
            .and_then(|p| p.get(name_attribute))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
        else {
            continue;
        };

        let Some(geometry) = feature.geometry else {
            continue;
        };
        let geometry: geo::Geometry<f64> = match geometry.value.try_into() {
            Ok(g) => g,
            Err(_) => continue,
        };
        let geometry = match geometry {
            geo::Geometry::Polygon(p) => MultiPolygon(vec![p]),
            geo::Geometry::MultiPolygon(mp) => mp,
            _ => continue,
        };

        features.push(NamedGeometry { name, geometry });
    }

    if features.is_empty() {
        return Err(TourError::geometry(
            layer,
            format!("no areal features with attribute '{}'", name_attribute),
        ));
    }

    Ok(features)
}

/// Bounding box covering every geometry in the iterator, or None when it is
/// empty or no geometry has an extent.
pub fn layer_extent<'a, I>(geometries: I) -> Option<BoundingBox>
where
    I: IntoIterator<Item = &'a MultiPolygon<f64>>,
{
    let mut extent: Option<BoundingBox> = None;
    for geometry in geometries {
        if let Some(rect) = geometry.bounding_rect() {
            let bbox = BoundingBox::from_rect(rect);
            match extent.as_mut() {
                Some(extent) => extent.expand_to_include(&bbox),
                None => extent = Some(bbox),
            }
        }
    }
    extent
}
