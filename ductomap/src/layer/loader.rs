//! Fetching and decoding of layer GeoJSON documents.

use bytes::Bytes;
use ductomap_types::error::GeometryError;
use ductomap_types::Geom;
use geojson::GeoJson;

use crate::error::LoadError;
use crate::layer::{Feature, LayerId, Properties};
use crate::platform::GeoJsonSource;

/// Result of loading one layer.
#[derive(Debug, Clone)]
pub struct LoadCompletion {
    /// Layer the result belongs to.
    pub layer: LayerId,
    /// Decoded features or the reason the load failed.
    pub result: Result<Vec<Feature>, LoadError>,
}

/// Fetches the document at `url` and decodes it into features.
pub(crate) async fn load_features(
    source: &dyn GeoJsonSource,
    url: &str,
) -> Result<Vec<Feature>, LoadError> {
    let bytes = source.load_bytes(url).await?;
    decode_features(&bytes)
}

/// Decodes a GeoJSON document into features.
///
/// A `FeatureCollection` gives one feature per member. A single `Feature` or bare geometry gives a
/// single feature. Members of a collection are decoded one by one: a member with missing or
/// malformed geometry is kept as a geometry-less feature and does not fail the document.
pub fn decode_features(bytes: &Bytes) -> Result<Vec<Feature>, LoadError> {
    let value: serde_json::Value = serde_json::from_slice(bytes)?;
    match value.get("type").and_then(serde_json::Value::as_str) {
        Some("FeatureCollection") => {
            if let Some(members) = value.get("features").and_then(serde_json::Value::as_array) {
                return Ok(members.iter().map(decode_member).collect());
            }
        }
        Some("Feature") => return Ok(vec![decode_member(&value)]),
        _ => {}
    }

    let features = match GeoJson::try_from(value)? {
        GeoJson::Geometry(geometry) => vec![match Geom::try_from(&geometry) {
            Ok(geom) => Feature::new(geom, Properties::default()),
            Err(err) => Feature::without_geometry(err, Properties::default()),
        }],
        GeoJson::FeatureCollection(_) | GeoJson::Feature(_) => {
            return Err(LoadError::Decode("malformed feature collection".into()))
        }
    };

    Ok(features)
}

fn decode_member(member: &serde_json::Value) -> Feature {
    let properties = member
        .get("properties")
        .and_then(serde_json::Value::as_object)
        .cloned()
        .map(Properties::from)
        .unwrap_or_default();

    match decode_geometry(member.get("geometry")) {
        Ok(geom) => Feature::new(geom, properties),
        Err(err) => {
            log::debug!("Feature without usable geometry: {err}");
            Feature::without_geometry(err, properties)
        }
    }
}

fn decode_geometry(value: Option<&serde_json::Value>) -> Result<Geom, GeometryError> {
    let value = match value {
        None | Some(serde_json::Value::Null) => return Err(GeometryError::Missing),
        Some(value) => value.clone(),
    };

    let geometry = geojson::Geometry::try_from(value)
        .map_err(|err| GeometryError::Conversion(err.to_string()))?;
    Geom::try_from(&geometry)
}
