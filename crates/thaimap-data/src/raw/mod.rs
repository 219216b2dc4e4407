use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

use crate::{AdminLevel, AdminProperties, DataError, Feature, FeatureCollection, Geometry};

pub mod fetch;

pub use super::error::Result;
pub use fetch::{BoundaryFetcher, DataSource};

#[derive(Debug, Deserialize)]
struct RawFeatureCollection {
    #[serde(default)]
    features: Vec<RawFeature>,
}

#[derive(Debug, Deserialize)]
struct RawFeature {
    #[serde(default)]
    properties: Option<Map<String, Value>>,
    #[serde(default)]
    geometry: Option<Geometry>,
}

/// Parse one level's GeoJSON `FeatureCollection` document.
///
/// Features with a `null` geometry are skipped. A document that ends up with
/// no features is rejected with [`DataError::EmptyCollection`].
#[instrument(
    name = "Parse boundary document",
    skip(bytes),
    fields(bytes = bytes.len()),
    level = "debug"
)]
pub fn parse_collection(level: AdminLevel, bytes: &[u8]) -> Result<FeatureCollection> {
    let raw: RawFeatureCollection = serde_json::from_slice(bytes)
        .map_err(|source| DataError::Parse { level, source })?;

    let total = raw.features.len();
    let no_properties = Map::new();
    let features: Vec<Feature> = raw
        .features
        .into_iter()
        .filter_map(|raw_feature| {
            let geometry = raw_feature.geometry?;
            let properties = raw_feature.properties.as_ref().unwrap_or(&no_properties);
            Some(Feature::new(geometry, AdminProperties::from_raw(level, properties)))
        })
        .collect();

    let skipped = total - features.len();
    if skipped > 0 {
        warn!(%level, skipped, "Skipped features without geometry");
    }
    if features.is_empty() {
        return Err(DataError::EmptyCollection(level));
    }

    debug!(%level, features = features.len(), "Parsed boundary document");
    Ok(FeatureCollection::new(level, features))
}
