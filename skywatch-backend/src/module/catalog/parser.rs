//! GeoJSON catalog parser
//!
//! Reads the `FeatureCollection` files shipped with common web star-map data
//! sets. Only identity and brightness are kept; positions are the oracle's job.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::types::{ConstellationRecord, StarRecord};

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    id: Value,
    #[serde(default)]
    properties: Option<Value>,
}

/// Feature ids are strings for constellations and numbers for stars
fn id_string(id: &Value) -> Option<String> {
    match id {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn clean_name(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(|s| s.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|s| !s.is_empty())
}

/// Parse a constellation `FeatureCollection`.
///
/// Features without an id or a name are skipped.
pub fn parse_constellations(json: &str) -> Result<Vec<ConstellationRecord>> {
    let collection: FeatureCollection =
        serde_json::from_str(json).context("Failed to deserialize constellation GeoJSON")?;

    let mut records = Vec::with_capacity(collection.features.len());
    for feature in collection.features {
        let props = feature.properties.as_ref();
        let name = clean_name(props.and_then(|p| p.get("name")));

        match (id_string(&feature.id), name) {
            (Some(id), Some(name)) => records.push(ConstellationRecord { id, name }),
            (id, name) => warn!("Skipping malformed constellation feature: id={:?}, name={:?}", id, name),
        }
    }

    Ok(records)
}

/// Parse a star `FeatureCollection`.
///
/// Stars without a usable id are skipped; name and magnitude stay optional so
/// the index decides what is bright enough.
pub fn parse_stars(json: &str) -> Result<Vec<StarRecord>> {
    let collection: FeatureCollection =
        serde_json::from_str(json).context("Failed to deserialize star GeoJSON")?;

    let mut records = Vec::with_capacity(collection.features.len());
    for feature in collection.features {
        let Some(id) = id_string(&feature.id) else {
            warn!("Skipping star feature without id");
            continue;
        };
        let props = feature.properties.as_ref();

        records.push(StarRecord {
            id,
            name: clean_name(props.and_then(|p| p.get("name"))),
            magnitude: props
                .and_then(|p| p.get("mag"))
                .and_then(Value::as_f64)
                .filter(|m| m.is_finite()),
        });
    }

    Ok(records)
}
