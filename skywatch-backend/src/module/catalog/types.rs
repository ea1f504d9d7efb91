//! Catalog source records

use serde::{Deserialize, Serialize};

/// Bodies whose positions are computed on the fly by the oracle
pub const SOLAR_SYSTEM_BODIES: [&str; 9] = [
    "Sun", "Moon", "Mercury", "Venus", "Mars", "Jupiter", "Saturn", "Uranus", "Neptune",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstellationRecord {
    /// Three-letter IAU abbreviation, e.g. "Ori"
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StarRecord {
    pub id: String,
    /// Proper name; unnamed stars are never indexed
    pub name: Option<String>,
    /// Visual magnitude, smaller is brighter
    pub magnitude: Option<f64>,
}

/// Raw inputs of an index rebuild. `None` means the source could not be loaded.
#[derive(Debug, Clone, Default)]
pub struct CatalogSources {
    pub constellations: Option<Vec<ConstellationRecord>>,
    pub stars: Option<Vec<StarRecord>>,
}
