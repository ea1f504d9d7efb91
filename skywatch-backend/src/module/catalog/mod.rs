//! Celestial object catalog
//!
//! Merges constellations, named bright stars and the solar-system bodies
//! into one flat index that the visibility filter and name search walk.

pub mod types;
pub use types::{CatalogSources, ConstellationRecord, SOLAR_SYSTEM_BODIES, StarRecord};

pub mod parser;

mod index;
pub use index::{CONSTELLATIONS_FILE, CatalogIndex, RebuildReport, STARS_FILE, load_sources};

pub mod search;
