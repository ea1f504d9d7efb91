//! Catalog index - flat list of every searchable object
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use skywatch_common::{CelestialObject, ObjectKind};
use tokio::fs;

use super::parser::{parse_constellations, parse_stars};
use super::types::{CatalogSources, SOLAR_SYSTEM_BODIES};

pub const CONSTELLATIONS_FILE: &str = "constellations.json";
pub const STARS_FILE: &str = "stars.json";

/// Counts per contribution of the last rebuild
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RebuildReport {
    pub constellations: usize,
    pub stars: usize,
    pub planets: usize,
    pub duplicates_skipped: usize,
}

impl RebuildReport {
    pub fn total(&self) -> usize {
        self.constellations + self.stars + self.planets
    }
}

#[derive(Debug, Clone)]
pub struct CatalogIndex {
    entries: Arc<Vec<CelestialObject>>,
    star_magnitude_limit: f64,
}

impl CatalogIndex {
    pub fn new(star_magnitude_limit: f64) -> Self {
        Self {
            entries: Arc::new(Vec::new()),
            star_magnitude_limit,
        }
    }

    /// Replace the whole index from `sources`.
    ///
    /// Order is constellations, then stars, then solar-system bodies. A source
    /// that is `None` contributes nothing. The first occurrence of a
    /// `(kind, name)` key wins.
    pub fn rebuild(&mut self, sources: &CatalogSources) -> RebuildReport {
        let mut report = RebuildReport::default();
        let mut entries = Vec::new();
        let mut seen: HashSet<(ObjectKind, String)> = HashSet::new();

        let mut push = |object: CelestialObject, report: &mut RebuildReport| -> bool {
            let (kind, name) = object.key();
            if seen.insert((kind, name.to_string())) {
                entries.push(object);
                true
            } else {
                tracing::debug!("Duplicate catalog entry skipped: {} '{}'", object.kind, object.name);
                report.duplicates_skipped += 1;
                false
            }
        };

        for record in sources.constellations.iter().flatten() {
            let object = CelestialObject::new(
                ObjectKind::Constellation,
                record.name.clone(),
                Some(record.id.clone()),
            );
            if push(object, &mut report) {
                report.constellations += 1;
            }
        }

        for record in sources.stars.iter().flatten() {
            let (Some(name), Some(magnitude)) = (&record.name, record.magnitude) else {
                continue;
            };
            if magnitude >= self.star_magnitude_limit {
                continue;
            }
            let object = CelestialObject::new(ObjectKind::Star, name.clone(), Some(record.id.clone()));
            if push(object, &mut report) {
                report.stars += 1;
            }
        }

        for body in SOLAR_SYSTEM_BODIES {
            if push(CelestialObject::new(ObjectKind::Planet, body, None), &mut report) {
                report.planets += 1;
            }
        }

        self.entries = Arc::new(entries);

        tracing::info!(
            "Catalog rebuilt: {} constellations, {} stars, {} solar-system bodies",
            report.constellations,
            report.stars,
            report.planets
        );

        report
    }

    /// Cheap shared view of the current entries
    pub fn snapshot(&self) -> Arc<Vec<CelestialObject>> {
        self.entries.clone()
    }

    pub fn entries(&self) -> &[CelestialObject] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn of_kind(&self, kind: ObjectKind) -> impl Iterator<Item = &CelestialObject> {
        self.entries.iter().filter(move |o| o.kind == kind)
    }
}

/// Read catalog sources from `data_dir`.
///
/// Missing or unparsable files degrade to `None` for that source.
pub async fn load_sources(data_dir: impl AsRef<Path>) -> CatalogSources {
    let data_dir = data_dir.as_ref();

    let constellations = match fs::read_to_string(data_dir.join(CONSTELLATIONS_FILE)).await {
        Ok(json) => parse_constellations(&json)
            .map_err(|e| tracing::warn!("Constellation source unusable: {:#}", e))
            .ok(),
        Err(e) => {
            tracing::warn!("Constellation source not loaded from {:?}: {}", data_dir, e);
            None
        }
    };

    let stars = match fs::read_to_string(data_dir.join(STARS_FILE)).await {
        Ok(json) => parse_stars(&json)
            .map_err(|e| tracing::warn!("Star source unusable: {:#}", e))
            .ok(),
        Err(e) => {
            tracing::warn!("Star source not loaded from {:?}: {}", data_dir, e);
            None
        }
    };

    CatalogSources { constellations, stars }
}
