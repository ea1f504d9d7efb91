//! Directional visibility filter
//!
//! Models a phone held level and tilted slightly up: the view center is the
//! captured heading at a fixed altitude, and everything within a fixed radius
//! of it that is above the horizon counts as "in view".

use chrono::Utc;
use skywatch_common::{
    CelestialObject, GeoLocation, HorizontalCoord, VisibilityResult, VisibleObject,
};

use super::oracle::CoordinateOracle;
use crate::config::VisibilityConfig;
use crate::error::SkyError;

#[derive(Debug, Clone, Copy, Default)]
struct ScanStats {
    unresolved: usize,
    below_horizon: usize,
    outside_view: usize,
}

#[derive(Debug, Clone)]
pub struct VisibilityFilter {
    view_altitude_deg: f64,
    fov_radius_deg: f64,
    max_results: usize,
}

impl VisibilityFilter {
    pub fn new(config: &VisibilityConfig) -> Self {
        Self {
            view_altitude_deg: config.view_altitude_deg,
            fov_radius_deg: config.fov_radius_deg,
            max_results: config.max_results,
        }
    }

    pub fn view_center(&self, heading_deg: f64) -> HorizontalCoord {
        HorizontalCoord::new(heading_deg.rem_euclid(360.0), self.view_altitude_deg)
    }

    /// Rank the catalog objects that are above the horizon and within the
    /// field of view around `heading_deg`.
    ///
    /// Never fails: objects the oracle cannot place are skipped, and an empty
    /// outcome carries a reason.
    pub fn analyze(
        &self,
        heading_deg: f64,
        location: &GeoLocation,
        catalog: &[CelestialObject],
        oracle: &dyn CoordinateOracle,
    ) -> VisibilityResult {
        let center = self.view_center(heading_deg);
        let empty = |reason: String| VisibilityResult::empty(center.azimuth_deg, reason);

        if !heading_deg.is_finite() {
            return empty(format!("heading {} is not a usable direction", heading_deg));
        }
        if catalog.is_empty() {
            return empty("catalog is empty".to_string());
        }

        let center_eq = oracle.equatorial_position(&center, location);
        if !center_eq.is_finite() {
            return empty("view direction could not be converted to sky coordinates".to_string());
        }

        let mut stats = ScanStats::default();
        let mut visible = Vec::new();

        for object in catalog {
            let coord = match oracle
                .resolve_coordinates(object.kind, &object.name, object.catalog_id.as_deref())
                .filter(|c| c.is_finite())
            {
                Some(coord) => coord,
                None => {
                    let skipped = SkyError::CoordinateUnresolved {
                        kind: object.kind,
                        name: object.name.clone(),
                    };
                    tracing::trace!("{}", skipped);
                    stats.unresolved += 1;
                    continue;
                }
            };

            let altitude = oracle.horizontal_position(&coord, location).altitude_deg;
            if !altitude.is_finite() || altitude <= 0.0 {
                stats.below_horizon += 1;
                continue;
            }

            let distance = oracle.angular_separation(&center_eq, &coord);
            if !distance.is_finite() || distance > self.fov_radius_deg {
                stats.outside_view += 1;
                continue;
            }

            visible.push(VisibleObject {
                object: object.clone(),
                angular_distance_deg: distance,
                altitude_deg: altitude,
            });
        }

        // sort_by is stable, so equal distances keep catalog order
        visible.sort_by(|a, b| {
            a.angular_distance_deg
                .partial_cmp(&b.angular_distance_deg)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        visible.truncate(self.max_results);

        tracing::debug!(
            "Visibility scan at {:.1}°: {} in view, {} below horizon, {} outside view, {} unresolved",
            center.azimuth_deg,
            visible.len(),
            stats.below_horizon,
            stats.outside_view,
            stats.unresolved
        );

        if visible.is_empty() {
            return empty(format!(
                "no notable objects in this direction ({} below horizon, {} outside field of view, {} unresolved)",
                stats.below_horizon, stats.outside_view, stats.unresolved
            ));
        }

        VisibilityResult {
            analysis_id: uuid::Uuid::now_v7().to_string(),
            heading_deg: center.azimuth_deg,
            objects: visible,
            reason: None,
            computed_at: Utc::now(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use skywatch_common::{EquatorialCoord, ObjectKind};
    use std::collections::HashMap;

    /// Oracle whose sky is pinned to the horizon frame: ra == azimuth and
    /// dec == altitude, independent of location and time.
    pub(crate) struct FlatSkyOracle {
        pub positions: HashMap<String, EquatorialCoord>,
    }

    impl FlatSkyOracle {
        pub(crate) fn new(positions: &[(&str, f64, f64)]) -> Self {
            Self {
                positions: positions
                    .iter()
                    .map(|&(name, az, alt)| (name.to_string(), EquatorialCoord::new(az, alt)))
                    .collect(),
            }
        }
    }

    impl CoordinateOracle for FlatSkyOracle {
        fn resolve_coordinates(&self, _kind: ObjectKind, name: &str, _id: Option<&str>) -> Option<EquatorialCoord> {
            self.positions.get(name).copied()
        }

        fn horizontal_position(&self, coord: &EquatorialCoord, _location: &GeoLocation) -> HorizontalCoord {
            HorizontalCoord::new(coord.ra_deg, coord.dec_deg)
        }

        fn equatorial_position(&self, coord: &HorizontalCoord, _location: &GeoLocation) -> EquatorialCoord {
            EquatorialCoord::new(coord.azimuth_deg, coord.altitude_deg)
        }
    }

    fn planet(name: &str) -> CelestialObject {
        CelestialObject::new(ObjectKind::Planet, name, None)
    }

    fn star(name: &str) -> CelestialObject {
        CelestialObject::new(ObjectKind::Star, name, Some(format!("hip-{}", name)))
    }

    fn hong_kong() -> GeoLocation {
        GeoLocation::new(22.3, 114.2)
    }

    fn filter() -> VisibilityFilter {
        VisibilityFilter::new(&VisibilityConfig::default())
    }

    #[test]
    fn test_field_of_view_keeps_near_object_only() {
        // View center is (az 120, alt 30): Mars 10° away, Sirius 50° away
        let oracle = FlatSkyOracle::new(&[("Mars", 120.0, 40.0), ("Sirius", 120.0, 80.0)]);
        let catalog = vec![star("Sirius"), planet("Mars")];

        let result = filter().analyze(120.0, &hong_kong(), &catalog, &oracle);
        assert_eq!(result.objects.len(), 1);
        assert_eq!(result.objects[0].object.name, "Mars");
        assert!((result.objects[0].angular_distance_deg - 10.0).abs() < 1e-9);
        assert!(result.reason.is_none());
    }

    #[test]
    fn test_below_horizon_excluded_even_when_close() {
        // 30° from center but at altitude 0
        let oracle = FlatSkyOracle::new(&[("Moon", 90.0, 0.0), ("Venus", 90.0, -5.0), ("Jupiter", 90.0, 1.0)]);
        let catalog = vec![planet("Moon"), planet("Venus"), planet("Jupiter")];

        let result = filter().analyze(90.0, &hong_kong(), &catalog, &oracle);
        let names: Vec<&str> = result.objects.iter().map(|v| v.object.name.as_str()).collect();
        assert_eq!(names, vec!["Jupiter"]);
        assert!(result.objects.iter().all(|v| v.altitude_deg > 0.0));
    }

    #[test]
    fn test_sorted_ascending_and_capped() {
        let positions: Vec<(String, f64, f64)> = (0..8)
            .map(|i| (format!("Star{}", i), 200.0, 30.0 + 40.0 - 5.0 * i as f64))
            .collect();
        let refs: Vec<(&str, f64, f64)> = positions.iter().map(|(n, a, b)| (n.as_str(), *a, *b)).collect();
        let oracle = FlatSkyOracle::new(&refs);
        let catalog: Vec<CelestialObject> = positions.iter().map(|(n, _, _)| star(n)).collect();

        let result = filter().analyze(200.0, &hong_kong(), &catalog, &oracle);
        assert_eq!(result.objects.len(), 5);
        for pair in result.objects.windows(2) {
            assert!(pair[0].angular_distance_deg <= pair[1].angular_distance_deg);
        }
        assert_eq!(result.objects[0].object.name, "Star7");
    }

    #[test]
    fn test_ties_keep_catalog_order() {
        let oracle = FlatSkyOracle::new(&[("Castor", 10.0, 40.0), ("Pollux", 10.0, 20.0)]);
        let catalog = vec![star("Pollux"), star("Castor")];

        let result = filter().analyze(10.0, &hong_kong(), &catalog, &oracle);
        let names: Vec<&str> = result.objects.iter().map(|v| v.object.name.as_str()).collect();
        assert_eq!(names, vec!["Pollux", "Castor"]);
    }

    #[test]
    fn test_unresolved_objects_skipped() {
        let oracle = FlatSkyOracle::new(&[("Saturn", 300.0, 35.0)]);
        let catalog = vec![planet("Pluto"), planet("Saturn")];

        let result = filter().analyze(300.0, &hong_kong(), &catalog, &oracle);
        assert_eq!(result.objects.len(), 1);
        assert_eq!(result.objects[0].object.name, "Saturn");
    }

    #[test]
    fn test_heading_wraps_into_compass_range() {
        let oracle = FlatSkyOracle::new(&[("Vega", 5.0, 30.0)]);
        let result = filter().analyze(725.0, &hong_kong(), &[star("Vega")], &oracle);
        assert_eq!(result.heading_deg, 5.0);
        assert_eq!(result.objects.len(), 1);
    }

    #[test]
    fn test_empty_outcomes_carry_reason() {
        let oracle = FlatSkyOracle::new(&[("Mars", 180.0, 40.0)]);

        let result = filter().analyze(0.0, &hong_kong(), &[planet("Mars")], &oracle);
        assert!(result.is_empty());
        assert!(result.reason.as_deref().unwrap().contains("1 outside field of view"));

        let result = filter().analyze(0.0, &hong_kong(), &[], &oracle);
        assert_eq!(result.reason.as_deref(), Some("catalog is empty"));

        let result = filter().analyze(f64::NAN, &hong_kong(), &[planet("Mars")], &oracle);
        assert!(result.is_empty());
        assert!(result.reason.is_some());
    }
}
