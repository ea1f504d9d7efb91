use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{RwLock, watch};
use tracing::{debug, info, warn};

use skywatch_common::{
    CelestialObject, GeoLocation, ObjectKind, Outlook, Recommendation, VisibilityResult,
};

use crate::config::EngineConfig;
use crate::error::SkyError;
use crate::module::catalog::{CatalogIndex, CatalogSources, RebuildReport, search};
use crate::module::orientation::OrientationTracker;
use crate::module::suitability::{
    KeywordPolicy, SuitabilityScorer, WeatherFeeds, build_outlook, fetch_all, fetch_daily,
};
use crate::module::visibility::{CoordinateOracle, VisibilityFilter};

/// Facade over orientation, catalog, visibility and suitability.
///
/// Every entry point returns a populated or explicitly empty outcome; errors
/// from collaborators are folded into reasons and rationales.
pub struct SkyEngine {
    orientation: Arc<OrientationTracker>,
    catalog: RwLock<CatalogIndex>,
    oracle: Option<Arc<dyn CoordinateOracle>>,
    feeds: Arc<dyn WeatherFeeds>,
    filter: VisibilityFilter,
    scorer: SuitabilityScorer,
    observer: GeoLocation,
    feed_timeout: Duration,
    search_threshold: f64,
    /// Bumped by every visibility request; only the newest may publish
    generation: AtomicU64,
    displayed: watch::Sender<Option<VisibilityResult>>,
    recommendation: watch::Sender<Option<Recommendation>>,
}

impl SkyEngine {
    pub fn new(config: &EngineConfig, feeds: Arc<dyn WeatherFeeds>) -> Result<Self, SkyError> {
        let policy = KeywordPolicy::new(&config.suitability.keywords)
            .map_err(|e| SkyError::Config(format!("invalid forecast keyword: {}", e)))?;

        let (displayed, _) = watch::channel(None);
        let (recommendation, _) = watch::channel(None);

        Ok(Self {
            orientation: Arc::new(OrientationTracker::new(&config.orientation)),
            catalog: RwLock::new(CatalogIndex::new(config.catalog.star_magnitude_limit)),
            oracle: None,
            feeds,
            filter: VisibilityFilter::new(&config.visibility),
            scorer: SuitabilityScorer::new(policy, config.suitability.sites.clone()),
            observer: config.observer,
            feed_timeout: Duration::from_secs(config.suitability.feed_timeout_secs),
            search_threshold: config.catalog.search_threshold,
            generation: AtomicU64::new(0),
            displayed,
            recommendation,
        })
    }

    /// Attach the coordinate transform collaborator used by visibility analysis.
    pub fn with_oracle(mut self, oracle: Arc<dyn CoordinateOracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    pub fn observer(&self) -> GeoLocation {
        self.observer
    }

    // ---- orientation ----

    /// Shared tracker, for wiring a heading stream listener
    pub fn orientation(&self) -> Arc<OrientationTracker> {
        self.orientation.clone()
    }

    pub fn submit_heading_sample(&self, raw_deg: f64, instant: DateTime<Utc>) -> bool {
        self.orientation.submit(raw_deg, instant)
    }

    pub fn continuous_heading(&self) -> f64 {
        self.orientation.continuous_heading()
    }

    pub fn raw_heading(&self) -> f64 {
        self.orientation.raw_heading()
    }

    // ---- catalog ----

    pub async fn rebuild_catalog(&self, sources: &CatalogSources) -> RebuildReport {
        self.catalog.write().await.rebuild(sources)
    }

    pub async fn catalog_len(&self) -> usize {
        self.catalog.read().await.len()
    }

    pub async fn find_object(&self, query: &str) -> Option<CelestialObject> {
        let catalog = self.catalog.read().await;
        search::find(query, catalog.entries()).cloned()
    }

    pub async fn search_objects(&self, query: &str) -> Vec<CelestialObject> {
        let catalog = self.catalog.read().await;
        search::search(query, catalog.entries(), self.search_threshold)
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn objects_of_kind(&self, kind: ObjectKind) -> Vec<CelestialObject> {
        self.catalog.read().await.of_kind(kind).cloned().collect()
    }

    // ---- visibility ----

    /// Objects in view along `heading_deg`.
    ///
    /// The result is always returned to the caller, but it only replaces the
    /// displayed result if no newer request has been made in the meantime.
    pub async fn request_visibility_analysis(&self, heading_deg: f64, location: GeoLocation) -> VisibilityResult {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let heading = self.filter.view_center(heading_deg).azimuth_deg;

        let result = match &self.oracle {
            None => VisibilityResult::empty(heading, "no coordinate transform service configured"),
            Some(oracle) => {
                let entries = self.catalog.read().await.snapshot();
                let oracle = oracle.clone();
                let filter = self.filter.clone();

                let scan = tokio::task::spawn_blocking(move || {
                    filter.analyze(heading_deg, &location, &entries, oracle.as_ref())
                });
                match scan.await {
                    Ok(result) => result,
                    Err(e) => {
                        warn!("Visibility analysis task failed: {}", e);
                        VisibilityResult::empty(heading, format!("analysis aborted: {}", e))
                    }
                }
            }
        };

        let published = self.displayed.send_if_modified(|slot| {
            if self.generation.load(Ordering::SeqCst) == generation {
                *slot = Some(result.clone());
                true
            } else {
                false
            }
        });
        if !published {
            debug!("Visibility analysis {} superseded by a newer request", result.analysis_id);
        }

        result
    }

    /// Same as [`Self::request_visibility_analysis`] with the heading captured now.
    pub async fn request_visibility_at_current_heading(&self, location: GeoLocation) -> VisibilityResult {
        let state = self.orientation.snapshot();
        if state.last_raw.is_none() {
            let err = SkyError::SensorUnavailable("no heading sample received yet".to_string());
            return VisibilityResult::empty(0.0, err.to_string());
        }
        self.request_visibility_analysis(state.raw_heading(), location).await
    }

    /// Latest published visibility result
    pub fn displayed_visibility(&self) -> Option<VisibilityResult> {
        self.displayed.borrow().clone()
    }

    pub fn subscribe_visibility(&self) -> watch::Receiver<Option<VisibilityResult>> {
        self.displayed.subscribe()
    }

    // ---- suitability ----

    pub async fn request_suitability_recommendation(&self) -> Recommendation {
        let bundle = fetch_all(self.feeds.as_ref(), self.feed_timeout).await;
        let recommendation = self.scorer.recommend(&bundle);

        info!(
            "Recommendation {}: {} (best site: {})",
            recommendation.run_id,
            recommendation.verdict,
            recommendation.best_site.as_deref().unwrap_or("none")
        );

        self.recommendation.send_replace(Some(recommendation.clone()));
        recommendation
    }

    pub fn latest_recommendation(&self) -> Option<Recommendation> {
        self.recommendation.borrow().clone()
    }

    pub fn subscribe_recommendation(&self) -> watch::Receiver<Option<Recommendation>> {
        self.recommendation.subscribe()
    }

    pub async fn request_outlook(&self) -> Outlook {
        let daily = fetch_daily(self.feeds.as_ref(), self.feed_timeout).await;
        build_outlook(daily, self.scorer.policy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::catalog::{ConstellationRecord, StarRecord};
    use crate::module::suitability::StaticFeeds;
    use crate::module::visibility::FlatSkyOracle;
    use skywatch_common::{
        DailyForecast, EquatorialCoord, HorizontalCoord, StationReading, Verdict,
    };

    fn sources() -> CatalogSources {
        CatalogSources {
            constellations: Some(vec![ConstellationRecord {
                id: "Ori".to_string(),
                name: "Orion".to_string(),
            }]),
            stars: Some(vec![
                StarRecord {
                    id: "32349".to_string(),
                    name: Some("Sirius".to_string()),
                    magnitude: Some(-1.46),
                },
                StarRecord {
                    id: "24436".to_string(),
                    name: Some("Rigel".to_string()),
                    magnitude: Some(0.13),
                },
            ]),
        }
    }

    fn engine(feeds: StaticFeeds) -> SkyEngine {
        SkyEngine::new(&EngineConfig::default(), Arc::new(feeds)).unwrap()
    }

    fn hong_kong() -> GeoLocation {
        GeoLocation::new(22.3, 114.2)
    }

    #[tokio::test]
    async fn test_visibility_at_current_heading() {
        let oracle = FlatSkyOracle::new(&[("Mars", 120.0, 40.0), ("Sirius", 120.0, 80.0)]);
        let engine = engine(StaticFeeds::new(Ok("Fine"))).with_oracle(Arc::new(oracle));
        engine.rebuild_catalog(&sources()).await;

        let result = engine.request_visibility_at_current_heading(hong_kong()).await;
        assert!(result.is_empty());
        assert!(result.reason.unwrap().contains("no heading sample"));

        let t0 = Utc::now();
        assert!(engine.submit_heading_sample(120.0, t0));
        let result = engine.request_visibility_at_current_heading(hong_kong()).await;
        let names: Vec<&str> = result.objects.iter().map(|v| v.object.name.as_str()).collect();
        assert_eq!(names, vec!["Mars"]);
        assert_eq!(engine.displayed_visibility(), Some(result));
    }

    #[tokio::test]
    async fn test_visibility_without_oracle_is_empty_with_reason() {
        let engine = engine(StaticFeeds::new(Ok("Fine")));
        engine.rebuild_catalog(&sources()).await;

        let result = engine.request_visibility_analysis(400.0, hong_kong()).await;
        assert!(result.is_empty());
        assert_eq!(result.heading_deg, 40.0);
        assert!(result.reason.is_some());
    }

    /// Oracle that stalls when asked about one particular view direction
    struct StallingOracle {
        inner: FlatSkyOracle,
        slow_azimuth: f64,
    }

    impl CoordinateOracle for StallingOracle {
        fn resolve_coordinates(&self, kind: ObjectKind, name: &str, id: Option<&str>) -> Option<EquatorialCoord> {
            self.inner.resolve_coordinates(kind, name, id)
        }

        fn horizontal_position(&self, coord: &EquatorialCoord, location: &GeoLocation) -> HorizontalCoord {
            self.inner.horizontal_position(coord, location)
        }

        fn equatorial_position(&self, coord: &HorizontalCoord, location: &GeoLocation) -> EquatorialCoord {
            if coord.azimuth_deg == self.slow_azimuth {
                std::thread::sleep(std::time::Duration::from_millis(300));
            }
            self.inner.equatorial_position(coord, location)
        }
    }

    #[tokio::test]
    async fn test_newer_request_supersedes_stale_one() {
        let oracle = StallingOracle {
            inner: FlatSkyOracle::new(&[("Mars", 90.0, 40.0), ("Venus", 10.0, 40.0)]),
            slow_azimuth: 90.0,
        };
        let engine = engine(StaticFeeds::new(Ok("Fine"))).with_oracle(Arc::new(oracle));
        // Planets only
        engine.rebuild_catalog(&CatalogSources::default()).await;
        let mut receiver = engine.subscribe_visibility();

        let (stale, fresh) = tokio::join!(
            engine.request_visibility_analysis(90.0, hong_kong()),
            engine.request_visibility_analysis(10.0, hong_kong()),
        );

        // Both callers get their own answer
        assert_eq!(stale.objects[0].object.name, "Mars");
        assert_eq!(fresh.objects[0].object.name, "Venus");

        // Only the newer one is displayed
        let displayed = engine.displayed_visibility().unwrap();
        assert_eq!(displayed.analysis_id, fresh.analysis_id);
        assert!(receiver.has_changed().unwrap());
        assert_eq!(receiver.borrow_and_update().as_ref().unwrap().heading_deg, 10.0);
    }

    #[tokio::test]
    async fn test_heading_captured_when_requested() {
        let oracle = StallingOracle {
            inner: FlatSkyOracle::new(&[("Mars", 90.0, 40.0), ("Venus", 10.0, 40.0)]),
            slow_azimuth: 90.0,
        };
        let engine = engine(StaticFeeds::new(Ok("Fine"))).with_oracle(Arc::new(oracle));
        engine.rebuild_catalog(&CatalogSources::default()).await;

        let t0 = Utc::now();
        assert!(engine.submit_heading_sample(90.0, t0));

        // The device turns while the scan for 90 degrees is still running
        let (result, accepted) = tokio::join!(
            engine.request_visibility_at_current_heading(hong_kong()),
            async {
                tokio::time::sleep(std::time::Duration::from_millis(50)).await;
                engine.submit_heading_sample(10.0, t0 + chrono::Duration::seconds(1))
            },
        );

        assert!(accepted);
        assert_eq!(engine.raw_heading(), 10.0);
        assert_eq!(result.heading_deg, 90.0);
        let names: Vec<&str> = result.objects.iter().map(|v| v.object.name.as_str()).collect();
        assert_eq!(names, vec!["Mars"]);
    }

    #[tokio::test]
    async fn test_catalog_lookup() {
        let engine = engine(StaticFeeds::new(Ok("Fine")));
        let report = engine.rebuild_catalog(&sources()).await;
        assert_eq!(report.constellations, 1);
        assert_eq!(report.stars, 2);

        assert_eq!(engine.find_object("  sirius ").await.unwrap().kind, ObjectKind::Star);
        assert!(engine.find_object("Betelgeuse").await.is_none());

        let suggestions = engine.search_objects("Orio").await;
        assert_eq!(suggestions[0].name, "Orion");

        let planets = engine.objects_of_kind(ObjectKind::Planet).await;
        assert_eq!(planets.len(), 9);

        // Rebuilding again replaces rather than appends
        engine.rebuild_catalog(&sources()).await;
        assert_eq!(engine.catalog_len().await, 12);
    }

    #[tokio::test]
    async fn test_recommendation_published() {
        let mut feeds = StaticFeeds::new(Ok("Fine and dry."));
        feeds.stations = Ok(vec![StationReading {
            station_name: "Sai Kung".to_string(),
            temperature_c: Some(24.0),
            humidity_pct: Some(55.0),
            visibility_km: None,
        }]);
        let engine = engine(feeds);
        assert!(engine.latest_recommendation().is_none());

        let rec = engine.request_suitability_recommendation().await;
        assert_eq!(rec.verdict, Verdict::Favorable);
        assert_eq!(rec.best_site.as_deref(), Some("Sai Kung East Country Park"));
        assert_eq!(engine.latest_recommendation().unwrap().run_id, rec.run_id);
    }

    #[tokio::test]
    async fn test_recommendation_without_forecast() {
        let engine = engine(StaticFeeds::new(Err("connection reset")));
        let rec = engine.request_suitability_recommendation().await;
        assert_eq!(rec.verdict, Verdict::InsufficientData);
        assert_eq!(rec.feeds.len(), 3);
    }

    #[tokio::test]
    async fn test_outlook() {
        let unsupported = engine(StaticFeeds::new(Ok("Fine")));
        let outlook = unsupported.request_outlook().await;
        assert!(outlook.days.is_empty());
        assert!(outlook.reason.is_some());

        let mut feeds = StaticFeeds::new(Ok("Fine"));
        feeds.daily = Some(vec![DailyForecast {
            date: chrono::NaiveDate::from_ymd_opt(2023, 10, 21).unwrap(),
            weather: "Isolated showers.".to_string(),
            min_temp_c: None,
            max_temp_c: None,
            min_humidity_pct: None,
            max_humidity_pct: None,
        }]);
        let outlook = engine(feeds).request_outlook().await;
        assert_eq!(outlook.days[0].verdict, Verdict::Unfavorable);
    }

    #[test]
    fn test_heading_passthrough() {
        let engine = engine(StaticFeeds::new(Ok("Fine")));
        let t0 = Utc::now();
        assert!(engine.submit_heading_sample(350.0, t0));
        assert!(engine.submit_heading_sample(10.0, t0 + chrono::Duration::milliseconds(200)));
        assert_eq!(engine.raw_heading(), 10.0);
        assert_eq!(engine.continuous_heading(), 370.0);
    }
}
