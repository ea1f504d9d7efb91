//! Observation suitability
//!
//! Fetches forecast wording and station telemetry concurrently, classifies
//! the wording and ranks candidate sites.

mod classifier;
pub use classifier::{ForecastClass, KeywordPolicy};

mod feeds;
pub use feeds::{FeedBundle, ForecastSummary, WeatherFeeds, fetch_all, fetch_daily};

mod scorer;
pub use scorer::{SuitabilityScorer, merge_readings, score_sites};

mod outlook;
pub use outlook::build_outlook;

#[cfg(test)]
pub(crate) use feeds::tests::StaticFeeds;
