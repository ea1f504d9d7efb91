//! Telemetry collaborators and the concurrent three-feed fetch
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use skywatch_common::{DailyForecast, FeedKind, FeedStatus, StationReading, VisibilityReading};

use crate::error::FeedError;

/// Forecast text for the coming night
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSummary {
    /// e.g. "Weather forecast for tonight and tomorrow"
    pub period: Option<String>,
    /// Forecast wording that is classified
    pub description: String,
    pub outlook: Option<String>,
    pub updated_at: Option<String>,
}

impl ForecastSummary {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            period: None,
            description: description.into(),
            outlook: None,
            updated_at: None,
        }
    }
}

/// Independent, individually fallible weather feeds
#[async_trait]
pub trait WeatherFeeds: Send + Sync {
    async fn fetch_forecast_summary(&self) -> Result<ForecastSummary, FeedError>;

    async fn fetch_station_readings(&self) -> Result<Vec<StationReading>, FeedError>;

    async fn fetch_visibility_readings(&self) -> Result<Vec<VisibilityReading>, FeedError>;

    /// Multi-day forecast; sources without one keep the default
    async fn fetch_daily_forecast(&self) -> Result<Vec<DailyForecast>, FeedError> {
        Err(FeedError::Unsupported)
    }
}

/// Settled results of one fetch round, one slot per feed
#[derive(Debug)]
pub struct FeedBundle {
    pub forecast: Result<ForecastSummary, FeedError>,
    pub stations: Result<Vec<StationReading>, FeedError>,
    pub visibility: Result<Vec<VisibilityReading>, FeedError>,
}

impl FeedBundle {
    pub fn statuses(&self) -> Vec<FeedStatus> {
        vec![
            status(FeedKind::Forecast, &self.forecast),
            status(FeedKind::StationReadings, &self.stations),
            status(FeedKind::VisibilityReadings, &self.visibility),
        ]
    }
}

pub(crate) fn status<T>(feed: FeedKind, result: &Result<T, FeedError>) -> FeedStatus {
    FeedStatus {
        feed,
        ok: result.is_ok(),
        detail: result.as_ref().err().map(|e| e.to_string()),
    }
}

pub(crate) async fn with_timeout<T, F>(feed: FeedKind, timeout: Duration, fut: F) -> Result<T, FeedError>
where
    F: Future<Output = Result<T, FeedError>>,
{
    let result = match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(FeedError::Timeout(timeout.as_secs())),
    };

    match &result {
        Ok(_) => tracing::debug!("{} feed fetched", feed),
        Err(e) => tracing::warn!("{} feed failed: {}", feed, e),
    }

    result
}

/// Fetch the three suitability feeds concurrently.
///
/// Every branch runs to completion (or its own timeout); one failure never
/// cancels the others.
pub async fn fetch_all(feeds: &dyn WeatherFeeds, timeout: Duration) -> FeedBundle {
    let (forecast, stations, visibility) = tokio::join!(
        with_timeout(FeedKind::Forecast, timeout, feeds.fetch_forecast_summary()),
        with_timeout(FeedKind::StationReadings, timeout, feeds.fetch_station_readings()),
        with_timeout(FeedKind::VisibilityReadings, timeout, feeds.fetch_visibility_readings()),
    );

    FeedBundle {
        forecast,
        stations,
        visibility,
    }
}

pub async fn fetch_daily(feeds: &dyn WeatherFeeds, timeout: Duration) -> Result<Vec<DailyForecast>, FeedError> {
    with_timeout(FeedKind::DailyForecast, timeout, feeds.fetch_daily_forecast()).await
}
