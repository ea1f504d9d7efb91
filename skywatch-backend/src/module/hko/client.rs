//! Hong Kong Observatory feed client
//!
//! Fetches the open-data endpoints and hands the bodies to the parsers.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use skywatch_common::{DailyForecast, StationReading, VisibilityReading};

use super::parser::{
    parse_current_report, parse_local_forecast, parse_nine_day_forecast, parse_visibility_table,
};
use crate::config::HkoConfig;
use crate::error::FeedError;
use crate::module::suitability::{ForecastSummary, WeatherFeeds};

const USER_AGENT: &str = "Mozilla/5.0 Skywatch/1.0";

pub struct HkoClient {
    client: Client,
    config: HkoConfig,
}

impl HkoClient {
    pub fn new(config: &HkoConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build reqwest client")?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    async fn get_text(&self, url: &str) -> Result<String, FeedError> {
        tracing::debug!("Fetching {}", url);

        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        Ok(body)
    }
}

fn malformed(e: anyhow::Error) -> FeedError {
    FeedError::Malformed(format!("{:#}", e))
}

#[async_trait]
impl WeatherFeeds for HkoClient {
    async fn fetch_forecast_summary(&self) -> Result<ForecastSummary, FeedError> {
        let body = self.get_text(&self.config.forecast_url).await?;
        parse_local_forecast(&body).map_err(malformed)
    }

    async fn fetch_station_readings(&self) -> Result<Vec<StationReading>, FeedError> {
        let body = self.get_text(&self.config.readings_url).await?;
        let readings = parse_current_report(&body).map_err(malformed)?;
        tracing::debug!("HKO current report: {} stations", readings.len());
        Ok(readings)
    }

    async fn fetch_visibility_readings(&self) -> Result<Vec<VisibilityReading>, FeedError> {
        let body = self.get_text(&self.config.visibility_url).await?;
        let readings = parse_visibility_table(&body).map_err(malformed)?;
        tracing::debug!("HKO visibility: {} stations", readings.len());
        Ok(readings)
    }

    async fn fetch_daily_forecast(&self) -> Result<Vec<DailyForecast>, FeedError> {
        let body = self.get_text(&self.config.daily_forecast_url).await?;
        parse_nine_day_forecast(&body).map_err(malformed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builds_from_default_config() {
        assert!(HkoClient::new(&HkoConfig::default()).is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_http_error() {
        let config = HkoConfig {
            forecast_url: "http://127.0.0.1:9/flw".to_string(),
            request_timeout_secs: 2,
            ..HkoConfig::default()
        };
        let client = HkoClient::new(&config).unwrap();

        let err = client.fetch_forecast_summary().await.unwrap_err();
        assert!(matches!(err, FeedError::Http(_)));
    }

    #[test]
    fn test_malformed_keeps_context_chain() {
        let err = malformed(parse_local_forecast("not json").unwrap_err());
        let text = err.to_string();
        assert!(text.starts_with("malformed payload: Failed to deserialize local forecast JSON"));
    }
}
