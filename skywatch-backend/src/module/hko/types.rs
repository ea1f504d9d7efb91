//! Hong Kong Observatory open-data payloads
//!
//! Only the fields the engine reads are modelled; everything else in the
//! responses is ignored.

use serde::Deserialize;

/// `dataType=flw`, local weather forecast
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalForecast {
    #[serde(default)]
    pub forecast_period: Option<String>,
    #[serde(default)]
    pub forecast_desc: String,
    #[serde(default)]
    pub outlook: Option<String>,
    #[serde(default)]
    pub update_time: Option<String>,
}

/// One `{place, value, unit}` entry of `rhrread`
#[derive(Debug, Deserialize)]
pub struct PlaceValue {
    pub place: String,
    pub value: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PlaceSeries {
    #[serde(default)]
    pub data: Vec<PlaceValue>,
}

/// `dataType=rhrread`, current weather report
#[derive(Debug, Deserialize)]
pub struct CurrentReport {
    #[serde(default)]
    pub temperature: PlaceSeries,
    #[serde(default)]
    pub humidity: PlaceSeries,
}

/// `dataType=LTMV`, 10-minute mean visibility
///
/// Rows look like `["202310201900", "Central", "35 km"]`.
#[derive(Debug, Deserialize)]
pub struct VisibilityTable {
    #[serde(default)]
    pub fields: Vec<String>,
    #[serde(default)]
    pub data: Vec<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct Measure {
    pub value: Option<f64>,
}

/// One day of `dataType=fnd`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastDay {
    /// `YYYYMMDD`
    pub forecast_date: String,
    #[serde(default)]
    pub forecast_weather: String,
    #[serde(default)]
    pub forecast_maxtemp: Option<Measure>,
    #[serde(default)]
    pub forecast_mintemp: Option<Measure>,
    #[serde(default)]
    pub forecast_maxrh: Option<Measure>,
    #[serde(default)]
    pub forecast_minrh: Option<Measure>,
}

/// `dataType=fnd`, nine-day forecast
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NineDayForecast {
    #[serde(default)]
    pub weather_forecast: Vec<ForecastDay>,
}
