//! Hong Kong Observatory JSON parsers
//!
//! Turn the raw open-data responses into engine types. Malformed rows are
//! skipped with a warning; a body that is not the expected JSON at all is
//! an error.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use skywatch_common::{DailyForecast, StationReading, VisibilityReading};

use super::types::{CurrentReport, LocalForecast, NineDayForecast, VisibilityTable};
use crate::module::suitability::ForecastSummary;

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Parse `flw` into a forecast summary.
pub fn parse_local_forecast(json: &str) -> Result<ForecastSummary> {
    let raw: LocalForecast =
        serde_json::from_str(json).context("Failed to deserialize local forecast JSON")?;

    Ok(ForecastSummary {
        period: raw.forecast_period.filter(|s| !s.trim().is_empty()),
        description: raw.forecast_desc.trim().to_string(),
        outlook: raw.outlook.filter(|s| !s.trim().is_empty()),
        updated_at: raw.update_time,
    })
}

/// Parse `rhrread`, joining temperature and humidity by place.
///
/// Stations keep the order in which they first appear.
pub fn parse_current_report(json: &str) -> Result<Vec<StationReading>> {
    let raw: CurrentReport =
        serde_json::from_str(json).context("Failed to deserialize current weather report JSON")?;

    let mut readings: Vec<StationReading> = Vec::new();
    let mut slot = |place: &str| -> Option<usize> {
        let place = place.trim();
        if place.is_empty() {
            return None;
        }
        match readings.iter().position(|r| r.station_name == place) {
            Some(idx) => Some(idx),
            None => {
                readings.push(StationReading::new(place));
                Some(readings.len() - 1)
            }
        }
    };

    let mut temperatures = Vec::new();
    for entry in &raw.temperature.data {
        if let Some(idx) = slot(&entry.place) {
            temperatures.push((idx, finite(entry.value)));
        }
    }
    let mut humidities = Vec::new();
    for entry in &raw.humidity.data {
        if let Some(idx) = slot(&entry.place) {
            humidities.push((idx, finite(entry.value)));
        }
    }

    for (idx, value) in temperatures {
        readings[idx].temperature_c = value;
    }
    for (idx, value) in humidities {
        readings[idx].humidity_pct = value;
    }

    Ok(readings)
}

/// "35 km" -> 35.0
fn parse_distance_km(text: &str) -> Option<f64> {
    let number = text.trim().trim_end_matches("km").trim();
    number.parse::<f64>().ok().filter(|v| v.is_finite() && *v >= 0.0)
}

/// Parse `LTMV`. The last column is the visibility, the one before it the
/// station name.
pub fn parse_visibility_table(json: &str) -> Result<Vec<VisibilityReading>> {
    let raw: VisibilityTable =
        serde_json::from_str(json).context("Failed to deserialize visibility JSON")?;

    let readings = raw
        .data
        .iter()
        .filter_map(|row| {
            let (station, distance) = match row.as_slice() {
                [.., station, distance] => (station, distance),
                _ => {
                    tracing::warn!("Skipping short visibility row: {:?}", row);
                    return None;
                }
            };
            match parse_distance_km(distance) {
                Some(visibility_km) if !station.trim().is_empty() => Some(VisibilityReading {
                    station_name: station.trim().to_string(),
                    visibility_km,
                }),
                _ => {
                    tracing::warn!("Skipping unreadable visibility row: {:?}", row);
                    None
                }
            }
        })
        .collect();

    Ok(readings)
}

/// Parse `fnd` into daily forecasts, in feed order.
pub fn parse_nine_day_forecast(json: &str) -> Result<Vec<DailyForecast>> {
    let raw: NineDayForecast =
        serde_json::from_str(json).context("Failed to deserialize nine-day forecast JSON")?;

    let value = |m: &Option<super::types::Measure>| finite(m.as_ref().and_then(|m| m.value));

    let days = raw
        .weather_forecast
        .iter()
        .filter_map(|day| {
            let date = match NaiveDate::parse_from_str(day.forecast_date.trim(), "%Y%m%d") {
                Ok(date) => date,
                Err(e) => {
                    tracing::warn!("Skipping forecast day with date '{}': {}", day.forecast_date, e);
                    return None;
                }
            };
            Some(DailyForecast {
                date,
                weather: day.forecast_weather.trim().to_string(),
                min_temp_c: value(&day.forecast_mintemp),
                max_temp_c: value(&day.forecast_maxtemp),
                min_humidity_pct: value(&day.forecast_minrh),
                max_humidity_pct: value(&day.forecast_maxrh),
            })
        })
        .collect();

    Ok(days)
}
