//! Multi-day outlook from the daily forecast feed
use chrono::Utc;
use skywatch_common::{DailyForecast, DayOutlook, FeedKind, Outlook, Verdict};

use super::classifier::{ForecastClass, KeywordPolicy};
use crate::error::{FeedError, SkyError};

fn day_outlook(day: &DailyForecast, policy: &KeywordPolicy) -> DayOutlook {
    let (verdict, mut reason) = if day.weather.trim().is_empty() {
        (Verdict::InsufficientData, "no forecast wording".to_string())
    } else {
        match policy.classify(&day.weather) {
            ForecastClass::Precipitation(term) => {
                (Verdict::Unfavorable, format!("precipitation expected ({})", term))
            }
            ForecastClass::Cloud(term) => (Verdict::Unfavorable, format!("cloud cover expected ({})", term)),
            ForecastClass::Clear(term) => (Verdict::Favorable, format!("clear wording ({})", term)),
            ForecastClass::Ambiguous => (Verdict::Marginal, "forecast wording is inconclusive".to_string()),
        }
    };

    if let (Some(min), Some(max)) = (day.min_humidity_pct, day.max_humidity_pct) {
        reason.push_str(&format!(", humidity {:.0}-{:.0}%", min, max));
    }

    DayOutlook {
        date: day.date,
        verdict,
        reason,
    }
}

/// Classify each forecast day, in feed order.
pub fn build_outlook(daily: Result<Vec<DailyForecast>, FeedError>, policy: &KeywordPolicy) -> Outlook {
    let (days, reason) = match daily {
        Ok(days) if days.is_empty() => (Vec::new(), Some("daily forecast feed returned no days".to_string())),
        Ok(days) => (days.iter().map(|d| day_outlook(d, policy)).collect(), None),
        Err(source) => {
            let err = SkyError::FeedUnavailable {
                feed: FeedKind::DailyForecast,
                source,
            };
            tracing::warn!("{}", err);
            (Vec::new(), Some(err.to_string()))
        }
    };

    Outlook {
        days,
        reason,
        generated_at: Utc::now(),
    }
}
