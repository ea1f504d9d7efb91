//! Observation-suitability scorer
//!
//! The site score is `visibility_km - humidity_pct`. The units do not mix in
//! any physical sense; it is a ranking weight that favours long visibility
//! and dry air, and is kept as such.

use std::collections::HashMap;

use chrono::Utc;
use skywatch_common::{
    Recommendation, SiteCandidate, SiteScore, StationReading, Verdict, VisibilityReading,
};

use super::classifier::{ForecastClass, KeywordPolicy};
use super::feeds::FeedBundle;
use crate::error::SkyError;

fn station_key(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Combine station readings with visibility readings, keyed by station name.
///
/// The first reading of a station wins; visibility readings fill in (or
/// override) the visibility of the matching station.
pub fn merge_readings(
    stations: &[StationReading],
    visibility: &[VisibilityReading],
) -> HashMap<String, StationReading> {
    let mut merged: HashMap<String, StationReading> = HashMap::new();

    for reading in stations {
        merged
            .entry(station_key(&reading.station_name))
            .or_insert_with(|| reading.clone());
    }

    for reading in visibility {
        merged
            .entry(station_key(&reading.station_name))
            .or_insert_with(|| StationReading::new(reading.station_name.clone()))
            .visibility_km = Some(reading.visibility_km);
    }

    merged
}

/// Score every site whose station has both temperature and humidity.
///
/// Output is best first; equal scores keep the order of `sites`.
pub fn score_sites(sites: &[SiteCandidate], readings: &HashMap<String, StationReading>) -> Vec<SiteScore> {
    let mut scores: Vec<SiteScore> = sites
        .iter()
        .filter_map(|site| {
            let reading = readings.get(&station_key(&site.nearest_station))?;
            let temperature_c = finite(reading.temperature_c)?;
            let humidity_pct = finite(reading.humidity_pct)?;
            let visibility_km = finite(reading.visibility_km);

            Some(SiteScore {
                site_name: site.site_name.clone(),
                station_name: reading.station_name.clone(),
                score: visibility_km.unwrap_or(0.0) - humidity_pct,
                visibility_km,
                humidity_pct,
                temperature_c,
            })
        })
        .collect();

    scores.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    scores
}

pub struct SuitabilityScorer {
    policy: KeywordPolicy,
    sites: Vec<SiteCandidate>,
}

impl SuitabilityScorer {
    pub fn new(policy: KeywordPolicy, sites: Vec<SiteCandidate>) -> Self {
        Self { policy, sites }
    }

    pub fn policy(&self) -> &KeywordPolicy {
        &self.policy
    }

    /// Turn one settled fetch round into a recommendation.
    pub fn recommend(&self, bundle: &FeedBundle) -> Recommendation {
        let feeds = bundle.statuses();
        let build = |verdict: Verdict, best_site: Option<String>, rationale: String, ranking: Vec<SiteScore>| {
            Recommendation {
                run_id: uuid::Uuid::now_v7().to_string(),
                verdict,
                best_site,
                rationale,
                ranking,
                feeds: feeds.clone(),
                generated_at: Utc::now(),
            }
        };

        let forecast = match &bundle.forecast {
            Ok(summary) if !summary.description.trim().is_empty() => summary,
            Ok(_) => {
                let err = SkyError::CoreDataUnavailable("forecast text is empty".to_string());
                return build(Verdict::InsufficientData, None, format!("cannot recommend: {}", err), Vec::new());
            }
            Err(e) => {
                let err = SkyError::CoreDataUnavailable(format!("forecast feed failed: {}", e));
                return build(Verdict::InsufficientData, None, format!("cannot recommend: {}", err), Vec::new());
            }
        };

        match self.policy.classify(&forecast.description) {
            ForecastClass::Precipitation(term) => {
                return build(
                    Verdict::Unfavorable,
                    None,
                    format!("precipitation expected (forecast mentions \"{}\")", term),
                    Vec::new(),
                );
            }
            ForecastClass::Cloud(term) => {
                return build(
                    Verdict::Unfavorable,
                    None,
                    format!("cloud cover expected (forecast mentions \"{}\")", term),
                    Vec::new(),
                );
            }
            ForecastClass::Ambiguous => {
                return build(
                    Verdict::Marginal,
                    None,
                    "forecast wording is inconclusive about the night sky".to_string(),
                    Vec::new(),
                );
            }
            ForecastClass::Clear(_) => {}
        }

        let mut notes = Vec::new();
        let stations: &[StationReading] = match &bundle.stations {
            Ok(readings) => readings,
            Err(e) => {
                notes.push(format!("station readings unavailable ({})", e));
                &[]
            }
        };
        let visibility: &[VisibilityReading] = match &bundle.visibility {
            Ok(readings) => readings,
            Err(e) => {
                notes.push(format!("visibility readings unavailable ({}), visibility counted as 0 km", e));
                &[]
            }
        };

        let readings = merge_readings(stations, visibility);
        let ranking = score_sites(&self.sites, &readings);

        let mut rationale = match ranking.first() {
            Some(best) => format!(
                "clear skies expected; best site {} (score {:.1}, station {})",
                best.site_name, best.score, best.station_name
            ),
            None => "clear skies expected; no site has both temperature and humidity readings, \
                     so no site could be ranked (degraded precision)"
                .to_string(),
        };
        if !notes.is_empty() {
            rationale.push_str("; ");
            rationale.push_str(&notes.join("; "));
        }

        let best_site = ranking.first().map(|s| s.site_name.clone());
        build(Verdict::Favorable, best_site, rationale, ranking)
    }
}
