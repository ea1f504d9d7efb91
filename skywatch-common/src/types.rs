use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Kind of catalog object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ObjectKind {
    #[serde(rename = "constellation")]
    Constellation,
    #[serde(rename = "star")]
    Star,
    #[serde(rename = "planet")]
    Planet,
}

impl ObjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Constellation => "constellation",
            ObjectKind::Star => "star",
            ObjectKind::Planet => "planet",
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ObjectKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "constellation" | "con" => Ok(ObjectKind::Constellation),
            "star" => Ok(ObjectKind::Star),
            "planet" => Ok(ObjectKind::Planet),
            _ => Err(format!("Unknown object kind: {}", s)),
        }
    }
}

/// One searchable entry of the catalog index.
///
/// Identity is the `(kind, name)` pair; `catalog_id` is only a hint passed
/// back to the coordinate oracle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CelestialObject {
    pub name: String,
    pub kind: ObjectKind,
    #[serde(default)]
    pub catalog_id: Option<String>,
}

impl CelestialObject {
    pub fn new(kind: ObjectKind, name: impl Into<String>, catalog_id: Option<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            catalog_id,
        }
    }

    pub fn key(&self) -> (ObjectKind, &str) {
        (self.kind, self.name.as_str())
    }
}

/// Right ascension / declination, both in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquatorialCoord {
    pub ra_deg: f64,
    pub dec_deg: f64,
}

impl EquatorialCoord {
    pub fn new(ra_deg: f64, dec_deg: f64) -> Self {
        Self { ra_deg, dec_deg }
    }

    pub fn is_finite(&self) -> bool {
        self.ra_deg.is_finite() && self.dec_deg.is_finite()
    }
}

/// Azimuth (clockwise from north) / altitude above the horizon, in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HorizontalCoord {
    pub azimuth_deg: f64,
    pub altitude_deg: f64,
}

impl HorizontalCoord {
    pub fn new(azimuth_deg: f64, altitude_deg: f64) -> Self {
        Self {
            azimuth_deg,
            altitude_deg,
        }
    }
}

/// Observer position on Earth
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
}

impl GeoLocation {
    pub fn new(latitude_deg: f64, longitude_deg: f64) -> Self {
        Self {
            latitude_deg,
            longitude_deg,
        }
    }
}

/// Object that passed the visibility filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisibleObject {
    pub object: CelestialObject,
    /// Great-circle distance from the view center
    pub angular_distance_deg: f64,
    /// Current altitude above the horizon
    pub altitude_deg: f64,
}

/// Outcome of one visibility analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisibilityResult {
    pub analysis_id: String,
    /// Heading captured when the analysis was requested, normalized to [0, 360)
    pub heading_deg: f64,
    /// Sorted ascending by `angular_distance_deg`
    pub objects: Vec<VisibleObject>,
    /// Set when `objects` is empty
    pub reason: Option<String>,
    pub computed_at: DateTime<Utc>,
}

impl VisibilityResult {
    /// Empty outcome with an explanation
    pub fn empty(heading_deg: f64, reason: impl Into<String>) -> Self {
        Self {
            analysis_id: uuid::Uuid::now_v7().to_string(),
            heading_deg,
            objects: Vec::new(),
            reason: Some(reason.into()),
            computed_at: Utc::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// Real-time reading of a weather station.
///
/// Temperature and humidity come from different tables upstream, so either
/// may be missing for a given station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationReading {
    pub station_name: String,
    #[serde(default)]
    pub temperature_c: Option<f64>,
    #[serde(default)]
    pub humidity_pct: Option<f64>,
    #[serde(default)]
    pub visibility_km: Option<f64>,
}

impl StationReading {
    pub fn new(station_name: impl Into<String>) -> Self {
        Self {
            station_name: station_name.into(),
            temperature_c: None,
            humidity_pct: None,
            visibility_km: None,
        }
    }
}

/// Mean visibility range reported by a station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisibilityReading {
    pub station_name: String,
    pub visibility_km: f64,
}

/// Candidate observation site and the station used to judge it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteCandidate {
    pub site_name: String,
    pub nearest_station: String,
}

impl SiteCandidate {
    pub fn new(site_name: impl Into<String>, nearest_station: impl Into<String>) -> Self {
        Self {
            site_name: site_name.into(),
            nearest_station: nearest_station.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Verdict {
    Favorable,
    Marginal,
    Unfavorable,
    InsufficientData,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Favorable => "favorable",
            Verdict::Marginal => "marginal",
            Verdict::Unfavorable => "unfavorable",
            Verdict::InsufficientData => "insufficient-data",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Score of one scorable site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteScore {
    pub site_name: String,
    pub station_name: String,
    /// `visibility_km - humidity_pct`, higher is better
    pub score: f64,
    pub visibility_km: Option<f64>,
    pub humidity_pct: f64,
    pub temperature_c: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedKind {
    Forecast,
    StationReadings,
    VisibilityReadings,
    DailyForecast,
}

impl FeedKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedKind::Forecast => "forecast",
            FeedKind::StationReadings => "station readings",
            FeedKind::VisibilityReadings => "visibility readings",
            FeedKind::DailyForecast => "daily forecast",
        }
    }
}

impl std::fmt::Display for FeedKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-feed result of one fetch round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedStatus {
    pub feed: FeedKind,
    pub ok: bool,
    /// Failure description when `ok` is false
    pub detail: Option<String>,
}

/// Output of one suitability run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub run_id: String,
    pub verdict: Verdict,
    pub best_site: Option<String>,
    pub rationale: String,
    /// Scorable sites, best first
    #[serde(default)]
    pub ranking: Vec<SiteScore>,
    #[serde(default)]
    pub feeds: Vec<FeedStatus>,
    pub generated_at: DateTime<Utc>,
}

/// One day of a multi-day forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub weather: String,
    pub min_temp_c: Option<f64>,
    pub max_temp_c: Option<f64>,
    pub min_humidity_pct: Option<f64>,
    pub max_humidity_pct: Option<f64>,
}

/// Verdict for one forecast day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayOutlook {
    pub date: NaiveDate,
    pub verdict: Verdict,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outlook {
    pub days: Vec<DayOutlook>,
    /// Set when `days` is empty
    pub reason: Option<String>,
    pub generated_at: DateTime<Utc>,
}
