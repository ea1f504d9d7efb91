use std::path::Path;
use std::sync::OnceLock;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use skywatch_common::{GeoLocation, SiteCandidate};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub orientation: OrientationConfig,

    #[serde(default)]
    pub visibility: VisibilityConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub suitability: SuitabilityConfig,

    #[serde(default)]
    pub hko: HkoConfig,

    #[serde(default = "default_observer")]
    pub observer: GeoLocation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_dir")]
    pub dir: String,
    #[serde(default = "default_log_prefix")]
    pub prefix: String,
    #[serde(default = "default_log_retention_days")]
    pub retention_days: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrientationConfig {
    /// Samples closer together than this are dropped
    #[serde(default = "default_min_interval_ms")]
    pub min_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisibilityConfig {
    /// Assumed gaze elevation; the device pitch is not sensed
    #[serde(default = "default_view_altitude")]
    pub view_altitude_deg: f64,
    #[serde(default = "default_fov_radius")]
    pub fov_radius_deg: f64,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Directory holding `constellations.json` and `stars.json`
    #[serde(default = "default_catalog_dir")]
    pub data_dir: String,
    /// Stars must be strictly brighter (smaller magnitude) than this
    #[serde(default = "default_magnitude_limit")]
    pub star_magnitude_limit: f64,
    #[serde(default = "default_search_threshold")]
    pub search_threshold: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuitabilityConfig {
    #[serde(default = "default_feed_timeout")]
    pub feed_timeout_secs: u64,
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_minutes: u64,
    #[serde(default)]
    pub keywords: KeywordConfig,
    /// Candidate sites, each tied to the station whose readings it uses.
    ///
    /// A site is only ranked when its station reports both temperature and
    /// humidity. HKO `rhrread` publishes humidity for "Hong Kong Observatory"
    /// alone, and `LTMV` visibility covers only Central, Chek Lap Kok,
    /// Sai Wan Ho and Waglan Island. Against live HKO data the other default
    /// sites therefore stay unranked unless a feed with wider coverage is used.
    #[serde(default = "default_sites")]
    pub sites: Vec<SiteCandidate>,
}

/// Forecast wording policy, matched ignoring case. Latin terms match whole
/// words only; terms in scripts without spaces, such as Chinese, match anywhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordConfig {
    #[serde(default = "default_precipitation_terms")]
    pub precipitation: Vec<String>,
    #[serde(default = "default_cloud_terms")]
    pub cloud: Vec<String>,
    #[serde(default = "default_clear_terms")]
    pub clear: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HkoConfig {
    #[serde(default = "default_forecast_url")]
    pub forecast_url: String,
    #[serde(default = "default_readings_url")]
    pub readings_url: String,
    #[serde(default = "default_visibility_url")]
    pub visibility_url: String,
    #[serde(default = "default_daily_forecast_url")]
    pub daily_forecast_url: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_log_prefix() -> String {
    "skywatch-backend".to_string()
}

fn default_log_retention_days() -> u64 {
    3
}

fn default_min_interval_ms() -> u64 {
    100
}

fn default_view_altitude() -> f64 {
    30.0
}

fn default_fov_radius() -> f64 {
    45.0
}

fn default_max_results() -> usize {
    5
}

fn default_catalog_dir() -> String {
    "data".to_string()
}

fn default_magnitude_limit() -> f64 {
    2.5
}

fn default_search_threshold() -> f64 {
    0.85
}

fn default_feed_timeout() -> u64 {
    20
}

fn default_refresh_interval() -> u64 {
    30
}

fn default_precipitation_terms() -> Vec<String> {
    [
        "rain", "rainy", "showers", "shower", "drizzle", "thunderstorm", "thunderstorms",
        "storm", "storms", "squally", "squalls", "typhoon", "hail", "snow",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_cloud_terms() -> Vec<String> {
    ["cloudy", "cloud", "clouds", "overcast"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_clear_terms() -> Vec<String> {
    ["clear", "fine", "sunny", "fair"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Dark-sky sites around Hong Kong, named after their `rhrread` temperature
/// stations. Only the last one has humidity in HKO data, see
/// [`SuitabilityConfig::sites`].
fn default_sites() -> Vec<SiteCandidate> {
    vec![
        SiteCandidate::new("Sai Kung East Country Park", "Sai Kung"),
        SiteCandidate::new("Tai Mo Shan", "Tai Mo Shan"),
        SiteCandidate::new("Ngong Ping", "Ngong Ping"),
        SiteCandidate::new("Cheung Chau", "Cheung Chau"),
        SiteCandidate::new("Hong Kong Observatory", "Hong Kong Observatory"),
    ]
}

fn default_forecast_url() -> String {
    "https://data.weather.gov.hk/weatherAPI/opendata/weather.php?dataType=flw&lang=en".to_string()
}

fn default_readings_url() -> String {
    "https://data.weather.gov.hk/weatherAPI/opendata/weather.php?dataType=rhrread&lang=en".to_string()
}

fn default_visibility_url() -> String {
    "https://data.weather.gov.hk/weatherAPI/opendata/opendata.php?dataType=LTMV&lang=en&rformat=json"
        .to_string()
}

fn default_daily_forecast_url() -> String {
    "https://data.weather.gov.hk/weatherAPI/opendata/weather.php?dataType=fnd&lang=en".to_string()
}

fn default_request_timeout() -> u64 {
    15
}

fn default_observer() -> GeoLocation {
    // Hong Kong
    GeoLocation::new(22.3, 114.2)
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
            prefix: default_log_prefix(),
            retention_days: default_log_retention_days(),
        }
    }
}

impl Default for OrientationConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: default_min_interval_ms(),
        }
    }
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            view_altitude_deg: default_view_altitude(),
            fov_radius_deg: default_fov_radius(),
            max_results: default_max_results(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            data_dir: default_catalog_dir(),
            star_magnitude_limit: default_magnitude_limit(),
            search_threshold: default_search_threshold(),
        }
    }
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self {
            precipitation: default_precipitation_terms(),
            cloud: default_cloud_terms(),
            clear: default_clear_terms(),
        }
    }
}

impl Default for SuitabilityConfig {
    fn default() -> Self {
        Self {
            feed_timeout_secs: default_feed_timeout(),
            refresh_interval_minutes: default_refresh_interval(),
            keywords: KeywordConfig::default(),
            sites: default_sites(),
        }
    }
}

impl Default for HkoConfig {
    fn default() -> Self {
        Self {
            forecast_url: default_forecast_url(),
            readings_url: default_readings_url(),
            visibility_url: default_visibility_url(),
            daily_forecast_url: default_daily_forecast_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            logging: LoggingConfig::default(),
            orientation: OrientationConfig::default(),
            visibility: VisibilityConfig::default(),
            catalog: CatalogConfig::default(),
            suitability: SuitabilityConfig::default(),
            hko: HkoConfig::default(),
            observer: default_observer(),
        }
    }
}

impl EngineConfig {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if !(self.visibility.fov_radius_deg > 0.0 && self.visibility.fov_radius_deg <= 180.0) {
            anyhow::bail!(
                "visibility.fov_radius_deg must be in (0, 180], got {}",
                self.visibility.fov_radius_deg
            );
        }
        if !(-90.0..=90.0).contains(&self.visibility.view_altitude_deg) {
            anyhow::bail!(
                "visibility.view_altitude_deg must be in [-90, 90], got {}",
                self.visibility.view_altitude_deg
            );
        }
        if self.visibility.max_results == 0 {
            anyhow::bail!("visibility.max_results must be at least 1");
        }
        Ok(())
    }
}

pub static CONFIG: OnceLock<EngineConfig> = OnceLock::new();

/// Parse the file at `path`, or `None` if there is no such file.
pub fn load_config(path: impl AsRef<Path>) -> anyhow::Result<Option<EngineConfig>> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(None);
    }
    EngineConfig::from_file(path).map(Some)
}

/// Load the configuration into [`CONFIG`].
///
/// A missing file is not an error: every field has a default. The flag tells
/// whether the file was found, so the caller can report it once logging is up.
pub fn read_config(path: impl AsRef<Path>) -> anyhow::Result<(&'static EngineConfig, bool)> {
    let loaded = load_config(path)?;
    let found = loaded.is_some();
    let config = loaded.unwrap_or_default();

    Ok((CONFIG.get_or_init(|| config), found))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = EngineConfig::from_toml("").unwrap();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.orientation.min_interval_ms, 100);
        assert_eq!(config.visibility.view_altitude_deg, 30.0);
        assert_eq!(config.visibility.fov_radius_deg, 45.0);
        assert_eq!(config.visibility.max_results, 5);
        assert_eq!(config.catalog.star_magnitude_limit, 2.5);
        assert!(!config.suitability.sites.is_empty());
        assert!(config.suitability.keywords.precipitation.contains(&"storm".to_string()));
    }

    #[test]
    fn test_partial_section_override() {
        let config = EngineConfig::from_toml(
            r#"
            log_level = "debug"

            [visibility]
            fov_radius_deg = 30.0

            [[suitability.sites]]
            site_name = "High Island"
            nearest_station = "Sai Kung"
            "#,
        )
        .unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.visibility.fov_radius_deg, 30.0);
        assert_eq!(config.visibility.view_altitude_deg, 30.0);
        assert_eq!(config.suitability.sites.len(), 1);
        assert_eq!(config.suitability.sites[0].nearest_station, "Sai Kung");
    }

    #[test]
    fn test_invalid_fov_rejected() {
        let result = EngineConfig::from_toml("[visibility]\nfov_radius_deg = 0.0\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[orientation]\nmin_interval_ms = 250").unwrap();
        let config = EngineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.orientation.min_interval_ms, 250);
    }

    #[test]
    fn test_load_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_config(dir.path().join("absent.toml")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_load_existing_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "log_level = \"warn\"").unwrap();
        let loaded = load_config(file.path()).unwrap().unwrap();
        assert_eq!(loaded.log_level, "warn");

        writeln!(file, "[visibility]\nmax_results = 0").unwrap();
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_default_sites_include_humidity_station() {
        let sites = SuitabilityConfig::default().sites;
        assert!(sites.iter().any(|s| s.nearest_station == "Hong Kong Observatory"));
        assert!(sites.iter().all(|s| !s.site_name.is_empty() && !s.nearest_station.is_empty()));
    }
}
