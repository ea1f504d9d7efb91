//! Forecast wording classifier
use regex::Regex;

use crate::config::KeywordConfig;

/// What the forecast text says about the night sky, in priority order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForecastClass {
    /// Matched term, e.g. "showers"
    Precipitation(String),
    Cloud(String),
    Clear(String),
    Ambiguous,
}

/// Case-insensitive keyword policy, whole words for Latin terms
#[derive(Debug, Clone)]
pub struct KeywordPolicy {
    precipitation: Option<Regex>,
    cloud: Option<Regex>,
    clear: Option<Regex>,
}

/// `term` escaped, with a word boundary on each side that ends in an ASCII
/// letter or digit. Scripts written without spaces match as substrings.
fn term_pattern(term: &str) -> String {
    let boundary = |c: Option<char>| match c {
        Some(c) if c.is_ascii_alphanumeric() => r"\b",
        _ => "",
    };
    format!(
        "{}{}{}",
        boundary(term.chars().next()),
        regex::escape(term),
        boundary(term.chars().last())
    )
}

fn build_pattern(terms: &[String]) -> Result<Option<Regex>, regex::Error> {
    let alternatives: Vec<String> = terms
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(term_pattern)
        .collect();

    if alternatives.is_empty() {
        return Ok(None);
    }

    Regex::new(&format!("(?i)(?:{})", alternatives.join("|"))).map(Some)
}

impl KeywordPolicy {
    pub fn new(config: &KeywordConfig) -> Result<Self, regex::Error> {
        Ok(Self {
            precipitation: build_pattern(&config.precipitation)?,
            cloud: build_pattern(&config.cloud)?,
            clear: build_pattern(&config.clear)?,
        })
    }

    pub fn classify(&self, text: &str) -> ForecastClass {
        let find = |re: &Option<Regex>| {
            re.as_ref()
                .and_then(|re| re.find(text))
                .map(|m| m.as_str().to_lowercase())
        };

        if let Some(term) = find(&self.precipitation) {
            ForecastClass::Precipitation(term)
        } else if let Some(term) = find(&self.cloud) {
            ForecastClass::Cloud(term)
        } else if let Some(term) = find(&self.clear) {
            ForecastClass::Clear(term)
        } else {
            ForecastClass::Ambiguous
        }
    }
}

impl Default for KeywordPolicy {
    fn default() -> Self {
        // Escaped terms always compile
        Self::new(&KeywordConfig::default()).expect("default keyword patterns are valid")
    }
}
