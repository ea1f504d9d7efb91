//! Error taxonomy of the engine.
//!
//! None of these escape the public `SkyEngine` entry points: each one is
//! either swallowed (sensor, coordinate), folded into a rationale (feed), or
//! turned into an explicit "cannot recommend" outcome (core data).

use skywatch_common::{FeedKind, ObjectKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SkyError {
    /// Orientation sample was missing, non-finite or a sentinel value
    #[error("orientation sample unavailable: {0}")]
    SensorUnavailable(String),

    #[error("coordinates unresolved for {kind} '{name}'")]
    CoordinateUnresolved { kind: ObjectKind, name: String },

    #[error("{feed} feed unavailable: {source}")]
    FeedUnavailable {
        feed: FeedKind,
        #[source]
        source: FeedError,
    },

    /// The forecast feed is mandatory; without it nothing can be recommended
    #[error("core data unavailable: {0}")]
    CoreDataUnavailable(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Failure of a single telemetry collaborator call
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed payload: {0}")]
    Malformed(String),

    #[error("timed out after {0}s")]
    Timeout(u64),

    #[error("feed not supported by this source")]
    Unsupported,

    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for FeedError {
    fn from(e: serde_json::Error) -> Self {
        FeedError::Malformed(e.to_string())
    }
}
