//! Heading unwrapping state machine

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SkyError;

const FULL_TURN: f64 = 360.0;
const HALF_TURN: f64 = 180.0;

/// One raw compass reading
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadingSample {
    pub instant: DateTime<Utc>,
    /// Compass heading; valid readings lie in [0, 360]
    pub raw_deg: f64,
}

impl HeadingSample {
    pub fn new(raw_deg: f64, instant: DateTime<Utc>) -> Self {
        Self { instant, raw_deg }
    }

    /// Normalized heading in [0, 360), or why the sample is unusable.
    ///
    /// Negative values cover the `-1` "no fix" sentinel some compasses report.
    pub fn normalized(&self) -> Result<f64, SkyError> {
        let raw = self.raw_deg;
        if !raw.is_finite() {
            return Err(SkyError::SensorUnavailable(format!("non-finite heading {}", raw)));
        }
        if !(0.0..=FULL_TURN).contains(&raw) {
            return Err(SkyError::SensorUnavailable(format!(
                "heading {} outside [0, 360]",
                raw
            )));
        }
        Ok(raw.rem_euclid(FULL_TURN))
    }
}

/// Continuous orientation derived from accepted samples.
///
/// `continuous_deg == last_raw + 360 * cumulative_turns` after every accepted
/// sample, so consecutive values never differ by more than 180 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OrientationState {
    pub last_raw: Option<f64>,
    pub cumulative_turns: i64,
    pub continuous_deg: f64,
    pub last_accepted: Option<DateTime<Utc>>,
    pub accepted_samples: u64,
}

impl OrientationState {
    /// Fold a sample into the state.
    ///
    /// Returns `Ok(true)` when accepted, `Ok(false)` when it fell inside the
    /// throttle window and `Err` when the reading itself is unusable. The state
    /// is untouched unless the sample is accepted.
    pub fn apply(&mut self, sample: &HeadingSample, min_interval: Duration) -> Result<bool, SkyError> {
        let raw = sample.normalized()?;

        if let Some(last) = self.last_accepted {
            if sample.instant - last < min_interval {
                return Ok(false);
            }
        }

        if let Some(last_raw) = self.last_raw {
            let delta = raw - last_raw;
            if delta > HALF_TURN {
                self.cumulative_turns -= 1;
            } else if delta < -HALF_TURN {
                self.cumulative_turns += 1;
            }
        }

        self.last_raw = Some(raw);
        self.continuous_deg = raw + FULL_TURN * self.cumulative_turns as f64;
        self.last_accepted = Some(sample.instant);
        self.accepted_samples += 1;

        Ok(true)
    }

    /// Latest accepted heading in [0, 360)
    pub fn raw_heading(&self) -> f64 {
        self.last_raw.unwrap_or(0.0)
    }
}
