//! Orientation tracker - owns the unwrapping state and publishes snapshots
use chrono::{DateTime, Duration, Utc};
use futures::Stream;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;

use super::state::{HeadingSample, OrientationState};
use crate::config::OrientationConfig;

/// Single-writer holder of [`OrientationState`].
///
/// The state lives inside a watch channel: writers fold samples in place,
/// readers copy the latest snapshot out and never hold a lock afterwards.
pub struct OrientationTracker {
    state: watch::Sender<OrientationState>,
    min_interval: Duration,
}

impl OrientationTracker {
    pub fn new(config: &OrientationConfig) -> Self {
        let (state, _) = watch::channel(OrientationState::default());
        Self {
            state,
            min_interval: Duration::milliseconds(config.min_interval_ms as i64),
        }
    }

    /// Feed one raw heading. Returns whether the sample was accepted.
    pub fn submit(&self, raw_deg: f64, instant: DateTime<Utc>) -> bool {
        let sample = HeadingSample::new(raw_deg, instant);
        let min_interval = self.min_interval;
        let mut accepted = false;

        self.state.send_if_modified(|state| match state.apply(&sample, min_interval) {
            Ok(applied) => {
                accepted = applied;
                applied
            }
            Err(e) => {
                tracing::trace!("Dropping heading sample: {}", e);
                false
            }
        });

        accepted
    }

    pub fn snapshot(&self) -> OrientationState {
        *self.state.borrow()
    }

    pub fn continuous_heading(&self) -> f64 {
        self.state.borrow().continuous_deg
    }

    pub fn raw_heading(&self) -> f64 {
        self.state.borrow().raw_heading()
    }

    /// Receiver notified on every accepted sample
    pub fn subscribe(&self) -> watch::Receiver<OrientationState> {
        self.state.subscribe()
    }
}

/// Drive a tracker from a push stream of samples until the stream ends.
pub fn spawn_heading_listener<S>(
    tracker: std::sync::Arc<OrientationTracker>,
    samples: S,
) -> JoinHandle<u64>
where
    S: Stream<Item = HeadingSample> + Send + 'static,
{
    tokio::spawn(async move {
        let mut samples = std::pin::pin!(samples);
        let mut accepted = 0u64;

        while let Some(sample) = samples.next().await {
            if tracker.submit(sample.raw_deg, sample.instant) {
                accepted += 1;
            }
        }

        tracing::debug!("Heading stream closed after {} accepted samples", accepted);
        accepted
    })
}
