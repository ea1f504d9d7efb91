//! Scheduled task manager
//!
//! Periodic background work of the engine:
//! - Observation recommendation refresh (every `refresh_interval_minutes`)
//! - Multi-day outlook refresh (daily)

use chrono::{DateTime, Timelike, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::config::SuitabilityConfig;
use crate::service::SkyEngine;

/// Configuration for scheduled tasks
#[derive(Debug, Clone)]
pub struct ScheduledTaskConfig {
    /// Interval between recommendation refreshes (in minutes)
    pub recommendation_interval_minutes: u64,

    /// Hour of day (UTC) at which the outlook is refreshed
    pub outlook_hour_utc: u32,

    /// Perform initial refresh immediately
    pub perform_initial_update: bool,
}

impl Default for ScheduledTaskConfig {
    fn default() -> Self {
        Self {
            recommendation_interval_minutes: 30,
            // 22:00 UTC = 06:00 HKT
            outlook_hour_utc: 22,
            perform_initial_update: true,
        }
    }
}

impl From<&SuitabilityConfig> for ScheduledTaskConfig {
    fn from(config: &SuitabilityConfig) -> Self {
        Self {
            recommendation_interval_minutes: config.refresh_interval_minutes.max(1),
            ..Self::default()
        }
    }
}

/// Scheduled task manager
pub struct ScheduledTaskManager {
    config: ScheduledTaskConfig,
    engine: Arc<SkyEngine>,
    task_handles: Vec<JoinHandle<()>>,
}

impl ScheduledTaskManager {
    pub fn new(config: ScheduledTaskConfig, engine: Arc<SkyEngine>) -> Self {
        Self {
            config,
            engine,
            task_handles: Vec::new(),
        }
    }

    /// Start all scheduled tasks
    pub fn start_all(&mut self) {
        tracing::info!("Starting scheduled task manager...");

        let recommendation_handle = self.start_recommendation_task();
        self.task_handles.push(recommendation_handle);

        let outlook_handle = self.start_outlook_task();
        self.task_handles.push(outlook_handle);

        tracing::info!(
            "Started {} scheduled tasks (recommendation every {} min, outlook daily at {:02}:00 UTC)",
            self.task_handles.len(),
            self.config.recommendation_interval_minutes,
            self.config.outlook_hour_utc
        );
    }

    fn start_recommendation_task(&self) -> JoinHandle<()> {
        let engine = self.engine.clone();
        let interval_minutes = self.config.recommendation_interval_minutes;
        let perform_initial = self.config.perform_initial_update;

        tokio::spawn(async move {
            if perform_initial {
                tracing::info!("Performing initial recommendation refresh...");
                Self::run_recommendation_refresh(&engine).await;
            }

            loop {
                let now = Utc::now();
                let next_trigger = Self::calculate_next_refresh_time(now, interval_minutes);
                let sleep_duration = (next_trigger - now)
                    .to_std()
                    .unwrap_or(Duration::from_secs(60));

                tracing::debug!(
                    "Next recommendation refresh at: {} (in {:.1} min)",
                    next_trigger.format("%Y-%m-%d %H:%M:%S UTC"),
                    sleep_duration.as_secs_f64() / 60.0
                );

                tokio::time::sleep(sleep_duration).await;
                Self::run_recommendation_refresh(&engine).await;
            }
        })
    }

    async fn run_recommendation_refresh(engine: &SkyEngine) {
        let recommendation = engine.request_suitability_recommendation().await;

        for feed in recommendation.feeds.iter().filter(|f| !f.ok) {
            tracing::warn!(
                "Recommendation {} ran without {} ({})",
                recommendation.run_id,
                feed.feed,
                feed.detail.as_deref().unwrap_or("unknown error")
            );
        }
        tracing::info!("Recommendation rationale: {}", recommendation.rationale);
    }

    fn start_outlook_task(&self) -> JoinHandle<()> {
        let engine = self.engine.clone();
        let target_hour = self.config.outlook_hour_utc;
        let perform_initial = self.config.perform_initial_update;

        tokio::spawn(async move {
            if perform_initial {
                Self::run_outlook_refresh(&engine).await;
            }

            loop {
                let now = Utc::now();
                let next_trigger = Self::calculate_next_daily_time(now, target_hour);
                let sleep_duration = (next_trigger - now)
                    .to_std()
                    .unwrap_or(Duration::from_secs(3600));

                tracing::debug!(
                    "Next outlook refresh at: {} (in {:.1} hours)",
                    next_trigger.format("%Y-%m-%d %H:%M:%S UTC"),
                    sleep_duration.as_secs_f64() / 3600.0
                );

                tokio::time::sleep(sleep_duration).await;
                Self::run_outlook_refresh(&engine).await;
            }
        })
    }

    async fn run_outlook_refresh(engine: &SkyEngine) {
        let outlook = engine.request_outlook().await;

        match &outlook.reason {
            Some(reason) => tracing::warn!("Outlook unavailable: {}", reason),
            None => {
                for day in &outlook.days {
                    tracing::info!("Outlook {}: {} ({})", day.date, day.verdict, day.reason);
                }
            }
        }
    }

    /// Next instant strictly after `now` that is a whole multiple of
    /// `interval_minutes` counted from midnight UTC.
    fn calculate_next_refresh_time(now: DateTime<Utc>, interval_minutes: u64) -> DateTime<Utc> {
        let interval = interval_minutes.clamp(1, 24 * 60) as i64;
        let midnight = now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|t| t.and_utc())
            .unwrap_or(now);

        let elapsed_minutes = (now - midnight).num_minutes();
        let next_slot = (elapsed_minutes / interval + 1) * interval;

        midnight + chrono::Duration::minutes(next_slot)
    }

    /// Next occurrence of `target_hour`:00 UTC strictly after `now`
    fn calculate_next_daily_time(now: DateTime<Utc>, target_hour: u32) -> DateTime<Utc> {
        let midnight = now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|t| t.and_utc())
            .unwrap_or(now);
        let today = midnight + chrono::Duration::hours(target_hour.min(23) as i64);

        if now.hour() < target_hour.min(23) {
            today
        } else {
            today + chrono::Duration::days(1)
        }
    }

    /// Gracefully shutdown all tasks
    pub async fn shutdown(self) {
        tracing::info!("Shutting down scheduled task manager...");

        for handle in self.task_handles {
            handle.abort();
        }

        tracing::info!("All scheduled tasks stopped");
    }
}
