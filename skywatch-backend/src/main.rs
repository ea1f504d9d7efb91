use std::sync::Arc;

use anyhow::{Context, Result};

use skywatch_backend::config;
use skywatch_backend::module::catalog::load_sources;
use skywatch_backend::module::hko::HkoClient;
use skywatch_backend::module::scheduled::{ScheduledTaskConfig, ScheduledTaskManager};
use skywatch_backend::service::SkyEngine;

const CONFIG_ENV: &str = "SKYWATCH_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config_path = std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let (config, found) = config::read_config(&config_path)?;

    // Initialize logging
    let _logging_guard = skywatch_backend::logging::init_logging(&config.logging, &config.log_level);

    if !found {
        tracing::warn!("Config file {} not found, using defaults", config_path);
    }
    tracing::info!("Skywatch backend starting (config: {})...", config_path);

    let feeds = Arc::new(HkoClient::new(&config.hko)?);
    let engine = SkyEngine::new(config, feeds).context("Failed to build sky engine")?;

    // Catalog
    let sources = load_sources(&config.catalog.data_dir).await;
    let report = engine.rebuild_catalog(&sources).await;
    tracing::info!(
        "Catalog ready: {} objects from {}",
        report.total(),
        config.catalog.data_dir
    );

    let engine = Arc::new(engine);

    // Configure and start scheduled tasks
    let mut task_manager =
        ScheduledTaskManager::new(ScheduledTaskConfig::from(&config.suitability), engine.clone());
    task_manager.start_all();
    tracing::info!("All scheduled tasks started successfully");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;

    task_manager.shutdown().await;
    tracing::info!("Skywatch backend stopped");

    Ok(())
}
