use std::{
    fs,
    path::{Path, PathBuf},
    time::{Duration, SystemTime},
};
use tokio::task;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, filter::LevelFilter, fmt, prelude::*};

use crate::config::LoggingConfig;

const CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[allow(dead_code)]
pub struct LoggerGuard(Option<WorkerGuard>);

fn parse_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        _ => {
            eprintln!("Invalid log level '{}', defaulting to 'info'", level);
            LevelFilter::INFO
        }
    }
}

/// Install console + daily rolling file logging.
///
/// `RUST_LOG` directives are layered on top of `level`. If the log directory
/// cannot be created, logging continues on stdout only.
pub fn init_logging(config: &LoggingConfig, level: &str) -> LoggerGuard {
    let log_dir = PathBuf::from(&config.dir);
    let builder = EnvFilter::builder().with_default_directive(parse_level(level).into());
    let env_directives = std::env::var("RUST_LOG").unwrap_or_default();

    let console_filter = builder.clone().parse_lossy(&env_directives);
    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true)
        .with_filter(console_filter);

    let (file_layer, guard, open_error) = match open_file_writer(&log_dir, &config.prefix) {
        Ok((non_blocking, guard)) => {
            let layer = fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_filter(builder.parse_lossy(&env_directives));
            (Some(layer), Some(guard), None)
        }
        Err(e) => (None, None, Some(e)),
    };

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stdout_layer)
        .init();

    match open_error {
        Some(e) => tracing::warn!(
            "Failed to create log file appender in {}: {}, logging to stdout only",
            log_dir.display(),
            e
        ),
        None => {
            let max_age = Duration::from_secs(60 * 60 * 24 * config.retention_days.max(1));
            start_log_cleanup_task(log_dir, config.prefix.clone(), max_age);
        }
    }

    LoggerGuard(guard)
}

/// Daily rolling `<prefix>.<date>.log` writer in `log_dir`, behind a
/// non-blocking worker.
fn open_file_writer(log_dir: &Path, prefix: &str) -> Result<(NonBlocking, WorkerGuard), InitError> {
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .build(log_dir)?;
    Ok(NonBlocking::new(appender))
}

fn start_log_cleanup_task(log_dir: PathBuf, prefix: String, max_age: Duration) {
    task::spawn(async move {
        loop {
            if let Err(e) = cleanup_old_logs(&log_dir, &prefix, max_age) {
                tracing::warn!("Failed to delete old log file: {}", e);
            }
            tokio::time::sleep(CLEANUP_INTERVAL).await;
        }
    });
}

fn cleanup_old_logs(log_dir: &Path, prefix: &str, max_age: Duration) -> std::io::Result<usize> {
    let now = SystemTime::now();
    let mut removed = 0;

    for entry in fs::read_dir(log_dir)? {
        let path = entry?.path();

        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !(file_name.starts_with(prefix) && file_name.ends_with(".log")) {
            continue;
        }

        if let Ok(modified) = fs::metadata(&path)?.modified() {
            if now.duration_since(modified).unwrap_or_default() > max_age {
                fs::remove_file(&path)?;
                removed += 1;
                tracing::info!("Old log file deleted: {}", file_name);
            }
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level_falls_back_to_info() {
        assert_eq!(parse_level("DEBUG"), LevelFilter::DEBUG);
        assert_eq!(parse_level("verbose"), LevelFilter::INFO);
    }

    #[test]
    fn test_file_writer_opens_in_writable_dir() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("logs");

        let (_writer, _guard) = open_file_writer(&log_dir, "skywatch-backend").unwrap();
        assert!(log_dir.is_dir());
    }

    #[test]
    fn test_file_writer_fails_under_regular_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let log_dir = file.path().join("logs");

        assert!(open_file_writer(&log_dir, "skywatch-backend").is_err());
    }

    #[test]
    fn test_cleanup_skips_fresh_and_foreign_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("skywatch-backend.2026-10-01.log"), "x").unwrap();
        fs::write(dir.path().join("other.log"), "x").unwrap();

        let removed =
            cleanup_old_logs(dir.path(), "skywatch-backend", Duration::from_secs(3600)).unwrap();
        assert_eq!(removed, 0);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn test_cleanup_removes_expired_prefixed_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("skywatch-backend.2026-10-01.log"), "x").unwrap();
        fs::write(dir.path().join("other.log"), "x").unwrap();
        std::thread::sleep(Duration::from_millis(20));

        let removed =
            cleanup_old_logs(dir.path(), "skywatch-backend", Duration::from_millis(1)).unwrap();
        assert_eq!(removed, 1);
        assert!(dir.path().join("other.log").exists());
    }
}
