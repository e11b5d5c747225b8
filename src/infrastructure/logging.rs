//! Structured JSON logging to `logs/commands.log`.
//!
//! One JSON object per line, in the shape the command log has always used
//! (timestamp, level, fields). `RUST_LOG` overrides the configured level.
//! Installing twice is a no-op that returns the first log path.

use crate::infrastructure::error::InfraError;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use tracing::info;
use tracing_subscriber::EnvFilter;

const LOG_FILE_NAME: &str = "commands.log";

static LOGGING_STATE: OnceLock<LoggingState> = OnceLock::new();

struct LoggingState {
    log_path: PathBuf,
}

pub fn init_logging(level: &str, logs_dir: &Path) -> Result<PathBuf, InfraError> {
    let level = normalize_level(level)?;
    if let Some(state) = LOGGING_STATE.get() {
        return Ok(state.log_path.clone());
    }

    fs::create_dir_all(logs_dir)?;
    let log_path = logs_dir.join(LOG_FILE_NAME);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,mission_control={level}")));

    tracing_subscriber::fmt()
        .json()
        .with_current_span(false)
        .with_target(true)
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|error| InfraError::InvalidConfig(format!("failed to install logger: {error}")))?;

    let state = LOGGING_STATE.get_or_init(|| LoggingState {
        log_path: log_path.clone(),
    });
    info!(
        event = "app_start",
        version = env!("CARGO_PKG_VERSION"),
        log_level = level,
        log_path = %state.log_path.display(),
        "logging initialized"
    );
    Ok(state.log_path.clone())
}

pub fn normalize_level(level: &str) -> Result<&'static str, InfraError> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(InfraError::InvalidConfig(format!(
            "unsupported log level `{other}`; expected trace|debug|info|warn|error"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_normalized() {
        assert_eq!(normalize_level(" INFO ").expect("info"), "info");
        assert_eq!(normalize_level("warning").expect("warn"), "warn");
        assert!(normalize_level("verbose").is_err());
    }
}
