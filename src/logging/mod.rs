//! Diagnostic logging to disk.
//!
//! The terminal is owned by the UI, so tracing output goes to
//! `<log_dir>/mockme.log` (default: `~/.local/share/mockme/logs/`).
//! The filter comes from the command line, then `RUST_LOG`, then config.

use crate::config::expand_home;
use crate::config::model::LoggingConfig;
use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Returns the log file path, or `None` when
/// logging is disabled.
pub fn init(config: &LoggingConfig, level_override: Option<&str>) -> Result<Option<PathBuf>> {
    if !config.enabled {
        return Ok(None);
    }

    let log_dir = expand_home(&config.log_dir);
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;
    let path = log_dir.join("mockme.log");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter(config, level_override))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {}", e))?;

    Ok(Some(path))
}

fn filter(config: &LoggingConfig, level_override: Option<&str>) -> EnvFilter {
    if let Some(level) = level_override {
        return EnvFilter::new(level);
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_logging_installs_nothing() {
        let config = LoggingConfig {
            enabled: false,
            ..LoggingConfig::default()
        };
        assert!(init(&config, None).unwrap().is_none());
    }

    #[test]
    fn override_wins_over_config() {
        let config = LoggingConfig::default();
        let f = filter(&config, Some("mockme=trace"));
        assert!(f.to_string().contains("mockme=trace"));
    }
}
