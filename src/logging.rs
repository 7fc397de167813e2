//! Tracing subscriber setup.
//!
//! CLI commands log to stderr. The viewer owns the terminal, so it logs to a
//! file and only when logging was asked for.

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

pub const ENV_VAR: &str = "SPRIG_LOG";
const DEFAULT_LEVEL: &str = "warn";

/// `SPRIG_LOG` wins, then the configured level, then `warn`.
pub fn filter(config_level: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_env(ENV_VAR)
        .or_else(|_| EnvFilter::try_new(config_level.unwrap_or(DEFAULT_LEVEL)))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL))
}

/// True when the environment or config asks for log output.
pub fn requested(config_level: Option<&str>, config_file: Option<&Path>) -> bool {
    std::env::var_os(ENV_VAR).is_some() || config_level.is_some() || config_file.is_some()
}

pub fn init_stderr(config_level: Option<&str>) {
    // A second init (tests, repeated commands) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(config_level))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Append log lines to `path`, creating parent directories as needed.
pub fn init_file(path: &Path, config_level: Option<&str>) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(config_level))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
    Ok(())
}
