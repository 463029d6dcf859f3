//! Diagnostics for the issuefeed binary.
//!
//! Events go to `issuefeed.log` in the per-user data directory, rotated
//! daily, so stdout carries only command output. `RUST_LOG` replaces the
//! default filter when it parses.

use std::path::PathBuf;

use anyhow::Context;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use crate::config::APP_DIR;

const LOG_FILE: &str = "issuefeed.log";

/// Filter used when `RUST_LOG` is unset or invalid.
const DEFAULT_FILTER: &str = "issuefeed=info,warn";

/// Install the global subscriber.
///
/// Log files live under `<data_local_dir>/issuefeed/logs/`, e.g.
/// `~/.local/share/issuefeed/logs/` on Linux.
///
/// # Errors
///
/// Fails if the data directory is unknown, the log directory cannot be
/// created, or a global subscriber is already installed.
pub fn init() -> anyhow::Result<()> {
    let dir = log_dir()?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Could not create log directory {}", dir.display()))?;

    let layer = fmt::layer()
        .with_writer(RollingFileAppender::new(Rotation::DAILY, &dir, LOG_FILE))
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(layer)
        .with(filter_from(std::env::var(EnvFilter::DEFAULT_ENV).ok().as_deref()))
        .try_init()?;

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), log_dir = %dir.display(), "Logging initialized");
    Ok(())
}

fn filter_from(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

fn log_dir() -> anyhow::Result<PathBuf> {
    let base = dirs::data_local_dir().context("Could not determine local data directory")?;
    Ok(base.join(APP_DIR).join("logs"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;

    #[test]
    fn test_log_dir_is_per_app() {
        let dir = log_dir().unwrap();
        assert!(dir.ends_with("issuefeed/logs"));
    }

    #[test]
    fn test_default_filter_is_info() {
        assert_eq!(filter_from(None).max_level_hint(), Some(LevelFilter::INFO));
    }

    #[test]
    fn test_env_directives_replace_default() {
        assert_eq!(
            filter_from(Some("debug")).max_level_hint(),
            Some(LevelFilter::DEBUG)
        );
    }
}
