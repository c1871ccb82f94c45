use anyhow::{Context, Result, anyhow};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

use crate::config::project_dirs;

const DEFAULT_FILTER: &str = "playtime=info";

/// Where log lines go. Stdout is reserved for the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
  Stderr,
  File(PathBuf),
}

impl LogTarget {
  /// Daily-rolling file under the platform data dir, or stderr if there is none.
  pub fn default_for_platform() -> Self {
    match project_dirs() {
      Some(dirs) => LogTarget::File(dirs.data_local_dir().join("logs")),
      None => LogTarget::Stderr,
    }
  }
}

/// Install the global subscriber. Keep the guard alive until exit so buffered lines get flushed.
pub fn init(target: LogTarget) -> Result<WorkerGuard> {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

  let (writer, guard) = match &target {
    LogTarget::Stderr => tracing_appender::non_blocking(std::io::stderr()),
    LogTarget::File(dir) => {
      let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("playtime")
        .filename_suffix("log")
        .build(dir)
        .with_context(|| format!("Failed to open log directory {}", dir.display()))?;
      tracing_appender::non_blocking(appender)
    }
  };

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(writer)
    .with_ansi(target == LogTarget::Stderr)
    .with_target(false)
    .try_init()
    .map_err(|e| anyhow!("Failed to install log subscriber: {}", e))?;

  Ok(guard)
}
