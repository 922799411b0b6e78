//! Tracing setup. Logs go to a file so command output stays clean.

use color_eyre::{eyre::eyre, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Install the global subscriber writing to `file`.
///
/// `RUST_LOG` takes precedence over the configured level; `verbose` forces
/// debug output for this crate. The returned guard must be held until exit
/// so buffered lines are flushed.
pub fn init(config: &LoggingConfig, file: &Path, verbose: bool) -> Result<WorkerGuard> {
  let dir = file
    .parent()
    .filter(|p| !p.as_os_str().is_empty())
    .unwrap_or_else(|| Path::new("."));
  let file_name = file
    .file_name()
    .ok_or_else(|| eyre!("Invalid log file path: {}", file.display()))?;

  std::fs::create_dir_all(dir)
    .map_err(|e| eyre!("Failed to create log directory {}: {}", dir.display(), e))?;

  let filter = build_filter(&config.level, verbose)?;

  let appender = tracing_appender::rolling::never(dir, file_name);
  let (writer, guard) = tracing_appender::non_blocking(appender);

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(writer)
    .with_ansi(false)
    .try_init()
    .map_err(|e| eyre!("Failed to initialize logging: {}", e))?;

  Ok(guard)
}

fn build_filter(level: &str, verbose: bool) -> Result<EnvFilter> {
  let filter = match EnvFilter::try_from_default_env() {
    Ok(filter) => filter,
    Err(_) => EnvFilter::try_new(level)
      .map_err(|e| eyre!("Invalid log level '{}': {}", level, e))?,
  };

  if verbose {
    let directive = "vinx=debug"
      .parse()
      .map_err(|e| eyre!("Invalid log directive: {}", e))?;
    return Ok(filter.add_directive(directive));
  }

  Ok(filter)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_invalid_level_is_rejected() {
    if std::env::var("RUST_LOG").is_ok() {
      return;
    }
    assert!(build_filter("vinx=notalevel", false).is_err());
  }

  #[test]
  fn test_verbose_filter_builds() {
    assert!(build_filter("warn", true).is_ok());
  }
}
