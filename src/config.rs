use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default vPIC API endpoint.
pub const DEFAULT_API_URL: &str = "https://vpic.nhtsa.dot.gov/api/";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub api: ApiConfig,
  #[serde(default)]
  pub database: DatabaseConfig,
  #[serde(default)]
  pub cache: CacheConfig,
  #[serde(default)]
  pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  #[serde(default = "default_api_url")]
  pub base_url: String,
  #[serde(default = "default_user_agent")]
  pub user_agent: String,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url: default_api_url(),
      user_agent: default_user_agent(),
    }
  }
}

fn default_api_url() -> String {
  DEFAULT_API_URL.to_string()
}

fn default_user_agent() -> String {
  format!("vinx/{}", env!("CARGO_PKG_VERSION"))
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseConfig {
  /// SQLite file (defaults to $XDG_DATA_HOME/vinx/vins.db)
  pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheConfig {
  /// Keep a VIN's favorite flag when it is decoded again
  #[serde(default)]
  pub preserve_favorites: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
  /// Filter directive used when RUST_LOG is not set
  #[serde(default = "default_log_level")]
  pub level: String,
  /// Log file (defaults to $XDG_DATA_HOME/vinx/vinx.log)
  pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
  fn default() -> Self {
    Self {
      level: default_log_level(),
      file: None,
    }
  }
}

fn default_log_level() -> String {
  "info".to_string()
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./vinx.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/vinx/config.yaml
  ///
  /// Defaults are used when no file is found. Environment overrides are
  /// applied last.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    let config = match path {
      Some(p) => Self::load_from_path(&p)?,
      None => Self::default(),
    };

    Ok(config.with_env_overrides(|key| std::env::var(key).ok()))
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("vinx.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("vinx").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    // An empty file is a valid, all-defaults config
    if contents.trim().is_empty() {
      return Ok(Self::default());
    }

    let config: Config = serde_yaml::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;

    Ok(config)
  }

  /// Apply VINX_API_URL and VINX_DATABASE from the given lookup.
  fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
    if let Some(url) = lookup("VINX_API_URL").filter(|v| !v.is_empty()) {
      self.api.base_url = url;
    }
    if let Some(db) = lookup("VINX_DATABASE").filter(|v| !v.is_empty()) {
      self.database.path = Some(PathBuf::from(db));
    }
    self
  }

  /// Directory for the database and log file.
  pub fn data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("vinx"))
  }

  /// Resolved database path.
  pub fn database_path(&self) -> Result<PathBuf> {
    match &self.database.path {
      Some(p) => Ok(p.clone()),
      None => Ok(Self::data_dir()?.join("vins.db")),
    }
  }

  /// Resolved log file path.
  pub fn log_file_path(&self) -> Result<PathBuf> {
    match &self.logging.file {
      Some(p) => Ok(p.clone()),
      None => Ok(Self::data_dir()?.join("vinx.log")),
    }
  }
}
