use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::constants;

/// Environment variable checked for the API key when `--api-key` isn't given.
pub const API_KEY_ENV: &str = "YOUTUBE_API_KEY";

pub fn project_dirs() -> Option<ProjectDirs> {
  ProjectDirs::from("", "", "playtime")
}

/// User preferences stored in `<config dir>/config.toml`.
#[derive(Serialize, Deserialize, Default, Debug, Clone, PartialEq)]
pub struct Config {
  pub api_key: Option<String>,
  pub default_speed: Option<f64>,
  pub request_timeout_secs: Option<u64>,
  pub batch_concurrency: Option<usize>,
}

impl Config {
  pub fn path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
  }

  /// Missing or unreadable config falls back to defaults.
  pub fn load() -> Self {
    Self::path().map(|p| Self::load_from(&p)).unwrap_or_default()
  }

  pub fn load_from(path: &Path) -> Self {
    if let Ok(content) = std::fs::read_to_string(path)
      && let Ok(config) = toml::from_str(&content)
    {
      return config;
    }
    Self::default()
  }

  pub fn save(&self) -> Result<PathBuf> {
    let path = Self::path().context("Could not determine a config directory for this platform")?;
    self.save_to(&path)?;
    Ok(path)
  }

  pub fn save_to(&self, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
      std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    let content = toml::to_string(self).context("Failed to serialize config")?;
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
  }

  /// Key precedence: CLI flag, then environment, then config file.
  pub fn resolve_api_key(&self, flag: Option<String>, env: Option<String>) -> Option<String> {
    let present = |k: &String| !k.trim().is_empty();
    flag.filter(present).or(env.filter(present)).or_else(|| self.api_key.clone())
  }

  pub fn request_timeout(&self) -> Duration {
    Duration::from_secs(self.request_timeout_secs.unwrap_or(constants().request_timeout_secs).max(1))
  }

  pub fn batch_concurrency(&self) -> usize {
    self.batch_concurrency.unwrap_or(constants().batch_concurrency).max(1)
  }

  pub fn default_speed(&self) -> f64 {
    self.default_speed.unwrap_or(1.0)
  }
}
