//! Configuration loading for toolrank.
//! Reads toolrank.toml from the current directory or the path in TOOLRANK_CONFIG
//! (YAML or JSON when the file extension says so).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use toolrank_common::{load_config_file, TrackerConfig};
use toolrank_ingestion::HttpSettings;

pub const CONFIG_ENV: &str = "TOOLRANK_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "toolrank.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub http: HttpSettings,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub trends: TrendsConfig,
    #[serde(default)]
    pub tracker: TrackerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one CSV file per history key
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf { PathBuf::from("./data") }

impl Default for StorageConfig {
    fn default() -> Self {
        Self { data_dir: default_data_dir() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

fn default_ttl_secs() -> u64   { 3600 }
fn default_capacity() -> usize { 64 }

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: default_ttl_secs(), capacity: default_capacity() }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendsConfig {
    /// Directory of search-interest CSV exports (`<dir>/<REGION>/*.csv`)
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,
}

fn default_export_dir() -> PathBuf { PathBuf::from("./exports/trends") }

impl Default for TrendsConfig {
    fn default() -> Self {
        Self { export_dir: default_export_dir() }
    }
}


impl Config {
    /// Load configuration.
    /// Uses `explicit` if given, else TOOLRANK_CONFIG, else ./toolrank.toml.
    /// A missing file falls back to defaults.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => std::env::var(CONFIG_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE)),
        };

        if !path.exists() {
            tracing::warn!(
                "Config file not found: {}; using defaults. \
                 Copy toolrank.example.toml to toolrank.toml to customise.",
                path.display()
            );
            return Ok(Config::default());
        }

        let config = Self::from_path(&path)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a config file; `.yaml`/`.yml` and `.json` are accepted besides TOML.
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let config = load_config_file(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.tracker.validate()?;
        if self.http.user_agent.trim().is_empty() {
            anyhow::bail!("http.user_agent must not be empty");
        }
        Ok(())
    }
}
