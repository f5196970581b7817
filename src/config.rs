use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::registry;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub db: DbConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    /// Explicit category→source bindings. When absent the built-in
    /// default set is used (see [`registry::default_bindings`]).
    #[serde(default)]
    pub sources: Option<Vec<SourceEntry>>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./data/quotes.sqlite")
}

#[derive(Debug, Deserialize, Clone)]
pub struct FetchConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,
    #[serde(default = "default_retry_statuses")]
    pub retry_statuses: Vec<u16>,
    /// Hard cap on records kept per category, applied in arrival order.
    #[serde(default = "default_max_quotes")]
    pub max_quotes: usize,
    /// Page size asked of the upstream; the cap above still applies.
    #[serde(default = "default_fetch_limit")]
    pub fetch_limit: usize,
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            max_attempts: default_max_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
            throttle_ms: default_throttle_ms(),
            retry_statuses: default_retry_statuses(),
            max_quotes: default_max_quotes(),
            fetch_limit: default_fetch_limit(),
            concurrency: default_concurrency(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.quotable.io".to_string()
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_max_attempts() -> u32 {
    3
}
fn default_backoff_base_ms() -> u64 {
    500
}
fn default_throttle_ms() -> u64 {
    1000
}
fn default_retry_statuses() -> Vec<u16> {
    vec![429, 500, 502, 503, 504]
}
fn default_max_quotes() -> usize {
    100
}
fn default_fetch_limit() -> usize {
    150
}
fn default_concurrency() -> usize {
    4
}

/// One `[[sources]]` entry: a category name, its upstream tag, and
/// optional metadata overrides.
#[derive(Debug, Deserialize, Clone)]
pub struct SourceEntry {
    pub name: String,
    pub tag: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    /// Provenance label attached to every record from this source.
    #[serde(default)]
    pub label: Option<String>,
    /// Per-source base URL override.
    #[serde(default)]
    pub base_url: Option<String>,
}

/// Load configuration from a TOML file. A missing file is not an error:
/// defaults apply, so `qh` runs with no required arguments.
pub fn load_config(path: &Path) -> Result<Config> {
    let config: Config = if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content).with_context(|| "Failed to parse config file")?
    } else {
        Config::default()
    };

    // Validate fetch policy
    if config.fetch.max_attempts == 0 {
        anyhow::bail!("fetch.max_attempts must be > 0");
    }
    if config.fetch.concurrency == 0 {
        anyhow::bail!("fetch.concurrency must be > 0");
    }
    if config.fetch.timeout_secs == 0 {
        anyhow::bail!("fetch.timeout_secs must be > 0");
    }

    // Validate bindings: resolving surfaces name/slug collisions up front.
    registry::resolve_bindings(&config)?;

    Ok(config)
}
