//! Optional `finkit.toml` settings for the stock commands and Monte Carlo.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_FILE: &str = "finkit.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Where fetched price histories are cached
    pub cache_dir: PathBuf,
    /// Directory holding `<TICKER>.csv` price files
    pub price_dir: PathBuf,
    /// Monte Carlo seed when a command does not pass one
    pub default_seed: u64,
    pub stale_after_days: i64,
}

impl Default for CliConfig {
    fn default() -> Self {
        CliConfig {
            cache_dir: default_cache_dir(),
            price_dir: PathBuf::from("prices"),
            default_seed: 42,
            stale_after_days: finkit_core::stocks::DEFAULT_STALE_AFTER_DAYS,
        }
    }
}

impl CliConfig {
    /// Load from `path`, or from `finkit.toml` in the working directory when
    /// present. An explicit path that does not exist is an error; a missing
    /// default file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let candidate = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !candidate.is_file() {
                    return Ok(CliConfig::default());
                }
                candidate
            }
        };

        let contents = fs::read_to_string(&path)
            .map_err(|e| format!("Failed to read config '{}': {}", path.display(), e))?;
        let config: CliConfig = toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config '{}': {}", path.display(), e))?;
        tracing::debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }
}

fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".cache")))
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join("finkit")
        .join("stocks")
}
