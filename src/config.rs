use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

// =============================================================================
// Constants
// =============================================================================

/// How long a cached manifest and tag list stay fresh (30 minutes)
pub const DEFAULT_CACHE_TTL_MS: i64 = 30 * 60 * 1000;

/// Timeout of a single fetch request in milliseconds (5 seconds)
pub const FETCH_TIMEOUT_MS: u64 = 5_000;

/// Number of versions printed by `--list` without a count
pub const DEFAULT_LIST_COUNT: usize = 20;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "NPM_REPO_CONFIG";

const APP_DIR: &str = "npm-repo";

/// Tool configuration, read from a JSON file
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub cache: CacheConfig,
    pub registries: RegistriesConfig,
}

/// Cache-related configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CacheConfig {
    pub enabled: bool,
    /// Freshness window in milliseconds
    pub ttl: i64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl: DEFAULT_CACHE_TTL_MS,
        }
    }
}

/// Endpoints of the remote sources
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct RegistriesConfig {
    /// package.json CDNs, tried in order
    pub manifest: Vec<String>,
    /// jsDelivr data API used to resolve version ranges
    pub resolve: String,
    pub github: String,
    pub github_api: String,
}

impl Default for RegistriesConfig {
    fn default() -> Self {
        Self {
            manifest: vec![
                "https://unpkg.com".to_string(),
                "https://esm.sh".to_string(),
            ],
            resolve: "https://data.jsdelivr.com".to_string(),
            github: "https://github.com".to_string(),
            github_api: "https://api.github.com".to_string(),
        }
    }
}

impl Config {
    /// Load the config file at `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Returns the path of the config file.
/// Uses $NPM_REPO_CONFIG if set, otherwise
/// $XDG_CONFIG_HOME/npm-repo/config.json or ~/.config/npm-repo/config.json.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return PathBuf::from(path);
    }
    app_dir_with_env(
        std::env::var("XDG_CONFIG_HOME").ok(),
        dirs::home_dir().map(|home| home.join(".config")),
    )
    .join("config.json")
}

/// Returns the path of the cache database.
/// Uses $XDG_CACHE_HOME/npm-repo if XDG_CACHE_HOME is set,
/// otherwise falls back to ~/.cache/npm-repo,
/// or the system temp directory if neither is available.
pub fn cache_db_path() -> PathBuf {
    app_dir_with_env(
        std::env::var("XDG_CACHE_HOME").ok(),
        dirs::home_dir().map(|home| home.join(".cache")),
    )
    .join("cache.db")
}

fn app_dir_with_env(xdg_home: Option<String>, fallback: Option<PathBuf>) -> PathBuf {
    xdg_home
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or(fallback)
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR)
}
