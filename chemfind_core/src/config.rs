//! Runtime configuration.
//!
//! Loaded from `~/.config/chemfind/config.toml` (or an explicit path). Every
//! field has a default, so a missing file yields a working configuration with
//! the keyless sources enabled.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_USER_AGENT: &str = concat!("chemfind/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_PUBCHEM_URL: &str = "https://pubchem.ncbi.nlm.nih.gov/rest/pug";
pub const DEFAULT_CHEMSPIDER_URL: &str = "https://api.rsc.org/compounds/v1";

/// Environment variable that overrides `chemspider.api_key`.
pub const CHEMSPIDER_KEY_ENV: &str = "CHEMSPIDER_API_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChemfindConfig {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub pubchem: PubChemConfig,
    #[serde(default)]
    pub chemspider: ChemSpiderConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Whole-request timeout applied by the HTTP client
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_connect_timeout_secs() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PubChemConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_pubchem_url")]
    pub base_url: String,
    /// Maximum compounds taken from one name lookup
    #[serde(default = "default_pubchem_max")]
    pub max_results: usize,
}

fn default_true() -> bool {
    true
}

fn default_pubchem_url() -> String {
    DEFAULT_PUBCHEM_URL.to_string()
}

fn default_pubchem_max() -> usize {
    10
}

impl Default for PubChemConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_pubchem_url(),
            max_results: default_pubchem_max(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChemSpiderConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_chemspider_url")]
    pub base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Record ids resolved to details per search
    #[serde(default = "default_chemspider_max")]
    pub max_records: usize,
}

fn default_chemspider_url() -> String {
    DEFAULT_CHEMSPIDER_URL.to_string()
}

fn default_chemspider_max() -> usize {
    5
}

impl Default for ChemSpiderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_chemspider_url(),
            api_key: None,
            max_records: default_chemspider_max(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_ttl_hours")]
    pub ttl_hours: i64,
    /// JSON cache file; defaults to `<data_dir>/chemfind/cache.json`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

fn default_ttl_hours() -> i64 {
    crate::cache::DEFAULT_CACHE_TTL_HOURS
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_hours: default_ttl_hours(),
            path: None,
        }
    }
}

impl ChemfindConfig {
    /// Default config file location.
    pub fn default_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|p| p.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("chemfind").join("config.toml")
    }

    /// Parse a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Load from `path`; a missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Load from `path` (or the default location) and apply environment
    /// overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(p) => Self::load_from(p)?,
            None => Self::load_from(&Self::default_path())?,
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply overrides from a variable lookup (`std::env::var` in production).
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(CHEMSPIDER_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.chemspider.api_key = Some(key);
        }
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write this config to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    pub fn cache_path(&self) -> PathBuf {
        self.cache
            .path
            .clone()
            .unwrap_or_else(crate::store::default_cache_path)
    }
}
