//! Configuration module for the faculty search engine.
//!
//! Layered configuration with figment:
//! - Default values
//! - TOML configuration file (`.facsearch/settings.toml`)
//! - Environment variable overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `FS_` and use double
//! underscores to separate nested levels:
//! - `FS_CORPUS__TRUNCATE_CHARS=300` sets `corpus.truncate_chars`
//! - `FS_SEARCH__DEFAULT_LIMIT=10` sets `search.default_limit`
//! - `FS_DEBUG=true` sets `debug`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Directory holding the snapshot (vector array + metadata side-table)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Global debug mode
    #[serde(default = "default_false")]
    pub debug: bool,

    /// Embedding model settings
    #[serde(default)]
    pub model: ModelConfig,

    /// Corpus loading settings
    #[serde(default)]
    pub corpus: CorpusConfig,

    /// Query-time settings
    #[serde(default)]
    pub search: SearchConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ModelConfig {
    /// Name of the embedding model
    #[serde(default = "default_model_name")]
    pub name: String,

    /// Directory for downloaded model files
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CorpusConfig {
    /// Maximum number of characters of profile text encoded per record.
    /// Longer text is truncated before encoding to cap memory and latency.
    #[serde(default = "default_truncate_chars")]
    pub truncate_chars: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SearchConfig {
    /// Default number of results returned when the caller does not ask
    /// for a specific limit
    #[serde(default = "default_limit")]
    pub default_limit: usize,
}

// Default value functions
fn default_version() -> u32 {
    1
}
fn default_data_dir() -> PathBuf {
    PathBuf::from(".facsearch/snapshot")
}
fn default_false() -> bool {
    false
}
fn default_model_name() -> String {
    "AllMiniLML6V2".to_string()
}
fn default_truncate_chars() -> usize {
    500
}
fn default_limit() -> usize {
    5
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            data_dir: default_data_dir(),
            debug: false,
            model: ModelConfig::default(),
            corpus: CorpusConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model_name(),
            cache_dir: None,
        }
    }
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            truncate_chars: default_truncate_chars(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
        }
    }
}

impl Settings {
    /// Load configuration from all sources
    pub fn load() -> Result<Self, Box<figment::Error>> {
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(".facsearch/settings.toml"));

        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(config_path))
            // Double underscore becomes a dot, single underscore stays
            // part of the field name
            .merge(Env::prefixed("FS_").map(|key| {
                key.as_str().to_lowercase().replace("__", ".").into()
            }))
            .extract()
            .map_err(Box::new)
    }

    /// Load configuration from a specific file
    pub fn load_from(path: impl AsRef<std::path::Path>) -> Result<Self, Box<figment::Error>> {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("FS_").map(|key| {
                key.as_str().to_lowercase().replace("__", ".").into()
            }))
            .extract()
            .map_err(Box::new)
    }

    /// Save current configuration to file
    pub fn save(
        &self,
        path: impl AsRef<std::path::Path>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let parent = path.as_ref().parent().ok_or("Invalid path")?;
        std::fs::create_dir_all(parent)?;

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }

    /// Directory where downloaded embedding models are cached
    pub fn models_dir(&self) -> PathBuf {
        self.model
            .cache_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(".facsearch/models"))
    }

    /// Find the workspace config by looking for a .facsearch directory,
    /// searching from the current directory up to root
    fn find_workspace_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        for ancestor in current.ancestors() {
            let config_dir = ancestor.join(".facsearch");
            if config_dir.exists() && config_dir.is_dir() {
                return Some(config_dir.join("settings.toml"));
            }
        }

        None
    }
}
