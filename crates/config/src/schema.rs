//! Configuration schema definitions

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use types::utils::{
    MAX_CLIENT_PROVIDERS, MAX_ENVIRONMENT_KEYS, MAX_KEY_LENGTH, MAX_SOURCES, MAX_VALUE_LENGTH,
};
use types::MergeStrategy;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnvSyncConfig {
    /// Defaults for the `load` command
    #[serde(default)]
    pub load: LoadConfig,
    /// Capacity limits of the load engine
    #[serde(default)]
    pub limits: LimitsConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Client-local provider bindings, built through the registry
    #[serde(default = "default_bindings")]
    pub providers: Vec<ProviderBinding>,
}

/// Defaults applied when the command line leaves them unset
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoadConfig {
    /// Merge strategy
    #[serde(default)]
    pub merge_strategy: MergeStrategy,
    /// Load timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    /// Directory relative export paths resolve against
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    /// Maximum number of sources per load
    #[serde(default = "default_max_sources")]
    pub max_sources: usize,
}

/// Capacity limits
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LimitsConfig {
    #[serde(default = "default_max_providers")]
    pub max_providers: usize,
    #[serde(default = "default_max_keys")]
    pub max_keys: usize,
    #[serde(default = "default_max_key_length")]
    pub max_key_length: usize,
    #[serde(default = "default_max_value_length")]
    pub max_value_length: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (json, pretty)
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Binds a client-local provider name to a registry entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderBinding {
    /// Name used as the source specifier prefix
    pub name: String,
    /// Registry name or alias
    pub provider: String,
    /// Declarative configuration passed to the registry factory
    #[serde(default)]
    pub config: Map<String, Value>,
}

impl ProviderBinding {
    pub fn new(name: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            provider: provider.into(),
            config: Map::new(),
        }
    }

    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }
}

impl LoadConfig {
    /// Load timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for EnvSyncConfig {
    fn default() -> Self {
        Self {
            load: LoadConfig::default(),
            limits: LimitsConfig::default(),
            logging: LoggingConfig::default(),
            providers: default_bindings(),
        }
    }
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            merge_strategy: MergeStrategy::default(),
            timeout_seconds: default_timeout_seconds(),
            output_dir: default_output_dir(),
            max_sources: default_max_sources(),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_providers: default_max_providers(),
            max_keys: default_max_keys(),
            max_key_length: default_max_key_length(),
            max_value_length: default_max_value_length(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_bindings() -> Vec<ProviderBinding> {
    ["local", types::DEFAULT_PROVIDER_NAME]
        .into_iter()
        .map(|name| ProviderBinding::new(name, "local").with_config("base_path", "."))
        .collect()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_output_dir() -> String {
    ".".to_string()
}

fn default_max_sources() -> usize {
    MAX_SOURCES
}

fn default_max_providers() -> usize {
    MAX_CLIENT_PROVIDERS
}

fn default_max_keys() -> usize {
    MAX_ENVIRONMENT_KEYS
}

fn default_max_key_length() -> usize {
    MAX_KEY_LENGTH
}

fn default_max_value_length() -> usize {
    MAX_VALUE_LENGTH
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}
