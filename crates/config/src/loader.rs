//! Configuration loader implementation

use crate::schema::EnvSyncConfig;
use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;
use types::ConfigError;

/// Config file picked up from the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = ".envsync.yaml";

/// Prefix of environment variable overrides
pub const ENV_PREFIX: &str = "ENVSYNC_";

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const VALID_LOG_FORMATS: [&str; 2] = ["json", "pretty"];

/// Configuration loader layering defaults, a YAML file and environment variables
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration.
    ///
    /// An explicit `config_path` must exist. Without one, [`DEFAULT_CONFIG_FILE`]
    /// is used when present. `ENVSYNC_`-prefixed variables override both, with
    /// `__` separating nested keys (`ENVSYNC_LOAD__TIMEOUT_SECONDS=60`).
    pub fn load(config_path: Option<&Path>) -> Result<EnvSyncConfig> {
        let mut figment = Figment::from(Serialized::defaults(EnvSyncConfig::default()));

        match config_path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::FileNotFound {
                        path: path.display().to_string(),
                    }
                    .into());
                }
                debug!(path = %path.display(), "Using configuration file");
                figment = figment.merge(Yaml::file(path));
            }
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                debug!(path = DEFAULT_CONFIG_FILE, "Using default configuration file");
                figment = figment.merge(Yaml::file(DEFAULT_CONFIG_FILE));
            }
            None => {}
        }

        let config: EnvSyncConfig = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("Failed to parse configuration")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from string (for testing)
    pub fn load_from_str(yaml_content: &str) -> Result<EnvSyncConfig> {
        let config: EnvSyncConfig = Figment::from(Serialized::defaults(EnvSyncConfig::default()))
            .merge(Yaml::string(yaml_content))
            .extract()
            .context("Failed to parse configuration from string")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(config: &EnvSyncConfig) -> std::result::Result<(), ConfigError> {
        let invalid = |field: &str, message: String| ConfigError::ValidationError {
            field: field.to_string(),
            message,
        };

        if config.load.timeout_seconds == 0 {
            return Err(invalid("load.timeout_seconds", "Timeout must be greater than 0".to_string()));
        }
        if config.load.max_sources == 0 {
            return Err(invalid("load.max_sources", "Max sources cannot be 0".to_string()));
        }
        if config.load.output_dir.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "load.output_dir".to_string(),
            });
        }

        let limits = [
            ("limits.max_providers", config.limits.max_providers),
            ("limits.max_keys", config.limits.max_keys),
            ("limits.max_key_length", config.limits.max_key_length),
            ("limits.max_value_length", config.limits.max_value_length),
        ];
        for (field, value) in limits {
            if value == 0 {
                return Err(invalid(field, "Limit cannot be 0".to_string()));
            }
        }

        if !VALID_LOG_LEVELS.contains(&config.logging.level.as_str()) {
            return Err(invalid(
                "logging.level",
                format!(
                    "Invalid log level: {}. Valid levels: {:?}",
                    config.logging.level, VALID_LOG_LEVELS
                ),
            ));
        }
        if !VALID_LOG_FORMATS.contains(&config.logging.format.as_str()) {
            return Err(invalid(
                "logging.format",
                format!(
                    "Invalid log format: {}. Valid formats: {:?}",
                    config.logging.format, VALID_LOG_FORMATS
                ),
            ));
        }

        let mut seen = HashSet::new();
        for binding in &config.providers {
            if binding.name.trim().is_empty() {
                return Err(invalid("providers.name", "Provider binding name cannot be empty".to_string()));
            }
            if binding.name.contains(types::source::SPEC_SEPARATOR) {
                return Err(invalid(
                    "providers.name",
                    format!("Provider binding name cannot contain ':': {}", binding.name),
                ));
            }
            if binding.provider.trim().is_empty() {
                return Err(invalid(
                    "providers.provider",
                    format!("Registry provider cannot be empty for binding {}", binding.name),
                ));
            }
            if !seen.insert(binding.name.as_str()) {
                return Err(invalid(
                    "providers.name",
                    format!("Duplicate provider binding: {}", binding.name),
                ));
            }
        }

        Ok(())
    }

    /// Get default configuration
    pub fn default() -> EnvSyncConfig {
        EnvSyncConfig::default()
    }

    /// Create example configuration file
    pub fn create_example<P: AsRef<Path>>(path: P) -> Result<()> {
        let config = Self::default();
        let yaml_content = serde_yaml::to_string(&config)
            .context("Failed to serialize default configuration")?;

        std::fs::write(path.as_ref(), yaml_content)
            .context("Failed to write example configuration file")?;

        Ok(())
    }
}
