//! Wiring of configuration, registry and client

use anyhow::{Context, Result};
use client::{Client, ClientLimits};
use config::{EnvSyncConfig, LimitsConfig};
use providers::{Provider, ProviderConfig, Registry};
use std::sync::Arc;
use tracing::{debug, info};

/// Client limits taken from configuration
pub fn client_limits(config: &EnvSyncConfig) -> ClientLimits {
    let LimitsConfig {
        max_providers,
        max_keys,
        max_key_length,
        max_value_length,
    } = config.limits;
    ClientLimits {
        max_providers,
        max_sources: config.load.max_sources,
        max_keys,
        max_key_length,
        max_value_length,
    }
}

/// Build a client with the configured provider bindings.
///
/// Bindings naming the same registry entry with identical configuration share
/// one provider instance.
pub fn build_client(config: &EnvSyncConfig, registry: &Registry) -> Result<Client> {
    let mut client = Client::with_limits(client_limits(config));
    let mut created: Vec<(String, &ProviderConfig, Arc<dyn Provider>)> = Vec::new();

    for binding in &config.providers {
        let canonical = registry
            .resolve_name(&binding.provider)
            .unwrap_or_else(|| binding.provider.clone());

        let shared = created
            .iter()
            .find(|(name, cfg, _)| *name == canonical && **cfg == binding.config)
            .map(|(_, _, provider)| provider.clone());

        let provider = match shared {
            Some(provider) => provider,
            None => {
                let provider = registry
                    .create_provider(&binding.provider, &binding.config)
                    .with_context(|| {
                        format!(
                            "Failed to create provider '{}' for binding '{}'",
                            binding.provider, binding.name
                        )
                    })?;
                created.push((canonical, &binding.config, provider.clone()));
                provider
            }
        };

        if client.add_provider(binding.name.clone(), provider) {
            debug!(binding = %binding.name, provider = %binding.provider, "Provider binding created");
        }
    }

    info!(providers = ?client.provider_names(), "Client initialized");
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::ProviderBinding;
    use providers::register_builtin;

    fn registry() -> Registry {
        let registry = Registry::new();
        register_builtin(&registry).unwrap();
        registry
    }

    #[test]
    fn test_default_bindings() {
        let config = EnvSyncConfig::default();
        let client = build_client(&config, &registry()).unwrap();

        assert_eq!(client.provider_names(), vec!["default", "local"]);
        assert_eq!(client.limits().max_sources, config.load.max_sources);
        assert_eq!(client.limits().max_keys, config.limits.max_keys);
    }

    #[test]
    fn test_bindings_resolve_aliases() {
        let mut config = EnvSyncConfig::default();
        config.providers = vec![
            ProviderBinding::new("files", "fs").with_config("base_path", "/etc/app"),
            ProviderBinding::new("cluster", "k8s").with_config("namespace", "prod"),
        ];

        let client = build_client(&config, &registry()).unwrap();
        assert!(client.has_provider("files"));
        assert!(client.has_provider("cluster"));
        assert!(!client.has_provider("local"));
    }

    #[test]
    fn test_unknown_registry_provider() {
        let mut config = EnvSyncConfig::default();
        config.providers = vec![ProviderBinding::new("x", "consul")];

        let err = build_client(&config, &registry()).unwrap_err();
        assert!(format!("{err:#}").contains("consul"));
    }

    #[test]
    fn test_missing_required_config() {
        let mut config = EnvSyncConfig::default();
        config.providers = vec![ProviderBinding::new("secrets", "vault")];

        assert!(build_client(&config, &registry()).is_err());
    }

    #[test]
    fn test_binding_capacity() {
        let mut config = EnvSyncConfig::default();
        config.limits.max_providers = 1;

        let client = build_client(&config, &registry()).unwrap();
        assert_eq!(client.provider_names(), vec!["local"]);
    }
}
