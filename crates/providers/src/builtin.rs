//! Registrations for the providers shipped with envsync

use crate::kubernetes::{self, KubernetesProvider};
use crate::local::{self, LocalProvider};
use crate::registry::{ProviderConfig, ProviderInfo, Registry, HIGH_PRIORITY, LOW_PRIORITY};
use crate::traits::Provider;
use crate::vault::{self, VaultProvider};
use anyhow::{bail, Context};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;
use types::RegistryError;

/// Read an optional string entry from a provider configuration
pub fn config_str(config: &ProviderConfig, key: &str) -> anyhow::Result<Option<String>> {
    match config.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => bail!("configuration key {} must be a string, got {}", key, other),
    }
}

/// Registration info for the local filesystem provider
pub fn local_info() -> ProviderInfo {
    ProviderInfo::new(local::PROVIDER_NAME, |config| {
        let provider = match config_str(config, "base_path")? {
            Some(base) => LocalProvider::with_base_path(base),
            None => LocalProvider::new(),
        };
        Ok(Arc::new(provider) as Arc<dyn Provider>)
    })
    .with_aliases(["file", "fs", "filesystem"])
    .with_priority(HIGH_PRIORITY)
    .with_description("Load configuration from local .env, JSON or YAML files")
    .with_supported_sources([".env", "config/.env.production", "/etc/app/config.yaml"])
    .with_optional_config(["base_path"])
}

/// Registration info for the Kubernetes provider
pub fn kubernetes_info() -> ProviderInfo {
    ProviderInfo::new(kubernetes::PROVIDER_NAME, |config| {
        let mut provider = KubernetesProvider::new();
        if let Some(namespace) = config_str(config, "namespace")? {
            provider = provider.with_namespace(namespace);
        }
        if let Some(kubeconfig) = config_str(config, "kubeconfig")? {
            provider = provider.with_kubeconfig(kubeconfig);
        }
        if let Some(context) = config_str(config, "context")? {
            provider = provider.with_context(context);
        }
        Ok(Arc::new(provider) as Arc<dyn Provider>)
    })
    .with_aliases(["k8s", "kube"])
    .with_description("Load configuration from Kubernetes secrets and config maps (not yet implemented)")
    .with_supported_sources(["secret/app-config", "production/configmap/settings"])
    .with_optional_config(["kubeconfig", "context", "namespace"])
}

/// Registration info for the Vault provider
pub fn vault_info() -> ProviderInfo {
    ProviderInfo::new(vault::PROVIDER_NAME, |config| {
        let token = config_str(config, "token")?.context("vault token is required")?;
        let mut provider = VaultProvider::new(token);
        if let Some(address) = config_str(config, "address")? {
            provider = provider.with_address(address);
        }
        if let Some(mount_path) = config_str(config, "mount_path")? {
            provider = provider.with_mount_path(mount_path);
        }
        if let Some(version) = config.get("version") {
            let version = match version {
                Value::Number(n) => n.as_u64(),
                Value::String(s) => s.trim_start_matches(['v', 'V']).parse().ok(),
                _ => None,
            };
            match version {
                Some(v @ (1 | 2)) => provider = provider.with_kv_version(v as u8),
                _ => bail!("vault KV version must be 1 or 2"),
            }
        }
        Ok(Arc::new(provider) as Arc<dyn Provider>)
    })
    .with_aliases(["hcvault", "hashicorp-vault"])
    .with_priority(LOW_PRIORITY)
    .with_description("Load secrets from HashiCorp Vault KV engines (not yet implemented)")
    .with_supported_sources(["app/config", "secret/data/app"])
    .with_required_config(["token"])
    .with_optional_config(["address", "mount_path", "version"])
}

/// Register every built-in provider into `registry`.
///
/// Stops at the first failure; providers registered before it stay registered.
pub fn register_builtin(registry: &Registry) -> Result<(), RegistryError> {
    for info in [local_info(), kubernetes_info(), vault_info()] {
        let name = info.name.clone();
        registry.register(info)?;
        debug!(provider = %name, "Registered built-in provider");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(value: Value) -> ProviderConfig {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_register_builtin() {
        let registry = Registry::new();
        register_builtin(&registry).unwrap();

        assert_eq!(registry.len(), 3);
        for name in ["local", "file", "fs", "filesystem", "k8s", "kube", "hcvault", "hashicorp-vault"] {
            assert!(registry.is_provider_registered(name), "{} missing", name);
        }

        let order: Vec<String> = registry.list_providers().into_iter().map(|p| p.name).collect();
        assert_eq!(order, vec!["local", "kubernetes", "vault"]);

        // Registering twice is rejected.
        assert!(register_builtin(&registry).is_err());
    }

    #[test]
    fn test_local_factory_uses_base_path() {
        let registry = Registry::new();
        register_builtin(&registry).unwrap();

        let provider = registry
            .create_provider("fs", &config(json!({"base_path": "/srv"})))
            .unwrap();
        assert_eq!(provider.name(), "local");

        assert!(registry
            .create_provider("local", &config(json!({"base_path": 7})))
            .is_err());
    }

    #[test]
    fn test_vault_factory_config() {
        let registry = Registry::new();
        register_builtin(&registry).unwrap();

        assert!(matches!(
            registry.create_provider("vault", &ProviderConfig::new()),
            Err(RegistryError::MissingConfig { .. })
        ));
        assert!(registry
            .create_provider("hcvault", &config(json!({"token": "t", "version": "v1"})))
            .is_ok());
        assert!(matches!(
            registry.create_provider("vault", &config(json!({"token": "t", "version": 3}))),
            Err(RegistryError::Factory { .. })
        ));
    }

    #[test]
    fn test_kubernetes_factory() {
        let registry = Registry::new();
        register_builtin(&registry).unwrap();

        let provider = registry
            .create_provider("k8s", &config(json!({"namespace": "prod"})))
            .unwrap();
        assert_eq!(provider.name(), "kubernetes");
        assert!(provider.validate("secret/api").is_ok());
    }
}
