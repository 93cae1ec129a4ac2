//! HashiCorp Vault provider
//!
//! Holds connection settings only. The provider stays disabled until a Vault
//! client is wired in, and every operation reports it as not implemented.

use crate::traits::{Provider, ProviderData, SourceResult};
use async_trait::async_trait;
use std::fmt;
use tokio_util::sync::CancellationToken;
use types::SourceError;

/// Registered name of the Vault provider
pub const PROVIDER_NAME: &str = "vault";

/// Default Vault server address
pub const DEFAULT_ADDRESS: &str = "http://127.0.0.1:8200";

/// Default KV mount path
pub const DEFAULT_MOUNT_PATH: &str = "secret";

/// Provider for Vault KV secrets
#[derive(Clone)]
pub struct VaultProvider {
    address: String,
    token: String,
    mount_path: String,
    kv_version: u8,
    enabled: bool,
}

impl VaultProvider {
    /// Create a provider with default settings
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            token: token.into(),
            mount_path: DEFAULT_MOUNT_PATH.to_string(),
            kv_version: 2,
            enabled: false,
        }
    }

    /// Set the server address; empty keeps the default
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        let address = address.into();
        if !address.trim().is_empty() {
            self.address = address;
        }
        self
    }

    /// Set the KV mount path; empty keeps the default
    pub fn with_mount_path(mut self, mount_path: impl Into<String>) -> Self {
        let mount_path = mount_path.into();
        if !mount_path.trim().is_empty() {
            self.mount_path = mount_path.trim_matches('/').to_string();
        }
        self
    }

    /// Set the KV engine version (1 or 2)
    pub fn with_kv_version(mut self, version: u8) -> Self {
        self.kv_version = version;
        self
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn mount_path(&self) -> &str {
        &self.mount_path
    }

    pub fn kv_version(&self) -> u8 {
        self.kv_version
    }

    /// Whether the provider can serve requests.
    ///
    /// Always `false` until a Vault client backs `load`.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Secret path checks applied once the provider is enabled
    fn check_path(source: &str) -> SourceResult<()> {
        if source.trim().is_empty() {
            return Err(SourceError::Empty);
        }
        if source.contains("..") {
            return Err(SourceError::InvalidPath(format!(
                "path contains '..': {}",
                source
            )));
        }
        Ok(())
    }

    fn not_implemented(detail: Option<String>) -> SourceError {
        SourceError::NotImplemented {
            provider: PROVIDER_NAME.to_string(),
            detail,
        }
    }
}

impl fmt::Debug for VaultProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultProvider")
            .field("address", &self.address)
            .field("token", &"<redacted>")
            .field("mount_path", &self.mount_path)
            .field("kv_version", &self.kv_version)
            .field("enabled", &self.enabled)
            .finish()
    }
}

#[async_trait]
impl Provider for VaultProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn validate(&self, source: &str) -> SourceResult<()> {
        if !self.enabled {
            return Err(Self::not_implemented(None));
        }
        Self::check_path(source)
    }

    async fn load(&self, _cancel: &CancellationToken, source: &str) -> SourceResult<ProviderData> {
        Err(Self::not_implemented(Some(format!(
            "would load from: {}/{}",
            self.mount_path, source
        ))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_and_overrides() {
        let provider = VaultProvider::new("s.token");
        assert_eq!(provider.address(), DEFAULT_ADDRESS);
        assert_eq!(provider.mount_path(), DEFAULT_MOUNT_PATH);
        assert_eq!(provider.kv_version(), 2);
        assert!(!provider.is_enabled());

        let provider = provider
            .with_address("https://vault.internal:8200")
            .with_mount_path("/kv/")
            .with_kv_version(1)
            .with_address("");
        assert_eq!(provider.address(), "https://vault.internal:8200");
        assert_eq!(provider.mount_path(), "kv");
        assert_eq!(provider.kv_version(), 1);
    }

    #[test]
    fn test_debug_redacts_token() {
        let rendered = format!("{:?}", VaultProvider::new("s.very-secret"));
        assert!(!rendered.contains("very-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_validate_reports_disabled() {
        let provider = VaultProvider::new("t");
        assert!(matches!(
            provider.validate("app/config"),
            Err(SourceError::NotImplemented { .. })
        ));
    }

    #[test]
    fn test_check_path() {
        assert!(VaultProvider::check_path("app/config").is_ok());
        assert!(matches!(VaultProvider::check_path("  "), Err(SourceError::Empty)));
        assert!(matches!(
            VaultProvider::check_path("app/../root"),
            Err(SourceError::InvalidPath(_))
        ));
    }

    #[tokio::test]
    async fn test_load_not_implemented() {
        let provider = VaultProvider::new("t");
        let err = provider
            .load(&CancellationToken::new(), "app/config")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("secret/app/config"));
    }
}
