//! Kubernetes provider
//!
//! Source grammar is `[namespace/][kind/]name` where kind is `secret` or
//! `configmap`. A bare name refers to a secret. There is no cluster client
//! yet, so loading always reports the provider as not implemented.

use crate::traits::{Provider, ProviderData, SourceResult};
use async_trait::async_trait;
use std::fmt;
use tokio_util::sync::CancellationToken;
use types::SourceError;

/// Registered name of the Kubernetes provider
pub const PROVIDER_NAME: &str = "kubernetes";

/// Namespace used when neither the source nor the configuration names one
pub const DEFAULT_NAMESPACE: &str = "default";

/// Kubernetes resource kinds a source can reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Secret,
    ConfigMap,
}

impl ResourceKind {
    fn parse(kind: &str) -> Option<Self> {
        match kind.to_ascii_lowercase().as_str() {
            "secret" | "secrets" => Some(ResourceKind::Secret),
            "configmap" | "configmaps" | "cm" => Some(ResourceKind::ConfigMap),
            _ => None,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Secret => write!(f, "secret"),
            ResourceKind::ConfigMap => write!(f, "configmap"),
        }
    }
}

/// A parsed Kubernetes source reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef {
    pub namespace: String,
    pub kind: ResourceKind,
    pub name: String,
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.namespace, self.kind, self.name)
    }
}

/// Provider for Kubernetes secrets and config maps
#[derive(Debug, Clone)]
pub struct KubernetesProvider {
    kubeconfig: Option<String>,
    context: Option<String>,
    namespace: String,
}

impl KubernetesProvider {
    /// Create a provider using the default namespace
    pub fn new() -> Self {
        Self {
            kubeconfig: None,
            context: None,
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }

    /// Set the default namespace; empty means `default`
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        self.namespace = if namespace.trim().is_empty() {
            DEFAULT_NAMESPACE.to_string()
        } else {
            namespace
        };
        self
    }

    /// Set the kubeconfig path
    pub fn with_kubeconfig(mut self, kubeconfig: impl Into<String>) -> Self {
        self.kubeconfig = Some(kubeconfig.into());
        self
    }

    /// Set the kubeconfig context
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Default namespace for sources that do not name one
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Whether a kubeconfig has been supplied
    pub fn is_enabled(&self) -> bool {
        self.kubeconfig.is_some()
    }

    /// Parse a source reference
    pub fn parse_source(&self, source: &str) -> SourceResult<ResourceRef> {
        let source = source.trim();
        if source.is_empty() {
            return Err(SourceError::Empty);
        }

        let parts: Vec<&str> = source.split('/').collect();
        if parts.iter().any(|p| p.trim().is_empty()) {
            return Err(invalid_source(source));
        }

        let (namespace, kind, name) = match parts.as_slice() {
            [name] => (self.namespace.as_str(), ResourceKind::Secret, *name),
            [kind, name] => (
                self.namespace.as_str(),
                ResourceKind::parse(kind).ok_or_else(|| unknown_kind(kind))?,
                *name,
            ),
            [namespace, kind, name] => (
                *namespace,
                ResourceKind::parse(kind).ok_or_else(|| unknown_kind(kind))?,
                *name,
            ),
            _ => return Err(invalid_source(source)),
        };

        Ok(ResourceRef {
            namespace: namespace.to_string(),
            kind,
            name: name.to_string(),
        })
    }
}

impl Default for KubernetesProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn invalid_source(source: &str) -> SourceError {
    SourceError::InvalidPath(format!(
        "{} (expected: [namespace/]resource-type/resource-name)",
        source
    ))
}

fn unknown_kind(kind: &str) -> SourceError {
    SourceError::InvalidPath(format!(
        "unknown resource type {} (expected secret or configmap)",
        kind
    ))
}

#[async_trait]
impl Provider for KubernetesProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn validate(&self, source: &str) -> SourceResult<()> {
        self.parse_source(source).map(|_| ())
    }

    async fn load(&self, _cancel: &CancellationToken, source: &str) -> SourceResult<ProviderData> {
        let resource = self.parse_source(source)?;
        Err(SourceError::NotImplemented {
            provider: PROVIDER_NAME.to_string(),
            detail: Some(format!("would load {}", resource)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_source_forms() {
        let provider = KubernetesProvider::new().with_namespace("apps");

        let bare = provider.parse_source("db-creds").unwrap();
        assert_eq!(bare.namespace, "apps");
        assert_eq!(bare.kind, ResourceKind::Secret);
        assert_eq!(bare.name, "db-creds");

        let kind = provider.parse_source("configmap/settings").unwrap();
        assert_eq!(kind.namespace, "apps");
        assert_eq!(kind.kind, ResourceKind::ConfigMap);

        let full = provider.parse_source("prod/secret/api").unwrap();
        assert_eq!(full.to_string(), "prod/secret/api");
    }

    #[test]
    fn test_parse_source_rejects_bad_input() {
        let provider = KubernetesProvider::new();
        assert!(matches!(provider.validate(""), Err(SourceError::Empty)));
        assert!(provider.validate("a/b/c/d").is_err());
        assert!(provider.validate("deployment/web").is_err());
        assert!(provider.validate("prod//api").is_err());
    }

    #[test]
    fn test_empty_namespace_falls_back_to_default() {
        let provider = KubernetesProvider::new().with_namespace("");
        assert_eq!(provider.namespace(), DEFAULT_NAMESPACE);
        assert!(!provider.is_enabled());
        assert!(provider.with_kubeconfig("~/.kube/config").is_enabled());
    }

    #[tokio::test]
    async fn test_load_not_implemented() {
        let provider = KubernetesProvider::new();
        let err = provider
            .load(&CancellationToken::new(), "secret/api")
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::NotImplemented { .. }));
        assert!(err.to_string().contains("default/secret/api"));
    }
}
