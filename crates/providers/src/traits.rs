//! Provider capability trait

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt;
use tokio_util::sync::CancellationToken;
use types::SourceError;

/// Key/value pairs produced by a provider
pub type ProviderData = BTreeMap<String, String>;

/// Result type for provider operations
pub type SourceResult<T> = std::result::Result<T, SourceError>;

/// Trait for configuration providers
///
/// A provider validates and loads one provider-local path into a flat
/// key/value mapping. Implementations must be safe to share between
/// concurrent loads when a client is used from several tasks.
#[async_trait]
pub trait Provider: Send + Sync + fmt::Debug {
    /// Get the provider name
    fn name(&self) -> &str;

    /// Check a source path before loading it
    fn validate(&self, source: &str) -> SourceResult<()>;

    /// Load the source.
    ///
    /// Implementations doing blocking or remote I/O should observe `cancel`.
    async fn load(&self, cancel: &CancellationToken, source: &str) -> SourceResult<ProviderData>;
}
