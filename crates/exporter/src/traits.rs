//! Exporter capability trait

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use types::Result;

/// Configuration handed to exporters
pub type ConfigMap = BTreeMap<String, String>;

/// Trait for configuration exporters
#[async_trait]
pub trait Exporter: Send + Sync + fmt::Debug {
    /// Write `config` to `destination` (`format:path`).
    ///
    /// Returns the path that was written.
    async fn export(
        &self,
        cancel: &CancellationToken,
        config: &ConfigMap,
        destination: &str,
    ) -> Result<PathBuf>;
}
