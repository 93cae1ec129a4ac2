//! Validator capability trait

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt;
use tokio_util::sync::CancellationToken;
use types::Result;

/// Merged configuration handed to validators
pub type ConfigMap = BTreeMap<String, String>;

/// Trait for validators of a merged configuration
///
/// Validators are read-only with respect to the mapping. A failure is reported
/// as `EnvSyncError::Validation` carrying every message found, joined with `; `.
#[async_trait]
pub trait Validator: Send + Sync + fmt::Debug {
    /// Get the validator name
    fn name(&self) -> &str;

    /// Validate the merged configuration
    async fn validate(&self, cancel: &CancellationToken, config: &ConfigMap) -> Result<()>;
}
