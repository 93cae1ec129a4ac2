//! Result of a successful load

use crate::limits::ClientLimits;
use exporter::Exporter;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};
use tokio_util::sync::CancellationToken;
use types::utils::check_key;
use types::{EnvSyncError, ExportError, Result, SourceInfo};

/// Exporter shared between a client and the environments it produced
pub(crate) type ExporterSlot = Arc<RwLock<Option<Arc<dyn Exporter>>>>;

/// Merged configuration plus per-source provenance
#[derive(Debug)]
pub struct Environment {
    data: BTreeMap<String, String>,
    sources: Vec<SourceInfo>,
    exporter: ExporterSlot,
    limits: ClientLimits,
}

impl Environment {
    pub(crate) fn new(
        data: BTreeMap<String, String>,
        sources: Vec<SourceInfo>,
        exporter: ExporterSlot,
        limits: ClientLimits,
    ) -> Self {
        Self {
            data,
            sources,
            exporter,
            limits,
        }
    }

    /// Merged key/value data
    pub fn data(&self) -> &BTreeMap<String, String> {
        &self.data
    }

    /// Sources in the order they were processed
    pub fn sources(&self) -> &[SourceInfo] {
        &self.sources
    }

    /// Sorted keys
    pub fn keys(&self) -> Vec<&str> {
        self.data.keys().map(String::as_str).collect()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }

    /// Insert or replace a value, subject to the client's limits.
    ///
    /// Returns the previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Result<Option<String>> {
        let key = key.into();
        let value = value.into();

        if let Some(reason) = check_key(&key) {
            return Err(EnvSyncError::Validation(format!("invalid key {:?}: {}", key, reason)));
        }
        self.limits.check_entry(&key, &value)?;
        if !self.data.contains_key(&key) {
            self.limits.check_key_count(self.data.len() + 1)?;
        }

        Ok(self.data.insert(key, value))
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Consume the environment, keeping only the data
    pub fn into_data(self) -> BTreeMap<String, String> {
        self.data
    }

    /// Export through the owning client's exporter
    pub async fn export(&self, cancel: &CancellationToken, destination: &str) -> Result<PathBuf> {
        let exporter = self
            .exporter
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(ExportError::NotConfigured)?;

        exporter.export(cancel, &self.data, destination).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn environment(limits: ClientLimits) -> Environment {
        let data = [("A", "1"), ("B", "2")]
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::new(data, Vec::new(), ExporterSlot::default(), limits)
    }

    #[test]
    fn test_accessors() {
        let env = environment(ClientLimits::default());
        assert_eq!(env.keys(), vec!["A", "B"]);
        assert_eq!(env.get("A"), Some("1"));
        assert_eq!(env.get("missing"), None);
        assert_eq!(env.len(), 2);
        assert!(!env.is_empty());
    }

    #[test]
    fn test_set_respects_limits() {
        let mut env = environment(ClientLimits {
            max_keys: 2,
            max_value_length: 4,
            ..Default::default()
        });

        assert_eq!(env.set("A", "one").unwrap(), Some("1".to_string()));
        assert!(matches!(env.set("C", "3"), Err(EnvSyncError::Capacity { .. })));
        assert!(matches!(env.set("B", "too long"), Err(EnvSyncError::Capacity { .. })));
        assert!(matches!(env.set("BAD KEY", "x"), Err(EnvSyncError::Validation(_))));
        assert_eq!(env.get("A"), Some("one"));
        assert_eq!(env.len(), 2);
    }

    #[tokio::test]
    async fn test_export_without_exporter() {
        let env = environment(ClientLimits::default());
        let err = env
            .export(&CancellationToken::new(), "json:out.json")
            .await
            .unwrap_err();
        assert!(matches!(err, EnvSyncError::Export(ExportError::NotConfigured)));
    }
}
