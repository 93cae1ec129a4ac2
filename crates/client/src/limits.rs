//! Capacity limits enforced by the load engine

use types::utils::{
    truncate_display, MAX_CLIENT_PROVIDERS, MAX_ENVIRONMENT_KEYS, MAX_KEY_LENGTH, MAX_SOURCES,
    MAX_VALUE_LENGTH,
};

/// Characters of an oversized key quoted in errors
const ERROR_KEY_DISPLAY: usize = 64;

/// Bounds applied by a [`Client`](crate::Client) and the environments it produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientLimits {
    /// Provider bindings accepted by `add_provider`; extra bindings are ignored
    pub max_providers: usize,
    /// Sources accepted per load
    pub max_sources: usize,
    /// Keys in the merged environment
    pub max_keys: usize,
    /// Bytes per key
    pub max_key_length: usize,
    /// Bytes per value
    pub max_value_length: usize,
}

impl Default for ClientLimits {
    fn default() -> Self {
        Self {
            max_providers: MAX_CLIENT_PROVIDERS,
            max_sources: MAX_SOURCES,
            max_keys: MAX_ENVIRONMENT_KEYS,
            max_key_length: MAX_KEY_LENGTH,
            max_value_length: MAX_VALUE_LENGTH,
        }
    }
}

impl ClientLimits {
    /// Check one key/value pair against the length limits
    pub fn check_entry(&self, key: &str, value: &str) -> types::Result<()> {
        if key.len() > self.max_key_length {
            return Err(types::EnvSyncError::capacity(
                format!("key length ({})", truncate_display(key, ERROR_KEY_DISPLAY)),
                self.max_key_length,
                key.len(),
            ));
        }
        if value.len() > self.max_value_length {
            return Err(types::EnvSyncError::capacity(
                format!("value length for key {}", key),
                self.max_value_length,
                value.len(),
            ));
        }
        Ok(())
    }

    /// Check the total key count
    pub fn check_key_count(&self, count: usize) -> types::Result<()> {
        if count > self.max_keys {
            return Err(types::EnvSyncError::capacity(
                "environment keys",
                self.max_keys,
                count,
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let limits = ClientLimits::default();
        assert_eq!(limits.max_providers, 50);
        assert_eq!(limits.max_sources, 10);
        assert_eq!(limits.max_keys, 10_000);
        assert_eq!(limits.max_key_length, 256);
        assert_eq!(limits.max_value_length, 4096);
    }

    #[test]
    fn test_check_entry() {
        let limits = ClientLimits {
            max_key_length: 3,
            max_value_length: 2,
            ..Default::default()
        };
        assert!(limits.check_entry("ABC", "12").is_ok());

        let err = limits.check_entry("ABCD", "1").unwrap_err();
        assert!(matches!(err, types::EnvSyncError::Capacity { limit: 3, actual: 4, .. }));

        let err = limits.check_entry("A", "123").unwrap_err();
        assert!(err.to_string().contains("value length for key A"));
    }

    #[test]
    fn test_oversized_key_is_shortened_in_error() {
        let limits = ClientLimits::default();
        let key = "K".repeat(1000);

        let err = limits.check_entry(&key, "v").unwrap_err();
        match err {
            types::EnvSyncError::Capacity {
                ref resource,
                limit,
                actual,
            } => {
                assert_eq!((limit, actual), (MAX_KEY_LENGTH, 1000));
                assert!(resource.len() < 100);
                assert!(resource.ends_with("...)"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
