//! Rule-based validation

use crate::report::ValidationReport;
use crate::traits::{ConfigMap, Validator};
use async_trait::async_trait;
use std::fmt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use types::utils::{check_key, MAX_KEY_LENGTH, MAX_VALUE_LENGTH};
use types::{EnvSyncError, Result};

/// Maximum number of keys accepted by [`MaxKeysRule::default`]
pub const MAX_CONFIG_KEYS: usize = 1000;

/// A single check over the merged configuration
pub trait ValidationRule: Send + Sync + fmt::Debug {
    /// Rule name, used in logs
    fn name(&self) -> &str;

    /// Record any problems in `report`
    fn check(&self, config: &ConfigMap, report: &mut ValidationReport);
}

/// Keys must be non-empty, bounded and free of whitespace and `=`
#[derive(Debug, Clone)]
pub struct KeyFormatRule {
    pub max_length: usize,
}

impl Default for KeyFormatRule {
    fn default() -> Self {
        Self {
            max_length: MAX_KEY_LENGTH,
        }
    }
}

impl ValidationRule for KeyFormatRule {
    fn name(&self) -> &str {
        "key_format"
    }

    fn check(&self, config: &ConfigMap, report: &mut ValidationReport) {
        for key in config.keys() {
            if let Some(reason) = check_key(key) {
                report.add_error(key.as_str(), reason);
            } else if key.len() > self.max_length {
                report.add_error(
                    key.as_str(),
                    format!("key too long: {} > {}", key.len(), self.max_length),
                );
            }
        }
    }
}

/// Values must not exceed a byte length
#[derive(Debug, Clone)]
pub struct ValueLengthRule {
    pub max_length: usize,
}

impl Default for ValueLengthRule {
    fn default() -> Self {
        Self {
            max_length: MAX_VALUE_LENGTH,
        }
    }
}

impl ValidationRule for ValueLengthRule {
    fn name(&self) -> &str {
        "value_length"
    }

    fn check(&self, config: &ConfigMap, report: &mut ValidationReport) {
        for (key, value) in config {
            if value.len() > self.max_length {
                report.add_error(
                    key.as_str(),
                    format!("value too long: {} > {}", value.len(), self.max_length),
                );
            }
        }
    }
}

/// Named keys must be present. Present-but-empty values only warn.
#[derive(Debug, Clone, Default)]
pub struct RequiredKeysRule {
    pub keys: Vec<String>,
}

impl RequiredKeysRule {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }
}

impl ValidationRule for RequiredKeysRule {
    fn name(&self) -> &str {
        "required_keys"
    }

    fn check(&self, config: &ConfigMap, report: &mut ValidationReport) {
        for key in &self.keys {
            match config.get(key) {
                None => report.add_error(key.as_str(), "required key is missing"),
                Some(value) if value.is_empty() => {
                    report.add_warning(key.as_str(), "required key has an empty value")
                }
                Some(_) => {}
            }
        }
    }
}

/// Bounds the number of keys
#[derive(Debug, Clone)]
pub struct MaxKeysRule {
    pub max_keys: usize,
}

impl Default for MaxKeysRule {
    fn default() -> Self {
        Self {
            max_keys: MAX_CONFIG_KEYS,
        }
    }
}

impl ValidationRule for MaxKeysRule {
    fn name(&self) -> &str {
        "max_keys"
    }

    fn check(&self, config: &ConfigMap, report: &mut ValidationReport) {
        if config.len() > self.max_keys {
            report.add_error(
                "",
                format!(
                    "too many configuration keys: {} > {}",
                    config.len(),
                    self.max_keys
                ),
            );
        }
    }
}

/// Validator running a list of rules and aggregating every failure
#[derive(Debug, Default)]
pub struct RuleValidator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl RuleValidator {
    /// Create a validator with no rules
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a validator with the key format, value length and key count rules
    pub fn with_defaults() -> Self {
        Self::new()
            .with_rule(KeyFormatRule::default())
            .with_rule(ValueLengthRule::default())
            .with_rule(MaxKeysRule::default())
    }

    /// Append a rule
    pub fn with_rule(mut self, rule: impl ValidationRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Number of configured rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Run every rule and return the full report
    pub fn report(&self, config: &ConfigMap) -> ValidationReport {
        let mut report = ValidationReport::new();
        for rule in &self.rules {
            rule.check(config, &mut report);
            debug!(rule = rule.name(), errors = report.errors.len(), "Applied validation rule");
        }
        report
    }
}

#[async_trait]
impl Validator for RuleValidator {
    fn name(&self) -> &str {
        "rules"
    }

    async fn validate(&self, cancel: &CancellationToken, config: &ConfigMap) -> Result<()> {
        if cancel.is_cancelled() {
            return Err(EnvSyncError::Cancelled("validation cancelled".to_string()));
        }

        let report = self.report(config);
        for warning in &report.warnings {
            warn!(field = %warning.field, "{}", warning.message);
        }
        debug!("{}", report.summary());
        report.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(pairs: &[(&str, &str)]) -> ConfigMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_defaults_accept_clean_config() {
        let validator = RuleValidator::with_defaults();
        assert_eq!(validator.len(), 3);
        let result = validator
            .validate(&CancellationToken::new(), &config(&[("A", "1"), ("B.c", "2")]))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_failures_are_aggregated() {
        let validator = RuleValidator::with_defaults()
            .with_rule(RequiredKeysRule::new(["DATABASE_URL"]));
        let long = "v".repeat(MAX_VALUE_LENGTH + 1);
        let cfg = config(&[("BAD KEY", "1"), ("BIG", long.as_str())]);

        let err = validator
            .validate(&CancellationToken::new(), &cfg)
            .await
            .unwrap_err();
        let msg = err.to_string();
        assert!(matches!(err, EnvSyncError::Validation(_)));
        assert!(msg.contains("BAD KEY: key contains invalid characters"));
        assert!(msg.contains("BIG: value too long"));
        assert!(msg.contains("DATABASE_URL: required key is missing"));
        assert_eq!(msg.matches("; ").count(), 2);
    }

    #[test]
    fn test_key_format_rule() {
        let rule = KeyFormatRule { max_length: 4 };
        let mut report = ValidationReport::new();
        rule.check(&config(&[("", "x"), ("LONGKEY", "x"), ("A=B", "x"), ("OK", "x")]), &mut report);
        assert_eq!(report.errors.len(), 3);
    }

    #[test]
    fn test_required_keys_empty_value_warns() {
        let rule = RequiredKeysRule::new(["TOKEN"]);
        let mut report = ValidationReport::new();
        rule.check(&config(&[("TOKEN", "")]), &mut report);
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn test_max_keys_rule() {
        let rule = MaxKeysRule { max_keys: 1 };
        let mut report = ValidationReport::new();
        rule.check(&config(&[("A", "1"), ("B", "2")]), &mut report);
        assert_eq!(
            report.error_message(),
            "too many configuration keys: 2 > 1"
        );
    }

    #[tokio::test]
    async fn test_cancelled_before_validation() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = RuleValidator::with_defaults()
            .validate(&cancel, &ConfigMap::new())
            .await
            .unwrap_err();
        assert!(matches!(err, EnvSyncError::Cancelled(_)));
    }
}
