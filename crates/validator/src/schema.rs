//! JSON Schema validation
//!
//! The merged configuration is checked as a JSON object whose values are all
//! strings, so schemas constrain values with `type: string` plus `pattern`,
//! `enum`, `minLength` and friends.

use crate::traits::{ConfigMap, Validator};
use async_trait::async_trait;
use jsonschema::{Draft, JSONSchema};
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use types::{EnvSyncError, Result};

/// Schema file looked up when none is given
pub const DEFAULT_SCHEMA_FILE: &str = ".envschema.json";

/// Validator checking the configuration against a compiled draft-07 schema
pub struct SchemaValidator {
    source: Option<PathBuf>,
    schema: JSONSchema,
}

impl SchemaValidator {
    /// Load and compile a schema file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let path = if path.as_os_str().is_empty() {
            Path::new(DEFAULT_SCHEMA_FILE)
        } else {
            path
        };

        if !path.exists() {
            return Err(EnvSyncError::Config(format!(
                "schema file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            EnvSyncError::Config(format!("failed to read schema file {}: {}", path.display(), e))
        })?;
        let document: Value = serde_json::from_str(&content).map_err(|e| {
            EnvSyncError::Config(format!("failed to parse schema file {}: {}", path.display(), e))
        })?;

        let mut validator = Self::from_value(&document)?;
        validator.source = Some(path.to_path_buf());
        debug!(schema = %path.display(), "Loaded JSON schema");
        Ok(validator)
    }

    /// Compile an in-memory schema document
    pub fn from_value(document: &Value) -> Result<Self> {
        let schema = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(document)
            .map_err(|e| EnvSyncError::Config(format!("failed to load schema: {}", e)))?;

        Ok(Self {
            source: None,
            schema,
        })
    }

    /// Path the schema was loaded from, if any
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    fn violations(&self, config: &ConfigMap) -> Vec<String> {
        let instance = Value::Object(
            config
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect(),
        );

        // Bound to a local so the error iterator is dropped before `instance`.
        let violations = match self.schema.validate(&instance) {
            Ok(()) => Vec::new(),
            Err(errors) => errors
                .map(|e| {
                    let location = e.instance_path.to_string();
                    if location.is_empty() {
                        e.to_string()
                    } else {
                        format!("{}: {}", location, e)
                    }
                })
                .collect(),
        };
        violations
    }
}

impl fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaValidator")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Validator for SchemaValidator {
    fn name(&self) -> &str {
        "schema"
    }

    async fn validate(&self, cancel: &CancellationToken, config: &ConfigMap) -> Result<()> {
        if cancel.is_cancelled() {
            return Err(EnvSyncError::Cancelled("validation cancelled".to_string()));
        }

        let violations = self.violations(config);
        if violations.is_empty() {
            return Ok(());
        }

        debug!(count = violations.len(), "Schema validation failed");
        Err(EnvSyncError::Validation(violations.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn schema() -> Value {
        json!({
            "$schema": "http://json-schema.org/draft-07/schema#",
            "type": "object",
            "required": ["DATABASE_URL", "PORT"],
            "properties": {
                "DATABASE_URL": {"type": "string", "minLength": 1},
                "PORT": {"type": "string", "pattern": "^[0-9]+$"},
                "LOG_LEVEL": {"type": "string", "enum": ["debug", "info", "warn", "error"]}
            }
        })
    }

    fn config(pairs: &[(&str, &str)]) -> ConfigMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_valid_config_passes() {
        let validator = SchemaValidator::from_value(&schema()).unwrap();
        let cfg = config(&[("DATABASE_URL", "postgres://db"), ("PORT", "5432"), ("LOG_LEVEL", "info")]);
        assert!(validator.validate(&CancellationToken::new(), &cfg).await.is_ok());
    }

    #[tokio::test]
    async fn test_violations_are_joined() {
        let validator = SchemaValidator::from_value(&schema()).unwrap();
        let cfg = config(&[("PORT", "http"), ("LOG_LEVEL", "loud")]);

        let err = validator
            .validate(&CancellationToken::new(), &cfg)
            .await
            .unwrap_err();
        let msg = match err {
            EnvSyncError::Validation(msg) => msg,
            other => panic!("unexpected error: {other}"),
        };
        assert!(msg.contains("DATABASE_URL"));
        assert!(msg.contains("/PORT"));
        assert!(msg.contains("/LOG_LEVEL"));
        assert_eq!(msg.split("; ").count(), 3);
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", schema()).unwrap();

        let validator = SchemaValidator::from_file(file.path()).unwrap();
        assert_eq!(validator.source(), Some(file.path()));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = SchemaValidator::from_file("/nonexistent/schema.json").unwrap_err();
        assert!(err.to_string().contains("schema file not found"));
    }

    #[test]
    fn test_invalid_schema_rejected() {
        let err = SchemaValidator::from_value(&json!({"type": 12})).unwrap_err();
        assert!(matches!(err, EnvSyncError::Config(_)));
    }
}
