//! Sequential composition of validators

use crate::traits::{ConfigMap, Validator};
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use types::{EnvSyncError, Result};

/// Runs validators in insertion order, stopping at the first failure
#[derive(Debug, Default, Clone)]
pub struct CompositeValidator {
    validators: Vec<Arc<dyn Validator>>,
}

impl CompositeValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a validator
    pub fn with(mut self, validator: Arc<dyn Validator>) -> Self {
        self.push(validator);
        self
    }

    pub fn push(&mut self, validator: Arc<dyn Validator>) {
        self.validators.push(validator);
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

#[async_trait]
impl Validator for CompositeValidator {
    fn name(&self) -> &str {
        "composite"
    }

    async fn validate(&self, cancel: &CancellationToken, config: &ConfigMap) -> Result<()> {
        for validator in &self.validators {
            if cancel.is_cancelled() {
                return Err(EnvSyncError::Cancelled("validation cancelled".to_string()));
            }
            debug!(validator = validator.name(), "Running validator");
            validator.validate(cancel, config).await?;
        }
        Ok(())
    }
}
