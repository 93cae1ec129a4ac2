//! Load engine

use crate::environment::{Environment, ExporterSlot};
use crate::limits::ClientLimits;
use crate::merge::merge_into;
use exporter::Exporter;
use providers::Provider;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};
use types::source::check_specifiers;
use types::utils::generate_load_id;
use types::{
    EnvSyncError, LoadOptions, ProviderError, Result, SourceError, SourceInfo, SourceSpec,
};
use validator::Validator;

/// Holds named provider instances plus an optional validator and exporter,
/// and turns a list of source specifiers into an [`Environment`].
///
/// Provider names here are client-local bindings, independent of the
/// registry. A single provider instance may be bound under several names.
#[derive(Debug, Default)]
pub struct Client {
    providers: HashMap<String, Arc<dyn Provider>>,
    validator: Option<Arc<dyn Validator>>,
    exporter: ExporterSlot,
    limits: ClientLimits,
}

impl Client {
    /// Create a client with default limits
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a client with custom limits
    pub fn with_limits(limits: ClientLimits) -> Self {
        Self {
            limits,
            ..Default::default()
        }
    }

    pub fn limits(&self) -> &ClientLimits {
        &self.limits
    }

    /// Bind a provider instance to `name`.
    ///
    /// Rebinding an existing name replaces it. Once `max_providers` distinct
    /// names are bound, new names are ignored and `false` is returned; this is
    /// not an error.
    pub fn add_provider(&mut self, name: impl Into<String>, provider: Arc<dyn Provider>) -> bool {
        let name = name.into();
        if !self.providers.contains_key(&name) && self.providers.len() >= self.limits.max_providers {
            warn!(
                provider = %name,
                limit = self.limits.max_providers,
                "Provider limit reached, ignoring binding"
            );
            return false;
        }

        debug!(provider = %name, implementation = provider.name(), "Bound provider");
        self.providers.insert(name, provider);
        true
    }

    /// Client-local provider names, sorted
    pub fn provider_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.providers.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn has_provider(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    /// Replace the validator run after every load
    pub fn set_validator(&mut self, validator: Arc<dyn Validator>) {
        self.validator = Some(validator);
    }

    /// Replace the exporter.
    ///
    /// Environments produced earlier by this client see the new exporter too.
    pub fn set_exporter(&self, exporter: Arc<dyn Exporter>) {
        *self.exporter.write().unwrap_or_else(PoisonError::into_inner) = Some(exporter);
    }

    /// Load, merge and validate the given sources.
    ///
    /// Sources are processed strictly in order. Any failure aborts the whole
    /// load and no environment is produced.
    pub async fn load(&self, cancel: &CancellationToken, options: &LoadOptions) -> Result<Environment> {
        let span = info_span!(
            "load",
            load_id = %generate_load_id(),
            sources = options.sources.len(),
            strategy = %options.merge_strategy,
        );
        self.load_sources(cancel, options).instrument(span).await
    }

    async fn load_sources(&self, cancel: &CancellationToken, options: &LoadOptions) -> Result<Environment> {
        if options.sources.is_empty() {
            return Err(EnvSyncError::InvalidOptions(
                "at least one source is required".to_string(),
            ));
        }
        if options.sources.len() > self.limits.max_sources {
            return Err(EnvSyncError::capacity(
                "sources",
                self.limits.max_sources,
                options.sources.len(),
            ));
        }
        check_specifiers(&options.sources)?;

        let mut data = BTreeMap::new();
        let mut sources = Vec::with_capacity(options.sources.len());

        for raw in &options.sources {
            if cancel.is_cancelled() {
                return Err(EnvSyncError::Cancelled(format!("load cancelled before source {}", raw)));
            }

            let spec = SourceSpec::parse(raw);
            let loaded = self.load_source(cancel, &spec).await?;
            let key_count = merge_into(&mut data, loaded, options.merge_strategy)?;

            info!(source = %spec.raw, provider = %spec.provider, keys = key_count, "Loaded source");
            sources.push(SourceInfo {
                name: spec.raw,
                provider: spec.provider,
                key_count,
            });
        }

        if let Some(validator) = &self.validator {
            if cancel.is_cancelled() {
                return Err(EnvSyncError::Cancelled("load cancelled before validation".to_string()));
            }
            debug!(validator = validator.name(), keys = data.len(), "Validating merged configuration");
            validator.validate(cancel, &data).await?;
        }

        self.limits.check_key_count(data.len())?;

        info!(keys = data.len(), "Load complete");
        Ok(Environment::new(data, sources, Arc::clone(&self.exporter), self.limits))
    }

    async fn load_source(
        &self,
        cancel: &CancellationToken,
        spec: &SourceSpec,
    ) -> Result<BTreeMap<String, String>> {
        let provider = self
            .providers
            .get(&spec.provider)
            .ok_or_else(|| ProviderError::NotFound {
                spec: spec.raw.clone(),
                provider: spec.provider.clone(),
            })?;

        provider
            .validate(&spec.path)
            .map_err(|cause| ProviderError::ValidationFailed {
                spec: spec.raw.clone(),
                provider: spec.provider.clone(),
                cause,
            })?;

        let loaded = match provider.load(cancel, &spec.path).await {
            Ok(loaded) => loaded,
            Err(SourceError::Cancelled) => {
                return Err(EnvSyncError::Cancelled(format!("load cancelled in source {}", spec.raw)))
            }
            Err(cause) => {
                return Err(ProviderError::LoadFailed {
                    spec: spec.raw.clone(),
                    provider: spec.provider.clone(),
                    cause,
                }
                .into())
            }
        };

        for (key, value) in &loaded {
            self.limits.check_entry(key, value)?;
        }
        Ok(loaded)
    }
}
