//! Error types for the envsync system

use thiserror::Error;

/// Main error type for the envsync system
#[derive(Error, Debug)]
pub enum EnvSyncError {
    /// Malformed source specifier or export destination
    #[error("Invalid source format: {0}")]
    SourceFormat(String),

    /// Provider lookup, validation or load failure
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Provider registry errors
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Duplicate key under the `error` merge strategy
    #[error("Merge conflict: duplicate key found: {key} (existing: {existing}, new: {incoming})")]
    MergeConflict {
        key: String,
        existing: String,
        incoming: String,
    },

    /// A configured limit was exceeded
    #[error("Capacity exceeded: {resource}: {actual} > {limit}")]
    Capacity {
        resource: String,
        limit: usize,
        actual: usize,
    },

    /// Aggregated failure from a validator
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid load options
    #[error("Invalid load options: {0}")]
    InvalidOptions(String),

    /// The operation was cancelled or timed out
    #[error("Operation cancelled: {0}")]
    Cancelled(String),
}

/// Result type alias for envsync operations
pub type Result<T> = std::result::Result<T, EnvSyncError>;

/// Failures reported by a provider implementation for a provider-local path
#[derive(Error, Debug)]
pub enum SourceError {
    /// Empty source path
    #[error("source cannot be empty")]
    Empty,

    /// File does not exist
    #[error("file not found: {path}")]
    FileNotFound { path: String },

    /// Path exists but is not a regular file
    #[error("source is not a regular file: {path}")]
    NotRegularFile { path: String },

    /// File exceeds the provider size limit
    #[error("file too large: {size} bytes > {limit} bytes")]
    TooLarge { size: u64, limit: u64 },

    /// File permissions are unsafe
    #[error("file is world-writable, which is insecure: {path}")]
    WorldWritable { path: String },

    /// File content could not be parsed
    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    /// Loaded data contains an invalid key
    #[error("invalid key {key:?}: {reason}")]
    InvalidKey { key: String, reason: String },

    /// Loaded data contains an oversized value
    #[error("value too long for key {key}: {length} > {limit}")]
    ValueTooLong {
        key: String,
        length: usize,
        limit: usize,
    },

    /// Provider-specific path grammar violation
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// Provider exists but has no working backend yet
    #[error("{provider} provider is not yet implemented{}", .detail.as_ref().map(|d| format!(" ({})", d)).unwrap_or_default())]
    NotImplemented {
        provider: String,
        detail: Option<String>,
    },

    /// Caller cancelled the load
    #[error("load cancelled")]
    Cancelled,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Provider errors raised by the load engine, carrying source context
#[derive(Error, Debug)]
pub enum ProviderError {
    /// No provider is bound to the requested name
    #[error("provider {provider} not found for source {spec}")]
    NotFound { spec: String, provider: String },

    /// Provider rejected the source before loading
    #[error("source validation failed for {spec} (provider {provider}): {cause}")]
    ValidationFailed {
        spec: String,
        provider: String,
        #[source]
        cause: SourceError,
    },

    /// Provider failed while loading the source
    #[error("failed to load {spec} from provider {provider}: {cause}")]
    LoadFailed {
        spec: String,
        provider: String,
        #[source]
        cause: SourceError,
    },
}

impl ProviderError {
    /// Name of the provider involved in the failure
    pub fn provider(&self) -> &str {
        match self {
            ProviderError::NotFound { provider, .. }
            | ProviderError::ValidationFailed { provider, .. }
            | ProviderError::LoadFailed { provider, .. } => provider,
        }
    }

    /// Source specifier involved in the failure
    pub fn spec(&self) -> &str {
        match self {
            ProviderError::NotFound { spec, .. }
            | ProviderError::ValidationFailed { spec, .. }
            | ProviderError::LoadFailed { spec, .. } => spec,
        }
    }
}

/// Provider registry specific errors
#[derive(Error, Debug)]
pub enum RegistryError {
    /// Registration info failed basic checks
    #[error("invalid provider info: {0}")]
    InvalidInfo(String),

    /// Registry reached its capacity
    #[error("registry is full (max {limit} providers)")]
    Full { limit: usize },

    /// Provider name already taken
    #[error("provider {name} already registered")]
    AlreadyRegistered { name: String },

    /// Alias collides with a provider name or another alias
    #[error("alias {alias} conflicts with existing {existing}")]
    AliasConflict { alias: String, existing: String },

    /// Unknown provider name or alias
    #[error("provider {name} not found")]
    NotFound { name: String },

    /// Required factory configuration key missing
    #[error("configuration validation failed for {provider}: required configuration key missing: {key}")]
    MissingConfig { provider: String, key: String },

    /// Factory returned an error
    #[error("failed to create provider {provider}: {message}")]
    Factory { provider: String, message: String },
}

/// Export specific errors
#[derive(Error, Debug)]
pub enum ExportError {
    /// No exporter configured on the client
    #[error("no exporter configured")]
    NotConfigured,

    /// Destination is not `format:path`
    #[error("invalid destination format, expected 'format:path', got: {0}")]
    InvalidDestination(String),

    /// Unknown output format
    #[error("unsupported export format: {format}")]
    UnsupportedFormat { format: String },

    /// Serialized output exceeds the size limit
    #[error("export content too large: {size} bytes > {limit} bytes")]
    TooLarge { size: usize, limit: usize },

    /// Serialization failed
    #[error("failed to serialize {format}: {message}")]
    Serialization { format: String, message: String },

    /// Filesystem failure
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

/// Configuration specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File not found
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    /// Parse error
    #[error("Configuration parse error: {0}")]
    ParseError(String),

    /// Validation error
    #[error("Configuration validation error: {field}: {message}")]
    ValidationError { field: String, message: String },

    /// Missing required field
    #[error("Missing required configuration field: {field}")]
    MissingField { field: String },

    /// Invalid value
    #[error("Invalid configuration value for {field}: {value}")]
    InvalidValue { field: String, value: String },
}

impl From<ConfigError> for EnvSyncError {
    fn from(err: ConfigError) -> Self {
        EnvSyncError::Config(err.to_string())
    }
}

impl EnvSyncError {
    /// Build a capacity error
    pub fn capacity(resource: impl Into<String>, limit: usize, actual: usize) -> Self {
        EnvSyncError::Capacity {
            resource: resource.into(),
            limit,
            actual,
        }
    }

    /// Whether this error came from a merge conflict
    pub fn is_merge_conflict(&self) -> bool {
        matches!(self, EnvSyncError::MergeConflict { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_conflict_message_names_key_and_values() {
        let err = EnvSyncError::MergeConflict {
            key: "K".to_string(),
            existing: "1".to_string(),
            incoming: "2".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("K"));
        assert!(msg.contains("existing: 1"));
        assert!(msg.contains("new: 2"));
        assert!(err.is_merge_conflict());
    }

    #[test]
    fn test_provider_error_carries_context() {
        let err = ProviderError::LoadFailed {
            spec: "local:.env".to_string(),
            provider: "local".to_string(),
            cause: SourceError::FileNotFound {
                path: "./.env".to_string(),
            },
        };
        assert_eq!(err.provider(), "local");
        assert_eq!(err.spec(), "local:.env");

        let wrapped: EnvSyncError = err.into();
        let msg = wrapped.to_string();
        assert!(msg.contains("local:.env"));
        assert!(msg.contains("file not found"));
    }

    #[test]
    fn test_not_implemented_detail() {
        let bare = SourceError::NotImplemented {
            provider: "vault".to_string(),
            detail: None,
        };
        assert_eq!(bare.to_string(), "vault provider is not yet implemented");

        let detailed = SourceError::NotImplemented {
            provider: "vault".to_string(),
            detail: Some("would load from: secret/app".to_string()),
        };
        assert!(detailed.to_string().ends_with("(would load from: secret/app)"));
    }

    #[test]
    fn test_config_error_conversion() {
        let err: EnvSyncError = ConfigError::MissingField {
            field: "providers".to_string(),
        }
        .into();
        assert!(matches!(err, EnvSyncError::Config(_)));
    }
}
