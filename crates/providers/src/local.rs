//! Local filesystem provider
//!
//! Reads `.env` style files, or JSON / YAML documents which are flattened into
//! dotted keys (`database.host`).

use crate::traits::{Provider, ProviderData, SourceResult};
use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use types::utils::check_key;
use types::SourceError;

/// Registered name of the local provider
pub const PROVIDER_NAME: &str = "local";

/// Maximum file size accepted by the provider
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Maximum length of a single value
pub const MAX_VALUE_LENGTH: usize = 8192;

/// File loaded when the source path is empty
pub const DEFAULT_ENV_FILE: &str = ".env";

const WORLD_WRITABLE_MASK: u32 = 0o002;

/// On-disk syntax, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileKind {
    Dotenv,
    Json,
    Yaml,
}

impl FileKind {
    fn detect(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("json") => FileKind::Json,
            Some("yaml") | Some("yml") => FileKind::Yaml,
            _ => FileKind::Dotenv,
        }
    }
}

/// Provider reading configuration files relative to a base directory
#[derive(Debug, Clone)]
pub struct LocalProvider {
    base_path: PathBuf,
}

impl LocalProvider {
    /// Create a provider rooted at the current directory
    pub fn new() -> Self {
        Self::with_base_path(".")
    }

    /// Create a provider rooted at `base_path`; an empty path means `.`
    pub fn with_base_path(base_path: impl AsRef<Path>) -> Self {
        let base_path = base_path.as_ref();
        let base_path = if base_path.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            base_path.to_path_buf()
        };
        Self { base_path }
    }

    /// Directory relative sources are resolved against
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Resolve a source to a filesystem path
    pub fn resolve_path(&self, source: &str) -> PathBuf {
        let source = source.trim();
        let source = if source.is_empty() {
            DEFAULT_ENV_FILE
        } else {
            source
        };

        let path = Path::new(source);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_path.join(path)
        }
    }

    fn check_size(path: &Path, size: u64) -> SourceResult<()> {
        if size > MAX_FILE_SIZE {
            debug!(path = %path.display(), size, "Rejecting oversized file");
            return Err(SourceError::TooLarge {
                size,
                limit: MAX_FILE_SIZE,
            });
        }
        Ok(())
    }

    #[cfg(unix)]
    fn check_permissions(path: &Path, metadata: &std::fs::Metadata) -> SourceResult<()> {
        use std::os::unix::fs::PermissionsExt;

        if metadata.permissions().mode() & WORLD_WRITABLE_MASK != 0 {
            return Err(SourceError::WorldWritable {
                path: path.display().to_string(),
            });
        }
        Ok(())
    }

    #[cfg(not(unix))]
    fn check_permissions(_path: &Path, _metadata: &std::fs::Metadata) -> SourceResult<()> {
        let _ = WORLD_WRITABLE_MASK;
        Ok(())
    }

    fn parse(path: &Path, content: &str) -> SourceResult<ProviderData> {
        let display = path.display().to_string();
        let parse_error = |message: String| SourceError::Parse {
            path: display.clone(),
            message,
        };

        match FileKind::detect(path) {
            FileKind::Dotenv => {
                let mut data = ProviderData::new();
                for item in dotenvy::from_read_iter(content.as_bytes()) {
                    let (key, value) = item.map_err(|e| parse_error(e.to_string()))?;
                    data.insert(key, value);
                }
                Ok(data)
            }
            FileKind::Json => {
                let document: Value =
                    serde_json::from_str(content).map_err(|e| parse_error(e.to_string()))?;
                flatten_document(document).map_err(parse_error)
            }
            FileKind::Yaml => {
                let document: serde_yaml::Value =
                    serde_yaml::from_str(content).map_err(|e| parse_error(e.to_string()))?;
                let document =
                    serde_json::to_value(document).map_err(|e| parse_error(e.to_string()))?;
                flatten_document(document).map_err(parse_error)
            }
        }
    }

    fn check_entries(data: &ProviderData) -> SourceResult<()> {
        for (key, value) in data {
            if let Some(reason) = check_key(key) {
                return Err(SourceError::InvalidKey {
                    key: key.clone(),
                    reason: reason.to_string(),
                });
            }
            if value.len() > MAX_VALUE_LENGTH {
                return Err(SourceError::ValueTooLong {
                    key: key.clone(),
                    length: value.len(),
                    limit: MAX_VALUE_LENGTH,
                });
            }
        }
        Ok(())
    }
}

impl Default for LocalProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Provider for LocalProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn validate(&self, source: &str) -> SourceResult<()> {
        if source.trim().is_empty() {
            return Err(SourceError::Empty);
        }

        let path = self.resolve_path(source);
        let metadata = match std::fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SourceError::FileNotFound {
                    path: path.display().to_string(),
                })
            }
            Err(e) => return Err(SourceError::Io(e)),
        };

        if !metadata.is_file() {
            return Err(SourceError::NotRegularFile {
                path: path.display().to_string(),
            });
        }

        Self::check_size(&path, metadata.len())?;
        Self::check_permissions(&path, &metadata)
    }

    async fn load(&self, cancel: &CancellationToken, source: &str) -> SourceResult<ProviderData> {
        let path = self.resolve_path(source);

        let metadata = match tokio::fs::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SourceError::FileNotFound {
                    path: path.display().to_string(),
                })
            }
            Err(e) => return Err(SourceError::Io(e)),
        };
        Self::check_size(&path, metadata.len())?;

        let content = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(SourceError::Cancelled),
            read = tokio::fs::read_to_string(&path) => read?,
        };

        let data = Self::parse(&path, &content)?;
        Self::check_entries(&data)?;

        debug!(path = %path.display(), keys = data.len(), "Loaded local file");
        Ok(data)
    }
}

/// Flatten a JSON document into dotted keys.
///
/// The top level must be an object. Arrays are indexed (`hosts.0`), `null`
/// becomes an empty string and other scalars use their JSON rendering.
fn flatten_document(document: Value) -> Result<ProviderData, String> {
    match document {
        Value::Object(map) => {
            let mut data = ProviderData::new();
            for (key, value) in map {
                flatten_into(&mut data, key, value);
            }
            Ok(data)
        }
        Value::Null => Ok(ProviderData::new()),
        other => Err(format!(
            "top-level document must be a mapping, found {}",
            json_kind(&other)
        )),
    }
}

fn flatten_into(data: &mut ProviderData, prefix: String, value: Value) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                flatten_into(data, format!("{}.{}", prefix, key), nested);
            }
        }
        Value::Array(items) => {
            for (index, nested) in items.into_iter().enumerate() {
                flatten_into(data, format!("{}.{}", prefix, index), nested);
            }
        }
        Value::String(s) => {
            data.insert(prefix, s);
        }
        Value::Null => {
            data.insert(prefix, String::new());
        }
        scalar => {
            data.insert(prefix, scalar.to_string());
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
