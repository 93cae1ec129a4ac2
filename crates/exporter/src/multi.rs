//! File exporter supporting every [`ExportFormat`]

use crate::format::ExportFormat;
use crate::traits::{ConfigMap, Exporter};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use types::{Destination, EnvSyncError, ExportError, Result};

/// Maximum size of a rendered export
pub const MAX_EXPORT_SIZE: usize = 10 * 1024 * 1024;

/// Permissions for created directories
pub const DIR_MODE: u32 = 0o750;

/// Permissions for written files
pub const FILE_MODE: u32 = 0o644;

/// Exporter writing files below an output directory
#[derive(Debug, Clone)]
pub struct MultiFormatExporter {
    output_dir: PathBuf,
}

impl MultiFormatExporter {
    /// Create an exporter; relative destinations resolve against `output_dir`
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        let output_dir = output_dir.as_ref();
        let output_dir = if output_dir.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            output_dir.to_path_buf()
        };
        Self { output_dir }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Parse a destination into its format and resolved path
    pub fn resolve(&self, destination: &str) -> std::result::Result<(ExportFormat, PathBuf), ExportError> {
        let destination = Destination::parse(destination)?;
        let format: ExportFormat = destination.format.parse()?;

        let path = Path::new(&destination.path);
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.output_dir.join(path)
        };
        Ok((format, path))
    }

    async fn ensure_parent(path: &Path) -> std::result::Result<(), ExportError> {
        let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) else {
            return Ok(());
        };

        let mut builder = tokio::fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        builder.mode(DIR_MODE);

        builder.create(dir).await.map_err(|source| ExportError::Io {
            path: dir.display().to_string(),
            source,
        })
    }

    async fn write_file(path: &Path, content: &str) -> std::result::Result<(), ExportError> {
        let io_error = |source| ExportError::Io {
            path: path.display().to_string(),
            source,
        };

        let mut options = tokio::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(FILE_MODE);

        let mut file = options.open(path).await.map_err(io_error)?;
        file.write_all(content.as_bytes()).await.map_err(io_error)?;
        file.flush().await.map_err(io_error)?;
        Ok(())
    }
}

impl Default for MultiFormatExporter {
    fn default() -> Self {
        Self::new(".")
    }
}

#[async_trait]
impl Exporter for MultiFormatExporter {
    async fn export(
        &self,
        cancel: &CancellationToken,
        config: &ConfigMap,
        destination: &str,
    ) -> Result<PathBuf> {
        let (format, path) = self.resolve(destination)?;

        let content = format.render(config)?;
        if content.len() > MAX_EXPORT_SIZE {
            return Err(ExportError::TooLarge {
                size: content.len(),
                limit: MAX_EXPORT_SIZE,
            }
            .into());
        }

        if cancel.is_cancelled() {
            return Err(EnvSyncError::Cancelled("export cancelled".to_string()));
        }

        Self::ensure_parent(&path).await?;
        Self::write_file(&path, &content).await?;

        debug!(bytes = content.len(), "Rendered export");
        info!(format = %format, path = %path.display(), keys = config.len(), "Exported configuration");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config() -> ConfigMap {
        [("DATABASE_URL", "postgres://db"), ("PORT", "8080")]
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_export_env_into_nested_dir() {
        let dir = TempDir::new().unwrap();
        let exporter = MultiFormatExporter::new(dir.path());

        let written = exporter
            .export(&CancellationToken::new(), &config(), "ENV:out/nested/.env")
            .await
            .unwrap();
        assert_eq!(written, dir.path().join("out/nested/.env"));

        let content = std::fs::read_to_string(&written).unwrap();
        assert!(content.contains("DATABASE_URL=postgres://db\n"));
        assert!(content.contains("PORT=8080\n"));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&written).unwrap().permissions().mode();
            assert_eq!(mode & 0o002, 0);
        }
    }

    #[tokio::test]
    async fn test_export_json_absolute_path() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("config.json");
        let exporter = MultiFormatExporter::new("/unused");

        exporter
            .export(
                &CancellationToken::new(),
                &config(),
                &format!("json:{}", target.display()),
            )
            .await
            .unwrap();

        let parsed: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&target).unwrap()).unwrap();
        assert_eq!(parsed["config"]["PORT"], "8080");
    }

    #[tokio::test]
    async fn test_invalid_destinations() {
        let exporter = MultiFormatExporter::default();
        let cancel = CancellationToken::new();

        let err = exporter.export(&cancel, &config(), "no-colon").await.unwrap_err();
        assert!(matches!(
            err,
            EnvSyncError::Export(ExportError::InvalidDestination(_))
        ));

        let err = exporter.export(&cancel, &config(), "toml:out.toml").await.unwrap_err();
        assert!(matches!(
            err,
            EnvSyncError::Export(ExportError::UnsupportedFormat { .. })
        ));
    }

    #[tokio::test]
    async fn test_cancelled_export_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let exporter = MultiFormatExporter::new(dir.path());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = exporter.export(&cancel, &config(), "yaml:out.yaml").await.unwrap_err();
        assert!(matches!(err, EnvSyncError::Cancelled(_)));
        assert!(!dir.path().join("out.yaml").exists());
    }
}
