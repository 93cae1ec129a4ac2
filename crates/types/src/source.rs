//! Source specifier and export destination grammar
//!
//! Sources are written as `[<provider>:]<path>`. A specifier without a
//! provider prefix is bound to the reserved provider name [`DEFAULT_PROVIDER_NAME`].
//! Export destinations are written as `<format>:<path>`.

use crate::error::{EnvSyncError, ExportError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of the provider used for specifiers without a prefix
pub const DEFAULT_PROVIDER_NAME: &str = "default";

/// Separator between provider/format and path
pub const SPEC_SEPARATOR: char = ':';

/// A parsed source specifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpec {
    /// Specifier exactly as supplied by the caller
    pub raw: String,
    /// Client-local provider name
    pub provider: String,
    /// Provider-local path
    pub path: String,
}

impl SourceSpec {
    /// Split a specifier on its first `:`.
    ///
    /// Only the first separator is significant, so `vault:secret:data` yields
    /// provider `vault` and path `secret:data`.
    pub fn parse(raw: &str) -> Self {
        match raw.split_once(SPEC_SEPARATOR) {
            Some((provider, path)) => Self {
                raw: raw.to_string(),
                provider: provider.to_string(),
                path: path.to_string(),
            },
            None => Self {
                raw: raw.to_string(),
                provider: DEFAULT_PROVIDER_NAME.to_string(),
                path: raw.to_string(),
            },
        }
    }

    /// Whether the specifier fell back to the default provider
    pub fn is_default(&self) -> bool {
        self.provider == DEFAULT_PROVIDER_NAME && !self.raw.contains(SPEC_SEPARATOR)
    }
}

impl fmt::Display for SourceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// A parsed export destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    /// Lower-cased format name
    pub format: String,
    /// Output path, relative or absolute
    pub path: String,
}

impl Destination {
    /// Parse `format:path`; both halves must be present.
    pub fn parse(raw: &str) -> std::result::Result<Self, ExportError> {
        match raw.split_once(SPEC_SEPARATOR) {
            Some((format, path)) if !format.trim().is_empty() && !path.trim().is_empty() => {
                Ok(Self {
                    format: format.trim().to_lowercase(),
                    path: path.to_string(),
                })
            }
            _ => Err(ExportError::InvalidDestination(raw.to_string())),
        }
    }
}

/// Check that a list of specifiers is usable before any provider is invoked
pub fn check_specifiers(sources: &[String]) -> crate::Result<()> {
    for raw in sources {
        if raw.trim().is_empty() {
            return Err(EnvSyncError::SourceFormat(
                "source specifier cannot be empty".to_string(),
            ));
        }
        let spec = SourceSpec::parse(raw);
        if spec.provider.trim().is_empty() {
            return Err(EnvSyncError::SourceFormat(format!(
                "missing provider name before ':' in {}",
                raw
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_provider() {
        let spec = SourceSpec::parse("local:.env");
        assert_eq!(spec.provider, "local");
        assert_eq!(spec.path, ".env");
        assert!(!spec.is_default());
    }

    #[test]
    fn test_parse_bare_path_uses_default() {
        let spec = SourceSpec::parse("config/.env");
        assert_eq!(spec.provider, DEFAULT_PROVIDER_NAME);
        assert_eq!(spec.path, "config/.env");
        assert!(spec.is_default());
    }

    #[test]
    fn test_parse_splits_on_first_colon_only() {
        let spec = SourceSpec::parse("vault:secret:data/app");
        assert_eq!(spec.provider, "vault");
        assert_eq!(spec.path, "secret:data/app");
    }

    #[test]
    fn test_parse_empty_path() {
        let spec = SourceSpec::parse("local:");
        assert_eq!(spec.provider, "local");
        assert_eq!(spec.path, "");
    }

    #[test]
    fn test_destination_parse() {
        let dest = Destination::parse("JSON:out/config.json").unwrap();
        assert_eq!(dest.format, "json");
        assert_eq!(dest.path, "out/config.json");

        assert!(Destination::parse("config.json").is_err());
        assert!(Destination::parse("json:").is_err());
        assert!(Destination::parse(":out.json").is_err());
    }

    #[test]
    fn test_check_specifiers() {
        assert!(check_specifiers(&["local:.env".to_string(), ".env".to_string()]).is_ok());
        assert!(matches!(
            check_specifiers(&[":.env".to_string()]),
            Err(EnvSyncError::SourceFormat(_))
        ));
        assert!(check_specifiers(&["  ".to_string()]).is_err());
    }
}
