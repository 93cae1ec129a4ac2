//! Output formats and their renderers

use crate::traits::ConfigMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use types::ExportError;

/// Value written as `metadata.exported_by`
pub const EXPORTED_BY: &str = "envsync";

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Env,
    Json,
    Yaml,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 3] = [ExportFormat::Env, ExportFormat::Json, ExportFormat::Yaml];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Env => "env",
            ExportFormat::Json => "json",
            ExportFormat::Yaml => "yaml",
        }
    }

    /// Render `config` in this format
    pub fn render(&self, config: &ConfigMap) -> Result<String, ExportError> {
        match self {
            ExportFormat::Env => Ok(render_env(config)),
            ExportFormat::Json => {
                let mut out = serde_json::to_string_pretty(&Document::new(*self, config))
                    .map_err(|e| self.serialization_error(e))?;
                out.push('\n');
                Ok(out)
            }
            ExportFormat::Yaml => serde_yaml::to_string(&Document::new(*self, config))
                .map_err(|e| self.serialization_error(e)),
        }
    }

    fn serialization_error(&self, err: impl fmt::Display) -> ExportError {
        ExportError::Serialization {
            format: self.as_str().to_string(),
            message: err.to_string(),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "env" | "dotenv" => Ok(ExportFormat::Env),
            "json" => Ok(ExportFormat::Json),
            "yaml" | "yml" => Ok(ExportFormat::Yaml),
            _ => Err(ExportError::UnsupportedFormat {
                format: s.to_string(),
            }),
        }
    }
}

/// Names of the supported export formats
pub fn supported_formats() -> Vec<&'static str> {
    ExportFormat::ALL.iter().map(ExportFormat::as_str).collect()
}

#[derive(Serialize)]
struct Metadata {
    exported_by: &'static str,
    format: &'static str,
}

#[derive(Serialize)]
struct Document<'a> {
    metadata: Metadata,
    config: &'a BTreeMap<String, String>,
}

impl<'a> Document<'a> {
    fn new(format: ExportFormat, config: &'a ConfigMap) -> Self {
        Self {
            metadata: Metadata {
                exported_by: EXPORTED_BY,
                format: format.as_str(),
            },
            config,
        }
    }
}

fn render_env(config: &ConfigMap) -> String {
    let mut out = String::new();
    out.push_str("# Environment configuration exported by envsync\n");
    out.push_str("# Generated automatically - do not edit manually\n\n");
    for (key, value) in config {
        out.push_str(key);
        out.push('=');
        out.push_str(&escape_env_value(value));
        out.push('\n');
    }
    out
}

/// Quote a value when it contains whitespace, quotes or backslashes
pub fn escape_env_value(value: &str) -> String {
    if !value.contains([' ', '\t', '\n', '\r', '"', '\'', '\\']) {
        return value.to_string();
    }

    let mut escaped = String::with_capacity(value.len() + 2);
    escaped.push('"');
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            other => escaped.push(other),
        }
    }
    escaped.push('"');
    escaped
}
