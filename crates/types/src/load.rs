//! Load request and provenance types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// How to handle a key defined by more than one source
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MergeStrategy {
    /// Later sources overwrite earlier values
    #[default]
    Override,
    /// The first value wins; later values are discarded
    Preserve,
    /// Any duplicate key aborts the load
    Error,
}

impl MergeStrategy {
    /// All strategies, in their documented order
    pub const ALL: [MergeStrategy; 3] = [
        MergeStrategy::Override,
        MergeStrategy::Preserve,
        MergeStrategy::Error,
    ];

    /// Lower-case name used on the command line and in config files
    pub fn as_str(&self) -> &'static str {
        match self {
            MergeStrategy::Override => "override",
            MergeStrategy::Preserve => "preserve",
            MergeStrategy::Error => "error",
        }
    }
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MergeStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "override" => Ok(MergeStrategy::Override),
            "preserve" => Ok(MergeStrategy::Preserve),
            "error" => Ok(MergeStrategy::Error),
            other => Err(format!(
                "invalid merge strategy: {} (valid: override, preserve, error)",
                other
            )),
        }
    }
}

/// Options for a single load call
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadOptions {
    /// Ordered source specifiers; order fixes merge precedence
    pub sources: Vec<String>,
    /// JSON Schema the caller validated against, if any
    pub schema: Option<PathBuf>,
    /// Conflict resolution policy
    #[serde(default)]
    pub merge_strategy: MergeStrategy,
}

impl LoadOptions {
    /// Create options for the given sources with the default strategy
    pub fn new<I, S>(sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sources: sources.into_iter().map(Into::into).collect(),
            schema: None,
            merge_strategy: MergeStrategy::default(),
        }
    }

    /// Set the merge strategy
    pub fn with_strategy(mut self, strategy: MergeStrategy) -> Self {
        self.merge_strategy = strategy;
        self
    }

    /// Record the schema path
    pub fn with_schema(mut self, schema: impl Into<PathBuf>) -> Self {
        self.schema = Some(schema.into());
        self
    }
}

/// Provenance of one processed source
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceInfo {
    /// Source specifier as supplied
    pub name: String,
    /// Client-local provider name it resolved to
    pub provider: String,
    /// Net growth of the merged key count after this source.
    ///
    /// A source that only overwrites existing keys reports zero.
    pub key_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_strategy_parse() {
        for strategy in MergeStrategy::ALL {
            assert_eq!(strategy.as_str().parse::<MergeStrategy>().unwrap(), strategy);
        }
        assert!("Override".parse::<MergeStrategy>().is_err());
        assert!("first".parse::<MergeStrategy>().is_err());
        assert_eq!(MergeStrategy::default(), MergeStrategy::Override);
    }

    #[test]
    fn test_merge_strategy_serde() {
        let json = serde_json::to_string(&MergeStrategy::Preserve).unwrap();
        assert_eq!(json, "\"preserve\"");
        let parsed: MergeStrategy = serde_json::from_str("\"error\"").unwrap();
        assert_eq!(parsed, MergeStrategy::Error);
    }

    #[test]
    fn test_load_options_builder() {
        let options = LoadOptions::new([".env", "local:.env.local"])
            .with_strategy(MergeStrategy::Error)
            .with_schema("schema.json");
        assert_eq!(options.sources.len(), 2);
        assert_eq!(options.merge_strategy, MergeStrategy::Error);
        assert_eq!(options.schema, Some(PathBuf::from("schema.json")));
    }
}
