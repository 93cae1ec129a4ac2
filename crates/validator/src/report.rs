//! Aggregated validation results

use std::fmt;
use types::EnvSyncError;

/// Errors and warnings collected while validating a configuration
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

/// A validation issue (error or warning)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub field: String,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.field.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ValidationIssue {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationIssue {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    pub fn summary(&self) -> String {
        format!(
            "Validation: {} errors, {} warnings",
            self.errors.len(),
            self.warnings.len()
        )
    }

    /// All error messages joined with `; `
    pub fn error_message(&self) -> String {
        self.errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Convert into a result, failing if any error was recorded
    pub fn into_result(self) -> types::Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(EnvSyncError::Validation(self.error_message()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_joins_errors() {
        let mut report = ValidationReport::new();
        report.add_error("A", "too long");
        report.add_error("", "too many keys");
        report.add_warning("B", "empty");

        assert!(!report.is_valid());
        assert!(report.has_warnings());
        assert_eq!(report.summary(), "Validation: 2 errors, 1 warnings");

        let err = report.into_result().unwrap_err();
        assert_eq!(err.to_string(), "Validation failed: A: too long; too many keys");
    }

    #[test]
    fn test_warnings_only_is_valid() {
        let mut report = ValidationReport::new();
        report.add_warning("B", "empty");
        assert!(report.into_result().is_ok());
    }
}
