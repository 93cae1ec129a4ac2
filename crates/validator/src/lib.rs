//! Validation of merged configurations
//!
//! Validators see the final merged mapping once per load. This crate ships a
//! rule-based validator, a JSON Schema validator, and a composite that chains
//! them.

pub mod composite;
pub mod report;
pub mod rules;
pub mod schema;
pub mod traits;

pub use composite::CompositeValidator;
pub use report::{ValidationIssue, ValidationReport};
pub use rules::{
    KeyFormatRule, MaxKeysRule, RequiredKeysRule, RuleValidator, ValidationRule, ValueLengthRule,
};
pub use schema::SchemaValidator;
pub use traits::{ConfigMap, Validator};
