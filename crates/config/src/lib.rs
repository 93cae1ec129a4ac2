//! Configuration management for envsync
//!
//! This crate handles parsing and validation of the application configuration
//! from YAML files and environment variables.

pub mod loader;
pub mod schema;

pub use loader::ConfigLoader;
pub use schema::*;
