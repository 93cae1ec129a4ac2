//! Shared types for the envsync system
//!
//! This crate contains the error taxonomy and the domain types shared by the
//! provider registry, the load engine and the command-line surface.

pub mod error;
pub mod load;
pub mod source;
pub mod utils;

// Re-export commonly used types
pub use error::{
    ConfigError, EnvSyncError, ExportError, ProviderError, RegistryError, Result, SourceError,
};
pub use load::{LoadOptions, MergeStrategy, SourceInfo};
pub use source::{Destination, SourceSpec, DEFAULT_PROVIDER_NAME};
