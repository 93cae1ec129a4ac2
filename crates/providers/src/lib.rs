//! Configuration providers
//!
//! This crate defines the provider capability, a registry of named provider
//! factories with alias resolution, and the built-in providers.

pub mod builtin;
pub mod kubernetes;
pub mod local;
pub mod registry;
pub mod traits;
pub mod vault;

pub use builtin::register_builtin;
pub use kubernetes::KubernetesProvider;
pub use local::LocalProvider;
pub use registry::{
    global, ProviderConfig, ProviderFactory, ProviderInfo, Registry, DEFAULT_PRIORITY,
    HIGH_PRIORITY, LOW_PRIORITY, MAX_REGISTERED_PROVIDERS,
};
pub use traits::{Provider, ProviderData, SourceResult};
pub use vault::VaultProvider;
