//! Provider registry
//!
//! The registry is a catalogue of provider *factories* keyed by name, with
//! alias resolution. It is used to construct provider instances from
//! declarative configuration; the load engine itself never consults it.
//!
//! Names and aliases share one keyspace: a string is either a provider name,
//! an alias, or unused. Collisions are rejected at registration time and a
//! failed registration leaves the registry untouched.

use crate::traits::Provider;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};
use types::RegistryError;

/// Maximum number of providers that can be registered
pub const MAX_REGISTERED_PROVIDERS: usize = 100;

/// Default priority for providers
pub const DEFAULT_PRIORITY: i32 = 50;

/// Priority for high-priority providers
pub const HIGH_PRIORITY: i32 = 10;

/// Priority for low-priority providers
pub const LOW_PRIORITY: i32 = 90;

/// Declarative provider configuration handed to factories
pub type ProviderConfig = serde_json::Map<String, serde_json::Value>;

/// Constructor for provider instances
pub type ProviderFactory =
    Arc<dyn Fn(&ProviderConfig) -> anyhow::Result<Arc<dyn Provider>> + Send + Sync>;

/// Result type for registry operations
pub type RegistryResult<T> = std::result::Result<T, RegistryError>;

/// Information about a registered provider
#[derive(Clone, Default)]
pub struct ProviderInfo {
    /// Unique provider name
    pub name: String,
    /// Alternative names resolving to this provider
    pub aliases: Vec<String>,
    /// Constructor for provider instances
    pub factory: Option<ProviderFactory>,
    /// Lower value means higher precedence; 0 is replaced by [`DEFAULT_PRIORITY`]
    pub priority: i32,
    /// Human-readable description
    pub description: String,
    /// Example source paths the provider understands
    pub supported_sources: Vec<String>,
    /// Configuration keys the factory cannot do without
    pub required_config: Vec<String>,
    /// Configuration keys the factory understands
    pub optional_config: Vec<String>,
}

impl ProviderInfo {
    /// Create provider info with a factory
    pub fn new<F>(name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&ProviderConfig) -> anyhow::Result<Arc<dyn Provider>> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            factory: Some(Arc::new(factory)),
            ..Default::default()
        }
    }

    /// Set aliases
    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    /// Set priority
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Set description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set supported source examples
    pub fn with_supported_sources<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.supported_sources = sources.into_iter().map(Into::into).collect();
        self
    }

    /// Set required configuration keys
    pub fn with_required_config<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_config = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Set optional configuration keys
    pub fn with_optional_config<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.optional_config = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Whether `needle` (already lower-cased) occurs in the name, an alias or the description
    pub fn matches_filter(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.aliases.iter().any(|a| a.to_lowercase().contains(needle))
            || self.description.to_lowercase().contains(needle)
    }
}

impl fmt::Debug for ProviderInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderInfo")
            .field("name", &self.name)
            .field("aliases", &self.aliases)
            .field("factory", &self.factory.as_ref().map(|_| "<factory>"))
            .field("priority", &self.priority)
            .field("description", &self.description)
            .field("supported_sources", &self.supported_sources)
            .field("required_config", &self.required_config)
            .field("optional_config", &self.optional_config)
            .finish()
    }
}

#[derive(Default)]
struct RegistryState {
    providers: HashMap<String, ProviderInfo>,
    aliases: HashMap<String, String>,
}

impl RegistryState {
    fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        self.aliases.get(name).map(String::as_str).unwrap_or(name)
    }

    fn lookup(&self, name: &str) -> RegistryResult<&ProviderInfo> {
        self.providers
            .get(self.resolve(name))
            .ok_or_else(|| RegistryError::NotFound {
                name: name.to_string(),
            })
    }
}

/// Registry managing provider registration and creation
///
/// Reads run concurrently; `register` and `unregister` take the lock
/// exclusively.
pub struct Registry {
    state: RwLock<RegistryState>,
    capacity: usize,
}

impl Registry {
    /// Create an empty registry with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(MAX_REGISTERED_PROVIDERS)
    }

    /// Create an empty registry holding at most `capacity` providers
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            state: RwLock::new(RegistryState::default()),
            capacity,
        }
    }

    // Writers only mutate after every check has passed, so a poisoned lock
    // still guards consistent maps.
    fn read(&self) -> RwLockReadGuard<'_, RegistryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a provider.
    ///
    /// Either the name and every alias are inserted, or nothing is.
    pub fn register(&self, info: ProviderInfo) -> RegistryResult<()> {
        let name = info.name.trim().to_string();
        if name.is_empty() {
            return Err(RegistryError::InvalidInfo(
                "provider name cannot be empty".to_string(),
            ));
        }
        if info.factory.is_none() {
            return Err(RegistryError::InvalidInfo(format!(
                "provider factory cannot be empty for {}",
                name
            )));
        }

        let aliases: Vec<String> = info
            .aliases
            .iter()
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();

        let mut state = self.write();

        if state.providers.len() >= self.capacity {
            return Err(RegistryError::Full {
                limit: self.capacity,
            });
        }

        if state.providers.contains_key(&name) {
            return Err(RegistryError::AlreadyRegistered { name });
        }
        if let Some(owner) = state.aliases.get(&name) {
            return Err(RegistryError::AliasConflict {
                alias: name.clone(),
                existing: format!("alias of provider {}", owner),
            });
        }

        for (i, alias) in aliases.iter().enumerate() {
            if *alias == name || state.providers.contains_key(alias) {
                return Err(RegistryError::AliasConflict {
                    alias: alias.clone(),
                    existing: format!("provider {}", alias),
                });
            }
            if let Some(owner) = state.aliases.get(alias) {
                return Err(RegistryError::AliasConflict {
                    alias: alias.clone(),
                    existing: format!("alias of provider {}", owner),
                });
            }
            if aliases[..i].contains(alias) {
                return Err(RegistryError::AliasConflict {
                    alias: alias.clone(),
                    existing: format!("alias of provider {}", name),
                });
            }
        }

        let priority = if info.priority == 0 {
            DEFAULT_PRIORITY
        } else {
            info.priority
        };

        for alias in &aliases {
            state.aliases.insert(alias.clone(), name.clone());
        }
        state.providers.insert(
            name.clone(),
            ProviderInfo {
                name: name.clone(),
                aliases,
                priority,
                ..info
            },
        );

        info!(provider = %name, priority, "Registered provider");
        Ok(())
    }

    /// Remove a provider and all of its aliases
    pub fn unregister(&self, name: &str) -> RegistryResult<()> {
        let mut state = self.write();

        let info = state
            .providers
            .remove(name)
            .ok_or_else(|| RegistryError::NotFound {
                name: name.to_string(),
            })?;

        for alias in &info.aliases {
            state.aliases.remove(alias);
        }

        debug!(provider = %name, "Unregistered provider");
        Ok(())
    }

    /// Construct a provider instance by name or alias.
    ///
    /// Every key in `required_config` must be present in `config`.
    pub fn create_provider(
        &self,
        name: &str,
        config: &ProviderConfig,
    ) -> RegistryResult<Arc<dyn Provider>> {
        // Clone out of the lock so the factory runs without holding it.
        let (canonical, required, factory) = {
            let state = self.read();
            let info = state.lookup(name)?;
            (
                info.name.clone(),
                info.required_config.clone(),
                info.factory.clone(),
            )
        };

        if let Some(missing) = required.iter().find(|key| !config.contains_key(key.as_str())) {
            return Err(RegistryError::MissingConfig {
                provider: canonical,
                key: missing.clone(),
            });
        }

        let factory = factory.ok_or_else(|| {
            RegistryError::InvalidInfo(format!("provider {} has no factory", canonical))
        })?;

        let provider = factory(config).map_err(|e| RegistryError::Factory {
            provider: name.to_string(),
            message: format!("{:#}", e),
        })?;

        debug!(requested = %name, provider = %canonical, "Created provider instance");
        Ok(provider)
    }

    /// Get a copy of a provider's registration info
    pub fn get_provider(&self, name: &str) -> RegistryResult<ProviderInfo> {
        self.read().lookup(name).cloned()
    }

    /// Copies of all registrations, ordered by priority then name
    pub fn list_providers(&self) -> Vec<ProviderInfo> {
        let mut providers: Vec<ProviderInfo> = self.read().providers.values().cloned().collect();
        providers.sort_by(|a, b| a.priority.cmp(&b.priority).then_with(|| a.name.cmp(&b.name)));
        providers
    }

    /// All provider names and aliases, sorted.
    ///
    /// Aliases appear alongside canonical names.
    pub fn get_provider_names(&self) -> Vec<String> {
        let state = self.read();
        let mut names: Vec<String> = state
            .providers
            .keys()
            .chain(state.aliases.keys())
            .cloned()
            .collect();
        names.sort();
        names
    }

    /// Whether a name or alias resolves to a registered provider
    pub fn is_provider_registered(&self, name: &str) -> bool {
        self.read().lookup(name).is_ok()
    }

    /// Resolve an alias to its canonical provider name
    pub fn resolve_name(&self, name: &str) -> Option<String> {
        self.read().lookup(name).ok().map(|info| info.name.clone())
    }

    /// Number of registered providers (aliases excluded)
    pub fn len(&self) -> usize {
        self.read().providers.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.read();
        let mut names: Vec<&String> = state.providers.keys().collect();
        names.sort();
        f.debug_struct("Registry")
            .field("providers", &names)
            .field("aliases", &state.aliases.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

static GLOBAL_REGISTRY: OnceLock<Registry> = OnceLock::new();

/// Process-wide registry.
///
/// Only the composition root should reach for this; library code takes a
/// `&Registry`.
pub fn global() -> &'static Registry {
    GLOBAL_REGISTRY.get_or_init(Registry::new)
}
