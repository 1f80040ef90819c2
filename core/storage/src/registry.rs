//! Provider registry for resolving object stores by name.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::store::ObjectStore;
use synclink_common::{Error, Result};

/// Factory function type for opening an object store session.
pub type StoreFactory = Arc<dyn Fn(&Value) -> Result<Arc<dyn ObjectStore>> + Send + Sync>;

/// Registry for object store factories.
///
/// Maps provider names to factories that open a backend session from an
/// opaque provider configuration.
pub struct ProviderRegistry {
    factories: HashMap<String, StoreFactory>,
}

impl ProviderRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a provider factory.
    ///
    /// # Errors
    /// - Returns error if name is already registered
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> Result<()>
    where
        F: Fn(&Value) -> Result<Arc<dyn ObjectStore>> + Send + Sync + 'static,
    {
        let name = name.into();
        if self.factories.contains_key(&name) {
            return Err(Error::AlreadyExists(format!(
                "Provider '{}' is already registered",
                name
            )));
        }
        self.factories.insert(name, Arc::new(factory));
        Ok(())
    }

    /// Look up the factory of a provider without invoking it.
    pub fn factory(&self, name: &str) -> Option<StoreFactory> {
        self.factories.get(name).cloned()
    }

    /// Open a session with a provider.
    ///
    /// # Errors
    /// - Provider not found
    /// - Configuration invalid
    pub fn resolve(&self, name: &str, config: &Value) -> Result<Arc<dyn ObjectStore>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| Error::NotFound(format!("Provider '{}' is not registered", name)))?;
        factory(config)
    }

    /// Get list of registered provider names.
    pub fn providers(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }

    /// Check if a provider is registered.
    pub fn has_provider(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn config_str<'a>(config: &'a Value, provider: &str, key: &str) -> Result<&'a str> {
    config.get(key).and_then(|v| v.as_str()).ok_or_else(|| {
        Error::InvalidInput(format!("Provider '{}' requires '{}' path", provider, key))
    })
}

/// Create a registry with the built-in providers.
///
/// - `memory`: fresh in-memory store per session
/// - `local`: directory store, config `{"root": "..."}`
/// - `dual-local`: two directory stores, config
///   `{"data_root": "...", "metadata_root": "..."}`
pub fn create_default_registry() -> ProviderRegistry {
    let mut registry = ProviderRegistry::new();

    let builtins: [(&str, StoreFactory); 3] = [
        (
            "memory",
            Arc::new(|_config: &Value| -> Result<Arc<dyn ObjectStore>> {
                Ok(Arc::new(crate::memory::MemoryStore::new()))
            }),
        ),
        (
            "local",
            Arc::new(|config: &Value| -> Result<Arc<dyn ObjectStore>> {
                let root = config_str(config, "local", "root")?;
                Ok(Arc::new(crate::local::LocalStore::new(root)?))
            }),
        ),
        (
            "dual-local",
            Arc::new(|config: &Value| -> Result<Arc<dyn ObjectStore>> {
                let data_root = config_str(config, "dual-local", "data_root")?;
                let metadata_root = config_str(config, "dual-local", "metadata_root")?;
                Ok(Arc::new(crate::dual::DualChannelStore::new(
                    Arc::new(crate::local::LocalStore::new(data_root)?),
                    Arc::new(crate::local::LocalStore::new(metadata_root)?),
                )))
            }),
        ),
    ];

    for (name, factory) in builtins {
        registry.factories.insert(name.to_string(), factory);
    }

    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use tempfile::TempDir;

    #[test]
    fn test_register_and_resolve() {
        let mut registry = ProviderRegistry::new();

        registry
            .register("test", |_: &Value| -> Result<Arc<dyn ObjectStore>> {
                Ok(Arc::new(MemoryStore::new()))
            })
            .unwrap();

        let store = registry.resolve("test", &Value::Null).unwrap();
        assert_eq!(store.name(), "memory");
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut registry = ProviderRegistry::new();
        let factory = |_: &Value| -> Result<Arc<dyn ObjectStore>> { Ok(Arc::new(MemoryStore::new())) };

        registry.register("test", factory).unwrap();
        assert!(registry.register("test", factory).is_err());
    }

    #[test]
    fn test_resolve_unknown_fails() {
        let registry = ProviderRegistry::new();
        let result = registry.resolve("unknown", &Value::Null);
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_default_providers() {
        let registry = create_default_registry();
        for name in ["memory", "local", "dual-local"] {
            assert!(registry.has_provider(name), "missing {name}");
        }
        assert_eq!(registry.providers().len(), 3);
    }

    #[test]
    fn test_local_requires_root() {
        let registry = create_default_registry();
        let result = registry.resolve("local", &serde_json::json!({}));
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_dual_local_exposes_metadata_channel() {
        let temp = TempDir::new().unwrap();
        let registry = create_default_registry();
        let config = serde_json::json!({
            "data_root": temp.path().join("data"),
            "metadata_root": temp.path().join("meta"),
        });

        let store = registry.resolve("dual-local", &config).unwrap();
        assert!(store.metadata_channel().is_some());
        assert!(store.read_after_write_consistent());
    }
}
