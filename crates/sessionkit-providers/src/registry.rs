//! Provider registry for managing available session backends.
//!
//! Registration is append-only and happens at startup. Duplicate names,
//! empty names and unconfigured providers are programming errors and panic.
//! Once a manager has resolved a provider the registry is sealed and any
//! further registration panics as well.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use sessionkit_core::{Error, Result};
use tracing::{debug, error};

use super::traits::Provider;

static GLOBAL: Lazy<RwLock<ProviderRegistry>> = Lazy::new(|| RwLock::new(ProviderRegistry::new()));

/// Registry of available session providers.
pub struct ProviderRegistry {
    providers: HashMap<String, Arc<dyn Provider>>,
    sealed: AtomicBool,
}

impl ProviderRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
            sealed: AtomicBool::new(false),
        }
    }

    /// Make a provider available under `name`.
    ///
    /// # Panics
    ///
    /// If `name` is empty, the provider is not configured, `name` is already
    /// registered, or the registry has been sealed.
    pub fn register(&mut self, name: impl Into<String>, provider: Arc<dyn Provider>) {
        let name = name.into();
        if name.is_empty() {
            panic!("session: register called with an empty provider name");
        }
        if !provider.is_configured() {
            panic!("session: register provider {name:?} is not initialized");
        }
        if self.is_sealed() {
            panic!("session: register called for provider {name:?} after the registry was sealed");
        }
        if self.providers.contains_key(&name) {
            panic!("session: register called twice for provider {name:?}");
        }

        debug!(provider = %name, "Registered session provider");
        self.providers.insert(name, provider);
    }

    /// Register a provider under its own id.
    pub fn register_provider(&mut self, provider: Arc<dyn Provider>) {
        let id = provider.id().to_string();
        self.register(id, provider);
    }

    /// Resolve a provider by name.
    pub fn lookup(&self, name: &str) -> Result<Arc<dyn Provider>> {
        match self.providers.get(name) {
            Some(provider) => Ok(provider.clone()),
            None => {
                error!(provider = %name, "No session provider registered under this name");
                Err(Error::UnknownProvider(name.to_string()))
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    /// List all registered provider names, sorted.
    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Forbid further registration. Idempotent.
    pub fn seal(&self) {
        if !self.sealed.swap(true, Ordering::AcqRel) {
            debug!(providers = self.providers.len(), "Provider registry sealed");
        }
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed.load(Ordering::Acquire)
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// The process-wide registry that backends self-register into.
pub fn global() -> &'static RwLock<ProviderRegistry> {
    &GLOBAL
}

/// Register a provider in the process-wide registry.
///
/// # Panics
///
/// Under the same conditions as [`ProviderRegistry::register`].
pub fn register(name: impl Into<String>, provider: Arc<dyn Provider>) {
    GLOBAL.write().register(name, provider);
}

#[cfg(test)]
mod tests {
    use super::*;
    use sessionkit_core::{SessionId, SessionRef};
    use std::time::Duration;

    struct NullProvider {
        configured: bool,
    }

    impl Provider for NullProvider {
        fn id(&self) -> &str {
            "null"
        }

        fn is_configured(&self) -> bool {
            self.configured
        }

        fn session_init(&self, id: &SessionId) -> Result<SessionRef> {
            Err(Error::NotFound(id.to_string()))
        }

        fn session_read(&self, id: &SessionId) -> Result<SessionRef> {
            Err(Error::NotFound(id.to_string()))
        }

        fn session_destroy(&self, _id: &SessionId) -> Result<()> {
            Ok(())
        }

        fn session_gc(&self, _max_lifetime: Duration) {}
    }

    fn null() -> Arc<dyn Provider> {
        Arc::new(NullProvider { configured: true })
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = ProviderRegistry::new();
        assert!(registry.is_empty());
        registry.register("memory", null());
        registry.register_provider(null());

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.list(), vec!["memory", "null"]);
        assert!(registry.contains("memory"));
        assert_eq!(registry.lookup("memory").unwrap().id(), "null");
    }

    #[test]
    fn test_lookup_unknown_provider() {
        let registry = ProviderRegistry::new();
        let err = registry.lookup("file").err().unwrap();
        assert!(matches!(err, Error::UnknownProvider(ref name) if name == "file"));
    }

    #[test]
    #[should_panic(expected = "register called twice")]
    fn test_duplicate_registration_panics() {
        let mut registry = ProviderRegistry::new();
        registry.register("memory", null());
        registry.register("memory", null());
    }

    #[test]
    #[should_panic(expected = "not initialized")]
    fn test_unconfigured_provider_panics() {
        let mut registry = ProviderRegistry::new();
        registry.register("memory", Arc::new(NullProvider { configured: false }));
    }

    #[test]
    #[should_panic(expected = "empty provider name")]
    fn test_empty_name_panics() {
        let mut registry = ProviderRegistry::new();
        registry.register("", null());
    }

    #[test]
    #[should_panic(expected = "after the registry was sealed")]
    fn test_register_after_seal_panics() {
        let mut registry = ProviderRegistry::new();
        registry.register("memory", null());
        registry.seal();
        assert!(registry.is_sealed());
        assert!(registry.lookup("memory").is_ok());
        registry.register("file", null());
    }

    #[test]
    fn test_global_registry() {
        register("registry-test-global", null());
        assert!(global().read().contains("registry-test-global"));
    }

    #[test]
    #[should_panic(expected = "register called twice")]
    fn test_global_duplicate_panics() {
        register("registry-test-global-dup", null());
        register("registry-test-global-dup", null());
    }
}
