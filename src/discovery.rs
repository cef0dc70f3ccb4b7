//! Best-effort discovery of components outside the registration surface.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::key::{key_of_trait, key_of_type, Key};
use crate::traits::AnyArc;

/// Provider closure probed during discovery. Returning `None` means this
/// provider cannot supply the type.
pub(crate) type ProviderFn = Arc<dyn Fn() -> Option<AnyArc> + Send + Sync>;

#[derive(Default)]
struct Inner {
    providers: HashMap<Key, Vec<ProviderFn>>,
    /// Memoized discovery outcomes, including failures. A failed attempt
    /// is not retried until the registry is reset.
    attempted: HashMap<Key, Option<AnyArc>>,
}

/// Injected registry of discovery providers, consulted when a resolution
/// misses the registration store.
///
/// Discovery is best effort: providers run in registration order, the
/// first `Some` wins, and the outcome (found or not) is memoized so
/// repeated misses stay cheap.
///
/// # Examples
///
/// ```
/// use trellis_di::{Resolver, ServiceContainer};
/// use std::sync::Arc;
///
/// struct Plugin { name: &'static str }
///
/// let c = ServiceContainer::new();
/// c.discovery().register_provider::<Plugin, _>(|| {
///     Some(Arc::new(Plugin { name: "external" }))
/// });
///
/// let plugin = c.get::<Plugin>().unwrap();
/// assert_eq!(plugin.name, "external");
/// ```
pub struct DiscoveryRegistry {
    inner: Mutex<Inner>,
}

impl DiscoveryRegistry {
    /// Creates an empty provider registry.
    pub fn new() -> Self {
        Self { inner: Mutex::new(Inner::default()) }
    }

    /// Registers a provider for a concrete type.
    pub fn register_provider<T, F>(&self, provider: F)
    where
        T: Send + Sync + 'static,
        F: Fn() -> Option<Arc<T>> + Send + Sync + 'static,
    {
        let erased: ProviderFn = Arc::new(move || provider().map(|arc| arc as AnyArc));
        self.push(key_of_type::<T>(), erased);
    }

    /// Registers a provider for a trait object.
    pub fn register_trait_provider<T, F>(&self, provider: F)
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn() -> Option<Arc<T>> + Send + Sync + 'static,
    {
        // Same double-Arc layout the container uses for trait singletons.
        let erased: ProviderFn =
            Arc::new(move || provider().map(|arc| Arc::new(arc) as AnyArc));
        self.push(key_of_trait::<T>(), erased);
    }

    fn push(&self, key: Key, provider: ProviderFn) {
        let mut inner = self.inner.lock().expect("discovery lock poisoned");
        inner.providers.entry(key).or_default().push(provider);
        // A new provider invalidates any memoized failure for the key.
        inner.attempted.remove(&key);
    }

    /// Runs the providers for a key, memoizing the outcome either way.
    pub(crate) fn try_discover(&self, key: &Key) -> Option<AnyArc> {
        // Copy the providers out so none run under the lock.
        let providers = {
            let inner = self.inner.lock().expect("discovery lock poisoned");
            if let Some(outcome) = inner.attempted.get(key) {
                return outcome.clone();
            }
            inner.providers.get(key).cloned().unwrap_or_default()
        };

        let mut found = None;
        for provider in &providers {
            if let Some(value) = provider() {
                found = Some(value);
                break;
            }
        }

        if found.is_some() {
            debug!(component = key.display_name(), "component discovered");
        }

        let mut inner = self.inner.lock().expect("discovery lock poisoned");
        inner.attempted.entry(*key).or_insert_with(|| found.clone());
        found
    }

    /// Number of keys with at least one provider.
    pub fn provider_count(&self) -> usize {
        self.inner.lock().expect("discovery lock poisoned").providers.len()
    }

    /// Drops all providers and memoized outcomes.
    pub fn clear(&self) {
        let mut inner = self.inner.lock().expect("discovery lock poisoned");
        inner.providers.clear();
        inner.attempted.clear();
    }
}

impl Default for DiscoveryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Widget;

    #[test]
    fn failed_attempt_is_memoized() {
        let calls = Arc::new(AtomicUsize::new(0));
        let registry = DiscoveryRegistry::new();
        let counter = Arc::clone(&calls);
        registry.register_provider::<Widget, _>(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            None
        });

        let key = key_of_type::<Widget>();
        assert!(registry.try_discover(&key).is_none());
        assert!(registry.try_discover(&key).is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn new_provider_resets_memoized_failure() {
        let registry = DiscoveryRegistry::new();
        registry.register_provider::<Widget, _>(|| None);
        let key = key_of_type::<Widget>();
        assert!(registry.try_discover(&key).is_none());

        registry.register_provider::<Widget, _>(|| Some(Arc::new(Widget)));
        assert!(registry.try_discover(&key).is_some());
    }

    #[test]
    fn first_some_wins() {
        let registry = DiscoveryRegistry::new();
        registry.register_provider::<u32, _>(|| Some(Arc::new(1u32)));
        registry.register_provider::<u32, _>(|| Some(Arc::new(2u32)));

        let key = key_of_type::<u32>();
        let found = registry.try_discover(&key).unwrap();
        let value = found.downcast::<u32>().unwrap();
        assert_eq!(*value, 1);
    }
}
