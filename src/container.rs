//! The service container: registration surface plus resolution engine.

use std::sync::{Arc, Mutex};

use tracing::trace;

use crate::context::ResolverContext;
use crate::discovery::DiscoveryRegistry;
use crate::error::{DiError, DiResult};
use crate::internal::circular::{self, StackGuard};
use crate::internal::with_circular_catch;
use crate::key::{key_of_trait, key_of_type, Key};
use crate::lifetime::Lifetime;
use crate::registration::{Candidate, Constructor, Registration, Registry};
use crate::traits::{AnyArc, Resolver, ResolverCore};

/// Thread-safe service container with singleton, transient, and factory
/// lifetimes.
///
/// Services register under their concrete type (or a trait object) and
/// resolve through the [`Resolver`] surface. Singletons are constructed at
/// most once and shared; transients and factories produce a fresh instance
/// per resolution. Constructor candidates declare their requirements
/// explicitly and the container tries them most-requirements-first,
/// falling back on failure.
///
/// Registration locks are never held while a constructor runs, so
/// constructors may resolve further services freely. Circular constructor
/// chains are detected per thread and surface as [`DiError::Circular`]
/// with the full resolution path.
///
/// # Examples
///
/// ```
/// use trellis_di::ServiceContainer;
/// use std::sync::Arc;
///
/// struct Config { name: &'static str }
///
/// let c = ServiceContainer::new();
/// c.register_singleton(Config { name: "app" });
///
/// let a: Arc<Config> = c.resolve::<Config>().unwrap();
/// let b: Arc<Config> = c.resolve::<Config>().unwrap();
/// assert!(Arc::ptr_eq(&a, &b));
/// ```
pub struct ServiceContainer {
    registrations: Mutex<Registry>,
    discovery: DiscoveryRegistry,
}

impl Default for ServiceContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl ServiceContainer {
    /// Creates an empty container.
    pub fn new() -> Self {
        Self {
            registrations: Mutex::new(Registry::new()),
            discovery: DiscoveryRegistry::new(),
        }
    }

    /// Registers a pre-built singleton instance.
    pub fn register_singleton<T: Send + Sync + 'static>(&self, value: T) {
        let key = key_of_type::<T>();
        let reg = Registration::new(
            Lifetime::Singleton,
            Vec::new(),
            Some(Arc::new(value) as AnyArc),
        );
        self.insert(key, reg);
    }

    /// Registers a singleton built lazily from constructor candidates.
    ///
    /// Candidates are ranked by declared-requirement count, most first; the
    /// first candidate whose requirements all resolve wins and its result
    /// is cached for the lifetime of the container.
    pub fn register_singleton_ctors<T: Send + Sync + 'static>(
        &self,
        candidates: Vec<Constructor<T>>,
    ) {
        let key = key_of_type::<T>();
        let erased: Vec<Candidate> = candidates.into_iter().map(Constructor::erase).collect();
        self.insert(key, Registration::new(Lifetime::Singleton, erased, None));
    }

    /// Registers a singleton whose constructor resolves further services
    /// through the context. Built once, on first resolution.
    pub fn register_singleton_factory<T, F>(&self, build: F)
    where
        T: Send + Sync + 'static,
        F: for<'a> Fn(&ResolverContext<'a>) -> DiResult<T> + Send + Sync + 'static,
    {
        self.register_singleton_ctors(vec![Constructor::new(Vec::new(), build)]);
    }

    /// Registers a transient service built by a plain closure.
    ///
    /// Each resolution produces a fresh instance.
    pub fn register_transient<T, F>(&self, build: F)
    where
        T: Send + Sync + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.register_transient_ctors(vec![Constructor::zero(build)]);
    }

    /// Registers a transient service built from constructor candidates.
    pub fn register_transient_ctors<T: Send + Sync + 'static>(
        &self,
        candidates: Vec<Constructor<T>>,
    ) {
        let key = key_of_type::<T>();
        let erased: Vec<Candidate> = candidates.into_iter().map(Constructor::erase).collect();
        self.insert(key, Registration::new(Lifetime::Transient, erased, None));
    }

    /// Registers a transient service whose constructor resolves further
    /// services through the context.
    pub fn register_transient_factory<T, F>(&self, build: F)
    where
        T: Send + Sync + 'static,
        F: for<'a> Fn(&ResolverContext<'a>) -> DiResult<T> + Send + Sync + 'static,
    {
        self.register_transient_ctors(vec![Constructor::new(Vec::new(), build)]);
    }

    /// Registers a factory service.
    ///
    /// The factory closure runs on every resolution and its result is never
    /// cached, even when the closure is cheap. Use this for values that
    /// must reflect external state at the moment of resolution.
    pub fn register_factory<T, F>(&self, build: F)
    where
        T: Send + Sync + 'static,
        F: for<'a> Fn(&ResolverContext<'a>) -> DiResult<T> + Send + Sync + 'static,
    {
        let key = key_of_type::<T>();
        let candidate = Constructor::new(Vec::new(), build).erase();
        self.insert(key, Registration::new(Lifetime::Factory, vec![candidate], None));
    }

    /// Registers a singleton trait implementation.
    ///
    /// Resolve it with [`Resolver::get_trait`].
    ///
    /// # Examples
    ///
    /// ```
    /// use trellis_di::{Resolver, ServiceContainer};
    /// use std::sync::Arc;
    ///
    /// trait Greeter: Send + Sync { fn hello(&self) -> String; }
    /// struct English;
    /// impl Greeter for English { fn hello(&self) -> String { "hi".into() } }
    ///
    /// let c = ServiceContainer::new();
    /// c.register_singleton_trait::<dyn Greeter>(Arc::new(English));
    /// let g = c.get_trait::<dyn Greeter>().unwrap();
    /// assert_eq!(g.hello(), "hi");
    /// ```
    pub fn register_singleton_trait<T: ?Sized + Send + Sync + 'static>(&self, value: Arc<T>) {
        let key = key_of_trait::<T>();
        // Double Arc so the trait object fits behind `dyn Any`.
        let stored: AnyArc = Arc::new(value);
        self.insert(key, Registration::new(Lifetime::Singleton, Vec::new(), Some(stored)));
    }

    fn insert(&self, key: Key, reg: Registration) {
        trace!(service = key.display_name(), lifetime = ?reg.lifetime, "register");
        self.registrations
            .lock()
            .expect("registry lock poisoned")
            .insert(key, reg);
    }

    /// Resolves a service by concrete type.
    ///
    /// Circular constructor chains and depth overruns are caught here and
    /// returned as errors rather than unwinding.
    pub fn resolve<T: Send + Sync + 'static>(&self) -> DiResult<Arc<T>> {
        self.get::<T>()
    }

    /// Resolves a service by concrete type, returning `None` on any error.
    pub fn try_resolve<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.resolve::<T>().ok()
    }

    /// Resolves a trait implementation registered with
    /// [`register_singleton_trait`](Self::register_singleton_trait).
    pub fn resolve_trait<T: ?Sized + Send + Sync + 'static>(&self) -> DiResult<Arc<T>> {
        self.get_trait::<T>()
    }

    /// Number of registered services.
    pub fn service_count(&self) -> usize {
        self.registrations.lock().expect("registry lock poisoned").len()
    }

    /// Number of singleton registrations with a live instance, whether
    /// supplied at registration or constructed since.
    pub fn singleton_count(&self) -> usize {
        self.registrations
            .lock()
            .expect("registry lock poisoned")
            .iter()
            .filter(|(_, reg)| reg.lifetime == Lifetime::Singleton && reg.has_instance())
            .count()
    }

    /// Whether the key names a singleton that already holds an instance.
    pub(crate) fn has_singleton_instance(&self, key: &Key) -> bool {
        self.registrations
            .lock()
            .expect("registry lock poisoned")
            .get(key)
            .map_or(false, |reg| reg.lifetime == Lifetime::Singleton && reg.has_instance())
    }

    /// The lifetime the key was registered with, if any.
    pub fn registered_lifetime(&self, key: &Key) -> Option<Lifetime> {
        self.registrations
            .lock()
            .expect("registry lock poisoned")
            .get(key)
            .map(|reg| reg.lifetime)
    }

    /// Whether the key is registered at all.
    pub fn contains(&self, key: &Key) -> bool {
        self.registrations
            .lock()
            .expect("registry lock poisoned")
            .contains_key(key)
    }

    /// The discovery registry consulted when a resolution misses.
    pub fn discovery(&self) -> &DiscoveryRegistry {
        &self.discovery
    }

    /// Removes every registration. Existing `Arc` handles stay alive.
    pub fn clear(&self) {
        self.registrations.lock().expect("registry lock poisoned").clear();
    }

    fn build_from_candidates(
        &self,
        name: &'static str,
        candidates: &[Candidate],
    ) -> DiResult<AnyArc> {
        let mut last: Option<DiError> = None;
        for candidate in candidates {
            let ctx = ResolverContext::new(self);
            match (candidate.build)(&ctx) {
                Ok(value) => return Ok(value),
                // Cycles and depth overruns abort the whole resolution.
                Err(e @ DiError::Circular(_)) | Err(e @ DiError::DepthExceeded(_)) => {
                    return Err(e)
                }
                Err(e) => {
                    trace!(service = name, error = %e, "constructor candidate failed");
                    last = Some(e);
                }
            }
        }
        Err(match last {
            Some(e) => DiError::CreationFailed(name, e.to_string()),
            None => DiError::CreationFailed(name, "no constructor candidates".to_owned()),
        })
    }
}

impl ServiceContainer {
    fn resolve_inner(&self, key: &Key) -> DiResult<AnyArc> {
        let name = key.display_name();

        // Snapshot under the lock, construct outside it.
        let snapshot = {
            let registry = self.registrations.lock().expect("registry lock poisoned");
            registry.get(key).cloned()
        };

        let reg = match snapshot {
            Some(reg) => reg,
            None => {
                if let Some(found) = self.discovery.try_discover(key) {
                    return Ok(found);
                }
                return Err(DiError::Unregistered(name));
            }
        };

        // Cached singleton short-circuits before any cycle bookkeeping.
        if let Some(cell) = &reg.single {
            if let Some(value) = cell.get() {
                return Ok(Arc::clone(value));
            }
        }
        if let Some(instance) = &reg.instance {
            return Ok(Arc::clone(instance));
        }

        let _guard = StackGuard::new(name);
        match reg.lifetime {
            Lifetime::Singleton => {
                let cell = reg.single.as_ref().ok_or(DiError::CreationFailed(
                    name,
                    "singleton registration without slot".to_owned(),
                ))?;
                let value =
                    cell.get_or_try_init(|| self.build_from_candidates(name, &reg.candidates))?;
                Ok(Arc::clone(value))
            }
            Lifetime::Transient | Lifetime::Factory => {
                self.build_from_candidates(name, &reg.candidates)
            }
        }
    }
}

impl ResolverCore for ServiceContainer {
    fn resolve_any(&self, key: &Key) -> DiResult<AnyArc> {
        // Top-level resolves catch what the stack guard throws; nested
        // resolves let it unwind to the outermost frame so the reported
        // path is complete.
        if circular::stack_depth() == 0 {
            with_circular_catch(|| self.resolve_inner(key))
        } else {
            self.resolve_inner(key)
        }
    }
}

impl Resolver for ServiceContainer {}
