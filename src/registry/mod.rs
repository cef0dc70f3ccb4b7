//! Component registry: the bootstrap boundary over the service container.
//!
//! Components register with a priority and a declared dependency list,
//! then `initialize_all` validates the graph, computes a topological
//! order, and constructs every component in that order with lifecycle
//! hooks. Steady-state access goes through `get_manager`, which never
//! fails loudly.

mod analysis;
mod resolver;
mod scheduler;

pub use analysis::{ComplexityRating, DependencyAnalysis};
pub use resolver::{ValidationReport, ValidationWarning};

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::cache::{ResolutionCache, DEFAULT_TTL};
use crate::container::ServiceContainer;
use crate::error::{DiError, DiResult};
use crate::key::{key_of_type, Key};
use crate::registration::Constructor;
use crate::traits::{AnyArc, Manager, ResolverCore};

/// Behavior knobs for a [`ComponentRegistry`].
#[derive(Debug, Clone)]
pub struct RegistryOptions {
    /// Abort `initialize_all` on the first construction failure. When
    /// false, failed components and their dependents are skipped with a
    /// warning and independent branches keep initializing.
    pub strict_init: bool,
    /// Lifetime of entries in the resolution cache.
    pub cache_ttl: Duration,
    /// Whether the resolution cache starts enabled.
    pub cache_enabled: bool,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            strict_init: true,
            cache_ttl: DEFAULT_TTL,
            cache_enabled: true,
        }
    }
}

/// Type-erased lifecycle hooks captured at registration time, when the
/// concrete type is still known.
pub(crate) struct Hooks {
    pub(crate) initialize: Arc<dyn Fn(&AnyArc) -> Result<(), String> + Send + Sync>,
    pub(crate) dependencies_resolved: Arc<dyn Fn(&AnyArc) + Send + Sync>,
    pub(crate) dispose: Arc<dyn Fn(&AnyArc) + Send + Sync>,
}

impl Hooks {
    fn for_type<T: Manager>() -> Self {
        Hooks {
            initialize: Arc::new(|any: &AnyArc| match any.clone().downcast::<T>() {
                Ok(manager) => manager.initialize(),
                Err(_) => Err("lifecycle hook received a mismatched instance".to_owned()),
            }),
            dependencies_resolved: Arc::new(|any: &AnyArc| {
                if let Ok(manager) = any.clone().downcast::<T>() {
                    manager.on_dependencies_resolved();
                }
            }),
            dispose: Arc::new(|any: &AnyArc| {
                if let Ok(manager) = any.clone().downcast::<T>() {
                    manager.dispose();
                }
            }),
        }
    }
}

/// Registration metadata for one component.
pub(crate) struct ComponentRegistration {
    pub(crate) key: Key,
    pub(crate) priority: i32,
    pub(crate) dependencies: Vec<Key>,
    /// Registration sequence number, the tie-break for equal priorities.
    pub(crate) seq: u64,
    pub(crate) dependency_aware: bool,
    pub(crate) hooks: Hooks,
}

#[derive(Default)]
struct RegistryInner {
    registrations: HashMap<Key, ComponentRegistration>,
    next_seq: u64,
    initialized: bool,
    /// Keys in the order they were successfully initialized; disposal
    /// walks this in reverse.
    init_order: Vec<Key>,
}

/// Priority- and dependency-aware component registry.
///
/// Construct one at process start and hand it (or its container) to every
/// consumer; there is no process-wide instance.
///
/// # Examples
///
/// ```
/// use trellis_di::{ComponentRegistry, Manager, key_of_type};
///
/// #[derive(Default)]
/// struct Audio;
/// impl Manager for Audio {}
///
/// #[derive(Default)]
/// struct Tutorial;
/// impl Manager for Tutorial {
///     const DEPENDENCY_AWARE: bool = true;
/// }
///
/// let registry = ComponentRegistry::new();
/// registry.register::<Audio>(10, vec![]);
/// registry.register::<Tutorial>(0, vec![key_of_type::<Audio>()]);
///
/// assert!(registry.validate_dependencies().is_valid);
/// registry.initialize_all().unwrap();
/// assert!(registry.get_manager::<Tutorial>().is_some());
/// ```
pub struct ComponentRegistry {
    container: ServiceContainer,
    cache: ResolutionCache,
    options: RegistryOptions,
    inner: Mutex<RegistryInner>,
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentRegistry {
    /// Creates a registry with default options (strict initialization,
    /// cache enabled at the default TTL).
    pub fn new() -> Self {
        Self::with_options(RegistryOptions::default())
    }

    /// Creates a registry with explicit options.
    pub fn with_options(options: RegistryOptions) -> Self {
        let cache = ResolutionCache::with_ttl(options.cache_ttl);
        cache.set_enabled(options.cache_enabled);
        Self {
            container: ServiceContainer::new(),
            cache,
            options,
            inner: Mutex::new(RegistryInner::default()),
        }
    }

    /// Declares a default-constructible component with its priority and
    /// dependency list. Logs and ignores the call once initialization has
    /// completed.
    pub fn register<T: Manager + Default>(&self, priority: i32, dependencies: Vec<Key>) {
        self.register_with::<T>(priority, dependencies, vec![Constructor::zero(T::default)]);
    }

    /// Declares a component with explicit constructor candidates.
    pub fn register_with<T: Manager>(
        &self,
        priority: i32,
        dependencies: Vec<Key>,
        candidates: Vec<Constructor<T>>,
    ) {
        let key = key_of_type::<T>();
        if !self.record::<T>(key, priority, dependencies) {
            return;
        }
        self.container.register_singleton_ctors(candidates);
    }

    /// Registers an already-constructed component. It participates in
    /// ordering and disposal but skips construction and the
    /// initialization hooks.
    pub fn register_instance<T: Manager>(&self, instance: T, priority: i32) {
        let key = key_of_type::<T>();
        if !self.record::<T>(key, priority, Vec::new()) {
            return;
        }
        self.container.register_singleton(instance);
    }

    fn record<T: Manager>(&self, key: Key, priority: i32, dependencies: Vec<Key>) -> bool {
        let mut inner = self.inner.lock().expect("registry lock poisoned");
        if inner.initialized {
            warn!(
                component = key.display_name(),
                "registration after initialization is ignored"
            );
            return false;
        }
        let seq = inner.next_seq;
        inner.next_seq += 1;
        debug!(component = key.display_name(), priority, seq, "component registered");
        inner.registrations.insert(
            key,
            ComponentRegistration {
                key,
                priority,
                dependencies,
                seq,
                dependency_aware: T::DEPENDENCY_AWARE,
                hooks: Hooks::for_type::<T>(),
            },
        );
        true
    }

    /// Returns the component instance, constructing it lazily if needed.
    ///
    /// Never fails loudly: resolution errors are logged as warnings and
    /// surface as `None`. Cached resolutions are consulted only for
    /// components without a live singleton instance, so the cache can
    /// never shadow the singleton store.
    pub fn get_manager<T: Manager>(&self) -> Option<Arc<T>> {
        let key = key_of_type::<T>();

        if !self.container.has_singleton_instance(&key) {
            if let Some(hit) = self.cache.get(&key) {
                if let Ok(instance) = hit.downcast::<T>() {
                    return Some(instance);
                }
                self.cache.invalidate(&key);
            }
        }

        match self.container.resolve::<T>() {
            Ok(instance) => {
                if !self.container.has_singleton_instance(&key) {
                    self.cache.put(key, instance.clone() as AnyArc);
                }
                Some(instance)
            }
            Err(e) => {
                warn!(component = key.display_name(), error = %e, "manager resolution failed");
                None
            }
        }
    }

    /// Validates the dependency graph. Read-only; callable at any time.
    pub fn validate_dependencies(&self) -> ValidationReport {
        let inner = self.inner.lock().expect("registry lock poisoned");
        resolver::validate(&inner.registrations)
    }

    /// Dependency graph statistics for diagnostics.
    pub fn analyze_dependencies(&self) -> DependencyAnalysis {
        let inner = self.inner.lock().expect("registry lock poisoned");
        analysis::analyze(&inner.registrations)
    }

    /// The initialization order the scheduler would use right now.
    pub fn initialization_order(&self) -> DiResult<Vec<&'static str>> {
        let inner = self.inner.lock().expect("registry lock poisoned");
        let order = scheduler::compute_order(&inner.registrations)?;
        Ok(order.iter().map(|key| key.display_name()).collect())
    }

    /// Validates, orders, and constructs every registered component,
    /// invoking lifecycle hooks along the way.
    ///
    /// One-shot: a second call is a warned no-op. In strict mode (the
    /// default) the first construction failure aborts the sequence; in
    /// lenient mode failed components and their dependents are skipped. A
    /// failing initialization hook always aborts.
    pub fn initialize_all(&self) -> DiResult<()> {
        let mut inner = self.inner.lock().expect("registry lock poisoned");
        if inner.initialized {
            warn!("initialize_all called twice; ignoring");
            return Ok(());
        }

        let report = resolver::validate(&inner.registrations);
        if !report.is_valid {
            warn!(issues = %report.format_issues(), "dependency validation failed");
            if let Some(cycle) = report.cycle.clone() {
                return Err(DiError::Circular(cycle));
            }
            if let Some((dependent, dependency)) = first_missing_edge(&inner.registrations) {
                return Err(DiError::MissingDependency { dependent, dependency });
            }
        }
        for warning in &report.warnings {
            debug!(warning = %warning, "dependency validation note");
        }

        let order = scheduler::compute_order(&inner.registrations)?;

        let mut failed: HashSet<Key> = HashSet::new();
        let mut completed: Vec<Key> = Vec::with_capacity(order.len());

        for key in &order {
            // Clone the pieces we need so the registration borrow ends
            // before the abort paths record the completed prefix.
            let (dependencies, init_hook, resolved_hook) = match inner.registrations.get(key) {
                Some(reg) => (
                    reg.dependencies.clone(),
                    Arc::clone(&reg.hooks.initialize),
                    Arc::clone(&reg.hooks.dependencies_resolved),
                ),
                None => continue,
            };
            let name = key.display_name();

            // A failed dependency hard-blocks its dependents, hooks
            // included.
            if dependencies.iter().any(|dep| failed.contains(dep)) {
                warn!(component = name, "skipped: a dependency failed to initialize");
                failed.insert(*key);
                continue;
            }

            // Pre-built instances keep their place in the order but skip
            // construction and the initialization hooks.
            if self.container.has_singleton_instance(key) {
                completed.push(*key);
                continue;
            }

            // The order already guarantees dependencies come first; this
            // re-resolve catches instances lost between passes.
            let mut dep_error = None;
            for dep in &dependencies {
                if inner.registrations.contains_key(dep)
                    && !self.container.has_singleton_instance(dep)
                {
                    if let Err(e) = self.container.resolve_any(dep) {
                        dep_error = Some(e);
                        break;
                    }
                }
            }

            let built = match dep_error {
                Some(e) => Err(e),
                None => self.container.resolve_any(key),
            };

            match built {
                Ok(instance) => {
                    if let Err(msg) = init_hook(&instance) {
                        warn!(component = name, error = %msg, "initialization hook failed");
                        // Components initialized before the abort still get
                        // their dispose hooks later.
                        inner.init_order = completed;
                        return Err(DiError::CreationFailed(name, msg));
                    }
                    resolved_hook(&instance);
                    completed.push(*key);
                }
                Err(e) => {
                    warn!(component = name, error = %e, "component construction failed");
                    if self.options.strict_init {
                        inner.init_order = completed;
                        return Err(e);
                    }
                    failed.insert(*key);
                }
            }
        }

        info!(
            initialized = completed.len(),
            skipped = failed.len(),
            "component initialization complete"
        );
        inner.init_order = completed;
        inner.initialized = true;
        Ok(())
    }

    /// Whether `initialize_all` has completed.
    pub fn is_initialized(&self) -> bool {
        self.inner.lock().expect("registry lock poisoned").initialized
    }

    /// Number of registered components.
    pub fn component_count(&self) -> usize {
        self.inner.lock().expect("registry lock poisoned").registrations.len()
    }

    /// Tears down every initialized component in reverse initialization
    /// order, then clears all internal state. Idempotent.
    pub fn dispose(&self) {
        let mut inner = self.inner.lock().expect("registry lock poisoned");
        if inner.registrations.is_empty() && inner.init_order.is_empty() {
            return;
        }

        for key in inner.init_order.iter().rev() {
            if let Some(reg) = inner.registrations.get(key) {
                if self.container.has_singleton_instance(key) {
                    if let Ok(instance) = self.container.resolve_any(key) {
                        (reg.hooks.dispose)(&instance);
                    }
                }
            }
        }

        inner.registrations.clear();
        inner.init_order.clear();
        inner.initialized = false;
        drop(inner);

        self.container.clear();
        self.container.discovery().clear();
        self.cache.clear();
        info!("component registry disposed");
    }

    /// The backing service container, for callers that need the raw
    /// resolution surface.
    pub fn container(&self) -> &ServiceContainer {
        &self.container
    }

    /// The resolution cache serving `get_manager` lookups.
    pub fn cache(&self) -> &ResolutionCache {
        &self.cache
    }
}

fn first_missing_edge(
    registrations: &HashMap<Key, ComponentRegistration>,
) -> Option<(&'static str, &'static str)> {
    let mut regs: Vec<&ComponentRegistration> = registrations.values().collect();
    regs.sort_by_key(|reg| reg.key.display_name());
    for reg in regs {
        for dep in &reg.dependencies {
            if !registrations.contains_key(dep) {
                return Some((reg.key.display_name(), dep.display_name()));
            }
        }
    }
    None
}
