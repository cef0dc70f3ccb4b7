//! Trellis DI: a dependency-resolution and service-container library for
//! bootstrapping component graphs.
//!
//! The crate has two cooperating layers:
//!
//! - [`ServiceContainer`]: singleton, transient, and factory lifetimes,
//!   explicit constructor candidates with declared requirements, trait
//!   object registration, and per-thread circular dependency detection.
//! - [`ComponentRegistry`]: priority- and dependency-aware bootstrap over
//!   the container. Components register with a priority and a dependency
//!   list; the registry validates the graph, computes a deterministic
//!   topological initialization order, constructs everything in order
//!   with lifecycle hooks, and serves steady-state lookups through a
//!   TTL-bounded resolution cache.
//!
//! There is no process-wide instance: construct a registry (or container)
//! once at startup and pass it to consumers.
//!
//! # Quick start
//!
//! ```rust
//! use trellis_di::{ComponentRegistry, Manager, key_of_type};
//!
//! #[derive(Default)]
//! struct Clock;
//! impl Manager for Clock {}
//!
//! #[derive(Default)]
//! struct Scheduler;
//! impl Manager for Scheduler {
//!     const DEPENDENCY_AWARE: bool = true;
//!     fn on_dependencies_resolved(&self) {
//!         // Clock is guaranteed to be constructed by now.
//!     }
//! }
//!
//! let registry = ComponentRegistry::new();
//! registry.register::<Clock>(100, vec![]);
//! registry.register::<Scheduler>(0, vec![key_of_type::<Clock>()]);
//!
//! let report = registry.validate_dependencies();
//! assert!(report.is_valid);
//!
//! registry.initialize_all().unwrap();
//! let scheduler = registry.get_manager::<Scheduler>().unwrap();
//! # let _ = scheduler;
//! ```
//!
//! # Container-level usage
//!
//! ```rust
//! use trellis_di::{Constructor, Resolver, ServiceContainer, key_of_type};
//! use std::sync::Arc;
//!
//! struct Logger;
//! struct Worker { logger: Arc<Logger> }
//!
//! let container = ServiceContainer::new();
//! container.register_singleton(Logger);
//! container.register_transient_ctors(vec![Constructor::new(
//!     vec![key_of_type::<Logger>()],
//!     |ctx| Ok(Worker { logger: ctx.get::<Logger>()? }),
//! )]);
//!
//! let a = container.resolve::<Worker>().unwrap();
//! let b = container.resolve::<Worker>().unwrap();
//! assert!(!Arc::ptr_eq(&a, &b));
//! assert!(Arc::ptr_eq(&a.logger, &b.logger));
//! ```
//!
//! # Error handling
//!
//! Erroring and non-erroring lookups are thin wrappers over the same
//! resolution core: [`ServiceContainer::resolve`] returns
//! [`DiResult`], [`ServiceContainer::try_resolve`] maps every failure to
//! `None`, and [`ComponentRegistry::get_manager`] logs the failure and
//! returns `None`.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod cache;
mod container;
mod context;
mod discovery;
mod error;
mod internal;
mod key;
mod lifetime;
mod registration;
mod registry;
mod traits;

pub use cache::{CacheStats, ResolutionCache, DEFAULT_TTL};
pub use container::ServiceContainer;
pub use context::ResolverContext;
pub use discovery::DiscoveryRegistry;
pub use error::{DiError, DiResult};
pub use internal::CircularPanic;
pub use key::{key_of_trait, key_of_type, Key};
pub use lifetime::Lifetime;
pub use registration::Constructor;
pub use registry::{
    ComplexityRating, ComponentRegistry, DependencyAnalysis, RegistryOptions, ValidationReport,
    ValidationWarning,
};
pub use traits::{Manager, Resolver, ResolverCore};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unregistered_type_fails_with_named_error() {
        let container = ServiceContainer::new();
        match container.resolve::<u64>() {
            Err(DiError::Unregistered(name)) => assert_eq!(name, "u64"),
            other => panic!("unexpected outcome: {:?}", other.map(|_| ())),
        }
        assert!(container.try_resolve::<u64>().is_none());
    }

    #[test]
    fn singleton_count_tracks_live_instances() {
        struct Logger;

        let container = ServiceContainer::new();
        container.register_singleton(Logger);
        assert_eq!(container.service_count(), 1);
        assert_eq!(container.singleton_count(), 1);
    }
}
