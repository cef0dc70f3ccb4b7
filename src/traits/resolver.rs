//! Resolver traits for service resolution.

use std::any::Any;
use std::sync::Arc;
use crate::error::DiResult;
use crate::key::{key_of_trait, key_of_type, Key};

/// Type-erased Arc used for storage and transport of resolved instances.
pub(crate) type AnyArc = Arc<dyn Any + Send + Sync>;

/// Core resolver trait for object-safe service resolution.
///
/// This trait provides the fundamental resolution capability that can be
/// used as a trait object. It handles the low-level mechanics including
/// circular dependency detection through the thread-local resolution stack.
///
/// Most users should use the [`Resolver`] trait instead, which provides
/// ergonomic generic methods built on top of this one.
pub trait ResolverCore: Send + Sync {
    /// Resolves a single service, guarded by the resolution stack.
    ///
    /// Returns the instance wrapped in `Arc<dyn Any>`; resolution errors
    /// (unregistered, circular, creation failure) come back as `DiError`.
    fn resolve_any(&self, key: &Key) -> DiResult<Arc<dyn Any + Send + Sync>>;
}

/// High-level resolver interface with generic methods for type-safe
/// service resolution.
///
/// This is the API callers interact with. It builds on [`ResolverCore`]
/// to offer type-safe generic methods that handle type erasure and casting
/// internally. Both `ServiceContainer` and the `ResolverContext` passed to
/// factories implement this trait.
///
/// The erroring (`get`) and non-erroring (`try_get`) variants are thin
/// wrappers over the same core resolution path; `try_get` swallows every
/// failure and returns `None`, trading diagnosability for convenience.
///
/// # Examples
///
/// ```
/// use trellis_di::{ServiceContainer, Resolver};
/// use std::sync::Arc;
///
/// trait Logger: Send + Sync {
///     fn log(&self, msg: &str);
/// }
///
/// struct ConsoleLogger;
/// impl Logger for ConsoleLogger {
///     fn log(&self, msg: &str) {
///         println!("LOG: {}", msg);
///     }
/// }
///
/// let container = ServiceContainer::new();
/// container.register_singleton(42usize);
/// container.register_singleton_trait(Arc::new(ConsoleLogger) as Arc<dyn Logger>);
///
/// let number = container.get::<usize>().unwrap();
/// assert_eq!(*number, 42);
///
/// let logger = container.get_trait::<dyn Logger>().unwrap();
/// logger.log("resolved");
/// ```
pub trait Resolver: ResolverCore {
    /// Resolves a concrete service type.
    ///
    /// The service must be registered with the exact type `T`.
    fn get<T: 'static + Send + Sync>(&self) -> DiResult<Arc<T>> {
        let key = key_of_type::<T>();
        let any = self.resolve_any(&key)?;
        any.downcast::<T>()
            .map_err(|_| crate::error::DiError::TypeMismatch(std::any::type_name::<T>()))
    }

    /// Resolves a trait implementation.
    ///
    /// Trait instances are stored as `Arc<Arc<dyn Trait>>` inside the
    /// type-erased Arc, so the downcast targets `Arc<T>`.
    fn get_trait<T: ?Sized + 'static + Send + Sync>(&self) -> DiResult<Arc<T>>
    where
        Arc<T>: 'static,
    {
        let key = key_of_trait::<T>();
        let any = self.resolve_any(&key)?;
        any.downcast::<Arc<T>>()
            .map(|boxed| (*boxed).clone())
            .map_err(|_| crate::error::DiError::TypeMismatch(std::any::type_name::<T>()))
    }

    /// Resolves a concrete service type, returning `None` on any failure.
    ///
    /// Never panics and never surfaces an error; the failure is discarded.
    fn try_get<T: 'static + Send + Sync>(&self) -> Option<Arc<T>> {
        self.get::<T>().ok()
    }

    /// Resolves a trait implementation, returning `None` on any failure.
    fn try_get_trait<T: ?Sized + 'static + Send + Sync>(&self) -> Option<Arc<T>>
    where
        Arc<T>: 'static,
    {
        self.get_trait::<T>().ok()
    }

    /// Resolves a concrete service type, panicking on failure.
    ///
    /// Use this when the service is known to be registered and a
    /// configuration error should fail fast.
    ///
    /// # Examples
    ///
    /// ```
    /// use trellis_di::{ServiceContainer, Resolver};
    ///
    /// struct Settings { retries: u32 }
    ///
    /// let container = ServiceContainer::new();
    /// container.register_singleton(Settings { retries: 3 });
    ///
    /// // Registered above, so this cannot fail.
    /// let settings = container.get_required::<Settings>();
    /// assert_eq!(settings.retries, 3);
    /// ```
    ///
    /// ```should_panic
    /// use trellis_di::{ServiceContainer, Resolver};
    ///
    /// struct Missing;
    ///
    /// let container = ServiceContainer::new();
    /// container.get_required::<Missing>(); // panics
    /// ```
    fn get_required<T: 'static + Send + Sync>(&self) -> Arc<T> {
        self.get::<T>()
            .unwrap_or_else(|e| panic!("Failed to resolve {}: {:?}", std::any::type_name::<T>(), e))
    }

    /// Resolves a trait implementation, panicking on failure.
    ///
    /// # Examples
    ///
    /// ```
    /// use trellis_di::{ServiceContainer, Resolver};
    /// use std::sync::Arc;
    ///
    /// trait Clock: Send + Sync { fn now(&self) -> u64; }
    /// struct Fixed;
    /// impl Clock for Fixed { fn now(&self) -> u64 { 42 } }
    ///
    /// let container = ServiceContainer::new();
    /// container.register_singleton_trait::<dyn Clock>(Arc::new(Fixed));
    ///
    /// let clock = container.get_required_trait::<dyn Clock>();
    /// assert_eq!(clock.now(), 42);
    /// ```
    fn get_required_trait<T: ?Sized + 'static + Send + Sync>(&self) -> Arc<T>
    where
        Arc<T>: 'static,
    {
        self.get_trait::<T>()
            .unwrap_or_else(|e| {
                panic!("Failed to resolve trait {}: {:?}", std::any::type_name::<T>(), e)
            })
    }
}
