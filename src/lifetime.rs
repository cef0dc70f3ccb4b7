//! Service lifetime definitions.

/// Service lifetimes controlling instance reuse
///
/// Defines how service instances are created, cached, and shared within
/// the service container.
///
/// # Lifetime Characteristics
///
/// - **Singleton**: Created once, reused for the remainder of the
///   container's life
/// - **Transient**: Fresh instance on every resolution, never cached
/// - **Factory**: Every resolution delegates to the supplied function;
///   results are never cached automatically
///
/// # Examples
///
/// ```rust
/// use trellis_di::{ServiceContainer, Resolver};
/// use std::sync::Arc;
///
/// struct Database { url: String }
/// struct RequestModel { id: u32 }
///
/// let container = ServiceContainer::new();
///
/// // Singleton: one instance for the container's lifetime
/// container.register_singleton(Database {
///     url: "postgres://localhost".to_string(),
/// });
///
/// // Transient: new instance every time
/// container.register_transient(|| RequestModel { id: 12345 });
///
/// let db1 = container.resolve::<Database>().unwrap();
/// let db2 = container.resolve::<Database>().unwrap();
/// assert!(Arc::ptr_eq(&db1, &db2)); // Same instance
///
/// let m1 = container.resolve::<RequestModel>().unwrap();
/// let m2 = container.resolve::<RequestModel>().unwrap();
/// assert!(!Arc::ptr_eq(&m1, &m2)); // Always different
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifetime {
    /// Single instance per container, cached forever
    ///
    /// Singleton services are created once when first requested and then
    /// cached in the container's singleton store. The same instance is
    /// shared across all subsequent resolutions and threads.
    Singleton,
    /// New instance per resolution, never cached
    ///
    /// Transient services construct a fresh instance on every resolution.
    /// Best for lightweight, stateless services.
    Transient,
    /// Every resolution delegates to the registered factory function
    ///
    /// The factory receives the container as context and may resolve other
    /// services. Its result is returned as-is; only singleton-lifetime
    /// registrations are ever persisted in the singleton store.
    Factory,
}
