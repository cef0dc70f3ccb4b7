//! Lifecycle contract for registry-managed components.

/// Lifecycle contract for components managed by the
/// [`ComponentRegistry`](crate::ComponentRegistry).
///
/// All hooks have default no-op implementations, so a component only
/// overrides what it needs. Hooks fire during `initialize_all()` in
/// dependency order: construction first, then [`initialize`](Manager::initialize),
/// then [`on_dependencies_resolved`](Manager::on_dependencies_resolved).
/// [`dispose`](Manager::dispose) fires in reverse initialization order
/// during registry teardown.
///
/// # Dependency awareness
///
/// Components that consume their declared dependencies should set
/// [`DEPENDENCY_AWARE`](Manager::DEPENDENCY_AWARE) to `true`. Declaring
/// dependencies while leaving the marker `false` produces an informational
/// validation warning; it never invalidates the graph.
///
/// # Examples
///
/// ```
/// use trellis_di::Manager;
///
/// #[derive(Default)]
/// struct TimeService {
///     tick_rate: u32,
/// }
///
/// impl Manager for TimeService {
///     fn initialize(&self) -> Result<(), String> {
///         // Validate configuration, open resources, etc.
///         Ok(())
///     }
///
///     fn dispose(&self) {
///         // Flush state, release resources.
///     }
/// }
/// ```
pub trait Manager: Send + Sync + 'static {
    /// Marker indicating the component knows how to consume the
    /// dependencies it declares.
    const DEPENDENCY_AWARE: bool = false;

    /// Custom initialization hook, invoked after construction.
    ///
    /// Returning an error surfaces as a hard initialization failure for
    /// the component (and, in strict mode, for the whole sequence).
    fn initialize(&self) -> Result<(), String> {
        Ok(())
    }

    /// Notification that all declared dependencies have instances.
    ///
    /// Fires immediately after [`initialize`](Manager::initialize)
    /// succeeds. Never fires for a component whose dependency failed to
    /// construct.
    fn on_dependencies_resolved(&self) {}

    /// Cleanup hook, invoked during registry disposal in reverse
    /// initialization order.
    fn dispose(&self) {}
}
