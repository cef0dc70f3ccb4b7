//! Error types for the component registry and service container.

use std::fmt;

/// Dependency injection errors
///
/// Represents the error conditions that can occur during component
/// registration, graph validation, scheduling, or service resolution.
///
/// # Examples
///
/// ```rust
/// use trellis_di::{DiError, ServiceContainer};
///
/// // Example of Unregistered error
/// let container = ServiceContainer::new();
/// match container.resolve::<String>() {
///     Err(DiError::Unregistered(type_name)) => {
///         assert_eq!(type_name, "alloc::string::String");
///         println!("Service not registered: {}", type_name);
///     }
///     _ => unreachable!(),
/// }
/// ```
///
/// ```rust
/// use trellis_di::DiError;
///
/// let unregistered = DiError::Unregistered("MyService");
/// let circular = DiError::Circular(vec!["ServiceA", "ServiceB", "ServiceA"]);
/// let missing = DiError::MissingDependency { dependent: "Harvester", dependency: "Clock" };
/// let creation = DiError::CreationFailed("Worker", "no constructor candidates".to_string());
///
/// // All errors implement Display
/// println!("Error: {}", unregistered);
/// println!("Error: {}", circular);
/// ```
#[derive(Debug, Clone)]
pub enum DiError {
    /// A declared dependency type was never registered (collected during
    /// validation and reported through the validation report, not thrown)
    MissingDependency {
        /// The component that declared the dependency
        dependent: &'static str,
        /// The dependency type that is not registered
        dependency: &'static str,
    },
    /// Circular dependency detected (includes the full path); produced
    /// identically by graph validation, the scheduler, and the
    /// resolution-stack guard
    Circular(Vec<&'static str>),
    /// Resolve requested for a type with no registration, no factory, and
    /// no discoverable implementation
    Unregistered(&'static str),
    /// All constructor candidates were exhausted or the chosen constructor
    /// returned an error
    CreationFailed(&'static str, String),
    /// Type downcast failed
    TypeMismatch(&'static str),
    /// Maximum resolution depth exceeded
    DepthExceeded(usize),
}

impl fmt::Display for DiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiError::MissingDependency { dependent, dependency } => {
                write!(f, "Component {} depends on unregistered type {}", dependent, dependency)
            }
            DiError::Circular(path) => {
                write!(f, "Circular dependency: {}", path.join(" -> "))
            }
            DiError::Unregistered(name) => write!(f, "Service not registered: {}", name),
            DiError::CreationFailed(name, reason) => {
                write!(f, "Failed to create instance of {}: {}", name, reason)
            }
            DiError::TypeMismatch(name) => write!(f, "Type mismatch for: {}", name),
            DiError::DepthExceeded(depth) => write!(f, "Max resolution depth {} exceeded", depth),
        }
    }
}

impl std::error::Error for DiError {}

/// Result type for DI operations
///
/// A convenience type alias for `Result<T, DiError>` used throughout the
/// crate, following the common Rust pattern of a crate-specific Result
/// type to reduce boilerplate in function signatures.
///
/// # Examples
///
/// ```rust
/// use trellis_di::{DiResult, DiError};
///
/// fn create_service() -> DiResult<String> {
///     Ok("service created".to_string())
/// }
///
/// fn failing_operation() -> DiResult<()> {
///     Err(DiError::Unregistered("some_service"))
/// }
///
/// match create_service() {
///     Ok(service) => println!("Success: {}", service),
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
pub type DiResult<T> = Result<T, DiError>;
