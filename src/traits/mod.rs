//! Core traits for the component registry and service container.

mod manager;
mod resolver;

pub use manager::Manager;
pub use resolver::{Resolver, ResolverCore};
pub(crate) use resolver::AnyArc;
