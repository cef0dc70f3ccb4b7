//! Resolution context handed to constructor candidates.

use crate::error::DiResult;
use crate::key::Key;
use crate::traits::{AnyArc, Resolver, ResolverCore};

/// Scoped view of the container passed into constructor candidates.
///
/// The context borrows the resolving container so candidates can pull their
/// declared requirements through the usual [`Resolver`] surface without
/// holding a container handle of their own.
///
/// # Examples
///
/// ```
/// use trellis_di::{Constructor, Resolver, ServiceContainer, key_of_type};
/// use std::sync::Arc;
///
/// struct Config { url: String }
/// struct Client { url: String }
///
/// let c = ServiceContainer::new();
/// c.register_singleton(Config { url: "http://localhost".into() });
/// c.register_transient_ctors(vec![Constructor::new(
///     vec![key_of_type::<Config>()],
///     |ctx| Ok(Client { url: ctx.get::<Config>()?.url.clone() }),
/// )]);
///
/// let client: Arc<Client> = c.resolve::<Client>().unwrap();
/// assert_eq!(client.url, "http://localhost");
/// ```
pub struct ResolverContext<'a> {
    inner: &'a dyn ResolverCore,
}

impl<'a> ResolverContext<'a> {
    pub(crate) fn new(inner: &'a dyn ResolverCore) -> Self {
        Self { inner }
    }
}

impl ResolverCore for ResolverContext<'_> {
    fn resolve_any(&self, key: &Key) -> DiResult<AnyArc> {
        self.inner.resolve_any(key)
    }
}

impl Resolver for ResolverContext<'_> {}
