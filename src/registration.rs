//! Service registration types and the container's registration store.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::context::ResolverContext;
use crate::error::DiResult;
use crate::key::Key;
use crate::lifetime::Lifetime;
use crate::traits::AnyArc;

/// Type-erased constructor function.
pub(crate) type CtorFn =
    Arc<dyn for<'a> Fn(&ResolverContext<'a>) -> DiResult<AnyArc> + Send + Sync>;

/// An explicit constructor candidate for a service type.
///
/// A candidate declares up front which service types it requires and how to
/// build the instance once they resolve. Candidates form the explicit,
/// testable replacement for reflective constructor selection: the container
/// ranks them by declared-dependency count (most first) and falls back to
/// the next candidate whenever one of the requirements cannot be resolved.
///
/// # Examples
///
/// ```
/// use trellis_di::{Constructor, Resolver, key_of_type};
/// use std::sync::Arc;
///
/// struct Logger;
/// struct Worker { logger: Arc<Logger> }
///
/// let full = Constructor::new(vec![key_of_type::<Logger>()], |ctx| {
///     Ok(Worker { logger: ctx.get::<Logger>()? })
/// });
/// let bare = Constructor::zero(|| Worker { logger: Arc::new(Logger) });
/// # let _ = (full, bare);
/// ```
pub struct Constructor<T> {
    required: Vec<Key>,
    build: Arc<dyn for<'a> Fn(&ResolverContext<'a>) -> DiResult<T> + Send + Sync>,
}

impl<T: 'static + Send + Sync> Constructor<T> {
    /// Creates a candidate that requires the given service types.
    ///
    /// The build closure resolves its requirements through the supplied
    /// context; any resolution error makes the container fall back to the
    /// next-fewer-requirements candidate.
    pub fn new<F>(required: Vec<Key>, build: F) -> Self
    where
        F: for<'a> Fn(&ResolverContext<'a>) -> DiResult<T> + Send + Sync + 'static,
    {
        Self { required, build: Arc::new(build) }
    }

    /// Creates a zero-requirement candidate, the final fallback in the
    /// ranking.
    pub fn zero<F>(build: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self { required: Vec::new(), build: Arc::new(move |_| Ok(build())) }
    }

    /// The number of declared requirements, used for ranking.
    pub fn arity(&self) -> usize {
        self.required.len()
    }

    pub(crate) fn erase(self) -> Candidate {
        let build = self.build;
        Candidate {
            required: self.required,
            build: Arc::new(move |ctx| Ok(Arc::new(build(ctx)?) as AnyArc)),
        }
    }
}

/// Type-erased constructor candidate stored in a registration.
#[derive(Clone)]
pub(crate) struct Candidate {
    pub(crate) required: Vec<Key>,
    pub(crate) build: CtorFn,
}

/// Service registration with lifetime, constructor candidates, and the
/// singleton slot.
///
/// All fields are cheaply cloneable so a resolve can snapshot the
/// registration under the registry lock and run constructors after
/// releasing it.
#[derive(Clone)]
pub(crate) struct Registration {
    pub(crate) lifetime: Lifetime,
    /// Constructor candidates, ranked most-requirements-first.
    pub(crate) candidates: Arc<Vec<Candidate>>,
    /// Pre-built instance supplied at registration time.
    pub(crate) instance: Option<AnyArc>,
    /// Singleton slot, present only for singleton lifetime; filled once on
    /// first successful construction and shared by all snapshots.
    pub(crate) single: Option<Arc<OnceCell<AnyArc>>>,
}

impl Registration {
    pub(crate) fn new(
        lifetime: Lifetime,
        mut candidates: Vec<Candidate>,
        instance: Option<AnyArc>,
    ) -> Self {
        candidates.sort_by(|a, b| b.required.len().cmp(&a.required.len()));
        let single = match lifetime {
            Lifetime::Singleton => Some(Arc::new(OnceCell::new())),
            _ => None,
        };
        Self {
            lifetime,
            candidates: Arc::new(candidates),
            instance,
            single,
        }
    }

    /// Whether a singleton instance has been attached or constructed.
    pub(crate) fn has_instance(&self) -> bool {
        self.instance.is_some()
            || self.single.as_ref().map_or(false, |cell| cell.get().is_some())
    }
}

/// Registration store holding all container registrations.
///
/// Small collections live in a Vec scanned linearly (cache-friendly for the
/// handful of services most containers hold); the HashMap takes the
/// overflow.
pub(crate) struct Registry {
    one_small: Vec<(Key, Registration)>,
    one_large: HashMap<Key, Registration>,
    small_threshold: usize,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self {
            one_small: Vec::new(),
            one_large: HashMap::new(),
            small_threshold: 16,
        }
    }

    /// Inserts a registration, replacing any existing one for the key.
    pub(crate) fn insert(&mut self, key: Key, registration: Registration) {
        if let Some(pos) = self.one_small.iter().position(|(k, _)| k == &key) {
            self.one_small[pos] = (key, registration);
        } else if self.one_small.len() < self.small_threshold {
            self.one_small.push((key, registration));
        } else {
            self.one_large.insert(key, registration);
        }
    }

    #[inline(always)]
    pub(crate) fn get(&self, key: &Key) -> Option<&Registration> {
        for (k, reg) in &self.one_small {
            if k == key {
                return Some(reg);
            }
        }
        self.one_large.get(key)
    }

    #[inline(always)]
    pub(crate) fn contains_key(&self, key: &Key) -> bool {
        self.get(key).is_some()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&Key, &Registration)> {
        self.one_small.iter().map(|(k, r)| (k, r)).chain(self.one_large.iter())
    }

    pub(crate) fn len(&self) -> usize {
        self.one_small.len() + self.one_large.len()
    }

    pub(crate) fn clear(&mut self) {
        self.one_small.clear();
        self.one_large.clear();
    }
}
