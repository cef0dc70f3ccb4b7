//! Component and service key types.

use std::any::TypeId;

/// Key for registration storage and lookup.
///
/// Keys uniquely identify components and services in the registry and
/// container. Concrete types carry their `TypeId` for fast lookup and the
/// type name for diagnostics; trait objects have no `TypeId`, so they are
/// keyed by trait name alone.
///
/// # Examples
///
/// ```rust
/// use trellis_di::{ServiceContainer, Resolver, key_of_type};
///
/// let container = ServiceContainer::new();
/// container.register_singleton(8080u32);
///
/// let key = key_of_type::<u32>();
/// assert_eq!(key.display_name(), "u32");
///
/// let port = container.resolve::<u32>().unwrap();
/// assert_eq!(*port, 8080);
/// ```
#[derive(Debug, Clone, Copy)]
pub enum Key {
    /// Concrete type key with TypeId and name for diagnostics
    Type(TypeId, &'static str),
    /// Trait object key
    ///
    /// Traits don't have a TypeId, so only the trait name is stored.
    Trait(&'static str),
}

impl Key {
    /// Get the type or trait name for display.
    ///
    /// This is the `std::any::type_name` result, used in error messages,
    /// cycle paths, and log output.
    pub fn display_name(&self) -> &'static str {
        match self {
            Key::Type(_, name) => name,
            Key::Trait(name) => name,
        }
    }
}

// Hot path: TypeId-only comparison for concrete types (the string is
// carried for diagnostics, never consulted for identity).
impl PartialEq for Key {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Key::Type(a, _), Key::Type(b, _)) => a == b,
            (Key::Trait(a), Key::Trait(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Key {}

// Ordering by display name keeps registry traversal and reported cycles
// deterministic across runs, unlike TypeId order.
impl PartialOrd for Key {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Key {
    #[inline]
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use std::cmp::Ordering;
        match (self, other) {
            (Key::Type(a, name_a), Key::Type(b, name_b)) => {
                name_a.cmp(name_b).then_with(|| a.cmp(b))
            }
            (Key::Type(_, _), Key::Trait(_)) => Ordering::Less,
            (Key::Trait(_), Key::Type(_, _)) => Ordering::Greater,
            (Key::Trait(a), Key::Trait(b)) => a.cmp(b),
        }
    }
}

impl std::hash::Hash for Key {
    #[inline(always)]
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self {
            Key::Type(id, _) => {
                0u8.hash(state);
                id.hash(state);
            }
            Key::Trait(name) => {
                1u8.hash(state);
                name.hash(state);
            }
        }
    }
}

/// Creates a key for a concrete type.
#[inline(always)]
pub fn key_of_type<T: 'static>() -> Key {
    Key::Type(TypeId::of::<T>(), std::any::type_name::<T>())
}

/// Creates a key for a trait object.
#[inline(always)]
pub fn key_of_trait<T: ?Sized + 'static>() -> Key {
    Key::Trait(std::any::type_name::<T>())
}
