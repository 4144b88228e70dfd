use std::fmt;
use std::sync::{OnceLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use hashbrown::HashMap;

// -----------------------------------------------------------------------------
// TypeTag

/// A small numeric identifier for a concrete type, used as the wire prefix
/// of polymorphic payloads.
///
/// Tags are assigned by a [`TypeRegistry`] in first-use order and are only
/// meaningful within one set of registrations: two processes agree on tags
/// exactly when they register the same keys in the same order (see
/// [`PolyTable`](crate::registry::PolyTable) for how the polymorphic layer
/// makes that order deterministic per base).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeTag(u32);

impl TypeTag {
    /// Rebuild a tag from its wire value.
    #[inline]
    pub const fn from_value(value: u32) -> Self {
        Self(value)
    }

    /// The numeric wire value.
    #[inline]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// -----------------------------------------------------------------------------
// TypeRegistry

/// A registry assigning stable small integer identifiers to type keys.
///
/// Registration is idempotent within one process run and the registry only
/// grows; there is no removal operation. Keys are `'static` strings of the
/// form `module::path::Name` (what
/// [`PolyTraverse::poly_key_static`](crate::PolyTraverse::poly_key_static)
/// produces).
///
/// # Example
///
/// ```
/// use flatwalk::TypeRegistry;
///
/// let mut registry = TypeRegistry::new();
///
/// let tag = registry.register_key("geometry::Circle");
/// assert_eq!(registry.register_key("geometry::Circle"), tag);
/// assert_eq!(registry.name_of(tag), Some("geometry::Circle"));
///
/// let other = registry.register_key("geometry::Square");
/// assert_ne!(other, tag);
/// ```
#[derive(Default)]
pub struct TypeRegistry {
    tag_by_key: HashMap<&'static str, TypeTag>,
    names: Vec<&'static str>,
}

impl TypeRegistry {
    /// Create an empty registry.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a tag to `key`, or return the tag it already has.
    pub fn register_key(&mut self, key: &'static str) -> TypeTag {
        if let Some(tag) = self.tag_by_key.get(key) {
            return *tag;
        }
        let tag = TypeTag(self.names.len() as u32);
        self.tag_by_key.insert(key, tag);
        self.names.push(key);
        tag
    }

    /// Look up an already-assigned tag without registering.
    pub fn tag_of(&self, key: &str) -> Option<TypeTag> {
        self.tag_by_key.get(key).copied()
    }

    /// The human-readable key behind `tag`, for diagnostics.
    ///
    /// Returns `None` for a tag this registry never assigned.
    pub fn name_of(&self, tag: TypeTag) -> Option<&'static str> {
        self.names.get(tag.0 as usize).copied()
    }

    /// Whether `key` has been registered.
    pub fn contains(&self, key: &str) -> bool {
        self.tag_by_key.contains_key(key)
    }

    /// Number of registered keys.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate over `(key, tag)` pairs in assignment order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, TypeTag)> + '_ {
        self.names
            .iter()
            .enumerate()
            .map(|(index, key)| (*key, TypeTag(index as u32)))
    }

    /// The process-global registry backing polymorphic dispatch.
    ///
    /// First-use registration takes the write lock, which is the
    /// atomic-register-once primitive: concurrent warm-up from multiple
    /// threads serializes there. Post-warm-up lookups take the read lock.
    pub fn global() -> &'static SharedTypeRegistry {
        static GLOBAL: OnceLock<SharedTypeRegistry> = OnceLock::new();
        GLOBAL.get_or_init(|| SharedTypeRegistry {
            internal: RwLock::new(TypeRegistry::new()),
        })
    }
}

// -----------------------------------------------------------------------------
// SharedTypeRegistry

/// A [`TypeRegistry`] shared behind a lock.
pub struct SharedTypeRegistry {
    internal: RwLock<TypeRegistry>,
}

impl SharedTypeRegistry {
    /// Takes a read lock on the underlying [`TypeRegistry`].
    pub fn read(&self) -> RwLockReadGuard<'_, TypeRegistry> {
        self.internal.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Takes a write lock on the underlying [`TypeRegistry`].
    pub fn write(&self) -> RwLockWriteGuard<'_, TypeRegistry> {
        self.internal
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for SharedTypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.read().names.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_is_idempotent() {
        let mut registry = TypeRegistry::new();
        let first = registry.register_key("a::A");
        let second = registry.register_key("b::B");
        assert_ne!(first, second);
        assert_eq!(registry.register_key("a::A"), first);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn tags_are_assigned_in_first_use_order() {
        let mut registry = TypeRegistry::new();
        assert_eq!(registry.register_key("x::X").value(), 0);
        assert_eq!(registry.register_key("y::Y").value(), 1);
        assert_eq!(registry.register_key("z::Z").value(), 2);

        let keys: Vec<_> = registry.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, ["x::X", "y::Y", "z::Z"]);
    }

    #[test]
    fn name_of_unregistered_tag_is_none() {
        let registry = TypeRegistry::new();
        assert_eq!(registry.name_of(TypeTag::from_value(3)), None);
    }

    #[test]
    fn global_registry_is_shared() {
        let tag = TypeRegistry::global()
            .write()
            .register_key("flatwalk::tests::GlobalProbe");
        assert_eq!(
            TypeRegistry::global().read().name_of(tag),
            Some("flatwalk::tests::GlobalProbe")
        );
    }
}
