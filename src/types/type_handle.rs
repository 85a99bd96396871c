//! Logical type identities used by the persistence layer.
//!
//! A [`TypeHandle`] is an interned index into a [`TypeRegistry`]. It is a
//! tag, not a Rust type: pages report one through `parent_type()` so a
//! reader can check that the bytes it is about to fill in were written by
//! the same kind of page.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

/// Interned identity of a registered type.
///
/// `TypeHandle::NONE` means "no declared type": the top of the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TypeHandle(u32);

impl TypeHandle {
    /// The unset handle
    pub const NONE: TypeHandle = TypeHandle(0);

    /// Check if this handle names a registered type
    pub const fn is_some(self) -> bool {
        self.0 != 0
    }

    /// Get the raw index
    pub const fn index(self) -> u32 {
        self.0
    }

    /// Name of this type in the global registry, or `""` for `NONE`
    pub fn name(self) -> String {
        TypeRegistry::global().name(self).unwrap_or_default()
    }
}

impl fmt::Display for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match TypeRegistry::global().name(*self) {
            Some(name) => write!(f, "{}", name),
            None if !self.is_some() => write!(f, "none"),
            None => write!(f, "<unregistered {}>", self.0),
        }
    }
}

struct TypeRecord {
    name: String,
    parent: TypeHandle,
}

#[derive(Default)]
struct RegistryInner {
    /// Index 0 is a placeholder so handles line up with positions
    records: Vec<TypeRecord>,
    by_name: HashMap<String, TypeHandle>,
}

/// Registry of type names and their single declared parent
pub struct TypeRegistry {
    inner: RwLock<RegistryInner>,
}

impl TypeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        let inner = RegistryInner {
            records: vec![TypeRecord {
                name: String::new(),
                parent: TypeHandle::NONE,
            }],
            by_name: HashMap::new(),
        };
        Self {
            inner: RwLock::new(inner),
        }
    }

    /// The process-wide registry
    pub fn global() -> &'static TypeRegistry {
        static GLOBAL: OnceLock<TypeRegistry> = OnceLock::new();
        GLOBAL.get_or_init(TypeRegistry::new)
    }

    /// Register `name` with an optional parent, returning its handle.
    ///
    /// Registering a name twice returns the original handle; the parent
    /// given the first time wins.
    pub fn register_type(&self, name: &str, parent: Option<TypeHandle>) -> TypeHandle {
        if let Some(handle) = self.find_type(name) {
            return handle;
        }

        let mut inner = self.inner.write();
        // Another thread may have won the race between the two locks.
        if let Some(&handle) = inner.by_name.get(name) {
            return handle;
        }

        let handle = TypeHandle(inner.records.len() as u32);
        inner.records.push(TypeRecord {
            name: name.to_string(),
            parent: parent.unwrap_or(TypeHandle::NONE),
        });
        inner.by_name.insert(name.to_string(), handle);
        handle
    }

    /// Look up a registered name
    pub fn find_type(&self, name: &str) -> Option<TypeHandle> {
        self.inner.read().by_name.get(name).copied()
    }

    /// Name of a registered handle
    pub fn name(&self, handle: TypeHandle) -> Option<String> {
        if !handle.is_some() {
            return None;
        }
        let inner = self.inner.read();
        inner
            .records
            .get(handle.0 as usize)
            .map(|record| record.name.clone())
    }

    /// Declared parent of a handle (`NONE` at the top)
    pub fn parent_of(&self, handle: TypeHandle) -> TypeHandle {
        let inner = self.inner.read();
        inner
            .records
            .get(handle.0 as usize)
            .map(|record| record.parent)
            .unwrap_or(TypeHandle::NONE)
    }

    /// Check whether `handle` is `ancestor` or descends from it
    pub fn is_derived_from(&self, handle: TypeHandle, ancestor: TypeHandle) -> bool {
        let inner = self.inner.read();
        let mut current = handle;
        // Parents are always registered before children, so the walk ends.
        while current.is_some() {
            if current == ancestor {
                return true;
            }
            current = match inner.records.get(current.0 as usize) {
                Some(record) => record.parent,
                None => return false,
            };
        }
        !ancestor.is_some()
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.inner.read().records.len() - 1
    }

    /// Check if nothing has been registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_is_idempotent() {
        let registry = TypeRegistry::new();
        let a = registry.register_type("Geom", None);
        let b = registry.register_type("Geom", None);
        assert_eq!(a, b);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.name(a).as_deref(), Some("Geom"));
        assert_eq!(registry.find_type("Geom"), Some(a));
        assert_eq!(registry.find_type("Texture"), None);
    }

    #[test]
    fn test_hierarchy() {
        let registry = TypeRegistry::new();
        let node = registry.register_type("PandaNode", None);
        let geom_node = registry.register_type("GeomNode", Some(node));
        let texture = registry.register_type("Texture", None);

        assert_eq!(registry.parent_of(geom_node), node);
        assert_eq!(registry.parent_of(node), TypeHandle::NONE);
        assert!(registry.is_derived_from(geom_node, node));
        assert!(registry.is_derived_from(geom_node, geom_node));
        assert!(!registry.is_derived_from(node, geom_node));
        assert!(!registry.is_derived_from(texture, node));
        assert!(registry.is_derived_from(texture, TypeHandle::NONE));
    }

    #[test]
    fn test_none_handle() {
        let registry = TypeRegistry::new();
        assert!(registry.is_empty());
        assert!(!TypeHandle::NONE.is_some());
        assert_eq!(registry.name(TypeHandle::NONE), None);
        assert_eq!(TypeHandle::NONE.name(), "");
        assert_eq!(format!("{}", TypeHandle::NONE), "none");
    }
}
