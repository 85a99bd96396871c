//! Persisted object identifier.

use std::fmt;

/// Identifier assigned by a writer to each object a page points at.
///
/// Id 0 is reserved for the null pointer; real objects start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ObjectId(pub u64);

impl ObjectId {
    /// The null pointer
    pub const NULL: ObjectId = ObjectId(0);

    /// Create a new object id
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw id value
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Check if this id names the null pointer
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// The id following this one
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "NULL")
        } else {
            write!(f, "#{}", self.0)
        }
    }
}

impl From<u64> for ObjectId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ObjectId> for u64 {
    fn from(id: ObjectId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_id_basics() {
        let id = ObjectId::new(42);
        assert_eq!(id.value(), 42);
        assert!(!id.is_null());
        assert!(ObjectId::NULL.is_null());
        assert_eq!(ObjectId::NULL.next(), ObjectId::new(1));
    }

    #[test]
    fn test_object_id_display() {
        assert_eq!(format!("{}", ObjectId::new(42)), "#42");
        assert_eq!(format!("{}", ObjectId::NULL), "NULL");
    }
}
