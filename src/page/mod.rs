//! Page layer: the `CycleData` contract.
//!
//! A page holds one snapshot of the mutable state an object protects
//! between pipeline stages. Concrete page types own their payload and
//! implement [`CycleData`] so that generic machinery can work on them
//! without knowing the concrete type:
//!
//! - the cycling layer duplicates pages through [`CycleData::make_copy`]
//!   when a writer must not disturb readers of the current snapshot;
//! - the persistence layer writes the payload with `write_datagram`, reads
//!   it back with `fillin`, and patches deferred pointers afterwards with
//!   `complete_pointers`.
//!
//! Every method except `make_copy` has a no-op default, so a page with
//! nothing to persist only has to say how to copy itself.

#[cfg(test)]
pub(crate) mod fixtures;

use crate::datagram::{Datagram, DatagramIterator};
use crate::error::{PageError, Result};
use crate::persist::{ObjectRef, ReadContext, WriteContext};
use crate::types::{AsAny, TypeHandle};
use std::any::Any;
use std::fmt;

/// One versioned snapshot of an object's protected state.
pub trait CycleData: AsAny + Send + Sync {
    /// Return an independent copy of this page.
    ///
    /// The copy must equal `self` at the instant of the call, and mutating
    /// either page afterwards must never be visible through the other.
    /// Sub-state may only be shared if it is immutable.
    fn make_copy(&self) -> Box<dyn CycleData>;

    /// Serialize the persistent payload.
    ///
    /// References to other persisted objects go through
    /// [`WriteContext::write_pointer`].
    fn write_datagram(&self, _writer: &mut dyn WriteContext, _dg: &mut Datagram) {}

    /// Serialize with caller-supplied context.
    fn write_datagram_with(
        &self,
        writer: &mut dyn WriteContext,
        dg: &mut Datagram,
        _extra: &dyn Any,
    ) {
        self.write_datagram(writer, dg)
    }

    /// Resolve deferred pointers once the whole object graph is loaded.
    ///
    /// `p_list` starts at this page's first entry and may continue into
    /// entries belonging to later pages. Implementations consume a prefix,
    /// in the order their `fillin` read the pointers, and return its length.
    fn complete_pointers(
        &mut self,
        _p_list: &[Option<ObjectRef>],
        _reader: &mut dyn ReadContext,
    ) -> Result<usize> {
        Ok(0)
    }

    /// Rebuild the payload from a datagram written by `write_datagram`.
    ///
    /// Pointers are read with [`ReadContext::read_pointer`] and only become
    /// available in `complete_pointers`.
    fn fillin(
        &mut self,
        _scan: &mut DatagramIterator<'_>,
        _reader: &mut dyn ReadContext,
    ) -> Result<()> {
        Ok(())
    }

    /// Rebuild the payload with caller-supplied context.
    fn fillin_with(
        &mut self,
        scan: &mut DatagramIterator<'_>,
        reader: &mut dyn ReadContext,
        _extra: &mut dyn Any,
    ) -> Result<()> {
        self.fillin(scan, reader)
    }

    /// Logical type the persistence layer checks before filling in.
    fn parent_type(&self) -> TypeHandle {
        TypeHandle::NONE
    }

    /// Write a short human-readable description.
    fn output(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let full = std::any::type_name::<Self>();
        let short = full.rsplit("::").next().unwrap_or(full);
        write!(f, "{}", short)
    }
}

impl dyn CycleData {
    /// Borrow the concrete page, if it is a `T`
    pub fn downcast_ref<T: CycleData>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Mutably borrow the concrete page, if it is a `T`
    pub fn downcast_mut<T: CycleData>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    /// Check the concrete type
    pub fn is<T: CycleData>(&self) -> bool {
        self.as_any().is::<T>()
    }
}

impl fmt::Display for dyn CycleData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.output(f)
    }
}

impl fmt::Debug for dyn CycleData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.output(f)
    }
}

impl Clone for Box<dyn CycleData> {
    fn clone(&self) -> Self {
        (**self).make_copy()
    }
}

/// Copy a page through `make_copy` and recover its concrete type.
///
/// Fails with [`PageError::CopyTypeMismatch`] if the implementation
/// returned a page of some other type.
pub fn copy_page<T: CycleData>(page: &T) -> Result<T> {
    page.make_copy()
        .into_any()
        .downcast::<T>()
        .map(|copy| *copy)
        .map_err(|_| PageError::CopyTypeMismatch {
            expected: std::any::type_name::<T>(),
        })
}

/// Display adapter for a concrete page
pub struct Output<'a, T: CycleData + ?Sized>(pub &'a T);

impl<T: CycleData + ?Sized> fmt::Display for Output<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.output(f)
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::{EmptyPage, TransformPage, WrongCopyPage};
    use super::*;

    #[test]
    fn test_make_copy_is_independent() -> Result<()> {
        let mut original = TransformPage::new("root", [1.0, 2.0, 3.0]);
        original.tags.push(7);

        let mut copy = copy_page(&original)?;
        assert_eq!(copy, original);

        original.pos[0] = 10.0;
        original.tags.push(8);
        original.name.push_str("-moved");
        assert_eq!(copy.pos, [1.0, 2.0, 3.0]);
        assert_eq!(copy.tags, vec![7]);
        assert_eq!(copy.name, "root");

        copy.pos[2] = -1.0;
        copy.tags.clear();
        assert_eq!(original.pos, [10.0, 2.0, 3.0]);
        assert_eq!(original.tags, vec![7, 8]);
        Ok(())
    }

    #[test]
    fn test_boxed_clone_keeps_dynamic_type() {
        let boxed: Box<dyn CycleData> = Box::new(TransformPage::new("a", [0.0; 3]));
        let cloned = boxed.clone();
        assert!(cloned.is::<TransformPage>());
        assert_eq!(
            cloned.downcast_ref::<TransformPage>(),
            boxed.downcast_ref::<TransformPage>()
        );
        assert!(cloned.downcast_ref::<EmptyPage>().is_none());
    }

    #[test]
    fn test_downcast_mut() {
        let mut boxed: Box<dyn CycleData> = Box::new(TransformPage::default());
        if let Some(page) = boxed.downcast_mut::<TransformPage>() {
            page.name = "renamed".to_string();
        }
        assert_eq!(boxed.downcast_ref::<TransformPage>().unwrap().name, "renamed");
    }

    #[test]
    fn test_copy_type_mismatch() {
        let page = WrongCopyPage;
        assert!(matches!(
            copy_page(&page),
            Err(PageError::CopyTypeMismatch { .. })
        ));
    }

    #[test]
    fn test_default_output() {
        let boxed: Box<dyn CycleData> = Box::new(EmptyPage);
        assert_eq!(format!("{}", boxed), "EmptyPage");
        assert_eq!(format!("{:?}", boxed), "EmptyPage");
        assert_eq!(format!("{}", Output(&EmptyPage)), "EmptyPage");
    }

    #[test]
    fn test_custom_output() {
        let page = TransformPage::new("arm", [1.0, 0.0, 0.5]);
        assert_eq!(format!("{}", Output(&page)), "TransformPage(arm @ 1 0 0.5)");
    }

    #[test]
    fn test_default_parent_type() {
        assert_eq!(EmptyPage.parent_type(), TypeHandle::NONE);
        assert!(TransformPage::default().parent_type().is_some());
    }
}
