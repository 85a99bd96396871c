//! Reader/writer context traits and persisted object references.

use crate::datagram::{Datagram, DatagramIterator};
use crate::error::Result;
use crate::types::{AsAny, TypeHandle};
use std::fmt;
use std::sync::Arc;

/// An object that pages may point at across a persistence boundary
pub trait TypedObject: AsAny + Send + Sync + fmt::Debug {
    /// Registered type of this object
    fn type_handle(&self) -> TypeHandle;
}

/// Shared handle to a persisted object
pub type ObjectRef = Arc<dyn TypedObject>;

impl dyn TypedObject {
    /// Borrow the concrete object, if it is a `T`
    pub fn downcast_ref<T: TypedObject>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// Identity comparison of two object handles
pub fn same_object(a: &ObjectRef, b: &ObjectRef) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

/// Write-side services offered to a page
pub trait WriteContext {
    /// Write a reference to `object` (or null) into `dg`.
    ///
    /// Objects not seen before are queued so the framework writes them too.
    fn write_pointer(&mut self, dg: &mut Datagram, object: Option<&ObjectRef>);

    /// Format version being written
    fn format_version(&self) -> u16;
}

/// Read-side services offered to a page
pub trait ReadContext {
    /// Read a reference written by [`WriteContext::write_pointer`].
    ///
    /// The target is delivered later, in order, through
    /// `complete_pointers`. Returns `false` for a null reference, which
    /// still occupies one entry in the resolved list.
    fn read_pointer(&mut self, scan: &mut DatagramIterator<'_>) -> Result<bool>;

    /// Format version of the stream being read
    fn format_version(&self) -> u16;
}
