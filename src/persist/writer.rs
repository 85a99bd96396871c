//! Write-side context.

use crate::datagram::Datagram;
use crate::page::CycleData;
use crate::persist::{ObjectRef, WriteContext};
use crate::types::{ObjectId, FORMAT_VERSION};
use log::trace;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// Assigns object ids and tags page payloads while writing.
///
/// Objects are identified by address. The writer keeps every object it has
/// seen alive until it is dropped, so an address is never reused for a
/// different object mid-write.
pub struct PageWriter {
    /// Object address -> assigned id
    ids: HashMap<usize, ObjectId>,
    /// Every object seen, in id order
    objects: Vec<(ObjectId, ObjectRef)>,
    /// Index into `objects` of the first object not yet handed out
    pending_from: usize,
    /// Last id assigned
    last_id: ObjectId,
    format_version: u16,
}

impl PageWriter {
    /// Create a writer for the current format version
    pub fn new() -> Self {
        Self::with_format_version(FORMAT_VERSION)
    }

    /// Create a writer that reports `version` to pages
    pub fn with_format_version(version: u16) -> Self {
        Self {
            ids: HashMap::new(),
            objects: Vec::new(),
            pending_from: 0,
            last_id: ObjectId::NULL,
            format_version: version,
        }
    }

    /// Write a page's type tag followed by its payload
    pub fn write_cdata(&mut self, dg: &mut Datagram, page: &dyn CycleData) {
        let start = dg.len();
        dg.add_string(&page.parent_type().name());
        page.write_datagram(self, dg);
        trace!("wrote {} in {} bytes", page, dg.len() - start);
    }

    /// Like [`write_cdata`](Self::write_cdata), passing `extra` to the page
    pub fn write_cdata_with(&mut self, dg: &mut Datagram, page: &dyn CycleData, extra: &dyn Any) {
        dg.add_string(&page.parent_type().name());
        page.write_datagram_with(self, dg, extra);
    }

    /// Id assigned to `object`, if it has been written
    pub fn object_id(&self, object: &ObjectRef) -> Option<ObjectId> {
        self.ids.get(&address_of(object)).copied()
    }

    /// Objects first referenced since the previous call.
    ///
    /// The framework persists these alongside the pages that point at them.
    pub fn take_pending(&mut self) -> Vec<(ObjectId, ObjectRef)> {
        let pending = self.objects[self.pending_from..].to_vec();
        self.pending_from = self.objects.len();
        pending
    }

    /// Number of distinct objects referenced
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }
}

impl Default for PageWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl WriteContext for PageWriter {
    fn write_pointer(&mut self, dg: &mut Datagram, object: Option<&ObjectRef>) {
        let id = match object {
            None => ObjectId::NULL,
            Some(object) => {
                let address = address_of(object);
                match self.ids.get(&address) {
                    Some(&id) => id,
                    None => {
                        self.last_id = self.last_id.next();
                        let id = self.last_id;
                        self.ids.insert(address, id);
                        self.objects.push((id, Arc::clone(object)));
                        id
                    }
                }
            }
        };
        dg.add_varint(id.value());
    }

    fn format_version(&self) -> u16 {
        self.format_version
    }
}

fn address_of(object: &ObjectRef) -> usize {
    Arc::as_ptr(object) as *const () as usize
}
