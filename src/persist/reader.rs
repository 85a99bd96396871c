//! Read-side context.

use crate::datagram::DatagramIterator;
use crate::error::{PageError, Result};
use crate::page::CycleData;
use crate::persist::{ObjectRef, PointerCursor, ReadContext};
use crate::types::{ObjectId, TypeRegistry, FORMAT_VERSION};
use log::warn;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// Range of deferred pointers one page requested during `fillin`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PointerSpan {
    start: usize,
    len: usize,
}

impl PointerSpan {
    /// Index of the page's first request
    pub fn start(&self) -> usize {
        self.start
    }

    /// Number of requests
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the page requested no pointers
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn end(&self) -> usize {
        self.start + self.len
    }
}

/// Validates type tags and collects deferred pointers while reading.
///
/// Typical use: `read_cdata` each page, `register_object` each object the
/// framework materializes, then `complete_cdata` (one page) or
/// `resolve_all` + [`PointerCursor`] (many pages sharing one list).
pub struct PageReader {
    /// Objects materialized by the framework, by id
    objects: HashMap<ObjectId, ObjectRef>,
    /// Every pointer id read so far, in read order
    requests: Vec<ObjectId>,
    format_version: u16,
}

impl PageReader {
    /// Create a reader for the current format version
    pub fn new() -> Self {
        Self::with_format_version(FORMAT_VERSION)
    }

    /// Create a reader that reports `version` to pages
    pub fn with_format_version(version: u16) -> Self {
        Self {
            objects: HashMap::new(),
            requests: Vec::new(),
            format_version: version,
        }
    }

    /// Check the type tag, then let `page` fill itself in.
    ///
    /// On failure the page's pointer requests are discarded and the error
    /// is returned; the page's contents are unspecified and must not be
    /// used.
    pub fn read_cdata(
        &mut self,
        scan: &mut DatagramIterator<'_>,
        page: &mut dyn CycleData,
    ) -> Result<PointerSpan> {
        self.check_type_tag(scan, page)?;
        let start = self.requests.len();
        if let Err(e) = page.fillin(scan, self) {
            self.requests.truncate(start);
            return Err(e);
        }
        Ok(PointerSpan {
            start,
            len: self.requests.len() - start,
        })
    }

    /// Like [`read_cdata`](Self::read_cdata), passing `extra` to the page
    pub fn read_cdata_with(
        &mut self,
        scan: &mut DatagramIterator<'_>,
        page: &mut dyn CycleData,
        extra: &mut dyn Any,
    ) -> Result<PointerSpan> {
        self.check_type_tag(scan, page)?;
        let start = self.requests.len();
        if let Err(e) = page.fillin_with(scan, self, extra) {
            self.requests.truncate(start);
            return Err(e);
        }
        Ok(PointerSpan {
            start,
            len: self.requests.len() - start,
        })
    }

    fn check_type_tag(&self, scan: &mut DatagramIterator<'_>, page: &dyn CycleData) -> Result<()> {
        let found = scan.get_string()?;
        let expected = page.parent_type();

        if found.is_empty() {
            if expected.is_some() {
                return Err(PageError::type_mismatch(expected.name(), found));
            }
            return Ok(());
        }

        let handle = TypeRegistry::global()
            .find_type(&found)
            .ok_or_else(|| PageError::UnknownType(found.clone()))?;
        if handle != expected {
            return Err(PageError::type_mismatch(expected.name(), found));
        }
        Ok(())
    }

    /// Make `object` the target of pointers written with `id`
    pub fn register_object(&mut self, id: ObjectId, object: ObjectRef) {
        if id.is_null() {
            warn!("ignoring object registered under the null id");
            return;
        }
        self.objects.insert(id, object);
    }

    /// Look up a registered object
    pub fn object(&self, id: ObjectId) -> Option<&ObjectRef> {
        self.objects.get(&id)
    }

    /// Total pointer requests recorded
    pub fn request_count(&self) -> usize {
        self.requests.len()
    }

    /// Resolved targets for one page's requests
    pub fn resolve(&self, span: PointerSpan) -> Result<Vec<Option<ObjectRef>>> {
        let ids = self.requests.get(span.start..span.end()).ok_or_else(|| {
            PageError::invalid_operation(format!(
                "pointer span {}..{} outside {} requests",
                span.start,
                span.end(),
                self.requests.len()
            ))
        })?;
        ids.iter().map(|&id| self.lookup(id)).collect()
    }

    /// Resolved targets for every request, in read order
    pub fn resolve_all(&self) -> Result<Vec<Option<ObjectRef>>> {
        self.requests.iter().map(|&id| self.lookup(id)).collect()
    }

    fn lookup(&self, id: ObjectId) -> Result<Option<ObjectRef>> {
        if id.is_null() {
            return Ok(None);
        }
        self.objects
            .get(&id)
            .map(|object| Some(Arc::clone(object)))
            .ok_or(PageError::DanglingPointer(id))
    }

    /// Resolve one page's span and hand it to `complete_pointers`.
    ///
    /// The page must consume exactly the pointers it requested.
    pub fn complete_cdata(&mut self, page: &mut dyn CycleData, span: PointerSpan) -> Result<usize> {
        let list = self.resolve(span)?;
        let mut cursor = PointerCursor::new(&list);
        let consumed = cursor.complete(page, self)?;
        if let Err(e) = cursor.finish() {
            warn!("{} left pointers unconsumed: {}", page, e);
            return Err(e);
        }
        Ok(consumed)
    }
}

impl Default for PageReader {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadContext for PageReader {
    fn read_pointer(&mut self, scan: &mut DatagramIterator<'_>) -> Result<bool> {
        let id = ObjectId::new(scan.get_varint()?);
        self.requests.push(id);
        Ok(!id.is_null())
    }

    fn format_version(&self) -> u16 {
        self.format_version
    }
}
