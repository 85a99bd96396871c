//! Reference-counted page nodes and external read handles.

use log::trace;
use serde::Serialize;
use std::fmt;
use std::ops::Deref;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Heap cell holding one page in pipelined mode.
///
/// The `Arc` around a node counts every holder. Holders that are read
/// handles additionally bump `external`, so the two classes can be told
/// apart: structural = strong count - external.
pub(crate) struct PageNode<T> {
    page: T,
    external: AtomicUsize,
}

impl<T> PageNode<T> {
    pub(crate) fn new(page: T) -> Self {
        Self {
            page,
            external: AtomicUsize::new(0),
        }
    }

    pub(crate) fn page(&self) -> &T {
        &self.page
    }

    pub(crate) fn page_mut(&mut self) -> &mut T {
        &mut self.page
    }
}

impl<T> Drop for PageNode<T> {
    fn drop(&mut self) {
        trace!("destroying page node {:p}", self);
    }
}

/// Holders of one page, split by class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefCounts {
    /// Slots or cycler stages holding the page
    pub structural: usize,
    /// Outstanding read handles
    pub external: usize,
}

impl RefCounts {
    pub(crate) fn of<T>(node: &Arc<PageNode<T>>) -> Self {
        let external = node.external.load(Ordering::Acquire);
        let total = Arc::strong_count(node);
        Self {
            structural: total.saturating_sub(external),
            external,
        }
    }

    /// All holders
    pub fn total(&self) -> usize {
        self.structural + self.external
    }

    /// Check if any read handle is outstanding
    pub fn has_external(&self) -> bool {
        self.external > 0
    }

    /// Check if a writer could mutate the page in place
    pub fn is_exclusive(&self) -> bool {
        self.structural == 1 && self.external == 0
    }
}

/// External reference to one page snapshot.
///
/// The snapshot stays alive and unchanged for as long as the handle exists,
/// whatever writers do to the slot it came from.
pub struct PageReadHandle<T> {
    node: Arc<PageNode<T>>,
}

impl<T> PageReadHandle<T> {
    pub(crate) fn new(node: &Arc<PageNode<T>>) -> Self {
        // Take the reference before counting it as external, so a concurrent
        // `RefCounts::of` never sees more external holders than strong ones
        let node = Arc::clone(node);
        node.external.fetch_add(1, Ordering::AcqRel);
        Self { node }
    }

    /// Holders of the snapshot this handle reads
    pub fn ref_counts(&self) -> RefCounts {
        RefCounts::of(&self.node)
    }

    /// Check whether two handles read the same snapshot
    pub fn same_page(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.node, &b.node)
    }
}

impl<T> Clone for PageReadHandle<T> {
    fn clone(&self) -> Self {
        Self::new(&self.node)
    }
}

impl<T> Drop for PageReadHandle<T> {
    fn drop(&mut self) {
        self.node.external.fetch_sub(1, Ordering::AcqRel);
    }
}

impl<T> Deref for PageReadHandle<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.node.page
    }
}

impl<T: fmt::Debug> fmt::Debug for PageReadHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageReadHandle")
            .field("page", &self.node.page)
            .field("refs", &self.ref_counts())
            .finish()
    }
}
