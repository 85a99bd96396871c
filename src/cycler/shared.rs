//! Pipelined slot: reference-counted pages with copy-on-write.

use crate::cycler::node::{PageNode, PageReadHandle, RefCounts};
use crate::cycler::PageStorage;
use crate::error::{PageError, Result};
use crate::page::{copy_page, CycleData, Output};
use log::debug;
use parking_lot::{MappedRwLockWriteGuard, RwLock, RwLockWriteGuard};
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

/// Slot holding a structural reference to a heap-allocated page
pub struct SharedSlot<T: CycleData> {
    current: RwLock<Arc<PageNode<T>>>,
}

impl<T: CycleData> SharedSlot<T> {
    /// Create a slot holding `page`
    pub fn new(page: T) -> Self {
        Self {
            current: RwLock::new(Arc::new(PageNode::new(page))),
        }
    }

    /// Take an external reference to the current page.
    ///
    /// Blocks while a write handle on this slot is outstanding.
    pub fn read(&self) -> PageReadHandle<T> {
        PageReadHandle::new(&self.current.read())
    }

    /// Get exclusive write access to this slot's page.
    ///
    /// If any other holder can see the current page, it is copied first and
    /// the copy replaces it in the slot; existing readers keep the old one.
    pub fn write(&self) -> Result<PageWriteHandle<'_, T>> {
        let mut guard = self.current.write();
        make_exclusive(&mut guard)?;
        PageWriteHandle::map(guard)
    }

    /// Replace the current page
    pub fn replace(&self, page: T) {
        *self.current.write() = Arc::new(PageNode::new(page));
    }

    /// Holders of the current page, seen from the slot
    pub fn ref_counts(&self) -> RefCounts {
        RefCounts::of(&self.current.read())
    }

    /// Check if readers still hold the current page
    pub fn has_external_refs(&self) -> bool {
        self.ref_counts().has_external()
    }
}

impl<T: CycleData + Default> Default for SharedSlot<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: CycleData> PageStorage<T> for SharedSlot<T> {
    type Read<'a> = PageReadHandle<T>;
    type Write<'a> = PageWriteHandle<'a, T>;

    const PIPELINED: bool = true;

    fn new(page: T) -> Self {
        SharedSlot::new(page)
    }

    fn read(&self) -> Self::Read<'_> {
        SharedSlot::read(self)
    }

    fn write(&self) -> Result<Self::Write<'_>> {
        SharedSlot::write(self)
    }
}

/// Copy the page behind `node` unless this reference is its only holder
pub(crate) fn make_exclusive<T: CycleData>(node: &mut Arc<PageNode<T>>) -> Result<()> {
    if Arc::get_mut(node).is_some() {
        return Ok(());
    }

    let counts = RefCounts::of(node);
    let copy = copy_page(node.page())?;
    debug!(
        "copy-on-write of {} ({} structural, {} external refs)",
        Output(node.page()),
        counts.structural,
        counts.external
    );
    *node = Arc::new(PageNode::new(copy));
    Ok(())
}

/// Exclusive access to a slot's page.
///
/// Holds the slot's lock: other readers and writers of the same slot wait
/// until it is dropped.
pub struct PageWriteHandle<'a, T> {
    page: MappedRwLockWriteGuard<'a, T>,
}

impl<'a, T> PageWriteHandle<'a, T> {
    pub(crate) fn map(guard: RwLockWriteGuard<'a, Arc<PageNode<T>>>) -> Result<Self> {
        RwLockWriteGuard::try_map(guard, |node| Arc::get_mut(node).map(PageNode::page_mut))
            .map(|page| Self { page })
            .map_err(|_| PageError::invalid_operation("page still shared after copy-on-write"))
    }
}

impl<T> Deref for PageWriteHandle<'_, T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.page
    }
}

impl<T> DerefMut for PageWriteHandle<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.page
    }
}
