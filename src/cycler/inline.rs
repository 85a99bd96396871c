//! Non-pipelined slot: the page embedded by value.

use crate::cycler::PageStorage;
use crate::error::Result;
use crate::page::CycleData;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Slot owning its single page directly.
///
/// No allocation beyond the owner, no reference counting, no copies. The
/// page is dropped together with the slot.
pub struct InlineSlot<T: CycleData> {
    page: RwLock<T>,
}

impl<T: CycleData> InlineSlot<T> {
    /// Create a slot holding `page`
    pub fn new(page: T) -> Self {
        Self {
            page: RwLock::new(page),
        }
    }

    /// Shared access to the page
    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.page.read()
    }

    /// Exclusive access to the page
    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.page.write()
    }

    /// Direct access when the slot itself is borrowed mutably
    pub fn get_mut(&mut self) -> &mut T {
        self.page.get_mut()
    }

    /// Give the page back
    pub fn into_inner(self) -> T {
        self.page.into_inner()
    }
}

impl<T: CycleData + Default> Default for InlineSlot<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: CycleData> PageStorage<T> for InlineSlot<T> {
    type Read<'a> = RwLockReadGuard<'a, T>;
    type Write<'a> = RwLockWriteGuard<'a, T>;

    const PIPELINED: bool = false;

    fn new(page: T) -> Self {
        InlineSlot::new(page)
    }

    fn read(&self) -> Self::Read<'_> {
        InlineSlot::read(self)
    }

    fn write(&self) -> Result<Self::Write<'_>> {
        Ok(InlineSlot::write(self))
    }
}
