//! Cursor over a flat list of resolved pointers.

use crate::error::{PageError, Result};
use crate::page::CycleData;
use crate::persist::{ObjectRef, ReadContext};
use log::trace;

/// Hands consecutive slices of one resolved-pointer list to several pages.
///
/// Each page reports how many entries it consumed; the cursor advances by
/// exactly that count, so the next page starts at its own first entry.
pub struct PointerCursor<'a> {
    list: &'a [Option<ObjectRef>],
    pos: usize,
}

impl<'a> PointerCursor<'a> {
    /// Start at the front of `list`
    pub fn new(list: &'a [Option<ObjectRef>]) -> Self {
        Self { list, pos: 0 }
    }

    /// Entries consumed so far
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Entries not yet consumed
    pub fn remaining(&self) -> usize {
        self.list.len() - self.pos
    }

    /// Let `page` complete its pointers from the current position.
    ///
    /// Returns the number of entries the page consumed. A page claiming
    /// more entries than remain is rejected and the cursor does not move.
    pub fn complete(
        &mut self,
        page: &mut dyn CycleData,
        reader: &mut dyn ReadContext,
    ) -> Result<usize> {
        let remaining = &self.list[self.pos..];
        let consumed = page.complete_pointers(remaining, reader)?;
        if consumed > remaining.len() {
            return Err(PageError::PointerOverrun {
                consumed,
                remaining: remaining.len(),
            });
        }

        trace!(
            "{} completed {} pointers at offset {}",
            page,
            consumed,
            self.pos
        );
        self.pos += consumed;
        Ok(consumed)
    }

    /// Check that every entry was consumed
    pub fn finish(self) -> Result<()> {
        if self.pos != self.list.len() {
            return Err(PageError::PointerCountMismatch {
                requested: self.list.len(),
                consumed: self.pos,
            });
        }
        Ok(())
    }
}
