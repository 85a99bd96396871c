//! Storage policy trait shared by both slot backends.

use crate::error::Result;
use crate::page::CycleData;
use std::ops::{Deref, DerefMut};

/// How an owner stores its page
pub trait PageStorage<T: CycleData> {
    /// Read access; keeps the observed snapshot stable while alive
    type Read<'a>: Deref<Target = T>
    where
        Self: 'a;

    /// Exclusive write access
    type Write<'a>: DerefMut<Target = T>
    where
        Self: 'a;

    /// Whether pages are reference counted and may be copied on write
    const PIPELINED: bool;

    /// Store `page` as the initial state
    fn new(page: T) -> Self
    where
        Self: Sized;

    /// Read the current page
    fn read(&self) -> Self::Read<'_>;

    /// Get write access to the current page
    fn write(&self) -> Result<Self::Write<'_>>;
}
