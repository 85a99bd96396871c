//! Cycler layer: where an owner keeps its pages.
//!
//! An owner never holds a page directly; it holds a storage slot chosen at
//! build time:
//!
//! - [`SharedSlot`] (pipelined): the page lives in a reference-counted node.
//!   Readers take [`PageReadHandle`]s, which keep the node they saw alive.
//!   A writer mutates in place only when nobody else holds the node and
//!   otherwise installs a `make_copy()` of it first (copy-on-write).
//! - [`InlineSlot`] (non-pipelined): the page is embedded by value behind a
//!   lock. One page for the owner's whole life; nothing is ever copied.
//!
//! Both implement [`PageStorage`], so owners can be written once against
//! the trait or against the [`CyclerSlot`](crate::CyclerSlot) alias.
//!
//! [`PipelineCycler`] keeps one slot per pipeline stage and shifts pages
//! downstream on [`cycle`](PipelineCycler::cycle).

mod inline;
mod node;
mod pipeline;
mod shared;
mod storage;

pub use inline::InlineSlot;
pub use node::{PageReadHandle, RefCounts};
pub use pipeline::{CyclerStats, PipelineCycler};
pub use shared::{PageWriteHandle, SharedSlot};
pub use storage::PageStorage;
