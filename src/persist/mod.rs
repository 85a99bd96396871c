//! Persistence seams for pages.
//!
//! The object-graph framework that decides which objects get written, and
//! in what container, lives outside this crate. What pages need from it is
//! captured by two traits:
//!
//! - [`WriteContext`]: records a reference to another object while a page
//!   writes its payload;
//! - [`ReadContext`]: records a deferred pointer while a page fills itself
//!   in, to be resolved by `complete_pointers` once every object exists.
//!
//! [`PageWriter`] and [`PageReader`] implement those traits with the
//! bookkeeping a framework needs around a page: type tags, object ids,
//! pointer spans. [`PointerCursor`] walks a flat resolved-pointer list
//! shared by several pages. [`DatagramSink`] and [`DatagramSource`] frame
//! datagrams into a checksummed byte stream.

mod context;
mod cursor;
mod reader;
mod stream;
mod writer;

pub use context::{same_object, ObjectRef, ReadContext, TypedObject, WriteContext};
pub use cursor::PointerCursor;
pub use reader::{PageReader, PointerSpan};
pub use stream::{DatagramSink, DatagramSource, STREAM_MAGIC};
pub use writer::PageWriter;
