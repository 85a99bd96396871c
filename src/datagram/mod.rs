//! Datagram codec: the byte buffers pages serialize into.
//!
//! A [`Datagram`] is an append-only little-endian buffer. A
//! [`DatagramIterator`] walks one from the front; every read is bounds
//! checked and reports truncation as an error instead of yielding zeros.
//!
//! Strings and blobs carry a varint length prefix.

mod buffer;
mod iterator;

pub use buffer::Datagram;
pub use iterator::DatagramIterator;
