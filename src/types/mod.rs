//! Common types used throughout the crate.

mod as_any;
mod object_id;
mod type_handle;
mod varint;

pub use as_any::AsAny;
pub use object_id::ObjectId;
pub use type_handle::{TypeHandle, TypeRegistry};
pub use varint::{decode_varint, encode_varint, varint_size};

/// Persistence format version written by default.
///
/// Concrete pages may branch on the version reported by their read or
/// write context to keep older streams readable.
pub const FORMAT_VERSION: u16 = 1;

/// Number of pipeline stages used when none is configured
pub const DEFAULT_NUM_STAGES: usize = 1;

/// Upper bound on pipeline stages a cycler accepts
pub const MAX_STAGES: usize = 16;
