//! Error types for page persistence and cycling.

use thiserror::Error;
use crate::types::ObjectId;

/// Result type alias for page operations
pub type Result<T> = std::result::Result<T, PageError>;

/// Errors that can occur while copying, cycling or persisting pages
#[derive(Error, Debug)]
pub enum PageError {
    /// A read ran past the end of the datagram
    #[error("Unexpected end of datagram: need {needed} bytes but only {remaining} remain")]
    UnexpectedEof { needed: usize, remaining: usize },

    /// Bytes were present but could not be decoded
    #[error("Corruption detected: {0}")]
    Corruption(String),

    /// Frame checksum did not match its contents
    #[error("Checksum mismatch: stored {stored:#010x}, computed {computed:#010x}")]
    ChecksumMismatch { stored: u32, computed: u32 },

    /// Persisted type tag does not match the page being filled in
    #[error("Type mismatch: expected {expected:?}, found {found:?}")]
    TypeMismatch { expected: String, found: String },

    /// Persisted type tag names a type nobody registered
    #[error("Unknown type: {0:?}")]
    UnknownType(String),

    /// A deferred pointer names an object that was never registered
    #[error("Dangling pointer to object {0}")]
    DanglingPointer(ObjectId),

    /// `complete_pointers` claimed more entries than were supplied
    #[error("Pointer overrun: page consumed {consumed} entries but only {remaining} remain")]
    PointerOverrun { consumed: usize, remaining: usize },

    /// `complete_pointers` consumed a different number of entries than were read
    #[error("Pointer count mismatch: {requested} pointers requested, {consumed} consumed")]
    PointerCountMismatch { requested: usize, consumed: usize },

    /// `make_copy` returned a page of a different concrete type
    #[error("make_copy returned a page that is not a {expected}")]
    CopyTypeMismatch { expected: &'static str },

    /// Stage index outside the cycler
    #[error("Stage {stage} out of range (cycler has {num_stages} stages)")]
    InvalidStage { stage: usize, num_stages: usize },

    /// Invalid operation for the current state
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Configuration JSON could not be parsed
    #[error("Configuration parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PageError {
    /// Create a corruption error with a message
    pub fn corruption(msg: impl Into<String>) -> Self {
        Self::Corruption(msg.into())
    }

    /// Create an invalid operation error
    pub fn invalid_operation(msg: impl Into<String>) -> Self {
        Self::InvalidOperation(msg.into())
    }

    /// Create an invalid configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a type mismatch error
    pub fn type_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }
}
