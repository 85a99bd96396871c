//! # Pipeline Page
//!
//! Versioned page snapshots for objects whose state is read and written by
//! different stages of a pipeline (for example an application stage and a
//! render stage) without either stage ever seeing a half-updated value.
//!
//! ## Architecture
//!
//! - **Page Layer** (`page`): the [`CycleData`] contract every page type
//!   implements: polymorphic copy, persistence hooks, diagnostics
//! - **Cycler Layer** (`cycler`): where owners keep pages. A reference
//!   counted, copy-on-write slot when pipelining, a by-value slot when not,
//!   and a multi-stage [`PipelineCycler`]
//! - **Persistence** (`persist`): reader/writer contexts, deferred pointer
//!   completion and framed datagram streams
//! - **Datagram** (`datagram`): the byte codec pages serialize into
//!
//! The `pipelining` cargo feature (on by default) selects which slot
//! [`CyclerSlot`] names. Both slots are always compiled.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pipeline_page::{CycleData, CyclerSlot, PageStorage};
//!
//! #[derive(Clone, Default)]
//! struct Transform { pos: [f32; 3] }
//!
//! impl CycleData for Transform {
//!     fn make_copy(&self) -> Box<dyn CycleData> {
//!         Box::new(self.clone())
//!     }
//! }
//!
//! let slot = CyclerSlot::new(Transform::default());
//! PageStorage::write(&slot)?.pos = [1.0, 2.0, 3.0];
//! assert_eq!(PageStorage::read(&slot).pos[0], 1.0);
//! ```

pub mod cycler;
pub mod datagram;
pub mod error;
pub mod page;
pub mod persist;
pub mod types;

pub use error::{PageError, Result};
pub use types::{ObjectId, TypeHandle, TypeRegistry, FORMAT_VERSION};

// Re-export main public API
pub use cycler::{
    CyclerStats, InlineSlot, PageReadHandle, PageStorage, PageWriteHandle, PipelineCycler,
    RefCounts, SharedSlot,
};
pub use datagram::{Datagram, DatagramIterator};
pub use page::{copy_page, CycleData};
pub use persist::{
    DatagramSink, DatagramSource, ObjectRef, PageReader, PageWriter, PointerCursor, PointerSpan,
    ReadContext, TypedObject, WriteContext,
};

use serde::{Deserialize, Serialize};
use types::{DEFAULT_NUM_STAGES, MAX_STAGES};

/// Whether this build keeps reference-counted page snapshots
pub const PIPELINING: bool = cfg!(feature = "pipelining");

/// Slot an owner embeds to hold its page
#[cfg(feature = "pipelining")]
pub type CyclerSlot<T> = SharedSlot<T>;

/// Slot an owner embeds to hold its page
#[cfg(not(feature = "pipelining"))]
pub type CyclerSlot<T> = InlineSlot<T>;

/// Cycler configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CyclerConfig {
    /// Label used in log lines and stats
    pub name: String,
    /// Number of pipeline stages (default: 1)
    pub num_stages: usize,
    /// Persistence format version reported to pages
    pub format_version: u16,
}

impl CyclerConfig {
    /// Create a configuration with default settings
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Parse a JSON configuration and validate it
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the number of stages
    pub fn num_stages(mut self, num_stages: usize) -> Self {
        self.num_stages = num_stages;
        self
    }

    /// Set the persistence format version
    pub fn format_version(mut self, version: u16) -> Self {
        self.format_version = version;
        self
    }

    /// Check the settings are usable
    pub fn validate(&self) -> Result<()> {
        if self.num_stages == 0 || self.num_stages > MAX_STAGES {
            return Err(PageError::config(format!(
                "num_stages must be between 1 and {}, got {}",
                MAX_STAGES, self.num_stages
            )));
        }
        if self.format_version == 0 || self.format_version > FORMAT_VERSION {
            return Err(PageError::config(format!(
                "unsupported format version {} (newest is {})",
                self.format_version, FORMAT_VERSION
            )));
        }
        Ok(())
    }

    /// A writer for this configuration's format version
    pub fn page_writer(&self) -> PageWriter {
        PageWriter::with_format_version(self.format_version)
    }

    /// A reader for this configuration's format version
    pub fn page_reader(&self) -> PageReader {
        PageReader::with_format_version(self.format_version)
    }
}

impl Default for CyclerConfig {
    fn default() -> Self {
        Self {
            name: "cycler".to_string(),
            num_stages: DEFAULT_NUM_STAGES,
            format_version: FORMAT_VERSION,
        }
    }
}
