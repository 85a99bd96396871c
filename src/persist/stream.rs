//! Framed, checksummed datagram streams held in memory.
//!
//! Layout:
//! ```text
//! Offset  Size  Description
//! 0       4     Magic "PGDG"
//! 4       2     Format version (little-endian)
//! then, per datagram:
//! 0       4     Payload length N (little-endian)
//! 4       N     Payload
//! 4+N     4     CRC32 of the payload
//! ```

use crate::datagram::Datagram;
use crate::error::{PageError, Result};
use crate::types::FORMAT_VERSION;

/// Magic bytes opening every stream
pub const STREAM_MAGIC: &[u8; 4] = b"PGDG";

const HEADER_SIZE: usize = 6;

/// Appends datagrams to an in-memory stream
pub struct DatagramSink {
    buf: Vec<u8>,
    count: usize,
}

impl DatagramSink {
    /// Start a stream for the current format version
    pub fn new() -> Self {
        Self::with_format_version(FORMAT_VERSION)
    }

    /// Start a stream tagged with `version`
    pub fn with_format_version(version: u16) -> Self {
        let mut buf = Vec::with_capacity(64);
        buf.extend_from_slice(STREAM_MAGIC);
        buf.extend_from_slice(&version.to_le_bytes());
        Self { buf, count: 0 }
    }

    /// Append one datagram as a frame
    pub fn push(&mut self, dg: &Datagram) -> Result<()> {
        let len = u32::try_from(dg.len()).map_err(|_| {
            PageError::invalid_operation(format!("datagram of {} bytes is too large to frame", dg.len()))
        })?;
        self.buf.extend_from_slice(&len.to_le_bytes());
        self.buf.extend_from_slice(dg.as_bytes());
        self.buf.extend_from_slice(&crc32fast::hash(dg.as_bytes()).to_le_bytes());
        self.count += 1;
        Ok(())
    }

    /// Number of frames written
    pub fn len(&self) -> usize {
        self.count
    }

    /// Check if no frames were written
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Finish the stream, returning its bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

impl Default for DatagramSink {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads frames back out of a stream
pub struct DatagramSource<'a> {
    bytes: &'a [u8],
    pos: usize,
    format_version: u16,
}

impl<'a> DatagramSource<'a> {
    /// Open a stream, checking its header
    pub fn new(bytes: &'a [u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(PageError::corruption("stream header too short"));
        }
        if &bytes[0..4] != STREAM_MAGIC {
            return Err(PageError::corruption("invalid stream magic"));
        }
        let format_version = u16::from_le_bytes([bytes[4], bytes[5]]);

        Ok(Self {
            bytes,
            pos: HEADER_SIZE,
            format_version,
        })
    }

    /// Format version recorded in the header
    pub fn format_version(&self) -> u16 {
        self.format_version
    }

    /// Read the next frame, or `None` at a clean end of stream
    pub fn next_datagram(&mut self) -> Result<Option<Datagram>> {
        let rest = &self.bytes[self.pos..];
        if rest.is_empty() {
            return Ok(None);
        }
        if rest.len() < 4 {
            return Err(PageError::UnexpectedEof {
                needed: 4,
                remaining: rest.len(),
            });
        }

        let len = u32::from_le_bytes([rest[0], rest[1], rest[2], rest[3]]) as usize;
        let needed = 4 + len + 4;
        if rest.len() < needed {
            return Err(PageError::UnexpectedEof {
                needed,
                remaining: rest.len(),
            });
        }

        let payload = &rest[4..4 + len];
        let trailer = &rest[4 + len..needed];
        let stored = u32::from_le_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]);
        let computed = crc32fast::hash(payload);
        if stored != computed {
            return Err(PageError::ChecksumMismatch { stored, computed });
        }

        self.pos += needed;
        Ok(Some(Datagram::from_bytes(payload)))
    }
}
