//! Output datagram buffer.

use crate::types::encode_varint;
use std::fmt;

/// An append-only byte buffer in little-endian order
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Datagram {
    data: Vec<u8>,
}

impl Datagram {
    /// Create an empty datagram
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Create a datagram holding a copy of `bytes`
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            data: bytes.to_vec(),
        }
    }

    /// Get a reference to the raw bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consume the datagram, returning its bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Number of bytes written so far
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if nothing has been written
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Discard the contents
    pub fn clear(&mut self) {
        self.data.clear();
    }

    pub fn add_bool(&mut self, value: bool) {
        self.data.push(value as u8);
    }

    pub fn add_u8(&mut self, value: u8) {
        self.data.push(value);
    }

    pub fn add_i8(&mut self, value: i8) {
        self.data.push(value as u8);
    }

    pub fn add_u16(&mut self, value: u16) {
        self.data.extend_from_slice(&value.to_le_bytes());
    }

    pub fn add_i16(&mut self, value: i16) {
        self.data.extend_from_slice(&value.to_le_bytes());
    }

    pub fn add_u32(&mut self, value: u32) {
        self.data.extend_from_slice(&value.to_le_bytes());
    }

    pub fn add_i32(&mut self, value: i32) {
        self.data.extend_from_slice(&value.to_le_bytes());
    }

    pub fn add_u64(&mut self, value: u64) {
        self.data.extend_from_slice(&value.to_le_bytes());
    }

    pub fn add_i64(&mut self, value: i64) {
        self.data.extend_from_slice(&value.to_le_bytes());
    }

    pub fn add_f32(&mut self, value: f32) {
        self.data.extend_from_slice(&value.to_le_bytes());
    }

    pub fn add_f64(&mut self, value: f64) {
        self.data.extend_from_slice(&value.to_le_bytes());
    }

    /// Append an unsigned varint
    pub fn add_varint(&mut self, value: u64) {
        encode_varint(value, &mut self.data);
    }

    /// Append a UTF-8 string with a varint length prefix
    pub fn add_string(&mut self, value: &str) {
        self.add_blob(value.as_bytes());
    }

    /// Append raw bytes with a varint length prefix
    pub fn add_blob(&mut self, value: &[u8]) {
        self.add_varint(value.len() as u64);
        self.data.extend_from_slice(value);
    }

    /// Append raw bytes with no prefix
    pub fn append_data(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Write a hex dump, 16 bytes per line
    pub fn dump_hex(&self, out: &mut impl fmt::Write) -> fmt::Result {
        for (line, chunk) in self.data.chunks(16).enumerate() {
            write!(out, "{:06x} ", line * 16)?;
            for byte in chunk {
                write!(out, " {:02x}", byte)?;
            }
            writeln!(out)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Datagram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Datagram({} bytes)", self.data.len())
    }
}

impl std::ops::Deref for Datagram {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl AsRef<[u8]> for Datagram {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl From<Vec<u8>> for Datagram {
    fn from(data: Vec<u8>) -> Self {
        Self { data }
    }
}
