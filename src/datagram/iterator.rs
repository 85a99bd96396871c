//! Checked reader over a datagram.

use crate::datagram::Datagram;
use crate::error::{PageError, Result};
use crate::types::decode_varint;

/// Cursor reading values from the front of a datagram
#[derive(Debug, Clone)]
pub struct DatagramIterator<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> DatagramIterator<'a> {
    /// Start reading at the beginning of `datagram`
    pub fn new(datagram: &'a Datagram) -> Self {
        Self::from_bytes(datagram.as_bytes())
    }

    /// Start reading at the beginning of a raw byte slice
    pub fn from_bytes(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current read offset
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left to read
    pub fn remaining_size(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Check if every byte has been consumed
    pub fn is_at_end(&self) -> bool {
        self.pos == self.data.len()
    }

    /// The unread tail
    pub fn remaining_bytes(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    fn take(&mut self, needed: usize) -> Result<&'a [u8]> {
        let remaining = self.remaining_size();
        if needed > remaining {
            return Err(PageError::UnexpectedEof { needed, remaining });
        }
        let bytes = &self.data[self.pos..self.pos + needed];
        self.pos += needed;
        Ok(bytes)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    /// Advance past `count` bytes
    pub fn skip_bytes(&mut self, count: usize) -> Result<()> {
        self.take(count).map(|_| ())
    }

    pub fn get_bool(&mut self) -> Result<bool> {
        let start = self.pos;
        match self.get_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => {
                self.pos = start;
                Err(PageError::corruption(format!(
                    "invalid bool byte {:#04x} at offset {}",
                    other, start
                )))
            }
        }
    }

    pub fn get_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn get_i8(&mut self) -> Result<i8> {
        Ok(self.take(1)?[0] as i8)
    }

    pub fn get_u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.take_array()?))
    }

    pub fn get_i16(&mut self) -> Result<i16> {
        Ok(i16::from_le_bytes(self.take_array()?))
    }

    pub fn get_u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.take_array()?))
    }

    pub fn get_i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.take_array()?))
    }

    pub fn get_u64(&mut self) -> Result<u64> {
        Ok(u64::from_le_bytes(self.take_array()?))
    }

    pub fn get_i64(&mut self) -> Result<i64> {
        Ok(i64::from_le_bytes(self.take_array()?))
    }

    pub fn get_f32(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.take_array()?))
    }

    pub fn get_f64(&mut self) -> Result<f64> {
        Ok(f64::from_le_bytes(self.take_array()?))
    }

    /// Read an unsigned varint
    pub fn get_varint(&mut self) -> Result<u64> {
        let (value, used) = decode_varint(self.remaining_bytes()).ok_or_else(|| {
            PageError::corruption(format!("malformed varint at offset {}", self.pos))
        })?;
        self.pos += used;
        Ok(value)
    }

    /// Read a length-prefixed blob
    pub fn get_blob(&mut self) -> Result<&'a [u8]> {
        let start = self.pos;
        let blob = self.get_varint().and_then(|len| {
            let len = usize::try_from(len)
                .map_err(|_| PageError::corruption(format!("blob length {} too large", len)))?;
            self.take(len)
        });
        if blob.is_err() {
            self.pos = start;
        }
        blob
    }

    /// Read a length-prefixed UTF-8 string
    pub fn get_string(&mut self) -> Result<String> {
        let start = self.pos;
        let bytes = self.get_blob()?;
        String::from_utf8(bytes.to_vec()).map_err(|_| {
            self.pos = start;
            PageError::corruption(format!("string at offset {} is not valid UTF-8", start))
        })
    }
}
