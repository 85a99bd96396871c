//! LEB128 variable-length integers.
//!
//! Used for length prefixes and object ids inside datagrams, where most
//! values are small. Each byte carries 7 data bits; the high bit marks that
//! another byte follows.

/// Longest encoding of a `u64`
pub const MAX_VARINT_LEN: usize = 10;

/// Append `value` to `buf` as a varint, returning the number of bytes written.
pub fn encode_varint(mut value: u64, buf: &mut Vec<u8>) -> usize {
    let start = buf.len();
    while value >= 0x80 {
        buf.push((value as u8) | 0x80);
        value >>= 7;
    }
    buf.push(value as u8);
    buf.len() - start
}

/// Decode a varint from the front of `bytes`.
///
/// Returns the value and the number of bytes consumed, or `None` when the
/// encoding is truncated or does not fit in 64 bits.
pub fn decode_varint(bytes: &[u8]) -> Option<(u64, usize)> {
    let mut value: u64 = 0;

    for (i, &byte) in bytes.iter().take(MAX_VARINT_LEN).enumerate() {
        let bits = (byte & 0x7F) as u64;
        let shift = 7 * i as u32;

        // The tenth byte may only contribute the single top bit.
        if i == MAX_VARINT_LEN - 1 && bits > 1 {
            return None;
        }
        value |= bits << shift;

        if byte & 0x80 == 0 {
            return Some((value, i + 1));
        }
    }

    None
}

/// Number of bytes `encode_varint` writes for `value`.
pub fn varint_size(value: u64) -> usize {
    let significant = 64 - value.leading_zeros() as usize;
    significant.max(1).div_ceil(7)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_varint_boundaries() {
        for &value in &[0u64, 1, 127, 128, 16383, 16384, u32::MAX as u64, u64::MAX] {
            let mut buf = Vec::new();
            let written = encode_varint(value, &mut buf);
            assert_eq!(written, buf.len());
            assert_eq!(written, varint_size(value), "size for {}", value);
            assert_eq!(decode_varint(&buf), Some((value, written)));
        }
    }

    #[test]
    fn test_varint_appends() {
        let mut buf = vec![0xAA];
        encode_varint(300, &mut buf);
        assert_eq!(buf, vec![0xAA, 0xAC, 0x02]);
    }

    #[test]
    fn test_decode_truncated() {
        assert!(decode_varint(&[]).is_none());
        assert!(decode_varint(&[0x80, 0x80]).is_none());
    }

    #[test]
    fn test_decode_overflow() {
        let mut bytes = vec![0xFF; 9];
        bytes.push(0x02);
        assert!(decode_varint(&bytes).is_none());
    }
}
