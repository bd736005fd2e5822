//! Key comparison, sentinel generation, and encoding helpers.
//!
//! Keys are stored as raw fixed-width byte strings; the index descriptor's
//! key type selects the comparison semantics. The comparator defines a total
//! order for every type, and the sentinel generator produces the
//! type-specific maximum key used by the EOF leaf.

use bytes::{BufMut, Bytes, BytesMut};
use std::cmp::Ordering;
use trellis_common::KeyType;

/// Compares two keys under the ordering of the given key type.
///
/// Both slices must be the index's declared key size.
pub fn compare_keys(key_type: KeyType, a: &[u8], b: &[u8]) -> Ordering {
    match key_type {
        KeyType::Block => a.cmp(b),

        KeyType::NumBlock => {
            // Little-endian magnitude: most significant byte is last.
            for i in (0..a.len()).rev() {
                if a[i] != b[i] {
                    return a[i].cmp(&b[i]);
                }
            }
            Ordering::Equal
        }

        KeyType::Integer => {
            let va = i16::from_le_bytes([a[0], a[1]]);
            let vb = i16::from_le_bytes([b[0], b[1]]);
            va.cmp(&vb)
        }

        KeyType::LongInt => {
            let va = i32::from_le_bytes([a[0], a[1], a[2], a[3]]);
            let vb = i32::from_le_bytes([b[0], b[1], b[2], b[3]]);
            va.cmp(&vb)
        }

        KeyType::Text => {
            // C-string compare: unsigned bytes, stop at the first NUL.
            for i in 0..a.len() {
                if a[i] != b[i] {
                    return a[i].cmp(&b[i]);
                }
                if a[i] == 0 {
                    return Ordering::Equal;
                }
            }
            Ordering::Equal
        }

        KeyType::Logical => (a[0] != 0).cmp(&(b[0] != 0)),

        KeyType::Character => a[0].cmp(&b[0]),
    }
}

/// Fills `key` with the type-specific maximum value.
///
/// This is the key of the EOF sentinel leaf: every descent terminates at it
/// because no insertable key compares greater. Text keys keep a NUL
/// terminator in the last byte; signed numeric types clear the sign bit of
/// their most significant (last) byte so the sentinel reads as the largest
/// positive value.
pub fn fill_eof_key(key_type: KeyType, key: &mut [u8]) {
    key.fill(0xFF);
    let last = key.len() - 1;
    match key_type {
        KeyType::Text => key[last] = 0,
        KeyType::Integer | KeyType::LongInt | KeyType::NumBlock => key[last] &= 0x7F,
        KeyType::Block | KeyType::Logical | KeyType::Character => {}
    }
}

/// Encodes a string into a NUL-terminated key buffer of `key_size` bytes.
///
/// The string is truncated if necessary, always leaving room for the
/// terminator.
pub fn encode_text(s: &str, key_size: u16) -> Bytes {
    let key_size = key_size as usize;
    let mut buf = BytesMut::zeroed(key_size);
    let take = s.len().min(key_size - 1);
    buf[..take].copy_from_slice(&s.as_bytes()[..take]);
    buf.freeze()
}

/// Encodes a 16-bit signed integer key.
pub fn encode_integer(value: i16) -> Bytes {
    let mut buf = BytesMut::with_capacity(2);
    buf.put_i16_le(value);
    buf.freeze()
}

/// Encodes a 32-bit signed integer key.
pub fn encode_long_int(value: i32) -> Bytes {
    let mut buf = BytesMut::with_capacity(4);
    buf.put_i32_le(value);
    buf.freeze()
}

/// Encodes a boolean key.
pub fn encode_logical(value: bool) -> Bytes {
    Bytes::copy_from_slice(&[value as u8])
}

/// Encodes a single-byte character key.
pub fn encode_character(value: u8) -> Bytes {
    Bytes::copy_from_slice(&[value])
}
