//! Byte/nibble conversion.
//!
//! Each byte expands to two nibbles, high nibble first. Nibbles are carried
//! as `u8` values in `0..16`.

use crate::error::{Result, StegoError};

/// Mask selecting the low nibble of a byte.
pub const NIBBLE_MASK: u8 = 0x0F;

/// Expand bytes into nibbles (high nibble first within each byte).
pub fn to_nibbles(bytes: &[u8]) -> Vec<u8> {
    let mut nibbles = Vec::with_capacity(bytes.len() * 2);
    for &byte in bytes {
        nibbles.push(byte >> 4);
        nibbles.push(byte & NIBBLE_MASK);
    }
    nibbles
}

/// Reassemble bytes from nibble pairs.
///
/// Only the low four bits of each input are used.
pub fn from_nibbles(nibbles: &[u8]) -> Result<Vec<u8>> {
    if nibbles.len() % 2 != 0 {
        return Err(StegoError::OddNibbleCount(nibbles.len()));
    }

    Ok(nibbles
        .chunks_exact(2)
        .map(|pair| ((pair[0] & NIBBLE_MASK) << 4) | (pair[1] & NIBBLE_MASK))
        .collect())
}

/// Sum of all nibble values, modulo 256.
///
/// A framing check, not a cryptographic one.
pub fn checksum(nibbles: &[u8]) -> u8 {
    nibbles
        .iter()
        .fold(0u8, |acc, &n| acc.wrapping_add(n & NIBBLE_MASK))
}
