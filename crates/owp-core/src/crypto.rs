//! Hashing and entropy helpers.
//!
//! Wraps SHA-256 with a strong type, provides the random hex identifiers
//! used for nonces and license ids, and the SHA-512 content-integrity check.

use rand::RngCore;
use sha2::{Digest, Sha256, Sha512};
use std::fmt;

/// Number of random bytes in a payload nonce (hex-encoded to 32 chars).
pub const NONCE_LEN: usize = 16;

/// A 32-byte SHA-256 hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sha256Hash(pub [u8; 32]);

impl Sha256Hash {
    /// Compute the SHA-256 hash of data.
    pub fn hash(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Self(hasher.finalize().into())
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get raw bytes.
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to lowercase hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Sha256Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SHA256({}...)", &self.to_hex()[..8])
    }
}

impl AsRef<[u8]> for Sha256Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 32]> for Sha256Hash {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// Generate `len` random bytes from the thread RNG, hex-encoded.
pub fn random_hex(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Hex SHA-512 of `content`, for detecting modified files or bundles.
pub fn integrity_hash(content: &[u8]) -> String {
    hex::encode(Sha512::digest(content))
}

/// Whether `content` still hashes to `expected_hash` (exact hex match).
pub fn verify_integrity(content: &[u8], expected_hash: &str) -> bool {
    integrity_hash(content) == expected_hash
}
