//! Integrity-tag schemes.
//!
//! The protocol's "signature" is a keyless hash over fields that are
//! themselves public. [`KeylessSha256Signer`] reproduces that scheme exactly.
//! It detects accidental corruption and naive edits, but it does NOT
//! authenticate the minter: anyone who knows the owner, contact and version
//! strings can produce a payload that verifies.
//!
//! Callers depend on the [`Signer`] trait rather than the concrete scheme, so
//! an asymmetric implementation can replace it without touching call sites.

use crate::crypto::Sha256Hash;

/// Produces and checks integrity tags over canonical messages.
pub trait Signer: Send + Sync {
    /// Short identifier for the scheme, used in logs.
    fn scheme(&self) -> &'static str;

    /// Compute the tag for `message`, as a lowercase hex string.
    fn sign(&self, message: &[u8]) -> String;

    /// Check `tag` against `message`. Exact match, not constant-time.
    fn verify(&self, message: &[u8], tag: &str) -> bool {
        self.sign(message) == tag
    }
}

/// Hex SHA-256 of the message, with no key material.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeylessSha256Signer;

impl Signer for KeylessSha256Signer {
    fn scheme(&self) -> &'static str {
        "sha256-keyless"
    }

    fn sign(&self, message: &[u8]) -> String {
        Sha256Hash::hash(message).to_hex()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_is_hex_sha256() {
        let signer = KeylessSha256Signer;
        assert_eq!(
            signer.sign(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_verify_exact_match_only() {
        let signer = KeylessSha256Signer;
        let tag = signer.sign(b"owner:contact");
        assert!(signer.verify(b"owner:contact", &tag));
        assert!(!signer.verify(b"owner:contacT", &tag));
        assert!(!signer.verify(b"owner:contact", &tag.to_uppercase()));
    }
}
