//! Golden test vectors for deterministic verification.
//!
//! These vectors pin the signing message, the integrity tag, and the wire
//! form. Any implementation that reads or writes these watermarks must
//! reproduce them exactly.

use owp_core::{Payload, PayloadCodec, Sha256Hash};
use owp_stego::{checksum, to_nibbles};

/// A golden test vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    pub owner: &'static str,
    pub contact: &'static str,
    pub issued_at_millis: u64,
    /// 16 bytes, hex.
    pub nonce: &'static str,
    pub version: &'static str,
    /// Expected integrity tag (hex SHA-256 of the signing message).
    pub expected_tag: &'static str,
    /// Expected length of the wire form in bytes.
    pub expected_wire_len: usize,
    /// Expected hex SHA-256 of the wire form.
    pub expected_wire_digest: &'static str,
    /// Expected nibble-sum checksum of the packed wire form.
    pub expected_checksum: u8,
}

/// Get all golden test vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "current version",
            owner: "Ada Lovelace",
            contact: "ada@example.org",
            issued_at_millis: 1_735_430_400_000, // 2024-12-29T00:00:00Z
            nonce: "000102030405060708090a0b0c0d0e0f",
            version: "2.0.0",
            expected_tag: "391d60d305e3a0d9b53a44b0552aaaec277a05b5127dd67a32b39dbd47c37f6b",
            expected_wire_len: 216,
            expected_wire_digest: "60ac8177cece56360db3cf294866a3b9e696f5b5be9982cf01e12b62c27b5b94",
            expected_checksum: 115,
        },
        GoldenVector {
            name: "epoch timestamp, all-ones nonce",
            owner: "Grace Hopper",
            contact: "grace@example.org",
            issued_at_millis: 0,
            nonce: "ffffffffffffffffffffffffffffffff",
            version: "2.0.0",
            expected_tag: "f4eb85ab979e9d9e3c29b62fbcf13905952f64056dce468896fd8960940a7ea8",
            expected_wire_len: 206,
            expected_wire_digest: "69e64737f6274aaee74ae859c7034d3b536a06524dff6f920f7eb06062231404",
            expected_checksum: 92,
        },
        GoldenVector {
            name: "previous version",
            owner: "Ada Lovelace",
            contact: "ada@example.org",
            issued_at_millis: 1_735_430_400_000,
            nonce: "000102030405060708090a0b0c0d0e0f",
            version: "1.0.0",
            expected_tag: "54f9e19ff1e732efb3c9456d05d2bef519c6487dbef842bb316e1a0cb2fa04ee",
            expected_wire_len: 216,
            expected_wire_digest: "56b35005adc52d6d2ad857d5b91bd23539c559b0f460fe4d2751c7ce9d71a230",
            expected_checksum: 160,
        },
    ]
}

/// Build the payload a vector describes.
pub fn payload_from_vector(vector: &GoldenVector) -> Payload {
    PayloadCodec::new().build_with(
        vector.owner,
        vector.contact,
        vector.version,
        vector.issued_at_millis,
        vector.nonce,
    )
}

/// Check every vector. Returns `(name, matches, actual_tag)` per vector.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    all_vectors()
        .iter()
        .map(|v| {
            let payload = payload_from_vector(v);
            let wire = payload.to_bytes().unwrap_or_default();

            let matches = payload.integrity_tag == v.expected_tag
                && wire.len() == v.expected_wire_len
                && Sha256Hash::hash(&wire).to_hex() == v.expected_wire_digest
                && checksum(&to_nibbles(&wire)) == v.expected_checksum;

            (v.name.to_string(), matches, payload.integrity_tag)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use owp_core::ProtocolIdentity;

    #[test]
    fn test_all_vectors_match() {
        for (name, matches, tag) in verify_all_vectors() {
            assert!(matches, "vector '{name}' diverged (tag {tag})");
        }
    }

    #[test]
    fn test_signing_message_layout() {
        let payload = payload_from_vector(&all_vectors()[0]);
        assert_eq!(
            payload.signing_message(),
            "Ada Lovelace:ada@example.org:1735430400000:000102030405060708090a0b0c0d0e0f:2.0.0"
        );
    }

    #[test]
    fn test_vector_nonces_are_16_bytes() {
        for vector in all_vectors() {
            let bytes = hex::decode(vector.nonce).unwrap();
            assert_eq!(bytes.len(), 16, "{}", vector.name);
        }
    }

    #[test]
    fn test_previous_version_rejected_by_current_verifier() {
        let old = payload_from_vector(&all_vectors()[2]);
        let current = ProtocolIdentity::new("Ada Lovelace", "ada@example.org");

        assert!(!PayloadCodec::new().verify(&old, &current));
        assert!(PayloadCodec::new().verify(&old, &current.with_version("1.0.0")));
    }
}
