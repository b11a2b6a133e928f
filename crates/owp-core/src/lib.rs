//! # OWP Core
//!
//! Pure primitives for the Ownership Watermark Protocol: the signed ownership
//! payload, its integrity tag, and its canonical encoding.
//!
//! This crate contains no I/O, no image handling, no shared state. It is pure
//! computation over small records.
//!
//! ## Key Types
//!
//! - [`Payload`] - The signed ownership record hidden inside an image
//! - [`PayloadCodec`] - Builds, serializes, and verifies payloads
//! - [`ProtocolIdentity`] - The owner/contact/version a verifier expects
//! - [`Signer`] - Seam for the integrity-tag scheme
//! - [`Clock`] - Seam for wall-clock time
//!
//! ## Integrity Tags Are Not Signatures
//!
//! The integrity tag is a keyless SHA-256 over public fields. Anyone who knows
//! the protocol constants can mint a payload that verifies. See [`signer`].

pub mod canonical;
pub mod clock;
pub mod crypto;
pub mod error;
pub mod payload;
pub mod signer;

pub use canonical::{decode_payload, encode_payload, signing_message};
pub use clock::{Clock, FixedClock, SystemClock};
pub use crypto::{integrity_hash, random_hex, verify_integrity, Sha256Hash, NONCE_LEN};
pub use error::{CoreError, Result};
pub use payload::{Payload, PayloadCodec, ProtocolIdentity, PROTOCOL_VERSION};
pub use signer::{KeylessSha256Signer, Signer};
