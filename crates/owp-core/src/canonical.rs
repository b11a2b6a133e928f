//! Canonical encodings of a payload.
//!
//! Two encodings exist:
//!
//! - The **signing message**, `owner:contact:issuedAtMillis:nonce:version`,
//!   which is what the integrity tag is computed over.
//! - The **wire form**, a single-line JSON object whose field order is fixed
//!   by the [`Payload`] struct:
//!   `{"owner":..,"email":..,"timestamp":..,"signature":..,"version":..,"nonce":..}`.
//!   This is what gets packed into the image.
//!
//! **CRITICAL**: Both encodings are FROZEN. Changing either one invalidates
//! every watermark already in the wild.

use crate::error::{CoreError, Result};
use crate::payload::Payload;

/// Separator between signing-message fields.
pub const FIELD_SEPARATOR: char = ':';

/// Build the message the integrity tag is computed over.
pub fn signing_message(
    owner: &str,
    contact: &str,
    issued_at_millis: u64,
    nonce: &str,
    version: &str,
) -> String {
    format!(
        "{owner}{sep}{contact}{sep}{issued_at_millis}{sep}{nonce}{sep}{version}",
        sep = FIELD_SEPARATOR
    )
}

/// Encode a payload to its wire form.
pub fn encode_payload(payload: &Payload) -> Result<Vec<u8>> {
    serde_json::to_vec(payload).map_err(|e| CoreError::Encoding(e.to_string()))
}

/// Decode a payload from its wire form.
///
/// Fails on invalid UTF-8, invalid JSON, missing fields, or unknown fields.
pub fn decode_payload(bytes: &[u8]) -> Result<Payload> {
    serde_json::from_slice(bytes).map_err(|e| CoreError::MalformedPayload(e.to_string()))
}
