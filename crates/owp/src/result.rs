//! Results of embedding and verification.

use serde::Serialize;
use thiserror::Error;

use owp_core::Payload;
use owp_stego::RasterImage;

/// Why a verification came back invalid.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerifyFault {
    /// Magic prefix absent, or no candidate length confirmed by a trailer.
    #[error("No watermark detected")]
    NoWatermarkDetected,

    /// A stream was found but did not decode into a payload.
    #[error("Corrupt payload: {0}")]
    CorruptPayload(String),

    /// A payload decoded but its identity or integrity tag did not check out.
    #[error("Signature mismatch: {0}")]
    SignatureMismatch(String),
}

/// Outcome of [`verify`](crate::WatermarkService::verify).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResult {
    pub valid: bool,
    /// Present whenever a payload decoded, valid or not.
    pub payload: Option<Payload>,
    pub owner: Option<String>,
    pub timestamp_millis: Option<u64>,
    pub error: Option<VerifyFault>,
}

impl VerifyResult {
    pub(crate) fn valid(payload: Payload) -> Self {
        Self {
            valid: true,
            owner: Some(payload.owner.clone()),
            timestamp_millis: Some(payload.issued_at_millis),
            payload: Some(payload),
            error: None,
        }
    }

    pub(crate) fn mismatch(payload: Payload, detail: String) -> Self {
        Self {
            valid: false,
            owner: Some(payload.owner.clone()),
            timestamp_millis: Some(payload.issued_at_millis),
            payload: Some(payload),
            error: Some(VerifyFault::SignatureMismatch(detail)),
        }
    }

    pub(crate) fn fault(fault: VerifyFault) -> Self {
        Self {
            valid: false,
            payload: None,
            owner: None,
            timestamp_millis: None,
            error: Some(fault),
        }
    }

    /// Human-readable error, if any.
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }
}

/// Outcome of [`embed`](crate::WatermarkService::embed).
#[derive(Debug, Clone)]
pub struct EmbedReport {
    /// The marked copy; same shape as the input.
    pub image: RasterImage,
    /// The payload that was embedded.
    pub payload: Payload,
    pub stride: usize,
    pub nibble_count: usize,
    /// Nibble-sum checksum of the stream.
    pub checksum: u8,
    /// Hex SHA-256 of the serialized payload.
    pub payload_digest: String,
    /// The image was too small to hold the whole stream.
    pub truncated: bool,
}
