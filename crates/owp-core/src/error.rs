//! Error types for OWP Core.

use thiserror::Error;

/// Core errors that can occur while encoding or checking payloads.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("{field} mismatch: expected {expected:?}, got {actual:?}")]
    IdentityMismatch {
        field: &'static str,
        expected: String,
        actual: String,
    },

    #[error("integrity tag does not match payload fields")]
    IntegrityTagMismatch,
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
