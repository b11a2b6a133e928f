//! Error types for the watermark service.

use owp_core::CoreError;
use owp_ledger::{LedgerError, Reason};
use owp_stego::StegoError;
use thiserror::Error;

/// Errors that can occur during service operations.
///
/// A watermark that is missing or fails verification is not an error; it is
/// reported through [`VerifyResult`](crate::VerifyResult).
#[derive(Debug, Error)]
pub enum WatermarkError {
    /// Payload codec error.
    #[error("payload error: {0}")]
    Core(#[from] CoreError),

    /// Image shape error.
    #[error("image error: {0}")]
    Stego(#[from] StegoError),

    /// Ledger error.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// The ledger refused to authorize the operation.
    #[error("ledger denied: {0}")]
    LedgerDenied(Reason),

    /// The serialized payload could never be found by the extractor.
    #[error("payload of {nibbles} nibbles is outside the extractable range {min}..{max}")]
    PayloadOutOfRange {
        nibbles: usize,
        min: usize,
        max: usize,
    },
}

impl WatermarkError {
    /// The ledger's reason, if this error is a ledger denial.
    pub fn denial_reason(&self) -> Option<Reason> {
        match self {
            Self::LedgerDenied(reason) => Some(*reason),
            Self::Ledger(err) => err.reason(),
            _ => None,
        }
    }
}

/// Result type for service operations.
pub type Result<T> = std::result::Result<T, WatermarkError>;
