//! Error types for the trust ledger.

use thiserror::Error;

use crate::decision::Reason;

/// Errors that can occur during ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The ledger refused the operation.
    #[error("denied: {0}")]
    Denied(Reason),

    /// No violation record exists for this identity.
    #[error("unknown identity: {0}")]
    UnknownIdentity(String),

    /// No runtime instance is registered under this id.
    #[error("unknown instance: {0}")]
    UnknownInstance(String),

    /// The presented recovery token does not match.
    #[error("invalid recovery token")]
    InvalidRecoveryToken,
}

impl LedgerError {
    /// The denial reason, if this is a denial.
    pub fn reason(&self) -> Option<Reason> {
        match self {
            Self::Denied(reason) => Some(*reason),
            _ => None,
        }
    }
}

/// Result type for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
