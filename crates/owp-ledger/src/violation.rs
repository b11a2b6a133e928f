//! Violation records and recovery tokens.

use serde::{Deserialize, Serialize};

use owp_core::Sha256Hash;

/// Trust record for an identity that has misbehaved.
///
/// Created on the first violation, overwritten by later ones, and never
/// deleted. Redeeming a recovery token clears `locked` but keeps the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationRecord {
    pub identity: String,
    pub violation_type: String,
    pub recorded_at_millis: u64,
    pub details: String,
    pub locked: bool,
}

/// Totals across all violation records, plus the records themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationSummary {
    pub total: usize,
    pub locked: usize,
    /// Every record, ordered by identity.
    pub violations: Vec<ViolationRecord>,
}

/// Shortest recovery token handed out, in hex characters.
pub const MIN_RECOVERY_TOKEN_LEN: usize = 1;

/// Longest recovery token: the full SHA-256 hex digest.
pub const MAX_RECOVERY_TOKEN_LEN: usize = 64;

/// Derive the recovery token for a record.
///
/// Hex SHA-256 of `identity:recorded_at:salt:recovery`, truncated to `len`
/// characters clamped to
/// `MIN_RECOVERY_TOKEN_LEN..=MAX_RECOVERY_TOKEN_LEN`. A token is never
/// empty. A newer violation changes the timestamp and therefore the token.
pub fn recovery_token(record: &ViolationRecord, salt: &str, len: usize) -> String {
    let material = format!(
        "{}:{}:{salt}:recovery",
        record.identity, record.recorded_at_millis
    );
    let mut token = Sha256Hash::hash(material.as_bytes()).to_hex();
    token.truncate(len.clamp(MIN_RECOVERY_TOKEN_LEN, MAX_RECOVERY_TOKEN_LEN));
    token
}
