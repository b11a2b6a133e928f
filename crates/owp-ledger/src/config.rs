//! Ledger configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::violation::{MAX_RECOVERY_TOKEN_LEN, MIN_RECOVERY_TOKEN_LEN};

/// Tunables for a [`TrustLedger`](crate::TrustLedger).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Lifetime of an issued license.
    pub license_ttl_millis: u64,

    /// Mixed into recovery tokens.
    pub recovery_salt: String,

    /// Hex characters kept from the recovery hash. Values outside `1..=64`
    /// are clamped when tokens are derived.
    pub recovery_token_len: usize,

    /// Period of the background expiry sweep.
    pub sweep_interval_millis: u64,
}

impl LedgerConfig {
    /// 24 hours.
    pub const DEFAULT_LICENSE_TTL_MILLIS: u64 = 24 * 60 * 60 * 1000;

    /// Matches the instance heartbeat period.
    pub const DEFAULT_SWEEP_INTERVAL_MILLIS: u64 = 30_000;

    pub fn with_license_ttl(mut self, ttl: Duration) -> Self {
        self.license_ttl_millis = ttl.as_millis() as u64;
        self
    }

    pub fn with_recovery_salt(mut self, salt: impl Into<String>) -> Self {
        self.recovery_salt = salt.into();
        self
    }

    /// Clamped to `1..=64`.
    pub fn with_recovery_token_len(mut self, len: usize) -> Self {
        self.recovery_token_len = len.clamp(MIN_RECOVERY_TOKEN_LEN, MAX_RECOVERY_TOKEN_LEN);
        self
    }

    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval_millis = interval.as_millis() as u64;
        self
    }

    /// Sweep period as a `Duration`.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_millis)
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            license_ttl_millis: Self::DEFAULT_LICENSE_TTL_MILLIS,
            recovery_salt: "owp-recovery".to_string(),
            recovery_token_len: 32,
            sweep_interval_millis: Self::DEFAULT_SWEEP_INTERVAL_MILLIS,
        }
    }
}
