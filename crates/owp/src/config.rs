//! Service configuration.

use serde::{Deserialize, Serialize};

use owp_core::ProtocolIdentity;
use owp_ledger::LedgerConfig;
use owp_stego::{LengthSearch, OWNERSHIP_CHANNEL};

/// Configuration for a [`WatermarkService`](crate::WatermarkService).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatermarkConfig {
    /// Owner, contact and version minted into payloads and expected on verify.
    pub identity: ProtocolIdentity,

    /// Interleaved channel index carrying the watermark.
    #[serde(default = "default_channel")]
    pub channel: usize,

    /// Stream lengths the extractor tries.
    #[serde(default)]
    pub search: LengthSearch,

    /// Ledger tunables.
    #[serde(default)]
    pub ledger: LedgerConfig,
}

fn default_channel() -> usize {
    OWNERSHIP_CHANNEL
}

impl WatermarkConfig {
    pub fn new(identity: ProtocolIdentity) -> Self {
        Self {
            identity,
            channel: OWNERSHIP_CHANNEL,
            search: LengthSearch::default(),
            ledger: LedgerConfig::default(),
        }
    }

    pub fn with_channel(mut self, channel: usize) -> Self {
        self.channel = channel;
        self
    }

    pub fn with_search(mut self, search: LengthSearch) -> Self {
        self.search = search;
        self
    }

    pub fn with_ledger(mut self, ledger: LedgerConfig) -> Self {
        self.ledger = ledger;
        self
    }
}
