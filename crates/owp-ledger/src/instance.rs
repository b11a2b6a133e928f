//! Registered runtime instances.

use serde::{Deserialize, Serialize};

/// A running deployment that checks in with the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeInstance {
    pub instance_id: String,
    pub platform: String,
    pub identity: String,
    /// License issued at registration.
    pub license_id: String,
    pub last_heartbeat_millis: u64,
    pub authorized: bool,
}

/// Result of [`TrustLedger::block_all_instances`](crate::TrustLedger::block_all_instances).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockReport {
    /// Instances now de-authorized, including ones that already were.
    pub blocked: usize,
    /// Distinct platforms of those instances, sorted.
    pub platforms: Vec<String>,
}

/// Instance totals by authorization state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceCounts {
    pub total: usize,
    pub authorized: usize,
    pub unauthorized: usize,
}

impl<'a> FromIterator<&'a RuntimeInstance> for InstanceCounts {
    fn from_iter<I: IntoIterator<Item = &'a RuntimeInstance>>(iter: I) -> Self {
        iter.into_iter().fold(Self::default(), |mut counts, instance| {
            counts.total += 1;
            if instance.authorized {
                counts.authorized += 1;
            } else {
                counts.unauthorized += 1;
            }
            counts
        })
    }
}
