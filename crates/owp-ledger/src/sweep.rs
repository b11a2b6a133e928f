//! Periodic license-expiry sweep.
//!
//! Expiry is evaluated lazily on every check, so the sweep only keeps
//! instance authorization flags in step with license state. It runs as a
//! background task and stops when the host flips the shutdown signal.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::ledger::TrustLedger;

/// Result of one sweep pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    /// Authorized instances examined.
    pub checked: usize,
    /// Instances that lost their authorization in this pass.
    pub deauthorized: usize,
}

/// Run [`TrustLedger::sweep_expired`] every `period` until `shutdown` holds
/// `true` or its sender is dropped.
///
/// Returns the total number of instances de-authorized.
pub async fn run_expiry_sweep(
    ledger: Arc<TrustLedger>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> usize {
    let mut ticker = tokio::time::interval(period.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut total = 0usize;
    let mut passes = 0u64;

    loop {
        if *shutdown.borrow() {
            break;
        }

        tokio::select! {
            _ = ticker.tick() => {
                let report = ledger.sweep_expired();
                total += report.deauthorized;
                passes += 1;
            }
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    tracing::debug!(passes, deauthorized = total, "expiry sweep stopped");
    total
}
