//! # OWP Ledger
//!
//! The trust ledger decides who may mint watermarks. It tracks:
//!
//! - **Licenses**: time-bounded grants, revocable one at a time or all at once
//! - **Violations**: per-identity records that lock an identity until a
//!   recovery token is redeemed
//! - **Runtime instances**: deployments that register, heartbeat, and can be
//!   cut off per platform
//! - **The kill switch**: a global flag that denies every decision
//!
//! All state sits behind one mutex inside [`TrustLedger`]. Checks return a
//! [`Decision`] carrying a stable [`Reason`] code; operations that produce
//! something return [`LedgerError::Denied`] instead.
//!
//! ## Lifecycle of an identity
//!
//! ```text
//! Unknown --issue--> Trusted --+--> Expired
//!                              +--> Revoked
//!                              +--> Locked --recovery token--> (unlocked)
//! ```

pub mod config;
pub mod decision;
pub mod error;
pub mod instance;
pub mod ledger;
pub mod license;
pub mod operation;
pub mod sweep;
pub mod violation;

pub use config::LedgerConfig;
pub use decision::{Decision, Reason};
pub use error::{LedgerError, Result};
pub use instance::{BlockReport, InstanceCounts, RuntimeInstance};
pub use ledger::{IdentityState, TrustLedger};
pub use license::License;
pub use operation::Operation;
pub use sweep::{run_expiry_sweep, SweepReport};
pub use violation::{ViolationRecord, ViolationSummary};
