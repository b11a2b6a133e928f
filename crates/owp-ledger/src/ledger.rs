//! The trust ledger.
//!
//! All mutable trust state lives in one [`LedgerState`] behind a single
//! mutex. Every public operation takes the lock once, reads the clock once,
//! and releases the lock before returning.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use owp_core::{random_hex, Clock, KeylessSha256Signer, Signer, SystemClock, NONCE_LEN};

use crate::config::LedgerConfig;
use crate::decision::{Decision, Reason};
use crate::error::{LedgerError, Result};
use crate::instance::{BlockReport, InstanceCounts, RuntimeInstance};
use crate::license::License;
use crate::operation::Operation;
use crate::sweep::SweepReport;
use crate::violation::{recovery_token, ViolationRecord, ViolationSummary};

/// Where an identity stands with the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdentityState {
    /// Never licensed.
    Unknown,
    /// Holds at least one live license.
    Trusted,
    /// Licensed before, but every license has lapsed.
    Expired,
    /// Every license it held was revoked.
    Revoked,
    /// Locked by a violation.
    Locked,
}

#[derive(Debug, Default)]
struct LedgerState {
    /// All issued licenses by id.
    licenses: HashMap<String, License>,

    /// Index: identity -> ids of licenses issued to it.
    by_identity: HashMap<String, Vec<String>>,

    /// Revoked license ids. May contain ids this ledger never issued.
    revoked: HashSet<String>,

    violations: HashMap<String, ViolationRecord>,

    instances: HashMap<String, RuntimeInstance>,

    blocked_platforms: HashSet<String>,

    kill_switch: bool,
}

impl LedgerState {
    fn is_locked(&self, identity: &str) -> bool {
        self.violations
            .get(identity)
            .map(|record| record.locked)
            .unwrap_or(false)
    }

    fn is_revoked(&self, license: &License) -> bool {
        license.revoked || self.revoked.contains(&license.license_id)
    }

    fn licenses_of<'a>(&'a self, identity: &str) -> impl Iterator<Item = &'a License> + 'a {
        self.by_identity
            .get(identity)
            .into_iter()
            .flatten()
            .filter_map(|id| self.licenses.get(id))
    }

    fn revoke(&mut self, license_id: &str) -> bool {
        if let Some(license) = self.licenses.get_mut(license_id) {
            license.revoked = true;
        }
        self.revoked.insert(license_id.to_string())
    }
}

/// In-memory registry of licenses, violations, and runtime instances.
///
/// Construct once at startup and share behind an `Arc`.
pub struct TrustLedger {
    config: LedgerConfig,
    signer: Arc<dyn Signer>,
    clock: Arc<dyn Clock>,
    state: Mutex<LedgerState>,
}

impl TrustLedger {
    /// Ledger with the keyless SHA-256 scheme and the system clock.
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            config,
            signer: Arc::new(KeylessSha256Signer),
            clock: Arc::new(SystemClock),
            state: Mutex::new(LedgerState::default()),
        }
    }

    /// Replace the license signature scheme.
    pub fn with_signer(mut self, signer: Arc<dyn Signer>) -> Self {
        self.signer = signer;
        self
    }

    /// Replace the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Licenses
    // ─────────────────────────────────────────────────────────────────────────

    /// Issue a license to `identity`.
    ///
    /// Refused while the kill switch is active or the identity is locked.
    pub fn issue_license(&self, identity: &str) -> Result<License> {
        let now = self.clock.now_millis();
        let mut state = self.lock();
        self.issue_locked(&mut state, identity, now)
    }

    fn issue_locked(&self, state: &mut LedgerState, identity: &str, now: u64) -> Result<License> {
        if state.kill_switch {
            return Err(deny(identity, Operation::IssueLicense, Reason::GlobalKillSwitchActive));
        }
        if state.is_locked(identity) {
            return Err(deny(identity, Operation::IssueLicense, Reason::IdentityLocked));
        }

        let license = License::issue(
            self.signer.as_ref(),
            random_hex(NONCE_LEN),
            identity,
            now,
            self.config.license_ttl_millis,
        );

        state
            .by_identity
            .entry(identity.to_string())
            .or_default()
            .push(license.license_id.clone());
        state
            .licenses
            .insert(license.license_id.clone(), license.clone());

        tracing::info!(
            identity,
            license_id = %license.license_id,
            expires_at_millis = license.expires_at_millis,
            "license issued"
        );

        Ok(license)
    }

    /// Check a license presented by a caller.
    ///
    /// Checks, in order: kill switch, revoked set, revoked flag, expiry,
    /// licensee, signature.
    pub fn validate_license(&self, license: &License, expected_identity: &str) -> Decision {
        let now = self.clock.now_millis();
        let state = self.lock();
        let decision = self.check_license(&state, license, expected_identity, now);
        if !decision.allowed {
            tracing::warn!(
                identity = expected_identity,
                license_id = %license.license_id,
                reason = %decision.reason,
                "license rejected"
            );
        }
        decision
    }

    fn check_license(
        &self,
        state: &LedgerState,
        license: &License,
        expected_identity: &str,
        now: u64,
    ) -> Decision {
        if state.kill_switch {
            return Decision::deny(Reason::GlobalKillSwitchActive);
        }
        if state.is_revoked(license) {
            return Decision::deny(Reason::LicenseRevoked);
        }
        if license.is_expired(now) {
            return Decision::deny(Reason::LicenseExpired);
        }
        if license.issued_to != expected_identity {
            return Decision::deny(Reason::UnauthorizedLicensee);
        }
        if !license.signature_valid(self.signer.as_ref()) {
            return Decision::deny(Reason::LicenseSignatureInvalid);
        }
        Decision::allow()
    }

    /// Revoke one license. Returns `false` if it was already revoked.
    ///
    /// Unknown ids are still recorded, so a license issued elsewhere can be
    /// revoked before it is ever presented.
    pub fn revoke_license(&self, license_id: &str) -> bool {
        let newly = self.lock().revoke(license_id);
        if newly {
            tracing::info!(license_id, "license revoked");
        }
        newly
    }

    /// Revoke every license issued so far. Returns how many were newly
    /// revoked.
    pub fn revoke_all(&self) -> usize {
        let mut state = self.lock();
        let ids: Vec<String> = state.licenses.keys().cloned().collect();
        let count = ids.iter().filter(|id| state.revoke(id)).count();

        tracing::info!(count, "all licenses revoked");
        count
    }

    /// A stored license by id.
    pub fn license(&self, license_id: &str) -> Option<License> {
        self.lock().licenses.get(license_id).cloned()
    }

    /// Every license issued to `identity`, oldest first.
    pub fn licenses_for(&self, identity: &str) -> Vec<License> {
        self.lock().licenses_of(identity).cloned().collect()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Authorization
    // ─────────────────────────────────────────────────────────────────────────

    /// Decide whether `identity` may perform `operation` right now.
    pub fn authorize(&self, identity: &str, operation: Operation) -> Decision {
        let now = self.clock.now_millis();
        let state = self.lock();

        let decision = if state.kill_switch {
            Decision::deny(Reason::GlobalKillSwitchActive)
        } else if state.is_locked(identity) {
            Decision::deny(Reason::IdentityLocked)
        } else if operation.requires_license()
            && !state
                .licenses_of(identity)
                .any(|license| self.check_license(&state, license, identity, now).allowed)
        {
            Decision::deny(Reason::NoValidLicense)
        } else {
            Decision::allow()
        };

        if !decision.allowed {
            tracing::warn!(identity, %operation, reason = %decision.reason, "operation denied");
        }
        decision
    }

    /// Summarize where `identity` stands.
    pub fn identity_state(&self, identity: &str) -> IdentityState {
        let now = self.clock.now_millis();
        let state = self.lock();

        if state.is_locked(identity) {
            return IdentityState::Locked;
        }

        let mut any = false;
        let mut all_revoked = true;
        for license in state.licenses_of(identity) {
            any = true;
            let revoked = state.is_revoked(license);
            if !revoked && !license.is_expired(now) {
                return IdentityState::Trusted;
            }
            all_revoked &= revoked;
        }

        match (any, all_revoked) {
            (false, _) => IdentityState::Unknown,
            (true, true) => IdentityState::Revoked,
            (true, false) => IdentityState::Expired,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Violations
    // ─────────────────────────────────────────────────────────────────────────

    /// Lock `identity`, replacing any earlier record.
    ///
    /// Instances registered by the identity lose their authorization.
    pub fn record_violation(
        &self,
        identity: &str,
        violation_type: impl Into<String>,
        details: impl Into<String>,
    ) -> ViolationRecord {
        let record = ViolationRecord {
            identity: identity.to_string(),
            violation_type: violation_type.into(),
            recorded_at_millis: self.clock.now_millis(),
            details: details.into(),
            locked: true,
        };

        let mut state = self.lock();
        state.violations.insert(identity.to_string(), record.clone());

        let mut blocked = 0usize;
        for instance in state.instances.values_mut() {
            if instance.identity == identity && instance.authorized {
                instance.authorized = false;
                blocked += 1;
            }
        }

        tracing::warn!(
            identity,
            violation_type = %record.violation_type,
            details = %record.details,
            blocked_instances = blocked,
            "violation recorded, identity locked"
        );

        record
    }

    pub fn is_locked(&self, identity: &str) -> bool {
        self.lock().is_locked(identity)
    }

    pub fn violation(&self, identity: &str) -> Option<ViolationRecord> {
        self.lock().violations.get(identity).cloned()
    }

    pub fn violation_summary(&self) -> ViolationSummary {
        let state = self.lock();
        let mut violations: Vec<ViolationRecord> = state.violations.values().cloned().collect();
        violations.sort_by(|a, b| a.identity.cmp(&b.identity));

        ViolationSummary {
            total: violations.len(),
            locked: violations.iter().filter(|r| r.locked).count(),
            violations,
        }
    }

    /// The token that unlocks `identity`, or `None` with no record.
    pub fn recovery_token(&self, identity: &str) -> Option<String> {
        let state = self.lock();
        let record = state.violations.get(identity)?;
        Some(recovery_token(
            record,
            &self.config.recovery_salt,
            self.config.recovery_token_len,
        ))
    }

    /// Unlock `identity` if `token` matches its current recovery token.
    pub fn redeem_recovery_token(&self, identity: &str, token: &str) -> Result<()> {
        let mut state = self.lock();
        let record = state
            .violations
            .get_mut(identity)
            .ok_or_else(|| LedgerError::UnknownIdentity(identity.to_string()))?;

        let expected = recovery_token(
            record,
            &self.config.recovery_salt,
            self.config.recovery_token_len,
        );
        if token != expected {
            tracing::warn!(identity, "recovery token rejected");
            return Err(LedgerError::InvalidRecoveryToken);
        }

        record.locked = false;
        tracing::info!(identity, "identity unlocked by recovery token");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Kill switch
    // ─────────────────────────────────────────────────────────────────────────

    /// Deny everything until [`deactivate_kill_switch`](Self::deactivate_kill_switch).
    ///
    /// Returns the number of instances that lost their authorization.
    pub fn activate_kill_switch(&self) -> usize {
        let mut state = self.lock();
        state.kill_switch = true;

        let mut blocked = 0usize;
        for instance in state.instances.values_mut() {
            if instance.authorized {
                instance.authorized = false;
                blocked += 1;
            }
        }

        tracing::info!(blocked_instances = blocked, "kill switch activated");
        blocked
    }

    /// Lift the kill switch. Instances stay de-authorized.
    pub fn deactivate_kill_switch(&self) {
        self.lock().kill_switch = false;
        tracing::info!("kill switch deactivated");
    }

    pub fn is_kill_switch_active(&self) -> bool {
        self.lock().kill_switch
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Runtime instances
    // ─────────────────────────────────────────────────────────────────────────

    /// Register an instance and issue it a license.
    ///
    /// Re-registering an id replaces the earlier entry.
    pub fn register_instance(
        &self,
        instance_id: &str,
        platform: &str,
        identity: &str,
    ) -> Result<RuntimeInstance> {
        let now = self.clock.now_millis();
        let mut state = self.lock();

        if state.kill_switch {
            return Err(deny(identity, Operation::RegisterInstance, Reason::GlobalKillSwitchActive));
        }
        if state.blocked_platforms.contains(platform) {
            return Err(deny(identity, Operation::RegisterInstance, Reason::PlatformBlocked));
        }

        let license = self.issue_locked(&mut state, identity, now)?;
        let instance = RuntimeInstance {
            instance_id: instance_id.to_string(),
            platform: platform.to_string(),
            identity: identity.to_string(),
            license_id: license.license_id,
            last_heartbeat_millis: now,
            authorized: true,
        };
        state
            .instances
            .insert(instance_id.to_string(), instance.clone());

        tracing::info!(instance_id, platform, identity, "instance registered");
        Ok(instance)
    }

    /// Remove an instance. Its license is left as is.
    pub fn deregister_instance(&self, instance_id: &str) -> Result<RuntimeInstance> {
        let removed = self
            .lock()
            .instances
            .remove(instance_id)
            .ok_or_else(|| LedgerError::UnknownInstance(instance_id.to_string()))?;

        tracing::info!(instance_id, "instance deregistered");
        Ok(removed)
    }

    /// Record a check-in from an instance.
    pub fn heartbeat(&self, instance_id: &str) -> Decision {
        let now = self.clock.now_millis();
        let mut state = self.lock();

        if state.kill_switch {
            return Decision::deny(Reason::GlobalKillSwitchActive);
        }

        let license_revoked = match state.instances.get(instance_id) {
            None => return Decision::deny(Reason::InstanceNotRegistered),
            Some(instance) if !instance.authorized => {
                return Decision::deny(Reason::InstanceUnauthorized)
            }
            Some(instance) => state.revoked.contains(&instance.license_id),
        };

        let Some(instance) = state.instances.get_mut(instance_id) else {
            return Decision::deny(Reason::InstanceNotRegistered);
        };
        if license_revoked {
            instance.authorized = false;
            tracing::warn!(instance_id, "heartbeat from instance with revoked license");
            return Decision::deny(Reason::LicenseRevoked);
        }

        instance.last_heartbeat_millis = now;
        Decision::allow()
    }

    pub fn instance(&self, instance_id: &str) -> Option<RuntimeInstance> {
        self.lock().instances.get(instance_id).cloned()
    }

    /// Every registered instance, ordered by id.
    pub fn instances(&self) -> Vec<RuntimeInstance> {
        let mut instances: Vec<RuntimeInstance> = self.lock().instances.values().cloned().collect();
        instances.sort_by(|a, b| a.instance_id.cmp(&b.instance_id));
        instances
    }

    pub fn instance_counts(&self) -> InstanceCounts {
        self.lock().instances.values().collect()
    }

    /// De-authorize every registered instance, whatever its platform.
    ///
    /// Unlike the kill switch this leaves licenses and new registrations
    /// alone.
    pub fn block_all_instances(&self) -> BlockReport {
        let mut state = self.lock();
        let mut platforms = BTreeSet::new();

        for instance in state.instances.values_mut() {
            instance.authorized = false;
            platforms.insert(instance.platform.clone());
        }

        let report = BlockReport {
            blocked: state.instances.len(),
            platforms: platforms.into_iter().collect(),
        };

        tracing::warn!(
            blocked_instances = report.blocked,
            platforms = report.platforms.len(),
            "all instances blocked"
        );
        report
    }

    /// Block a platform and de-authorize its instances. Returns how many
    /// instances were affected.
    pub fn block_platform(&self, platform: &str) -> usize {
        let mut state = self.lock();
        state.blocked_platforms.insert(platform.to_string());

        let mut blocked = 0usize;
        for instance in state.instances.values_mut() {
            if instance.platform == platform && instance.authorized {
                instance.authorized = false;
                blocked += 1;
            }
        }

        tracing::info!(platform, blocked_instances = blocked, "platform blocked");
        blocked
    }

    /// Allow new registrations from a platform again. Existing instances
    /// stay de-authorized.
    pub fn unblock_platform(&self, platform: &str) -> bool {
        let removed = self.lock().blocked_platforms.remove(platform);
        if removed {
            tracing::info!(platform, "platform unblocked");
        }
        removed
    }

    pub fn is_platform_blocked(&self, platform: &str) -> bool {
        self.lock().blocked_platforms.contains(platform)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Expiry
    // ─────────────────────────────────────────────────────────────────────────

    /// De-authorize instances whose license has expired or been revoked.
    pub fn sweep_expired(&self) -> SweepReport {
        let now = self.clock.now_millis();
        let mut guard = self.lock();
        let state = &mut *guard;

        let mut report = SweepReport::default();
        for instance in state.instances.values_mut().filter(|i| i.authorized) {
            report.checked += 1;

            let live = state.licenses.get(&instance.license_id).is_some_and(|license| {
                !license.revoked
                    && !state.revoked.contains(&license.license_id)
                    && !license.is_expired(now)
            });
            if !live {
                instance.authorized = false;
                report.deauthorized += 1;
            }
        }

        tracing::debug!(
            checked = report.checked,
            deauthorized = report.deauthorized,
            "expiry sweep"
        );
        report
    }
}

impl Default for TrustLedger {
    fn default() -> Self {
        Self::new(LedgerConfig::default())
    }
}

impl std::fmt::Debug for TrustLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrustLedger")
            .field("config", &self.config)
            .field("scheme", &self.signer.scheme())
            .finish_non_exhaustive()
    }
}

fn deny(identity: &str, operation: Operation, reason: Reason) -> LedgerError {
    tracing::warn!(identity, %operation, %reason, "operation denied");
    LedgerError::Denied(reason)
}
