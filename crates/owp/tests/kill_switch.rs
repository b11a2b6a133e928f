//! Ledger decisions as seen through the service.

mod common;

use common::{licensed_service, photo, MINTER};
use owp::ledger::{IdentityState, LedgerError};
use owp::{Operation, Reason, WatermarkError};

#[test]
fn test_kill_switch_blocks_minting_until_lifted() {
    let service = licensed_service();
    let ledger = service.ledger();
    let image = photo(64, 64);
    let marked = service.embed(MINTER, &image).unwrap().image;

    ledger.activate_kill_switch();

    let err = service.embed(MINTER, &image).unwrap_err();
    assert_eq!(err.denial_reason(), Some(Reason::GlobalKillSwitchActive));
    assert!(matches!(
        ledger.issue_license("newcomer"),
        Err(LedgerError::Denied(Reason::GlobalKillSwitchActive))
    ));
    for identity in ["studio-1", "newcomer", ""] {
        for op in Operation::ALL {
            assert_eq!(
                ledger.authorize(identity, op).reason,
                Reason::GlobalKillSwitchActive
            );
        }
    }

    // Plain verification reads the image only.
    assert!(service.verify(&marked).unwrap().valid);
    assert_eq!(
        service.verify_as("auditor", &marked).unwrap_err().denial_reason(),
        Some(Reason::GlobalKillSwitchActive)
    );

    ledger.deactivate_kill_switch();
    assert!(service.embed(MINTER, &image).is_ok());
    assert!(service.verify_as("auditor", &marked).unwrap().valid);
}

#[test]
fn test_revoke_all_cuts_off_existing_minters() {
    let service = licensed_service();
    assert_eq!(service.ledger().revoke_all(), 1);

    let err = service.embed(MINTER, &photo(64, 64)).unwrap_err();
    assert!(matches!(err, WatermarkError::LedgerDenied(Reason::NoValidLicense)));
    assert_eq!(service.ledger().identity_state(MINTER), IdentityState::Revoked);

    service.ledger().issue_license(MINTER).unwrap();
    assert!(service.embed(MINTER, &photo(64, 64)).is_ok());
}

#[test]
fn test_violation_and_recovery() {
    let service = licensed_service();
    let ledger = service.ledger();

    ledger.record_violation(MINTER, "WATERMARK_STRIPPED", "re-encoded without payload");
    assert_eq!(
        service.embed(MINTER, &photo(64, 64)).unwrap_err().denial_reason(),
        Some(Reason::IdentityLocked)
    );

    let token = ledger.recovery_token(MINTER).unwrap();
    ledger.redeem_recovery_token(MINTER, &token).unwrap();

    // The license issued before the violation is still live.
    assert!(service.embed(MINTER, &photo(64, 64)).is_ok());
}

#[test]
fn test_shared_ledger_across_services() {
    let minting = licensed_service();
    let verifying = owp::WatermarkService::with_ledger(
        minting.config().clone(),
        std::sync::Arc::clone(minting.ledger()),
    );

    verifying.ledger().activate_kill_switch();
    assert!(minting.embed(MINTER, &photo(64, 64)).is_err());
}
