//! Authorization outcomes.
//!
//! Every ledger check answers with a [`Decision`]: allowed or not, plus a
//! machine-readable [`Reason`]. Reasons render as stable upper-case codes
//! that callers may match on or forward verbatim.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Why a decision came out the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Reason {
    Ok,
    GlobalKillSwitchActive,
    LicenseRevoked,
    LicenseExpired,
    UnauthorizedLicensee,
    LicenseSignatureInvalid,
    IdentityLocked,
    NoValidLicense,
    InstanceNotRegistered,
    InstanceUnauthorized,
    PlatformBlocked,
}

impl Reason {
    /// The stable code for this reason.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::GlobalKillSwitchActive => "GLOBAL_KILL_SWITCH_ACTIVE",
            Self::LicenseRevoked => "LICENSE_REVOKED",
            Self::LicenseExpired => "LICENSE_EXPIRED",
            Self::UnauthorizedLicensee => "UNAUTHORIZED_LICENSEE",
            Self::LicenseSignatureInvalid => "LICENSE_SIGNATURE_INVALID",
            Self::IdentityLocked => "IDENTITY_LOCKED",
            Self::NoValidLicense => "NO_VALID_LICENSE",
            Self::InstanceNotRegistered => "INSTANCE_NOT_REGISTERED",
            Self::InstanceUnauthorized => "INSTANCE_UNAUTHORIZED",
            Self::PlatformBlocked => "PLATFORM_BLOCKED",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Outcome of a ledger check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub allowed: bool,
    pub reason: Reason,
}

impl Decision {
    /// An allowed decision.
    pub const fn allow() -> Self {
        Self {
            allowed: true,
            reason: Reason::Ok,
        }
    }

    /// A denied decision.
    pub const fn deny(reason: Reason) -> Self {
        Self {
            allowed: false,
            reason,
        }
    }

    /// Convert to a `Result`, mapping a denial to its reason.
    pub fn into_result(self) -> Result<(), Reason> {
        if self.allowed {
            Ok(())
        } else {
            Err(self.reason)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_match_serde() {
        for reason in [
            Reason::Ok,
            Reason::GlobalKillSwitchActive,
            Reason::LicenseSignatureInvalid,
            Reason::NoValidLicense,
            Reason::PlatformBlocked,
        ] {
            let json = serde_json::to_string(&reason).unwrap();
            assert_eq!(json, format!("\"{}\"", reason.code()));
        }
    }

    #[test]
    fn test_display_is_code() {
        assert_eq!(Reason::IdentityLocked.to_string(), "IDENTITY_LOCKED");
    }

    #[test]
    fn test_into_result() {
        assert_eq!(Decision::allow().into_result(), Ok(()));
        assert_eq!(
            Decision::deny(Reason::LicenseExpired).into_result(),
            Err(Reason::LicenseExpired)
        );
    }
}
