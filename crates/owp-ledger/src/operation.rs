//! Operations the ledger can be asked to authorize.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Operations gated by [`TrustLedger::authorize`](crate::TrustLedger::authorize).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Embed a fresh watermark. Requires a valid license.
    Mint,
    /// Check an image for a watermark.
    Verify,
    /// Obtain a new license.
    IssueLicense,
    /// Register a runtime instance.
    RegisterInstance,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::Mint,
        Operation::Verify,
        Operation::IssueLicense,
        Operation::RegisterInstance,
    ];

    /// Whether the operation needs a live license rather than just an
    /// unlocked identity.
    pub fn requires_license(&self) -> bool {
        match self {
            Self::Mint => true,
            Self::Verify | Self::IssueLicense | Self::RegisterInstance => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mint => "mint",
            Self::Verify => "verify",
            Self::IssueLicense => "issue_license",
            Self::RegisterInstance => "register_instance",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_mint_requires_license() {
        let gated: Vec<Operation> = Operation::ALL
            .into_iter()
            .filter(Operation::requires_license)
            .collect();
        assert_eq!(gated, vec![Operation::Mint]);
    }

    #[test]
    fn test_display_matches_serde() {
        for op in Operation::ALL {
            let json = serde_json::to_string(&op).unwrap();
            assert_eq!(json, format!("\"{op}\""));
        }
    }
}
