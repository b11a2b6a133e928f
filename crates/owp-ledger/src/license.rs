//! Time-bounded licenses.

use serde::{Deserialize, Serialize};

use owp_core::Signer;

/// An authorization grant issued to an identity.
///
/// The signature covers `license_id:issued_to:issued_at:expires_at`. The
/// `revoked` flag is not covered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct License {
    pub license_id: String,
    pub issued_to: String,
    pub issued_at_millis: u64,
    pub expires_at_millis: u64,
    pub revoked: bool,
    pub signature: String,
}

impl License {
    /// Create and sign a license.
    pub fn issue(
        signer: &dyn Signer,
        license_id: String,
        issued_to: &str,
        issued_at_millis: u64,
        ttl_millis: u64,
    ) -> Self {
        let expires_at_millis = issued_at_millis.saturating_add(ttl_millis);
        let message = signing_message(&license_id, issued_to, issued_at_millis, expires_at_millis);

        Self {
            signature: signer.sign(message.as_bytes()),
            license_id,
            issued_to: issued_to.to_string(),
            issued_at_millis,
            expires_at_millis,
            revoked: false,
        }
    }

    /// The message the signature covers.
    pub fn signing_message(&self) -> String {
        signing_message(
            &self.license_id,
            &self.issued_to,
            self.issued_at_millis,
            self.expires_at_millis,
        )
    }

    /// Whether the signature matches the signed fields.
    pub fn signature_valid(&self, signer: &dyn Signer) -> bool {
        signer.verify(self.signing_message().as_bytes(), &self.signature)
    }

    /// Expired once `now` is strictly past the expiry.
    pub fn is_expired(&self, now_millis: u64) -> bool {
        now_millis > self.expires_at_millis
    }
}

fn signing_message(license_id: &str, issued_to: &str, issued_at: u64, expires_at: u64) -> String {
    format!("{license_id}:{issued_to}:{issued_at}:{expires_at}")
}
