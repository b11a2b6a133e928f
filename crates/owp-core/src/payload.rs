//! The ownership payload and the codec that mints and checks it.
//!
//! A payload is created fresh for every embed (new nonce, current timestamp),
//! is immutable once built, and has no persistence of its own: it only lives
//! inside the image it was embedded in.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::canonical::{decode_payload, encode_payload, signing_message};
use crate::clock::{Clock, SystemClock};
use crate::crypto::{random_hex, NONCE_LEN};
use crate::error::{CoreError, Result};
use crate::signer::{KeylessSha256Signer, Signer};

/// The protocol version minted by this implementation.
pub const PROTOCOL_VERSION: &str = "2.0.0";

/// The signed ownership record hidden inside an image.
///
/// Field order is the wire order; see [`crate::canonical`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Payload {
    /// Identity name of the owner.
    pub owner: String,

    /// Email or handle of the owner.
    #[serde(rename = "email")]
    pub contact: String,

    /// When the payload was minted (Unix milliseconds).
    #[serde(rename = "timestamp")]
    pub issued_at_millis: u64,

    /// Hex tag over the signing message.
    #[serde(rename = "signature")]
    pub integrity_tag: String,

    /// Semantic version; must equal the verifier's exactly.
    #[serde(rename = "version")]
    pub protocol_version: String,

    /// 16 random bytes, lowercase hex.
    pub nonce: String,
}

impl Payload {
    /// The message the integrity tag covers.
    pub fn signing_message(&self) -> String {
        signing_message(
            &self.owner,
            &self.contact,
            self.issued_at_millis,
            &self.nonce,
            &self.protocol_version,
        )
    }

    /// Encode to the wire form.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        encode_payload(self)
    }

    /// Decode from the wire form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        decode_payload(bytes)
    }
}

/// The owner, contact and version a verifier expects to find.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolIdentity {
    pub owner: String,
    pub contact: String,
    pub version: String,
}

impl ProtocolIdentity {
    /// Identity at the current [`PROTOCOL_VERSION`].
    pub fn new(owner: impl Into<String>, contact: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            contact: contact.into(),
            version: PROTOCOL_VERSION.to_string(),
        }
    }

    /// Override the expected protocol version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }
}

/// Builds, serializes, and verifies payloads.
#[derive(Clone)]
pub struct PayloadCodec {
    signer: Arc<dyn Signer>,
    clock: Arc<dyn Clock>,
}

impl PayloadCodec {
    /// Codec with the keyless SHA-256 scheme and the system clock.
    pub fn new() -> Self {
        Self {
            signer: Arc::new(KeylessSha256Signer),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the integrity-tag scheme.
    pub fn with_signer(mut self, signer: Arc<dyn Signer>) -> Self {
        self.signer = signer;
        self
    }

    /// Replace the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The integrity-tag scheme in use.
    pub fn signer(&self) -> &Arc<dyn Signer> {
        &self.signer
    }

    /// Mint a payload with a fresh nonce and the current time.
    pub fn build(&self, owner: &str, contact: &str, version: &str) -> Payload {
        let nonce = random_hex(NONCE_LEN);
        let issued_at_millis = self.clock.now_millis();
        let payload = self.build_with(owner, contact, version, issued_at_millis, &nonce);

        tracing::info!(
            scheme = self.signer.scheme(),
            issued_at_millis,
            "minted ownership payload"
        );

        payload
    }

    /// Mint a payload from explicit inputs.
    pub fn build_with(
        &self,
        owner: &str,
        contact: &str,
        version: &str,
        issued_at_millis: u64,
        nonce: &str,
    ) -> Payload {
        let message = signing_message(owner, contact, issued_at_millis, nonce, version);

        Payload {
            owner: owner.to_string(),
            contact: contact.to_string(),
            issued_at_millis,
            integrity_tag: self.signer.sign(message.as_bytes()),
            protocol_version: version.to_string(),
            nonce: nonce.to_string(),
        }
    }

    /// Mint a payload for `identity`.
    pub fn build_for(&self, identity: &ProtocolIdentity) -> Payload {
        self.build(&identity.owner, &identity.contact, &identity.version)
    }

    /// Check a payload, reporting the first failing field.
    ///
    /// Identity fields are checked before the tag.
    pub fn check(&self, payload: &Payload, expected: &ProtocolIdentity) -> Result<()> {
        expect_field("owner", &expected.owner, &payload.owner)?;
        expect_field("contact", &expected.contact, &payload.contact)?;
        expect_field("version", &expected.version, &payload.protocol_version)?;

        let message = payload.signing_message();
        if !self.signer.verify(message.as_bytes(), &payload.integrity_tag) {
            return Err(CoreError::IntegrityTagMismatch);
        }

        Ok(())
    }

    /// `true` iff the identity fields match and the tag recomputes exactly.
    pub fn verify(&self, payload: &Payload, expected: &ProtocolIdentity) -> bool {
        self.check(payload, expected).is_ok()
    }

    /// Encode to the wire form.
    pub fn serialize(&self, payload: &Payload) -> Result<Vec<u8>> {
        encode_payload(payload)
    }

    /// Decode from the wire form.
    pub fn deserialize(&self, bytes: &[u8]) -> Result<Payload> {
        decode_payload(bytes)
    }
}

impl Default for PayloadCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PayloadCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PayloadCodec({})", self.signer.scheme())
    }
}

fn expect_field(field: &'static str, expected: &str, actual: &str) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(CoreError::IdentityMismatch {
            field,
            expected: expected.to_string(),
            actual: actual.to_string(),
        })
    }
}
