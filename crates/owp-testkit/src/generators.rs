//! Proptest generators for property-based testing.

use proptest::prelude::*;

use owp_core::{Payload, PayloadCodec, ProtocolIdentity, PROTOCOL_VERSION};

/// Generate an owner name, including non-ASCII and JSON-escaped characters.
pub fn owner() -> impl Strategy<Value = String> {
    "\\PC{0,40}"
}

/// Generate a contact handle.
pub fn contact() -> impl Strategy<Value = String> {
    "[a-z0-9._+-]{1,20}@[a-z0-9-]{1,16}\\.[a-z]{2,6}"
}

/// Generate a protocol identity at the current version.
pub fn identity() -> impl Strategy<Value = ProtocolIdentity> {
    (owner(), contact()).prop_map(|(owner, contact)| ProtocolIdentity::new(owner, contact))
}

/// Generate a 16-byte nonce as lowercase hex.
pub fn nonce() -> impl Strategy<Value = String> {
    any::<[u8; 16]>().prop_map(hex::encode)
}

/// Generate a plausible timestamp (13 digits, 2001 onward).
pub fn timestamp() -> impl Strategy<Value = u64> {
    1_000_000_000_000u64..=9_999_999_999_999u64
}

/// Generate image dimensions with at least 900 pixels, enough for any
/// payload [`identity`] produces.
pub fn dimensions() -> impl Strategy<Value = (u32, u32)> {
    (30u32..=160, 30u32..=160)
}

/// Inputs for building a payload deterministically.
#[derive(Debug, Clone)]
pub struct PayloadParams {
    pub identity: ProtocolIdentity,
    pub issued_at_millis: u64,
    pub nonce: String,
}

impl Arbitrary for PayloadParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (identity(), timestamp(), nonce())
            .prop_map(|(identity, issued_at_millis, nonce)| PayloadParams {
                identity,
                issued_at_millis,
                nonce,
            })
            .boxed()
    }
}

/// Build the payload described by `params`.
pub fn payload_from_params(params: &PayloadParams) -> Payload {
    PayloadCodec::new().build_with(
        &params.identity.owner,
        &params.identity.contact,
        PROTOCOL_VERSION,
        params.issued_at_millis,
        &params.nonce,
    )
}
