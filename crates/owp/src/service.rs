//! The watermark service.
//!
//! Composes the payload codec, the nibble packer and the channel codec, and
//! asks the trust ledger before minting anything.

use std::sync::Arc;

use owp_core::{Payload, PayloadCodec, Sha256Hash};
use owp_ledger::{Operation, TrustLedger};
use owp_stego::{checksum, from_nibbles, to_nibbles, RasterImage, StegoChannel};

use crate::config::WatermarkConfig;
use crate::error::{Result, WatermarkError};
use crate::result::{EmbedReport, VerifyFault, VerifyResult};

/// Embeds and verifies ownership watermarks.
///
/// Codec and channel work is stateless; the only shared state is the
/// ledger, which the service holds by `Arc` so several services (or a
/// background sweep) can use the same one.
#[derive(Debug)]
pub struct WatermarkService {
    config: WatermarkConfig,
    codec: PayloadCodec,
    channel: StegoChannel,
    ledger: Arc<TrustLedger>,
}

impl WatermarkService {
    /// Create a service with its own ledger built from `config.ledger`.
    pub fn new(config: WatermarkConfig) -> Self {
        let ledger = Arc::new(TrustLedger::new(config.ledger.clone()));
        Self::with_ledger(config, ledger)
    }

    /// Create a service over an existing ledger.
    pub fn with_ledger(config: WatermarkConfig, ledger: Arc<TrustLedger>) -> Self {
        Self {
            channel: StegoChannel::new(config.search),
            codec: PayloadCodec::new(),
            config,
            ledger,
        }
    }

    /// Replace the payload codec (clock or signer).
    pub fn with_codec(mut self, codec: PayloadCodec) -> Self {
        self.codec = codec;
        self
    }

    pub fn config(&self) -> &WatermarkConfig {
        &self.config
    }

    pub fn codec(&self) -> &PayloadCodec {
        &self.codec
    }

    pub fn ledger(&self) -> &Arc<TrustLedger> {
        &self.ledger
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Embedding
    // ─────────────────────────────────────────────────────────────────────────

    /// Mint a fresh payload for the configured identity and hide it in a copy
    /// of `image`.
    ///
    /// `minter` must hold a valid license. An image too small for the whole
    /// stream is still returned, with `truncated` set.
    pub fn embed(&self, minter: &str, image: &RasterImage) -> Result<EmbedReport> {
        self.ledger
            .authorize(minter, Operation::Mint)
            .into_result()
            .map_err(WatermarkError::LedgerDenied)?;

        let payload = self.codec.build_for(&self.config.identity);
        let report = self.write_payload(payload, image)?;

        tracing::info!(
            minter,
            nibble_count = report.nibble_count,
            stride = report.stride,
            digest = %report.payload_digest,
            truncated = report.truncated,
            "watermark embedded"
        );

        Ok(report)
    }

    fn write_payload(&self, payload: Payload, image: &RasterImage) -> Result<EmbedReport> {
        let bytes = self.codec.serialize(&payload)?;
        let nibbles = to_nibbles(&bytes);

        let search = self.channel.search();
        if !search.contains(nibbles.len()) {
            return Err(WatermarkError::PayloadOutOfRange {
                nibbles: nibbles.len(),
                min: search.min(),
                max: search.max(),
            });
        }

        let mut plane = image.channel_plane(self.config.channel)?;
        let outcome = self
            .channel
            .embed(&mut plane, image.width(), image.height(), &nibbles);

        let mut marked = image.clone();
        marked.set_channel_plane(self.config.channel, &plane)?;

        Ok(EmbedReport {
            image: marked,
            payload_digest: Sha256Hash::hash(&bytes).to_hex(),
            payload,
            stride: outcome.stride,
            nibble_count: outcome.nibble_count,
            checksum: checksum(&nibbles),
            truncated: outcome.truncated(),
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Verification
    // ─────────────────────────────────────────────────────────────────────────

    /// Look for a watermark and check it against the configured identity.
    ///
    /// Only an image without the watermark channel is an error; every other
    /// outcome is described by the returned [`VerifyResult`]. Does not
    /// consult the ledger.
    pub fn verify(&self, image: &RasterImage) -> Result<VerifyResult> {
        let plane = image.channel_plane(self.config.channel)?;

        let Some(stream) = self.channel.extract(&plane, image.width(), image.height()) else {
            return Ok(VerifyResult::fault(VerifyFault::NoWatermarkDetected));
        };

        let bytes = match from_nibbles(&stream.nibbles) {
            Ok(bytes) => bytes,
            Err(err) => return Ok(VerifyResult::fault(VerifyFault::CorruptPayload(err.to_string()))),
        };

        let payload = match self.codec.deserialize(&bytes) {
            Ok(payload) => payload,
            Err(err) => return Ok(VerifyResult::fault(VerifyFault::CorruptPayload(err.to_string()))),
        };

        let result = match self.codec.check(&payload, &self.config.identity) {
            Ok(()) => VerifyResult::valid(payload),
            Err(err) => VerifyResult::mismatch(payload, err.to_string()),
        };

        tracing::debug!(
            valid = result.valid,
            nibble_count = stream.nibbles.len(),
            stride = stream.stride,
            "watermark checked"
        );

        Ok(result)
    }

    /// [`verify`](Self::verify) on behalf of `identity`, which the ledger
    /// must allow to verify.
    pub fn verify_as(&self, identity: &str, image: &RasterImage) -> Result<VerifyResult> {
        self.ledger
            .authorize(identity, Operation::Verify)
            .into_result()
            .map_err(WatermarkError::LedgerDenied)?;
        self.verify(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use owp_core::{FixedClock, ProtocolIdentity};
    use owp_ledger::Reason;
    use owp_stego::{LengthSearch, StegoError};

    const MINTER: &str = "studio-1";

    fn service() -> WatermarkService {
        let identity = ProtocolIdentity::new("Ada Lovelace", "ada@example.org");
        let service = WatermarkService::new(WatermarkConfig::new(identity))
            .with_codec(PayloadCodec::new().with_clock(Arc::new(FixedClock::new(1_735_430_400_000))));
        service.ledger().issue_license(MINTER).unwrap();
        service
    }

    #[test]
    fn test_embed_then_verify() {
        let service = service();
        let image = RasterImage::filled(64, 64, 3, 0x80);

        let report = service.embed(MINTER, &image).unwrap();
        assert_eq!(report.nibble_count, 432);
        assert_eq!(report.stride, 7);
        assert!(!report.truncated);
        assert_eq!(report.payload_digest.len(), 64);
        assert_eq!(report.image.raw().len(), image.raw().len());

        let result = service.verify(&report.image).unwrap();
        assert!(result.valid, "{:?}", result.error);
        assert_eq!(result.payload.as_ref(), Some(&report.payload));
        assert_eq!(result.owner.as_deref(), Some("Ada Lovelace"));
        assert_eq!(result.timestamp_millis, Some(1_735_430_400_000));
    }

    #[test]
    fn test_embed_requires_license() {
        let service = service();
        let image = RasterImage::filled(64, 64, 3, 0x80);

        let err = service.embed("stranger", &image).unwrap_err();
        assert_eq!(err.denial_reason(), Some(Reason::NoValidLicense));
    }

    #[test]
    fn test_two_channel_image_rejected() {
        let service = service();
        let image = RasterImage::filled(64, 64, 2, 0x80);

        assert!(matches!(
            service.embed(MINTER, &image),
            Err(WatermarkError::Stego(StegoError::ChannelUnavailable { .. }))
        ));
        assert!(matches!(
            service.verify(&image),
            Err(WatermarkError::Stego(StegoError::ChannelUnavailable { .. }))
        ));
    }

    #[test]
    fn test_payload_outside_search_range() {
        let identity = ProtocolIdentity::new("Ada Lovelace", "ada@example.org");
        let config = WatermarkConfig::new(identity).with_search(LengthSearch::new(100, 400).unwrap());
        let service = WatermarkService::new(config);
        service.ledger().issue_license(MINTER).unwrap();

        let err = service
            .embed(MINTER, &RasterImage::filled(64, 64, 3, 0))
            .unwrap_err();
        assert!(matches!(
            err,
            WatermarkError::PayloadOutOfRange { nibbles: 432, min: 100, max: 400 }
        ));
    }

    #[test]
    fn test_oversized_payload_refused_at_widest_range() {
        let identity = ProtocolIdentity::new("x".repeat(33_000), "ada@example.org");
        let search = LengthSearch::new(100, LengthSearch::LIMIT).unwrap();
        let service = WatermarkService::new(WatermarkConfig::new(identity).with_search(search));
        service.ledger().issue_license(MINTER).unwrap();

        let err = service
            .embed(MINTER, &RasterImage::filled(400, 400, 3, 0x80))
            .unwrap_err();
        match err {
            WatermarkError::PayloadOutOfRange { nibbles, max, .. } => {
                assert!(nibbles > 65_536);
                assert_eq!(max, LengthSearch::LIMIT);
            }
            other => panic!("expected PayloadOutOfRange, got {other:?}"),
        }
    }

    #[test]
    fn test_only_target_channel_changes() {
        let service = service();
        let image = RasterImage::filled(32, 32, 4, 0x55);
        let report = service.embed(MINTER, &image).unwrap();

        for (i, (&after, &before)) in report.image.raw().iter().zip(image.raw()).enumerate() {
            if i % 4 != 2 {
                assert_eq!(after, before, "byte {i} outside the blue channel changed");
            }
        }
    }

    #[test]
    fn test_other_owner_is_signature_mismatch() {
        let service = service();
        let report = service
            .embed(MINTER, &RasterImage::filled(64, 64, 3, 0x80))
            .unwrap();

        let grace = ProtocolIdentity::new("Grace Hopper", "grace@example.org");
        let verifier = WatermarkService::new(WatermarkConfig::new(grace));
        let result = verifier.verify(&report.image).unwrap();

        assert!(!result.valid);
        assert!(result.payload.is_some());
        assert!(matches!(result.error, Some(VerifyFault::SignatureMismatch(_))));
    }

    #[test]
    fn test_verify_as_respects_lock() {
        let service = service();
        let image = RasterImage::filled(64, 64, 3, 0x80);

        assert!(service.verify_as("auditor", &image).is_ok());
        service.ledger().record_violation("auditor", "SCRAPING", "");
        assert_eq!(
            service.verify_as("auditor", &image).unwrap_err().denial_reason(),
            Some(Reason::IdentityLocked)
        );
    }
}
