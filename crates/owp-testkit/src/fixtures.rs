//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use owp::{
    EmbedReport, PayloadCodec, ProtocolIdentity, RasterImage, WatermarkConfig, WatermarkService,
};
use owp_core::Clock;
use owp_ledger::TrustLedger;

/// Fixed instant used by fixtures: 2024-12-29T00:00:00Z.
pub const FIXTURE_EPOCH_MILLIS: u64 = 1_735_430_400_000;

/// Identity used by [`TestFixture::new`].
pub fn default_identity() -> ProtocolIdentity {
    ProtocolIdentity::new("Ada Lovelace", "ada@example.org")
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    millis: AtomicU64,
}

impl ManualClock {
    pub fn new(millis: u64) -> Self {
        Self {
            millis: AtomicU64::new(millis),
        }
    }

    pub fn advance(&self, millis: u64) {
        self.millis.fetch_add(millis, Ordering::SeqCst);
    }

    pub fn set(&self, millis: u64) {
        self.millis.store(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> u64 {
        self.millis.load(Ordering::SeqCst)
    }
}

/// A service whose codec and ledger share one [`ManualClock`].
pub struct TestFixture {
    pub clock: Arc<ManualClock>,
    pub service: WatermarkService,
}

impl TestFixture {
    /// Fixture for [`default_identity`].
    pub fn new() -> Self {
        Self::for_identity(default_identity())
    }

    /// Fixture minting and expecting `identity`.
    pub fn for_identity(identity: ProtocolIdentity) -> Self {
        Self::with_config(WatermarkConfig::new(identity))
    }

    pub fn with_config(config: WatermarkConfig) -> Self {
        let clock = Arc::new(ManualClock::new(FIXTURE_EPOCH_MILLIS));
        let ledger = TrustLedger::new(config.ledger.clone()).with_clock(clock.clone());
        let codec = PayloadCodec::new().with_clock(clock.clone());
        let service = WatermarkService::with_ledger(config, Arc::new(ledger)).with_codec(codec);

        Self { clock, service }
    }

    pub fn ledger(&self) -> &TrustLedger {
        self.service.ledger()
    }

    /// Issue a license to `minter` and return the fixture.
    pub fn licensed(self, minter: &str) -> Self {
        self.service
            .ledger()
            .issue_license(minter)
            .expect("fixture ledger refused a license");
        self
    }

    /// Embed on behalf of `minter`, panicking on any error.
    pub fn mint(&self, minter: &str, image: &RasterImage) -> EmbedReport {
        self.service
            .embed(minter, image)
            .expect("fixture embed failed")
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Deterministic pseudo-random RGB image.
pub fn noise_image(width: u32, height: u32, seed: u64) -> RasterImage {
    let len = width as usize * height as usize * 3;
    let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
    let raw = (0..len)
        .map(|_| {
            // xorshift64
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state >> 24) as u8
        })
        .collect();
    RasterImage::new(width, height, 3, raw).expect("buffer length follows geometry")
}
