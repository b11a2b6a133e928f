//! Shared helpers for the service integration tests.

#![allow(dead_code)]

use std::sync::{Arc, OnceLock};

use owp::core::FixedClock;
use owp::{PayloadCodec, ProtocolIdentity, RasterImage, WatermarkConfig, WatermarkService};

pub const OWNER: &str = "Ada Lovelace";
pub const CONTACT: &str = "ada@example.org";
pub const MINTER: &str = "studio-1";
pub const MINTED_AT: u64 = 1_735_430_400_000;

pub fn init_tracing() {
    static ONCE: OnceLock<()> = OnceLock::new();
    ONCE.get_or_init(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

pub fn identity() -> ProtocolIdentity {
    ProtocolIdentity::new(OWNER, CONTACT)
}

/// A service with a frozen codec clock and a licensed [`MINTER`].
pub fn licensed_service() -> WatermarkService {
    init_tracing();
    let codec = PayloadCodec::new().with_clock(Arc::new(FixedClock::new(MINTED_AT)));
    let service = WatermarkService::new(WatermarkConfig::new(identity())).with_codec(codec);
    service.ledger().issue_license(MINTER).unwrap();
    service
}

/// An RGB image whose bytes follow a smooth, marker-free pattern.
pub fn photo(width: u32, height: u32) -> RasterImage {
    let raw = (0..width as usize * height as usize * 3)
        .map(|i| 0x40 + (i % 61) as u8)
        .collect();
    RasterImage::new(width, height, 3, raw).unwrap()
}
