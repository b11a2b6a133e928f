//! # OWP
//!
//! The unified API for the Ownership Watermark Protocol: hide a signed
//! ownership record in one color channel of an image, and find and check it
//! again later.
//!
//! ## Overview
//!
//! - **Payload**: owner, contact, timestamp, nonce and version, with an
//!   integrity tag over all of them
//! - **Channel codec**: writes the payload's nibbles into the blue channel at
//!   a stride the extractor can rediscover on its own
//! - **Trust ledger**: licenses, violations and a global kill switch that
//!   decide who may mint
//!
//! ## Usage
//!
//! ```rust,no_run
//! use owp::{ProtocolIdentity, RasterImage, WatermarkConfig, WatermarkService};
//!
//! fn example(raw: Vec<u8>) -> owp::Result<()> {
//!     let identity = ProtocolIdentity::new("Ada Lovelace", "ada@example.org");
//!     let service = WatermarkService::new(WatermarkConfig::new(identity));
//!
//!     service.ledger().issue_license("studio-1")?;
//!
//!     let image = RasterImage::new(640, 480, 3, raw)?;
//!     let report = service.embed("studio-1", &image)?;
//!
//!     let result = service.verify(&report.image)?;
//!     assert!(result.valid);
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `owp::core` - payload, codec, signer and clock
//! - `owp::stego` - nibble packing, channel codec, raster buffers
//! - `owp::ledger` - licenses, violations, instances, kill switch

pub mod config;
pub mod error;
pub mod result;
pub mod service;

// Re-export component crates
pub use owp_core as core;
pub use owp_ledger as ledger;
pub use owp_stego as stego;

// Re-export main types for convenience
pub use config::WatermarkConfig;
pub use error::{Result, WatermarkError};
pub use result::{EmbedReport, VerifyFault, VerifyResult};
pub use service::WatermarkService;

pub use owp_core::{Payload, PayloadCodec, ProtocolIdentity, PROTOCOL_VERSION};
pub use owp_ledger::{Decision, LedgerConfig, Operation, Reason, TrustLedger};
pub use owp_stego::{LengthSearch, RasterImage};
