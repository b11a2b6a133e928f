//! # OWP Testkit
//!
//! Testing utilities for the Ownership Watermark Protocol.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Golden vectors**: Known payloads with their expected tags and wire forms
//! - **Generators**: Proptest strategies for identities, nonces and image sizes
//! - **Fixtures**: A service wired to a [`ManualClock`] for expiry scenarios
//!
//! ## Golden Vectors
//!
//! ```rust
//! use owp_testkit::vectors::verify_all_vectors;
//!
//! for (name, matches, tag) in verify_all_vectors() {
//!     assert!(matches, "{name}: {tag}");
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use owp_testkit::generators::{payload_from_params, PayloadParams};
//!
//! proptest! {
//!     #[test]
//!     fn tag_is_deterministic(params: PayloadParams) {
//!         prop_assert_eq!(payload_from_params(&params), payload_from_params(&params));
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use owp_testkit::fixtures::{noise_image, TestFixture};
//!
//! let fixture = TestFixture::new().licensed("studio");
//! let report = fixture.mint("studio", &noise_image(64, 64, 1));
//! assert!(fixture.service.verify(&report.image).unwrap().valid);
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{noise_image, ManualClock, TestFixture};
pub use generators::{payload_from_params, PayloadParams};
pub use vectors::{all_vectors, payload_from_vector, verify_all_vectors, GoldenVector};
