//! # OWP Stego
//!
//! Hides a nibble stream in one color channel of a raw pixel buffer and finds
//! it again without being told where it is.
//!
//! ## Layout
//!
//! ```text
//! byte 0..4            low nibbles = magic "OWP1"
//! byte 4 + i*stride    low nibble  = stream[i]        (i in 0..n)
//! byte 4 + n*stride    [n >> 8, n & 0xff, 0xED]       (trailer)
//! stride               = max(1, width*height / (n + 100))
//! ```
//!
//! The extractor checks the magic, then tries every candidate `n` in a
//! bounded range until the trailer at that candidate's position confirms it.
//!
//! ## Modules
//!
//! - [`bitpack`] - bytes to nibbles and back
//! - [`channel`] - embedding and extraction over a single channel plane
//! - [`raster`] - interleaved pixel buffers and their channel planes

pub mod bitpack;
pub mod channel;
pub mod error;
pub mod raster;

pub use bitpack::{checksum, from_nibbles, to_nibbles};
pub use channel::{
    stride, EmbedOutcome, ExtractedStream, LengthSearch, StegoChannel, MAGIC, TRAILER_MARKER,
};
pub use error::{Result, StegoError};
pub use raster::{RasterImage, OWNERSHIP_CHANNEL};
