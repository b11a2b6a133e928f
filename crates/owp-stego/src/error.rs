//! Error types for the stego layer.
//!
//! Embedding and extraction themselves never fail; these errors cover
//! malformed inputs handed to the layer.

use thiserror::Error;

/// Errors that can occur while preparing buffers or unpacking nibbles.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StegoError {
    /// The image has no channel at the requested index.
    #[error("channel {channel} unavailable: image has {channels} channel(s)")]
    ChannelUnavailable { channel: usize, channels: u8 },

    /// A buffer's length disagrees with the image geometry.
    #[error("buffer shape mismatch: expected {expected} bytes, got {actual}")]
    BufferShape { expected: usize, actual: usize },

    /// Nibbles only reassemble into bytes in pairs.
    #[error("odd nibble count: {0}")]
    OddNibbleCount(usize),

    /// The extraction search range is empty or exceeds the trailer's u16.
    #[error("invalid length search range {min}..{max}")]
    InvalidSearchRange { min: usize, max: usize },
}

/// Result type for stego operations.
pub type Result<T> = std::result::Result<T, StegoError>;
