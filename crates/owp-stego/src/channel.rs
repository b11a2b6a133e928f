//! Single-channel embedding and extraction.
//!
//! The stream is spread across the plane at a fixed stride that depends only
//! on the plane area and the stream length, so the extractor can recompute it
//! from scratch for each candidate length.
//!
//! **CRITICAL**: [`STRIDE_BIAS`], [`MAGIC`], [`HEADER_LEN`] and the trailer
//! layout are FROZEN. Changing any of them makes existing watermarks
//! unrecoverable.

use serde::{Deserialize, Serialize};

use crate::bitpack::NIBBLE_MASK;
use crate::error::{Result, StegoError};

/// Self-description marker; only the low nibble of each byte is written.
pub const MAGIC: [u8; 4] = *b"OWP1";

/// Bytes occupied by the magic prefix. The stream starts right after.
pub const HEADER_LEN: usize = MAGIC.len();

/// Added to the stream length before dividing the area into strides.
pub const STRIDE_BIAS: usize = 100;

/// Last byte of the trailer.
pub const TRAILER_MARKER: u8 = 0xED;

/// Trailer size: length high byte, length low byte, marker.
pub const TRAILER_LEN: usize = 3;

/// Cosmetic perturbation applied to the byte after each written slot,
/// indexed by `i % 8`. Carries no information.
pub const NOISE_PATTERN: [i16; 8] = [1, -1, 1, -1, 1, -1, 1, -1];

/// Spacing between consecutive stream slots.
pub fn stride(area: usize, nibble_count: usize) -> usize {
    (area / nibble_count.saturating_add(STRIDE_BIAS)).max(1)
}

/// Byte offset of stream slot `index`, or `None` on overflow.
fn slot_offset(index: usize, stride: usize) -> Option<usize> {
    index.checked_mul(stride)?.checked_add(HEADER_LEN)
}

fn plane_area(width: u32, height: u32) -> usize {
    (width as usize).saturating_mul(height as usize)
}

/// Range of stream lengths (in nibbles) the extractor tries, `min..max`.
///
/// Only constructible through [`LengthSearch::new`]; deserialization goes
/// through the same checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawLengthSearch")]
pub struct LengthSearch {
    min: usize,
    max: usize,
}

impl LengthSearch {
    /// Default lower bound (inclusive).
    pub const DEFAULT_MIN: usize = 100;

    /// Default upper bound (exclusive).
    pub const DEFAULT_MAX: usize = 2000;

    /// Largest usable exclusive bound: the trailer stores the length as u16.
    pub const LIMIT: usize = u16::MAX as usize + 1;

    /// Create a search range, rejecting empty ranges and lengths the
    /// trailer cannot represent.
    pub fn new(min: usize, max: usize) -> Result<Self> {
        if min == 0 || min >= max || max > Self::LIMIT {
            return Err(StegoError::InvalidSearchRange { min, max });
        }
        Ok(Self { min, max })
    }

    /// Inclusive lower bound.
    pub fn min(&self) -> usize {
        self.min
    }

    /// Exclusive upper bound.
    pub fn max(&self) -> usize {
        self.max
    }

    /// Whether a stream of `nibble_count` nibbles would be found.
    pub fn contains(&self, nibble_count: usize) -> bool {
        (self.min..self.max).contains(&nibble_count)
    }
}

impl Default for LengthSearch {
    fn default() -> Self {
        Self {
            min: Self::DEFAULT_MIN,
            max: Self::DEFAULT_MAX,
        }
    }
}

/// Unchecked wire form of [`LengthSearch`]. Missing bounds take the defaults.
#[derive(Deserialize)]
struct RawLengthSearch {
    #[serde(default = "default_min")]
    min: usize,
    #[serde(default = "default_max")]
    max: usize,
}

fn default_min() -> usize {
    LengthSearch::DEFAULT_MIN
}

fn default_max() -> usize {
    LengthSearch::DEFAULT_MAX
}

impl TryFrom<RawLengthSearch> for LengthSearch {
    type Error = StegoError;

    fn try_from(raw: RawLengthSearch) -> Result<Self> {
        Self::new(raw.min, raw.max)
    }
}

/// What an embed actually managed to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbedOutcome {
    /// Stride used for slot placement.
    pub stride: usize,
    /// Length of the stream that was requested.
    pub nibble_count: usize,
    /// Slots that fit inside the plane.
    pub nibbles_written: usize,
    /// Whether all three trailer bytes fit.
    pub trailer_written: bool,
}

impl EmbedOutcome {
    /// `true` when part of the stream or the trailer was dropped.
    pub fn truncated(&self) -> bool {
        self.nibbles_written < self.nibble_count || !self.trailer_written
    }
}

/// A stream recovered from a plane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedStream {
    pub nibbles: Vec<u8>,
    pub stride: usize,
    pub trailer_offset: usize,
}

/// Embeds and extracts nibble streams in a single channel plane.
#[derive(Debug, Clone, Copy, Default)]
pub struct StegoChannel {
    search: LengthSearch,
}

impl StegoChannel {
    /// Channel codec using the given extraction search range.
    pub fn new(search: LengthSearch) -> Self {
        Self { search }
    }

    /// The extraction search range.
    pub fn search(&self) -> LengthSearch {
        self.search
    }

    /// Write `nibbles` into `plane`, a `width * height` channel plane.
    ///
    /// Never fails. Anything that falls outside the plane is skipped, so a
    /// plane that is too small yields a partial, likely unrecoverable embed;
    /// check [`EmbedOutcome::truncated`].
    pub fn embed(&self, plane: &mut [u8], width: u32, height: u32, nibbles: &[u8]) -> EmbedOutcome {
        for (byte, magic) in plane.iter_mut().zip(MAGIC) {
            *byte = (*byte & !NIBBLE_MASK) | (magic & NIBBLE_MASK);
        }

        let count = nibbles.len();
        let stride = stride(plane_area(width, height), count);

        let mut written = 0;
        for (i, &nibble) in nibbles.iter().enumerate() {
            let Some(pos) = slot_offset(i, stride).filter(|&pos| pos < plane.len()) else {
                break;
            };

            plane[pos] = (plane[pos] & !NIBBLE_MASK) | (nibble & NIBBLE_MASK);

            if let Some(next) = plane.get_mut(pos + 1) {
                let shifted = i16::from(*next) + NOISE_PATTERN[i % NOISE_PATTERN.len()];
                *next = shifted.clamp(0, 255) as u8;
            }

            written += 1;
        }

        let trailer_written = match slot_offset(count, stride) {
            Some(pos) if pos.saturating_add(TRAILER_LEN) <= plane.len() => {
                plane[pos] = (count >> 8) as u8;
                plane[pos + 1] = count as u8;
                plane[pos + 2] = TRAILER_MARKER;
                true
            }
            _ => false,
        };

        let outcome = EmbedOutcome {
            stride,
            nibble_count: count,
            nibbles_written: written,
            trailer_written,
        };

        if outcome.truncated() {
            tracing::warn!(
                plane_len = plane.len(),
                nibble_count = count,
                nibbles_written = written,
                trailer_written,
                "channel plane too small, embedding truncated"
            );
        }

        outcome
    }

    /// Whether the plane starts with the magic prefix.
    pub fn has_magic(plane: &[u8]) -> bool {
        plane.len() >= HEADER_LEN
            && plane
                .iter()
                .zip(MAGIC)
                .all(|(&byte, magic)| byte & NIBBLE_MASK == magic & NIBBLE_MASK)
    }

    /// Find and read back a stream written by [`embed`](Self::embed).
    ///
    /// Returns `None` when the magic is absent or no candidate length in the
    /// search range is confirmed by a trailer. The first confirmed candidate
    /// wins.
    pub fn extract(&self, plane: &[u8], width: u32, height: u32) -> Option<ExtractedStream> {
        if !Self::has_magic(plane) {
            tracing::debug!("magic prefix absent");
            return None;
        }

        let area = plane_area(width, height);
        let Some((count, stride, trailer_offset)) = self.find_length(plane, area) else {
            tracing::debug!(
                min = self.search.min,
                max = self.search.max,
                "no trailer confirmed any candidate length"
            );
            return None;
        };

        tracing::debug!(nibble_count = count, stride, trailer_offset, "stream located");

        // Every slot lies before the trailer, which is in bounds.
        let nibbles = (0..count)
            .map(|i| plane[HEADER_LEN + i * stride] & NIBBLE_MASK)
            .collect();

        Some(ExtractedStream {
            nibbles,
            stride,
            trailer_offset,
        })
    }

    fn find_length(&self, plane: &[u8], area: usize) -> Option<(usize, usize, usize)> {
        (self.search.min..self.search.max).find_map(|candidate| {
            let stride = stride(area, candidate);
            let pos = slot_offset(candidate, stride)?;
            let trailer = plane.get(pos..pos.checked_add(TRAILER_LEN)?)?;

            let encoded = usize::from(u16::from_be_bytes([trailer[0], trailer[1]]));
            (trailer[2] == TRAILER_MARKER && encoded == candidate).then_some((candidate, stride, pos))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitpack::to_nibbles;

    fn stream(byte_len: usize) -> Vec<u8> {
        let bytes: Vec<u8> = (0..byte_len).map(|i| (i * 37 + 11) as u8).collect();
        to_nibbles(&bytes)
    }

    #[test]
    fn test_stride_formula() {
        assert_eq!(stride(4096, 220), 12);
        assert_eq!(stride(64 * 64, 432), 7);
        assert_eq!(stride(4, 220), 1);
        assert_eq!(stride(0, 0), 1);
    }

    #[test]
    fn test_search_range_validation() {
        assert!(LengthSearch::new(100, 2000).is_ok());
        assert!(LengthSearch::new(1, LengthSearch::LIMIT).is_ok());
        assert!(LengthSearch::new(0, 10).is_err());
        assert!(LengthSearch::new(10, 10).is_err());
        assert!(LengthSearch::new(10, LengthSearch::LIMIT + 1).is_err());
        assert_eq!(LengthSearch::default(), LengthSearch::new(100, 2000).unwrap());
    }

    #[test]
    fn test_deserialized_search_is_validated() {
        let parsed: LengthSearch = serde_json::from_str(r#"{"min":10,"max":500}"#).unwrap();
        assert_eq!((parsed.min(), parsed.max()), (10, 500));

        let partial: LengthSearch = serde_json::from_str(r#"{"max":4000}"#).unwrap();
        assert_eq!(partial.min(), LengthSearch::DEFAULT_MIN);

        assert!(serde_json::from_str::<LengthSearch>(r#"{"min":50,"max":10}"#).is_err());
        assert!(serde_json::from_str::<LengthSearch>(r#"{"max":200000}"#).is_err());
        assert!(serde_json::from_str::<LengthSearch>(r#"{"min":0}"#).is_err());

        let json = serde_json::to_string(&LengthSearch::default()).unwrap();
        assert_eq!(json, r#"{"min":100,"max":2000}"#);
        assert_eq!(serde_json::from_str::<LengthSearch>(&json).unwrap(), LengthSearch::default());
    }

    #[test]
    fn test_known_offsets_64x64() {
        let nibbles = stream(110);
        assert_eq!(nibbles.len(), 220);

        let mut plane = vec![0x80u8; 64 * 64];
        let outcome = StegoChannel::default().embed(&mut plane, 64, 64, &nibbles);

        assert_eq!(outcome.stride, 12);
        assert_eq!(outcome.nibbles_written, 220);
        assert!(outcome.trailer_written);
        assert!(!outcome.truncated());

        // Magic low nibbles, high nibble preserved.
        assert_eq!(&plane[0..4], &[0x8F, 0x87, 0x80, 0x81]);
        assert_eq!(plane[4] & 0x0F, nibbles[0]);
        assert_eq!(plane[4 + 219 * 12] & 0x0F, nibbles[219]);
        assert_eq!(&plane[2644..2647], &[0x00, 0xDC, 0xED]);

        let extracted = StegoChannel::default().extract(&plane, 64, 64).unwrap();
        assert_eq!(extracted.stride, 12);
        assert_eq!(extracted.trailer_offset, 2644);
        assert_eq!(extracted.nibbles, nibbles);
    }

    #[test]
    fn test_noise_alternates_and_clamps() {
        let nibbles = stream(60);

        let mut plane = vec![0x80u8; 4096];
        let outcome = StegoChannel::default().embed(&mut plane, 64, 64, &nibbles);
        let s = outcome.stride;
        assert_eq!(plane[HEADER_LEN + 1], 0x81);
        assert_eq!(plane[HEADER_LEN + s + 1], 0x7F);

        let mut bright = vec![0xFFu8; 4096];
        StegoChannel::default().embed(&mut bright, 64, 64, &nibbles);
        assert_eq!(bright[HEADER_LEN + 1], 0xFF);
        assert_eq!(bright[HEADER_LEN + s + 1], 0xFE);

        let mut dark = vec![0x00u8; 4096];
        StegoChannel::default().embed(&mut dark, 64, 64, &nibbles);
        assert_eq!(dark[HEADER_LEN + 1], 0x01);
        assert_eq!(dark[HEADER_LEN + s + 1], 0x00);
    }

    #[test]
    fn test_embed_preserves_length() {
        let mut plane = vec![0x42u8; 1000];
        StegoChannel::default().embed(&mut plane, 40, 25, &stream(120));
        assert_eq!(plane.len(), 1000);
    }

    #[test]
    fn test_roundtrip_with_unit_stride() {
        let nibbles = stream(110);
        let mut plane = vec![0x80u8; 300];
        let outcome = StegoChannel::default().embed(&mut plane, 20, 15, &nibbles);
        assert_eq!(outcome.stride, 1);
        assert!(!outcome.truncated());

        let extracted = StegoChannel::default().extract(&plane, 20, 15).unwrap();
        assert_eq!(extracted.nibbles, nibbles);
    }

    #[test]
    fn test_tiny_plane_degrades_silently() {
        let nibbles = stream(110);
        let mut plane = vec![0x80u8; 4];
        let outcome = StegoChannel::default().embed(&mut plane, 2, 2, &nibbles);

        assert_eq!(outcome.nibbles_written, 0);
        assert!(!outcome.trailer_written);
        assert!(outcome.truncated());
        assert!(StegoChannel::has_magic(&plane));
        assert!(StegoChannel::default().extract(&plane, 2, 2).is_none());
    }

    #[test]
    fn test_plane_shorter_than_magic() {
        let mut plane = vec![0u8; 2];
        StegoChannel::default().embed(&mut plane, 1, 2, &stream(110));
        assert_eq!(plane, vec![0x0F, 0x07]);
        assert!(StegoChannel::default().extract(&plane, 1, 2).is_none());
    }

    #[test]
    fn test_missing_magic_stops_immediately() {
        let nibbles = stream(110);
        let mut plane = vec![0x80u8; 4096];
        StegoChannel::default().embed(&mut plane, 64, 64, &nibbles);
        plane[3] ^= 0x01;

        assert!(StegoChannel::default().extract(&plane, 64, 64).is_none());
    }

    #[test]
    fn test_empty_stream_is_never_found() {
        let mut plane = vec![0x80u8; 4096];
        StegoChannel::default().embed(&mut plane, 64, 64, &[]);
        assert!(StegoChannel::default().extract(&plane, 64, 64).is_none());
    }

    #[test]
    fn test_corrupt_trailer_marker() {
        let nibbles = stream(110);
        let mut plane = vec![0x80u8; 4096];
        let outcome = StegoChannel::default().embed(&mut plane, 64, 64, &nibbles);
        plane[HEADER_LEN + 220 * outcome.stride + 2] ^= 0x01;

        assert!(StegoChannel::default().extract(&plane, 64, 64).is_none());
    }

    #[test]
    fn test_short_stream_needs_wider_search() {
        let nibbles = stream(25);
        let mut plane = vec![0x80u8; 4096];
        StegoChannel::default().embed(&mut plane, 64, 64, &nibbles);

        assert!(StegoChannel::default().extract(&plane, 64, 64).is_none());

        let wide = StegoChannel::new(LengthSearch::new(10, 2000).unwrap());
        assert_eq!(wide.extract(&plane, 64, 64).unwrap().nibbles, nibbles);
    }

    #[test]
    fn test_extract_is_read_only_and_repeatable() {
        let mut plane = vec![0x80u8; 4096];
        StegoChannel::default().embed(&mut plane, 64, 64, &stream(110));
        let snapshot = plane.clone();

        let first = StegoChannel::default().extract(&plane, 64, 64);
        let second = StegoChannel::default().extract(&plane, 64, 64);
        assert_eq!(first, second);
        assert_eq!(plane, snapshot);
    }
}
