//! Interleaved raster buffers.
//!
//! Decoding and encoding image files happens elsewhere. This module only
//! deals with the decoded form: `width * height` pixels of `channels`
//! interleaved bytes each.

use crate::error::{Result, StegoError};

/// Channel the watermark lives in (blue in an RGB or RGBA buffer).
pub const OWNERSHIP_CHANNEL: usize = 2;

/// A decoded, pixel-interleaved image.
///
/// The byte for channel `c` of pixel `(x, y)` is at
/// `(y * width + x) * channels + c`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: u32,
    height: u32,
    channels: u8,
    raw: Vec<u8>,
}

impl RasterImage {
    /// Wrap a raw buffer, checking its length against the geometry.
    pub fn new(width: u32, height: u32, channels: u8, raw: Vec<u8>) -> Result<Self> {
        let expected = Self::byte_len(width, height, channels);
        if raw.len() != expected {
            return Err(StegoError::BufferShape {
                expected,
                actual: raw.len(),
            });
        }
        Ok(Self {
            width,
            height,
            channels,
            raw,
        })
    }

    /// An image where every byte is `value`.
    pub fn filled(width: u32, height: u32, channels: u8, value: u8) -> Self {
        let len = Self::byte_len(width, height, channels);
        Self {
            width,
            height,
            channels,
            raw: vec![value; len],
        }
    }

    fn byte_len(width: u32, height: u32, channels: u8) -> usize {
        (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(channels as usize)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// Number of pixels.
    pub fn area(&self) -> usize {
        (self.width as usize).saturating_mul(self.height as usize)
    }

    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.raw
    }

    fn check_channel(&self, channel: usize) -> Result<()> {
        if channel >= self.channels as usize {
            return Err(StegoError::ChannelUnavailable {
                channel,
                channels: self.channels,
            });
        }
        Ok(())
    }

    /// Copy one channel out as a contiguous `width * height` plane.
    pub fn channel_plane(&self, channel: usize) -> Result<Vec<u8>> {
        self.check_channel(channel)?;
        Ok(self
            .raw
            .iter()
            .skip(channel)
            .step_by(self.channels as usize)
            .copied()
            .collect())
    }

    /// Write a plane produced by [`channel_plane`](Self::channel_plane)
    /// back into the interleaved buffer. Other channels are untouched.
    pub fn set_channel_plane(&mut self, channel: usize, plane: &[u8]) -> Result<()> {
        self.check_channel(channel)?;
        if plane.len() != self.area() {
            return Err(StegoError::BufferShape {
                expected: self.area(),
                actual: plane.len(),
            });
        }

        let stride = self.channels as usize;
        for (slot, &value) in self.raw.iter_mut().skip(channel).step_by(stride).zip(plane) {
            *slot = value;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32, channels: u8) -> RasterImage {
        let len = (width * height) as usize * channels as usize;
        let raw = (0..len).map(|i| i as u8).collect();
        RasterImage::new(width, height, channels, raw).unwrap()
    }

    #[test]
    fn test_shape_checked() {
        assert!(RasterImage::new(2, 2, 3, vec![0; 12]).is_ok());
        assert_eq!(
            RasterImage::new(2, 2, 3, vec![0; 11]),
            Err(StegoError::BufferShape {
                expected: 12,
                actual: 11
            })
        );
    }

    #[test]
    fn test_channel_plane_addressing() {
        let image = gradient(3, 2, 4);
        let plane = image.channel_plane(2).unwrap();
        assert_eq!(plane.len(), 6);
        // pixel (x=1, y=1) -> (1*3 + 1) * 4 + 2 = 18
        assert_eq!(plane[4], 18);
        assert_eq!(plane, vec![2, 6, 10, 14, 18, 22]);
    }

    #[test]
    fn test_missing_channel_rejected() {
        let image = RasterImage::filled(4, 4, 2, 0);
        assert_eq!(
            image.channel_plane(OWNERSHIP_CHANNEL),
            Err(StegoError::ChannelUnavailable {
                channel: 2,
                channels: 2
            })
        );
    }

    #[test]
    fn test_set_plane_leaves_other_channels() {
        let mut image = gradient(2, 2, 3);
        let before = image.clone();
        image.set_channel_plane(2, &[0xAA; 4]).unwrap();

        for (i, (&after, &orig)) in image.raw().iter().zip(before.raw()).enumerate() {
            if i % 3 == 2 {
                assert_eq!(after, 0xAA);
            } else {
                assert_eq!(after, orig);
            }
        }
    }

    #[test]
    fn test_set_plane_wrong_length() {
        let mut image = RasterImage::filled(2, 2, 3, 0);
        assert!(matches!(
            image.set_channel_plane(2, &[0; 3]),
            Err(StegoError::BufferShape { expected: 4, actual: 3 })
        ));
    }

    #[test]
    fn test_plane_roundtrip() {
        let mut image = gradient(5, 3, 3);
        let plane = image.channel_plane(1).unwrap();
        let before = image.clone();
        image.set_channel_plane(1, &plane).unwrap();
        assert_eq!(image, before);
    }
}
