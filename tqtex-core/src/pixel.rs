//! Canonical decoded pixel data

use crate::{FormatError, Result};

/// Byte order of a 4-byte pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelOrder {
    Rgba,
    Bgra,
}

impl ChannelOrder {
    /// Rewrites packed pixels in this order to RGBA in place
    pub fn to_rgba_in_place(self, pixels: &mut [u8]) {
        match self {
            ChannelOrder::Rgba => {}
            ChannelOrder::Bgra => {
                for px in pixels.chunks_exact_mut(4) {
                    px.swap(0, 2);
                }
            }
        }
    }
}

/// Decoded image: RGBA, one byte per channel, row-major, top row first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wraps RGBA bytes, checking that `data` holds exactly `width * height` pixels
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = rgba_len(width, height)?;
        if data.len() != expected {
            return Err(FormatError::PixelCountMismatch {
                width,
                height,
                expected,
                actual: data.len(),
            }
            .into());
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the RGBA bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Returns the RGBA value of the pixel at (x, y)
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let start = (y as usize * self.width as usize + x as usize) * 4;
        let px = &self.data[start..start + 4];
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Consumes the buffer, returning width, height and RGBA bytes
    pub fn into_parts(self) -> (u32, u32, Vec<u8>) {
        (self.width, self.height, self.data)
    }
}

/// Number of bytes needed for `width * height` RGBA pixels
pub fn rgba_len(width: u32, height: u32) -> Result<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| FormatError::DimensionsTooLarge { width, height }.into())
}
