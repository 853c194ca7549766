//! Conversion to `image` crate buffers

use image::RgbaImage;
use tqtex_core::{FormatError, PixelBuffer, Result};

/// Converts a pixel buffer into an [`RgbaImage`] without copying
pub fn into_rgba_image(buffer: PixelBuffer) -> Result<RgbaImage> {
    let (width, height, data) = buffer.into_parts();
    let actual = data.len();
    RgbaImage::from_raw(width, height, data).ok_or_else(|| {
        FormatError::PixelCountMismatch {
            width,
            height,
            expected: width as usize * height as usize * 4,
            actual,
        }
        .into()
    })
}
