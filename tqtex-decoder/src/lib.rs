//! tqtex Decoder Library
//!
//! This library decodes the DDS payload of Titan Quest TEX files into RGBA
//! pixel buffers. Uncompressed 32-bit BGRA data is decoded directly; block
//! compressed data goes through a [`BlockDecoder`].

pub mod block_decoder;
pub mod pixel_decoder;
pub mod rgba_image;

pub use block_decoder::{BlockDecoder, DecodedImage, SurfaceFormat, Texture2dDecoder};
pub use pixel_decoder::{DecodeOptions, TexDecoder};
pub use rgba_image::into_rgba_image;
pub use tqtex_core::{Error, FormatError, PixelBuffer, Result, UnsupportedFormatError};

/// Decodes a DDS blob with the default options and block decoder
pub fn decode(blob: &[u8]) -> Result<PixelBuffer> {
    TexDecoder::new(DecodeOptions::default()).decode(blob)
}

/// Decodes a TEX file with the default options and block decoder
pub fn decode_tex(raw: &[u8]) -> Result<PixelBuffer> {
    TexDecoder::new(DecodeOptions::default()).decode_tex(raw)
}
