//! DDS pixel decoding with dispatch between the uncompressed and block paths

use crate::block_decoder::{BlockDecoder, DecodedImage, Texture2dDecoder};
use tqtex_core::dds::{DdsHeader, DDS_HEADER_SIZE};
use tqtex_core::pixel::rgba_len;
use tqtex_core::{
    extract_dds, ChannelOrder, FormatError, PixelBuffer, Result, UnsupportedFormatError,
};

/// Decoder configuration
#[derive(Debug, Clone)]
pub struct DecodeOptions {
    /// Largest width or height accepted before any pixel memory is allocated
    pub max_dimension: u32,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_dimension: 16384,
        }
    }
}

/// Decodes DDS blobs into RGBA pixel buffers
///
/// Stateless: one decoder can serve any number of threads.
pub struct TexDecoder<B = Texture2dDecoder> {
    options: DecodeOptions,
    block_decoder: B,
}

impl TexDecoder<Texture2dDecoder> {
    /// Creates a decoder using the default block decoder
    pub fn new(options: DecodeOptions) -> Self {
        Self::with_block_decoder(options, Texture2dDecoder)
    }
}

impl Default for TexDecoder<Texture2dDecoder> {
    fn default() -> Self {
        Self::new(DecodeOptions::default())
    }
}

impl<B: BlockDecoder> TexDecoder<B> {
    /// Creates a decoder that hands compressed data to `block_decoder`
    pub fn with_block_decoder(options: DecodeOptions, block_decoder: B) -> Self {
        Self {
            options,
            block_decoder,
        }
    }

    /// Returns the decoder configuration
    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Decodes a TEX file: extracts its DDS blob, then decodes that
    pub fn decode_tex(&self, raw: &[u8]) -> Result<PixelBuffer> {
        let dds = extract_dds(raw)?;
        self.decode(dds.as_bytes())
    }

    /// Decodes a DDS blob
    ///
    /// An all-zero FourCC selects the uncompressed 32-bit BGRA path; anything
    /// else goes through the block decoder.
    pub fn decode(&self, blob: &[u8]) -> Result<PixelBuffer> {
        let header = DdsHeader::parse(blob)?;
        self.check_dimensions(header.width, header.height)?;

        if header.is_uncompressed() {
            decode_bgra32(blob, &header)
        } else {
            self.decode_compressed(blob)
        }
    }

    fn decode_compressed(&self, blob: &[u8]) -> Result<PixelBuffer> {
        let DecodedImage {
            width,
            height,
            mut pixels,
            order,
        } = self.block_decoder.decode_blocks(blob)?;
        self.check_dimensions(width, height)?;

        order.to_rgba_in_place(&mut pixels);
        PixelBuffer::new(width, height, pixels)
    }

    fn check_dimensions(&self, width: u32, height: u32) -> Result<()> {
        if width > self.options.max_dimension || height > self.options.max_dimension {
            return Err(FormatError::DimensionsTooLarge { width, height }.into());
        }
        Ok(())
    }
}

/// Decodes the first surface of an uncompressed A8R8G8B8 blob
fn decode_bgra32(blob: &[u8], header: &DdsHeader) -> Result<PixelBuffer> {
    if header.rgb_bit_count != 32 {
        return Err(UnsupportedFormatError::BitDepth(header.rgb_bit_count).into());
    }

    let expected = rgba_len(header.width, header.height)?;
    let data = blob.get(DDS_HEADER_SIZE..).unwrap_or_default();
    if data.len() < expected {
        return Err(FormatError::TruncatedPixelData {
            expected,
            available: data.len(),
        }
        .into());
    }

    let mut pixels = data[..expected].to_vec();
    ChannelOrder::Bgra.to_rgba_in_place(&mut pixels);
    PixelBuffer::new(header.width, header.height, pixels)
}
