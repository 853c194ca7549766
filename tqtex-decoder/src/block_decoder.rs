//! Block-compressed DDS decoding

use tqtex_core::dds::{self, DdsHeader, FourCc, DDS_HEADER_SIZE, DX10_HEADER_SIZE};
use tqtex_core::pixel::rgba_len;
use tqtex_core::{ChannelOrder, FormatError, Result, UnsupportedFormatError};

/// Pixels produced by a [`BlockDecoder`], in the decoder's native channel order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
    pub order: ChannelOrder,
}

/// Decodes the pixel data of a DDS blob whose FourCC is not zero
///
/// Implementations receive the whole blob, header included, and interpret any
/// format fields they need themselves.
pub trait BlockDecoder: Send + Sync {
    fn decode_blocks(&self, blob: &[u8]) -> Result<DecodedImage>;
}

/// Surface encodings understood by [`Texture2dDecoder`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceFormat {
    /// a.k.a. DXT1
    Bc1,
    /// a.k.a. DXT2/3
    Bc2,
    /// a.k.a. DXT4/5
    Bc3,
    Bc4,
    Bc5,
    Bc7,
    /// Uncompressed, declared through a DX10 header
    Bgra8,
    /// Uncompressed, declared through a DX10 header
    Rgba8,
}

impl SurfaceFormat {
    /// Bytes per 4x4 block, or `None` for uncompressed formats
    fn block_size(self) -> Option<usize> {
        match self {
            SurfaceFormat::Bc1 | SurfaceFormat::Bc4 => Some(8),
            SurfaceFormat::Bc2 | SurfaceFormat::Bc3 | SurfaceFormat::Bc5 | SurfaceFormat::Bc7 => {
                Some(16)
            }
            SurfaceFormat::Bgra8 | SurfaceFormat::Rgba8 => None,
        }
    }

    /// Size of the first mip level of a `width` x `height` surface
    pub fn surface_len(self, width: u32, height: u32) -> Result<usize> {
        let Some(block_size) = self.block_size() else {
            return rgba_len(width, height);
        };
        (width.div_ceil(4) as usize)
            .checked_mul(height.div_ceil(4) as usize)
            .and_then(|blocks| blocks.checked_mul(block_size))
            .ok_or_else(|| FormatError::DimensionsTooLarge { width, height }.into())
    }
}

const DXGI_FORMAT_R8G8B8A8_TYPELESS: u32 = 27;
const DXGI_FORMAT_R8G8B8A8_UNORM: u32 = 28;
const DXGI_FORMAT_R8G8B8A8_UNORM_SRGB: u32 = 29;
const DXGI_FORMAT_BC1_TYPELESS: u32 = 70;
const DXGI_FORMAT_BC1_UNORM_SRGB: u32 = 72;
const DXGI_FORMAT_BC2_TYPELESS: u32 = 73;
const DXGI_FORMAT_BC2_UNORM_SRGB: u32 = 75;
const DXGI_FORMAT_BC3_TYPELESS: u32 = 76;
const DXGI_FORMAT_BC3_UNORM_SRGB: u32 = 78;
const DXGI_FORMAT_BC4_TYPELESS: u32 = 79;
const DXGI_FORMAT_BC4_UNORM: u32 = 80;
const DXGI_FORMAT_BC5_TYPELESS: u32 = 82;
const DXGI_FORMAT_BC5_UNORM: u32 = 83;
const DXGI_FORMAT_B8G8R8A8_UNORM: u32 = 87;
const DXGI_FORMAT_B8G8R8A8_TYPELESS: u32 = 90;
const DXGI_FORMAT_B8G8R8A8_UNORM_SRGB: u32 = 91;
const DXGI_FORMAT_BC7_TYPELESS: u32 = 97;
const DXGI_FORMAT_BC7_UNORM_SRGB: u32 = 99;

/// Works out the surface format and where its data starts
pub fn detect_format(blob: &[u8], fourcc: FourCc) -> Result<(SurfaceFormat, usize)> {
    let format = match fourcc {
        FourCc::DXT1 => SurfaceFormat::Bc1,
        FourCc::DXT2 | FourCc::DXT3 => SurfaceFormat::Bc2,
        FourCc::DXT4 | FourCc::DXT5 => SurfaceFormat::Bc3,
        FourCc::ATI1 | FourCc::BC4U => SurfaceFormat::Bc4,
        FourCc::ATI2 | FourCc::BC5U => SurfaceFormat::Bc5,
        FourCc::DX10 => {
            let format = match dds::read_dx10_format(blob)? {
                DXGI_FORMAT_BC1_TYPELESS..=DXGI_FORMAT_BC1_UNORM_SRGB => SurfaceFormat::Bc1,
                DXGI_FORMAT_BC2_TYPELESS..=DXGI_FORMAT_BC2_UNORM_SRGB => SurfaceFormat::Bc2,
                DXGI_FORMAT_BC3_TYPELESS..=DXGI_FORMAT_BC3_UNORM_SRGB => SurfaceFormat::Bc3,
                DXGI_FORMAT_BC4_TYPELESS | DXGI_FORMAT_BC4_UNORM => SurfaceFormat::Bc4,
                DXGI_FORMAT_BC5_TYPELESS | DXGI_FORMAT_BC5_UNORM => SurfaceFormat::Bc5,
                DXGI_FORMAT_BC7_TYPELESS..=DXGI_FORMAT_BC7_UNORM_SRGB => SurfaceFormat::Bc7,
                DXGI_FORMAT_B8G8R8A8_UNORM
                | DXGI_FORMAT_B8G8R8A8_TYPELESS
                | DXGI_FORMAT_B8G8R8A8_UNORM_SRGB => SurfaceFormat::Bgra8,
                DXGI_FORMAT_R8G8B8A8_TYPELESS
                | DXGI_FORMAT_R8G8B8A8_UNORM
                | DXGI_FORMAT_R8G8B8A8_UNORM_SRGB => SurfaceFormat::Rgba8,
                // BC6H is half-float HDR and has no 8-bit RGBA form without tone-mapping
                other => return Err(UnsupportedFormatError::DxgiFormat(other).into()),
            };
            return Ok((format, DDS_HEADER_SIZE + DX10_HEADER_SIZE));
        }
        other => return Err(UnsupportedFormatError::FourCc(other).into()),
    };
    Ok((format, DDS_HEADER_SIZE))
}

/// Block decoder backed by the `texture2ddecoder` crate
///
/// BC1 keeps its 1-bit alpha: index 3 of a block whose colour0 <= colour1 is
/// transparent black. Only the first mip level of the first surface is decoded.
#[derive(Debug, Clone, Copy, Default)]
pub struct Texture2dDecoder;

impl BlockDecoder for Texture2dDecoder {
    fn decode_blocks(&self, blob: &[u8]) -> Result<DecodedImage> {
        let header = DdsHeader::parse(blob)?;
        let (format, offset) = detect_format(blob, header.fourcc)?;
        let (width, height) = (header.width, header.height);

        let expected = format.surface_len(width, height)?;
        let data = blob.get(offset..).unwrap_or_default();
        if data.len() < expected {
            return Err(FormatError::TruncatedPixelData {
                expected,
                available: data.len(),
            }
            .into());
        }
        let data = &data[..expected];

        let (pixels, order) = match format {
            _ if width == 0 || height == 0 => (Vec::new(), ChannelOrder::Rgba),
            SurfaceFormat::Bgra8 => (data.to_vec(), ChannelOrder::Bgra),
            SurfaceFormat::Rgba8 => (data.to_vec(), ChannelOrder::Rgba),
            SurfaceFormat::Bc1 => decode_with_texture2d(format, width, height, |w, h, out| {
                texture2ddecoder::decode_bc1a(data, w, h, out)
            })?,
            SurfaceFormat::Bc2 => decode_with_texture2d(format, width, height, |w, h, out| {
                texture2ddecoder::decode_bc2(data, w, h, out)
            })?,
            SurfaceFormat::Bc3 => decode_with_texture2d(format, width, height, |w, h, out| {
                texture2ddecoder::decode_bc3(data, w, h, out)
            })?,
            SurfaceFormat::Bc4 => decode_with_texture2d(format, width, height, |w, h, out| {
                texture2ddecoder::decode_bc4(data, w, h, out)
            })?,
            SurfaceFormat::Bc5 => decode_with_texture2d(format, width, height, |w, h, out| {
                texture2ddecoder::decode_bc5(data, w, h, out)
            })?,
            SurfaceFormat::Bc7 => decode_with_texture2d(format, width, height, |w, h, out| {
                texture2ddecoder::decode_bc7(data, w, h, out)
            })?,
        };

        Ok(DecodedImage {
            width,
            height,
            pixels,
            order,
        })
    }
}

fn decode_with_texture2d<E: std::fmt::Debug>(
    format: SurfaceFormat,
    width: u32,
    height: u32,
    decode: impl FnOnce(usize, usize, &mut [u32]) -> std::result::Result<(), E>,
) -> Result<(Vec<u8>, ChannelOrder)> {
    let width_usize = width as usize;
    let height_usize = height as usize;
    let mut output = vec![0u32; width_usize * height_usize];

    decode(width_usize, height_usize, &mut output)
        .map_err(|e| FormatError::BlockData(format!("{format:?} decode failed: {e:?}")))?;

    // Each u32 is 0xAARRGGBB, so its little-endian bytes are B, G, R, A
    let pixels = output.iter().flat_map(|pixel| pixel.to_le_bytes()).collect();
    Ok((pixels, ChannelOrder::Bgra))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tqtex_core::dds::{FOURCC_OFFSET, HEIGHT_OFFSET, WIDTH_OFFSET};
    use tqtex_core::Error;

    fn dds_blob(width: u32, height: u32, fourcc: &[u8; 4], data: &[u8]) -> Vec<u8> {
        let mut blob = vec![0u8; DDS_HEADER_SIZE];
        blob[..4].copy_from_slice(b"DDS ");
        blob[HEIGHT_OFFSET..HEIGHT_OFFSET + 4].copy_from_slice(&height.to_le_bytes());
        blob[WIDTH_OFFSET..WIDTH_OFFSET + 4].copy_from_slice(&width.to_le_bytes());
        blob[FOURCC_OFFSET..FOURCC_OFFSET + 4].copy_from_slice(fourcc);
        blob.extend_from_slice(data);
        blob
    }

    fn dx10_blob(width: u32, height: u32, dxgi_format: u32, data: &[u8]) -> Vec<u8> {
        let mut extension = vec![0u8; DX10_HEADER_SIZE];
        extension[..4].copy_from_slice(&dxgi_format.to_le_bytes());
        extension.extend_from_slice(data);
        dds_blob(width, height, b"DX10", &extension)
    }

    /// BC1 block with color0 = pure red (RGB565 0xF800) and all indices 0
    const RED_BC1_BLOCK: [u8; 8] = [0x00, 0xF8, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];

    fn bc2_block(alpha: u64, color0: u16, indices: u32) -> Vec<u8> {
        let mut block = alpha.to_le_bytes().to_vec();
        block.extend_from_slice(&color0.to_le_bytes());
        block.extend_from_slice(&0u16.to_le_bytes());
        block.extend_from_slice(&indices.to_le_bytes());
        block
    }

    #[test]
    fn test_detect_legacy_fourcc() {
        let blob = dds_blob(4, 4, b"DXT1", &[]);
        assert_eq!(
            detect_format(&blob, FourCc::DXT1).unwrap(),
            (SurfaceFormat::Bc1, DDS_HEADER_SIZE)
        );
        assert_eq!(detect_format(&blob, FourCc::DXT3).unwrap().0, SurfaceFormat::Bc2);
        assert_eq!(detect_format(&blob, FourCc::DXT5).unwrap().0, SurfaceFormat::Bc3);
        assert_eq!(detect_format(&blob, FourCc::ATI2).unwrap().0, SurfaceFormat::Bc5);
    }

    #[test]
    fn test_detect_dx10_header() {
        let blob = dx10_blob(4, 4, 98, &[]);
        assert_eq!(
            detect_format(&blob, FourCc::DX10).unwrap(),
            (SurfaceFormat::Bc7, DDS_HEADER_SIZE + DX10_HEADER_SIZE)
        );
    }

    #[test]
    fn test_unknown_fourcc_is_unsupported() {
        let blob = dds_blob(4, 4, b"ETC1", &[0; 8]);
        let err = Texture2dDecoder.decode_blocks(&blob).unwrap_err();
        assert!(matches!(
            err,
            Error::Unsupported(UnsupportedFormatError::FourCc(FourCc(code))) if &code == b"ETC1"
        ));
    }

    #[test]
    fn test_bc6h_is_unsupported() {
        // DXGI_FORMAT_BC6H_UF16
        let blob = dx10_blob(4, 4, 95, &[0; 16]);
        let err = Texture2dDecoder.decode_blocks(&blob).unwrap_err();
        assert!(matches!(
            err,
            Error::Unsupported(UnsupportedFormatError::DxgiFormat(95))
        ));
    }

    #[test]
    fn test_surface_len_rounds_up_to_blocks() {
        assert_eq!(SurfaceFormat::Bc1.surface_len(4, 4).unwrap(), 8);
        assert_eq!(SurfaceFormat::Bc1.surface_len(5, 5).unwrap(), 32);
        assert_eq!(SurfaceFormat::Bc3.surface_len(8, 4).unwrap(), 32);
        assert_eq!(SurfaceFormat::Bgra8.surface_len(3, 2).unwrap(), 24);
    }

    #[test]
    fn test_bc1_solid_block() {
        let blob = dds_blob(4, 4, b"DXT1", &RED_BC1_BLOCK);
        let image = Texture2dDecoder.decode_blocks(&blob).unwrap();

        assert_eq!((image.width, image.height), (4, 4));
        assert_eq!(image.order, ChannelOrder::Bgra);
        assert_eq!(image.pixels.len(), 4 * 4 * 4);
        for px in image.pixels.chunks_exact(4) {
            assert_eq!(px, [0, 0, 255, 255]);
        }
    }

    #[test]
    fn test_bc1_punch_through_alpha() {
        // colour0 <= colour1 selects the three-colour palette; index 3 is transparent
        let block = [0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF];
        let blob = dds_blob(4, 4, b"DXT1", &block);
        let image = Texture2dDecoder.decode_blocks(&blob).unwrap();

        for px in image.pixels.chunks_exact(4) {
            assert_eq!(px[3], 0);
        }
    }

    #[test]
    fn test_bc1_dx10_punch_through_alpha() {
        let block = [0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF];
        let blob = dx10_blob(4, 4, 71, &block);
        let image = Texture2dDecoder.decode_blocks(&blob).unwrap();

        assert!(image.pixels.chunks_exact(4).all(|px| px[3] == 0));
    }

    #[test]
    fn test_bc2_explicit_alpha() {
        // Texel 0 fully transparent, texel 1 at 0x8 (136), rest opaque
        let data = bc2_block(0xFFFF_FFFF_FFFF_FF80, 0xF800, 0);
        let blob = dds_blob(4, 4, b"DXT3", &data);
        let image = Texture2dDecoder.decode_blocks(&blob).unwrap();

        assert_eq!(image.order, ChannelOrder::Bgra);
        assert_eq!(&image.pixels[0..4], &[0, 0, 255, 0]);
        assert_eq!(&image.pixels[4..8], &[0, 0, 255, 136]);
        assert_eq!(&image.pixels[8..12], &[0, 0, 255, 255]);
    }

    #[test]
    fn test_bc2_partial_block_clipped() {
        let data = bc2_block(u64::MAX, 0x07E0, 0);
        let blob = dds_blob(2, 3, b"DXT3", &data);
        let image = Texture2dDecoder.decode_blocks(&blob).unwrap();

        assert_eq!(image.pixels.len(), 2 * 3 * 4);
        for px in image.pixels.chunks_exact(4) {
            assert_eq!(px, [0, 255, 0, 255]);
        }
    }

    #[test]
    fn test_bc1_ignores_trailing_mips() {
        let mut data = RED_BC1_BLOCK.to_vec();
        data.extend_from_slice(&[0xFF; 8]);
        let blob = dds_blob(4, 4, b"DXT1", &data);

        let image = Texture2dDecoder.decode_blocks(&blob).unwrap();
        assert_eq!(image.pixels.len(), 64);
    }

    #[test]
    fn test_truncated_block_data_is_format_error() {
        let blob = dds_blob(8, 8, b"DXT5", &[0; 48]);
        let err = Texture2dDecoder.decode_blocks(&blob).unwrap_err();
        assert!(matches!(
            err,
            Error::Format(FormatError::TruncatedPixelData {
                expected: 64,
                available: 48
            })
        ));
    }

    #[test]
    fn test_dx10_bgra_passthrough() {
        let blob = dx10_blob(1, 1, DXGI_FORMAT_B8G8R8A8_UNORM, &[1, 2, 3, 4]);
        let image = Texture2dDecoder.decode_blocks(&blob).unwrap();

        assert_eq!(image.pixels, vec![1, 2, 3, 4]);
        assert_eq!(image.order, ChannelOrder::Bgra);
    }

    #[test]
    fn test_dx10_rgba_passthrough() {
        let blob = dx10_blob(1, 1, DXGI_FORMAT_R8G8B8A8_UNORM, &[1, 2, 3, 4]);
        let image = Texture2dDecoder.decode_blocks(&blob).unwrap();

        assert_eq!(image.pixels, vec![1, 2, 3, 4]);
        assert_eq!(image.order, ChannelOrder::Rgba);
    }
}
