//! Bounds-checked access to the DDS header embedded in a TEX file

use crate::{FormatError, Result};
use byteorder::{ByteOrder, LittleEndian};
use std::fmt;

/// Magic tag at the start of every DDS blob: "DDS "
pub const DDS_MAGIC: [u8; 4] = *b"DDS ";

/// Size of the legacy DDS header, including the magic
pub const DDS_HEADER_SIZE: usize = 0x80;

/// Size of the optional DX10 extension that follows the legacy header
pub const DX10_HEADER_SIZE: usize = 20;

pub const HEIGHT_OFFSET: usize = 0x0C;
pub const WIDTH_OFFSET: usize = 0x10;
pub const MIPMAP_COUNT_OFFSET: usize = 0x1C;
pub const PIXELFORMAT_FLAGS_OFFSET: usize = 0x50;
pub const FOURCC_OFFSET: usize = 0x54;
pub const RGB_BIT_COUNT_OFFSET: usize = 0x58;
pub const DX10_FORMAT_OFFSET: usize = 0x80;

/// Four-character code identifying a compressed pixel format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FourCc(pub [u8; 4]);

impl FourCc {
    pub const DXT1: FourCc = FourCc(*b"DXT1");
    pub const DXT2: FourCc = FourCc(*b"DXT2");
    pub const DXT3: FourCc = FourCc(*b"DXT3");
    pub const DXT4: FourCc = FourCc(*b"DXT4");
    pub const DXT5: FourCc = FourCc(*b"DXT5");
    pub const ATI1: FourCc = FourCc(*b"ATI1");
    pub const ATI2: FourCc = FourCc(*b"ATI2");
    pub const BC4U: FourCc = FourCc(*b"BC4U");
    pub const BC5U: FourCc = FourCc(*b"BC5U");
    pub const DX10: FourCc = FourCc(*b"DX10");

    /// An all-zero code marks uncompressed pixel data
    pub fn is_uncompressed(&self) -> bool {
        self.0 == [0; 4]
    }
}

impl fmt::Display for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
            for &b in &self.0 {
                write!(f, "{}", b as char)?;
            }
            Ok(())
        } else {
            write!(f, "0x{:08X}", u32::from_le_bytes(self.0))
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for FourCc {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

/// Fields of the legacy DDS header used to pick and run a decode path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DdsHeader {
    /// Surface height in pixels
    pub height: u32,
    /// Surface width in pixels
    pub width: u32,
    /// Number of mip levels (0 when the header does not say)
    pub mipmap_count: u32,
    /// DDPF_* flags of the pixel format
    pub pixel_format_flags: u32,
    /// Compression format, all zero for uncompressed data
    pub fourcc: FourCc,
    /// Bits per pixel for uncompressed data
    pub rgb_bit_count: u32,
}

impl DdsHeader {
    /// Reads the header fields from the start of a DDS blob
    ///
    /// Fails with [`FormatError::TruncatedHeader`] naming the first field that
    /// lies past the end of `blob`.
    pub fn parse(blob: &[u8]) -> Result<Self> {
        Ok(Self {
            height: read_u32_at(blob, HEIGHT_OFFSET, "height")?,
            width: read_u32_at(blob, WIDTH_OFFSET, "width")?,
            mipmap_count: read_u32_at(blob, MIPMAP_COUNT_OFFSET, "mipmap count")?,
            pixel_format_flags: read_u32_at(blob, PIXELFORMAT_FLAGS_OFFSET, "pixel format flags")?,
            fourcc: read_fourcc(blob)?,
            rgb_bit_count: read_u32_at(blob, RGB_BIT_COUNT_OFFSET, "bit depth")?,
        })
    }

    /// Returns true when the pixel data is stored without block compression
    pub fn is_uncompressed(&self) -> bool {
        self.fourcc.is_uncompressed()
    }
}

/// Reads the compression format tag at offset 84
pub fn read_fourcc(blob: &[u8]) -> Result<FourCc> {
    let bytes = field(blob, FOURCC_OFFSET, "fourcc")?;
    Ok(FourCc([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Reads the DXGI format of a DX10 extension header
pub fn read_dx10_format(blob: &[u8]) -> Result<u32> {
    read_u32_at(blob, DX10_FORMAT_OFFSET, "DXGI format")
}

/// Reads a little-endian u32 at `offset`, failing if it runs past the end
pub fn read_u32_at(bytes: &[u8], offset: usize, name: &'static str) -> Result<u32> {
    field(bytes, offset, name).map(LittleEndian::read_u32)
}

fn field<'a>(bytes: &'a [u8], offset: usize, name: &'static str) -> Result<&'a [u8]> {
    bytes.get(offset..offset + 4).ok_or_else(|| {
        FormatError::TruncatedHeader {
            field: name,
            offset,
            len: bytes.len(),
        }
        .into()
    })
}
