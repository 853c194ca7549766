//! tqtex Core Library
//!
//! This library provides the data structures shared by the tqtex crates: the
//! Titan Quest TEX container unwrapper, a bounds-checked view over the embedded
//! DDS header, and the canonical RGBA pixel buffer.

pub mod container;
pub mod dds;
pub mod pixel;

pub use container::{extract_dds, DdsBlob, TexContainer, TexHeader, TexVersion};
pub use dds::{DdsHeader, FourCc};
pub use pixel::{ChannelOrder, PixelBuffer};

/// Result type for tqtex operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for tqtex operations
///
/// Callers can tell malformed input ([`Error::Format`]) apart from valid input
/// using an encoding that is not implemented ([`Error::Unsupported`]).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    #[error("Unsupported format: {0}")]
    Unsupported(#[from] UnsupportedFormatError),
}

impl Error {
    /// Returns true if the input is malformed or truncated
    pub fn is_format(&self) -> bool {
        matches!(self, Error::Format(_))
    }

    /// Returns true if the input is well formed but uses an unimplemented encoding
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Error::Unsupported(_))
    }
}

/// Malformed or truncated input
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("TEX file too short: {len} bytes, need at least {min}")]
    TooShort { len: usize, min: usize },

    #[error("Invalid TEX magic 0x{0:08X}, expected 'TEX\\x01' or 'TEX\\x02'")]
    InvalidMagic(u32),

    #[error("No DDS header found after TEX header")]
    MissingDdsTag,

    #[error("DDS header truncated: {field} at offset {offset} is past the end ({len} bytes)")]
    TruncatedHeader {
        field: &'static str,
        offset: usize,
        len: usize,
    },

    #[error("Truncated pixel data: need {expected} bytes, have {available}")]
    TruncatedPixelData { expected: usize, available: usize },

    #[error("Pixel count mismatch: {width}x{height} needs {expected} bytes, got {actual}")]
    PixelCountMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("Implausible dimensions {width}x{height}")]
    DimensionsTooLarge { width: u32, height: u32 },

    #[error("Block data rejected: {0}")]
    BlockData(String),
}

/// Structurally valid input using a pixel encoding that is not implemented
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnsupportedFormatError {
    #[error("Only 32-bit A8R8G8B8 is supported for uncompressed data, got {0}-bit")]
    BitDepth(u32),

    #[error("Unknown compression format '{0}'")]
    FourCc(FourCc),

    #[error("Unknown DXGI format {0}")]
    DxgiFormat(u32),
}
