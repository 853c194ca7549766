//! TEX container unwrapping

use crate::dds::DDS_MAGIC;
use crate::{FormatError, Result};
use byteorder::{LittleEndian, ReadBytesExt};

/// Magic for TEX version 1: "TEX\x01"
pub const TEX_MAGIC_V1: u32 = 0x0158_4554;

/// Magic for TEX version 2: "TEX\x02"
pub const TEX_MAGIC_V2: u32 = 0x0258_4554;

/// Minimum number of bytes a TEX file must have
pub const TEX_HEADER_SIZE: usize = 16;

/// Offset of the embedded DDS blob
///
/// The blob overlaps the last four header bytes, which hold its "DDS " tag.
pub const DDS_OFFSET: usize = 12;

/// Corrupted tag written by some tools in place of "DDS "
const DDS_MAGIC_CORRUPT: [u8; 4] = *b"DDSR";

/// TEX container version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum TexVersion {
    V1,
    V2,
}

impl TexVersion {
    fn from_magic(magic: u32) -> Option<Self> {
        match magic {
            TEX_MAGIC_V1 => Some(TexVersion::V1),
            TEX_MAGIC_V2 => Some(TexVersion::V2),
            _ => None,
        }
    }

    /// Version number as stored in the magic's last byte
    pub fn number(self) -> u8 {
        match self {
            TexVersion::V1 => 1,
            TexVersion::V2 => 2,
        }
    }
}

/// TEX file header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TexHeader {
    /// Container version from the magic
    pub version: TexVersion,
    /// Bytes 4..12, not interpreted
    pub metadata: [u8; 8],
}

impl TexHeader {
    /// Reads and validates the header at the start of a TEX file
    pub fn parse(raw: &[u8]) -> Result<Self> {
        if raw.len() < TEX_HEADER_SIZE {
            return Err(FormatError::TooShort {
                len: raw.len(),
                min: TEX_HEADER_SIZE,
            }
            .into());
        }

        let mut reader = raw;
        let magic = reader
            .read_u32::<LittleEndian>()
            .map_err(|_| FormatError::TooShort {
                len: raw.len(),
                min: TEX_HEADER_SIZE,
            })?;
        let version = TexVersion::from_magic(magic).ok_or(FormatError::InvalidMagic(magic))?;

        let mut metadata = [0u8; 8];
        metadata.copy_from_slice(&raw[4..DDS_OFFSET]);

        Ok(Self { version, metadata })
    }
}

/// DDS blob recovered from a TEX file
///
/// Always starts with "DDS". Owns its bytes so it outlives the input buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DdsBlob(Vec<u8>);

impl DdsBlob {
    /// Returns the blob bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consumes the blob, returning its bytes
    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }

    /// Returns the size of the blob in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the blob holds no bytes
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for DdsBlob {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Complete TEX container
#[derive(Debug, Clone)]
pub struct TexContainer {
    /// Container header
    pub header: TexHeader,
    /// Embedded DDS blob
    pub dds: DdsBlob,
}

impl TexContainer {
    /// Parses a TEX file into its header and DDS blob
    pub fn parse(raw: &[u8]) -> Result<Self> {
        let header = TexHeader::parse(raw)?;
        let dds = repair_dds(&raw[DDS_OFFSET..])?;
        Ok(Self { header, dds })
    }
}

/// Extracts the DDS blob from a TEX file
///
/// A "DDSR" tag is repaired to "DDS " before the blob is checked; no other
/// byte is changed.
pub fn extract_dds(raw: &[u8]) -> Result<DdsBlob> {
    TexHeader::parse(raw)?;
    repair_dds(&raw[DDS_OFFSET..])
}

fn repair_dds(bytes: &[u8]) -> Result<DdsBlob> {
    let mut dds = bytes.to_vec();
    if dds.starts_with(&DDS_MAGIC_CORRUPT) {
        dds[3] = DDS_MAGIC[3];
    }
    if !dds.starts_with(&DDS_MAGIC[..3]) {
        return Err(FormatError::MissingDdsTag.into());
    }
    Ok(DdsBlob(dds))
}
