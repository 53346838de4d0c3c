//! RVZ / WIA container parsing.
//!
//! Both formats wrap a GameCube/Wii disc. The file header carries the
//! container metadata; the disc struct at 0x48 embeds the first 0x80
//! bytes of the raw GCM disc header (`dhead`) uncompressed, so disc
//! identification never needs to decompress chunk data.
//!
//! ```text
//! 0x00  4   Magic: "WIA\x01" or "RVZ\x01"
//! 0x04  4   Version
//! 0x08  4   Compatible version
//! 0x0C  4   Disc-struct size
//! 0x10  20  Disc-struct hash
//! 0x24  8   ISO file size
//! 0x2C  8   Container file size
//! 0x34  20  Header hash
//! 0x48  ...  Disc struct: type, compression, level, chunk size, dhead
//! ```

use serde::Serialize;

use romprobe_core::{GameInfo, IdentError, MemReader, Platform, RandomAccess, Region};

use crate::gamecube::{parse_gcm, GcmInfo};

pub const WIA_MAGIC: &[u8; 4] = b"WIA\x01";
pub const RVZ_MAGIC: &[u8; 4] = b"RVZ\x01";

const DISC_STRUCT_BASE: usize = 0x48;
const DHEAD_OFFSET: usize = 0x10;
const DHEAD_SIZE: usize = 0x80;

/// Total bytes the parser consumes from the file head.
pub const HEADER_SIZE: u64 = (DISC_STRUCT_BASE + DHEAD_OFFSET + DHEAD_SIZE) as u64;

/// Compression method used for chunk data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RvzCompression {
    None,
    Purge,
    Bzip2,
    Lzma,
    Lzma2,
    Zstandard,
    Unknown,
}

impl RvzCompression {
    fn from_raw(raw: u32) -> Self {
        match raw {
            0 => Self::None,
            1 => Self::Purge,
            2 => Self::Bzip2,
            3 => Self::Lzma,
            4 => Self::Lzma2,
            5 => Self::Zstandard,
            _ => Self::Unknown,
        }
    }
}

/// Metadata extracted from an RVZ/WIA container.
#[derive(Debug, Clone, Serialize)]
pub struct RvzInfo {
    /// True for RVZ containers, false for WIA.
    pub is_rvz: bool,
    /// Container format version.
    pub version: u32,
    /// Oldest compatible reader version.
    pub compatible_version: u32,
    /// Size of the original ISO image.
    pub iso_file_size: u64,
    /// Size of the container file as recorded in the header.
    pub container_file_size: u64,
    /// Disc type: 1 GameCube, 2 Wii.
    pub disc_type: u32,
    pub compression: RvzCompression,
    pub compression_level: i32,
    /// Chunk size for compressed data.
    pub chunk_size: u32,
    /// Disc identification parsed from the embedded GCM header.
    pub gcm: GcmInfo,
}

impl GameInfo for RvzInfo {
    fn platform(&self) -> Platform {
        self.gcm.platform()
    }

    fn title(&self) -> String {
        self.gcm.title()
    }

    fn serial(&self) -> String {
        self.gcm.serial()
    }

    fn maker_code(&self) -> String {
        self.gcm.maker_code()
    }

    fn regions(&self) -> Vec<Region> {
        self.gcm.regions()
    }

    fn disc_number(&self) -> Option<u32> {
        self.gcm.disc_number()
    }
}

/// Parse an RVZ/WIA header and identify the embedded disc.
pub fn parse_rvz(reader: &mut dyn RandomAccess, size: u64) -> Result<RvzInfo, IdentError> {
    if size < HEADER_SIZE {
        return Err(IdentError::TooSmall {
            expected: HEADER_SIZE,
            actual: size,
        });
    }

    let mut header = [0u8; HEADER_SIZE as usize];
    reader.read_exact_at(&mut header, 0)?;

    let is_rvz = match &header[0..4] {
        m if m == RVZ_MAGIC => true,
        m if m == WIA_MAGIC => false,
        _ => {
            return Err(IdentError::invalid_format(
                "not an RVZ/WIA container: bad magic",
            ))
        }
    };

    let version = u32::from_be_bytes(header[0x04..0x08].try_into().unwrap());
    let compatible_version = u32::from_be_bytes(header[0x08..0x0C].try_into().unwrap());
    let iso_file_size = u64::from_be_bytes(header[0x24..0x2C].try_into().unwrap());
    let container_file_size = u64::from_be_bytes(header[0x2C..0x34].try_into().unwrap());

    let disc = &header[DISC_STRUCT_BASE..];
    let disc_type = u32::from_be_bytes(disc[0x00..0x04].try_into().unwrap());
    let compression = RvzCompression::from_raw(u32::from_be_bytes(disc[0x04..0x08].try_into().unwrap()));
    let compression_level = i32::from_be_bytes(disc[0x08..0x0C].try_into().unwrap());
    let chunk_size = u32::from_be_bytes(disc[0x0C..0x10].try_into().unwrap());

    // Disc identification comes straight from the embedded header.
    let dhead = &disc[DHEAD_OFFSET..DHEAD_OFFSET + DHEAD_SIZE];
    let mut dhead_reader = MemReader::new(dhead.to_vec());
    let gcm = parse_gcm(&mut dhead_reader, DHEAD_SIZE as u64)?;

    Ok(RvzInfo {
        is_rvz,
        version,
        compatible_version,
        iso_file_size,
        container_file_size,
        disc_type,
        compression,
        compression_level,
        chunk_size,
        gcm,
    })
}

#[cfg(test)]
#[path = "tests/rvz_tests.rs"]
mod tests;
