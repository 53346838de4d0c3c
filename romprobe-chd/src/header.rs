//! CHD v5 header parsing.
//!
//! V5 header layout (124 bytes, all integers big-endian):
//!
//! ```text
//! Offset  Size  Description
//! 0       8     Magic ("MComprHD")
//! 8       4     Header length
//! 12      4     Version
//! 16      16    Compressors[0..4] (4-byte ASCII tags)
//! 32      8     Logical bytes
//! 40      8     Map offset
//! 48      8     Metadata offset
//! 56      4     Hunk bytes
//! 60      4     Unit bytes
//! 64      20    Raw SHA1 (uncompressed data)
//! 84      20    SHA1 (compressed data)
//! 104     20    Parent SHA1 (all zeros when standalone)
//! ```

use romprobe_core::{IdentError, RandomAccess};

pub const CHD_MAGIC: &[u8; 8] = b"MComprHD";
pub const HEADER_SIZE: u64 = 124;

const RAW_SHA1_OFFSET: usize = 64;
const SHA1_OFFSET: usize = 84;
const PARENT_SHA1_OFFSET: usize = 104;
const SHA1_SIZE: usize = 20;

/// Build a codec tag from its 4-byte ASCII name.
pub const fn make_tag(name: &[u8; 4]) -> u32 {
    u32::from_be_bytes(*name)
}

pub const CODEC_NONE: u32 = 0;
pub const CODEC_ZLIB: u32 = make_tag(b"zlib");
pub const CODEC_LZMA: u32 = make_tag(b"lzma");
pub const CODEC_HUFF: u32 = make_tag(b"huff");
pub const CODEC_FLAC: u32 = make_tag(b"flac");
pub const CODEC_ZSTD: u32 = make_tag(b"zstd");
pub const CODEC_CD_ZLIB: u32 = make_tag(b"cdzl");
pub const CODEC_CD_LZMA: u32 = make_tag(b"cdlz");
pub const CODEC_CD_FLAC: u32 = make_tag(b"cdfl");
pub const CODEC_CD_ZSTD: u32 = make_tag(b"cdzs");

/// Render a codec tag as its ASCII name for messages and metadata.
pub fn codec_name(tag: u32) -> String {
    if tag == 0 {
        return "none".to_string();
    }
    let bytes = tag.to_be_bytes();
    if bytes.iter().all(|b| b.is_ascii_graphic()) {
        String::from_utf8_lossy(&bytes).into_owned()
    } else {
        format!("0x{:08x}", tag)
    }
}

/// Parsed CHD v5 header.
#[derive(Debug, Clone)]
pub struct ChdHeader {
    /// Format version (5 or later).
    pub version: u32,
    /// Up to four codec slots referenced by hunk-map entries 0–3.
    pub compressors: [u32; 4],
    /// Total uncompressed size.
    pub logical_bytes: u64,
    /// File offset of the hunk map.
    pub map_offset: u64,
    /// File offset of the first metadata entry (0 = none).
    pub meta_offset: u64,
    /// Bytes per hunk.
    pub hunk_bytes: u32,
    /// Bytes per unit (sector size for disc images).
    pub unit_bytes: u32,
    /// ⌈logical_bytes ÷ hunk_bytes⌉.
    pub total_hunks: u32,
    /// SHA1 of the raw (uncompressed) data, 40 hex chars.
    pub raw_sha1: String,
    /// SHA1 of the compressed stream, 40 hex chars.
    pub sha1: String,
    /// SHA1 of the parent image; empty when standalone.
    pub parent_sha1: String,
}

impl ChdHeader {
    /// Read and validate the header at offset 0.
    pub fn parse(reader: &mut dyn RandomAccess, size: u64) -> Result<Self, IdentError> {
        if size < HEADER_SIZE {
            return Err(IdentError::TooSmall {
                expected: HEADER_SIZE,
                actual: size,
            });
        }

        let mut header = [0u8; HEADER_SIZE as usize];
        reader.read_exact_at(&mut header, 0)?;

        if &header[0..8] != CHD_MAGIC {
            return Err(IdentError::invalid_format("not a CHD file: bad magic"));
        }

        let header_len = u32::from_be_bytes(header[8..12].try_into().unwrap());
        let version = u32::from_be_bytes(header[12..16].try_into().unwrap());
        if version < 5 {
            return Err(IdentError::unsupported(format!(
                "CHD version {} not supported (v5 or later required)",
                version
            )));
        }
        if (header_len as u64) < HEADER_SIZE {
            return Err(IdentError::corrupted_header(format!(
                "CHD header length {} too small",
                header_len
            )));
        }

        let mut compressors = [0u32; 4];
        for (i, slot) in compressors.iter_mut().enumerate() {
            *slot = u32::from_be_bytes(header[16 + i * 4..20 + i * 4].try_into().unwrap());
        }

        let logical_bytes = u64::from_be_bytes(header[32..40].try_into().unwrap());
        let map_offset = u64::from_be_bytes(header[40..48].try_into().unwrap());
        let meta_offset = u64::from_be_bytes(header[48..56].try_into().unwrap());
        let hunk_bytes = u32::from_be_bytes(header[56..60].try_into().unwrap());
        let unit_bytes = u32::from_be_bytes(header[60..64].try_into().unwrap());
        if hunk_bytes == 0 || unit_bytes == 0 {
            return Err(IdentError::corrupted_header(format!(
                "CHD hunk size {} / unit size {} invalid",
                hunk_bytes, unit_bytes
            )));
        }

        let total_hunks =
            ((logical_bytes + hunk_bytes as u64 - 1) / hunk_bytes as u64) as u32;

        let raw_sha1 = hex(&header[RAW_SHA1_OFFSET..RAW_SHA1_OFFSET + SHA1_SIZE]);
        let sha1 = hex(&header[SHA1_OFFSET..SHA1_OFFSET + SHA1_SIZE]);

        let parent_bytes = &header[PARENT_SHA1_OFFSET..PARENT_SHA1_OFFSET + SHA1_SIZE];
        let parent_sha1 = if parent_bytes.iter().any(|&b| b != 0) {
            hex(parent_bytes)
        } else {
            String::new()
        };

        Ok(Self {
            version,
            compressors,
            logical_bytes,
            map_offset,
            meta_offset,
            hunk_bytes,
            unit_bytes,
            total_hunks,
            raw_sha1,
            sha1,
            parent_sha1,
        })
    }

    /// Whether the unit size marks this as a CD-ROM image
    /// (2448 = raw sector + subcode, 2352 = raw sector).
    pub fn is_cd_rom(&self) -> bool {
        self.unit_bytes == 2448 || self.unit_bytes == 2352
    }
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
#[path = "tests/header_tests.rs"]
mod tests;
