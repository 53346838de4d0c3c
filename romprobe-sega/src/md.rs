//! Mega Drive / Genesis ROM header parsing, plain and SMD-interleaved.
//!
//! The plain header sits at 0x100, after the 68000 vector table:
//!
//! ```text
//! 0x100  16  System type ("SEGA MEGA DRIVE ", "SEGA GENESIS    ")
//! 0x110  16  Copyright / release date
//! 0x120  48  Domestic title (Shift-JIS)
//! 0x150  48  International title
//! 0x180  14  Serial number ("GM 00001009-00")
//! 0x18E  2   Checksum (big-endian)
//! 0x190  16  Device support codes
//! 0x1F0  3   Region codes
//! ```
//!
//! SMD dumps prepend a 512-byte copier header and interleave the ROM
//! in 16 KiB blocks; the blocks are de-interleaved before parsing.

use serde::Serialize;

use romprobe_core::text::extract_printable;
use romprobe_core::{GameInfo, IdentError, MemReader, Platform, RandomAccess, Region};

const HEADER_OFFSET: u64 = 0x100;
const HEADER_SIZE: usize = 0x100;
pub const MIN_SIZE: u64 = 0x200;

/// The system-type field always begins with "SEGA".
pub const SEGA_MAGIC: &[u8; 4] = b"SEGA";

/// SMD copier header size.
pub const SMD_HEADER_SIZE: u64 = 512;
/// SMD interleave block size.
const SMD_BLOCK_SIZE: usize = 16 * 1024;
const SMD_HALF_BLOCK: usize = SMD_BLOCK_SIZE / 2;

/// Metadata extracted from a Mega Drive ROM header.
#[derive(Debug, Clone, Serialize)]
pub struct MdInfo {
    /// System type string.
    pub system_type: String,
    /// Copyright / release-date field.
    pub copyright: String,
    /// Domestic (Japanese) title, decoded from Shift-JIS.
    pub domestic_title: String,
    /// International title.
    pub international_title: String,
    /// Serial number (e.g. "GM 00001009-00").
    pub serial_number: String,
    /// Stored ROM checksum.
    pub checksum: u16,
    /// Device support codes.
    pub device_support: String,
    /// Raw region code characters.
    pub region_codes: String,
    /// True when the dump was SMD-interleaved.
    pub interleaved: bool,
}

impl GameInfo for MdInfo {
    fn platform(&self) -> Platform {
        Platform::MegaDrive
    }

    fn title(&self) -> String {
        if self.international_title.is_empty() {
            self.domestic_title.clone()
        } else {
            self.international_title.clone()
        }
    }

    fn serial(&self) -> String {
        self.serial_number.clone()
    }

    fn regions(&self) -> Vec<Region> {
        let mut regions = Vec::new();
        for c in self.region_codes.chars() {
            let region = match c.to_ascii_uppercase() {
                'J' => Region::Japan,
                'U' => Region::Usa,
                'E' => Region::Europe,
                // 'A' marks Asia on Mega Drive carts.
                'A' => Region::Asia,
                _ => continue,
            };
            if !regions.contains(&region) {
                regions.push(region);
            }
        }
        if regions.is_empty() {
            regions.push(Region::Unknown);
        }
        regions
    }
}

/// Decode a Shift-JIS field, falling back to a printable-ASCII
/// rendering when the bytes do not decode cleanly.
fn decode_shift_jis(data: &[u8]) -> String {
    let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
    let (text, _, had_errors) = encoding_rs::SHIFT_JIS.decode(&data[..end]);
    if had_errors {
        extract_printable(data)
    } else {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

fn parse_header_block(header: &[u8; HEADER_SIZE], interleaved: bool) -> Result<MdInfo, IdentError> {
    if &header[0..4] != SEGA_MAGIC {
        return Err(IdentError::invalid_format(
            "not a Mega Drive ROM: missing SEGA magic at 0x100",
        ));
    }

    Ok(MdInfo {
        system_type: extract_printable(&header[0x00..0x10]),
        copyright: extract_printable(&header[0x10..0x20]),
        domestic_title: decode_shift_jis(&header[0x20..0x50]),
        international_title: extract_printable(&header[0x50..0x80]),
        serial_number: extract_printable(&header[0x80..0x8E]),
        checksum: u16::from_be_bytes([header[0x8E], header[0x8F]]),
        device_support: extract_printable(&header[0x90..0xA0]),
        region_codes: extract_printable(&header[0xF0..0xF3]),
        interleaved,
    })
}

/// Parse a plain (non-interleaved) Mega Drive ROM.
pub fn parse_md(reader: &mut dyn RandomAccess, size: u64) -> Result<MdInfo, IdentError> {
    if size < MIN_SIZE {
        return Err(IdentError::TooSmall {
            expected: MIN_SIZE,
            actual: size,
        });
    }

    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact_at(&mut header, HEADER_OFFSET)?;
    parse_header_block(&header, false)
}

/// De-interleave one 16 KiB SMD block: even-indexed output bytes come
/// from the first 8 KiB, odd-indexed from the second.
fn deinterleave_block(block: &[u8]) -> Vec<u8> {
    let mut out = vec![0u8; SMD_BLOCK_SIZE];
    for i in 0..SMD_HALF_BLOCK {
        out[i * 2] = block[i];
        out[i * 2 + 1] = block[SMD_HALF_BLOCK + i];
    }
    out
}

/// Parse an SMD-interleaved Mega Drive ROM: validate the 512-byte SMD
/// header, de-interleave the first block, and parse the plain header
/// out of it.
pub fn parse_smd(reader: &mut dyn RandomAccess, size: u64) -> Result<MdInfo, IdentError> {
    let min = SMD_HEADER_SIZE + SMD_BLOCK_SIZE as u64;
    if size < min {
        return Err(IdentError::TooSmall {
            expected: min,
            actual: size,
        });
    }

    let mut smd_header = [0u8; 16];
    reader.read_exact_at(&mut smd_header, 0)?;
    // SMD signature: 0xAA 0xBB at offsets 8 and 9.
    if smd_header[8] != 0xAA || smd_header[9] != 0xBB {
        return Err(IdentError::invalid_format(
            "not an SMD ROM: copier signature missing",
        ));
    }

    let mut block = vec![0u8; SMD_BLOCK_SIZE];
    reader.read_exact_at(&mut block, SMD_HEADER_SIZE)?;
    let plain = deinterleave_block(&block);

    let mut mem = MemReader::new(plain);
    let mut header = [0u8; HEADER_SIZE];
    mem.read_exact_at(&mut header, HEADER_OFFSET)?;
    parse_header_block(&header, true)
}

#[cfg(test)]
#[path = "tests/md_tests.rs"]
mod tests;
