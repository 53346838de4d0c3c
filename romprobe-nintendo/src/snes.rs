//! SNES ROM header parsing.
//!
//! The internal header lives at 0x7FC0 (LoROM) or 0xFFC0 (HiROM); both
//! locations are probed and validated through the checksum/complement
//! pair. Dumps from some copier hardware prepend an extra 512-byte
//! header, detected from the file size and skipped.
//!
//! Titles are JIS X 0201: ASCII plus half-width katakana in 0xA1–0xDF.

use serde::Serialize;

use romprobe_core::{GameInfo, IdentError, Platform, RandomAccess, Region};

pub const HEADER_SIZE: usize = 0x20;

const LOROM_OFFSET: u64 = 0x7FC0;
const HIROM_OFFSET: u64 = 0xFFC0;
const COPIER_HEADER_SIZE: u64 = 512;

const TITLE_LEN: usize = 21;
const MAP_MODE_OFFSET: usize = 0x15;
const CART_TYPE_OFFSET: usize = 0x16;
const ROM_SIZE_OFFSET: usize = 0x17;
const RAM_SIZE_OFFSET: usize = 0x18;
const DEST_CODE_OFFSET: usize = 0x19;
const MAKER_OLD_OFFSET: usize = 0x1A;
const VERSION_OFFSET: usize = 0x1B;
const COMPLEMENT_OFFSET: usize = 0x1C;
const CHECKSUM_OFFSET: usize = 0x1E;

/// Memory-map mode as stored at header offset 0x15.
pub const MAP_MODE_LOROM: u8 = 0x20;
pub const MAP_MODE_HIROM: u8 = 0x21;

/// Metadata extracted from a SNES ROM header.
#[derive(Debug, Clone, Serialize)]
pub struct SnesInfo {
    /// Game title (21 bytes, JIS X 0201, space-padded).
    pub title: String,
    /// Map mode byte (0x20 LoROM, 0x21 HiROM, fast variants +0x10).
    pub map_mode: u8,
    /// Cartridge type code.
    pub cartridge_type: u8,
    /// ROM size code (1 KiB << n).
    pub rom_size_code: u8,
    /// RAM size code (1 KiB << n, 0 = none).
    pub ram_size_code: u8,
    /// Destination (region) code.
    pub destination_code: u8,
    /// Old maker code byte.
    pub maker_code: u8,
    /// ROM version.
    pub version: u8,
    /// Stored checksum.
    pub checksum: u16,
    /// Stored checksum complement; sums with checksum to 0xFFFF.
    pub complement: u16,
    /// True when the header validated at 0xFFC0 rather than 0x7FC0.
    pub is_hirom: bool,
    /// True when a 512-byte copier header was detected and skipped.
    pub has_copier_header: bool,
}

impl GameInfo for SnesInfo {
    fn platform(&self) -> Platform {
        Platform::Snes
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    fn maker_code(&self) -> String {
        format!("{:02X}", self.maker_code)
    }

    fn regions(&self) -> Vec<Region> {
        let region = match self.destination_code {
            0x00 => Region::Japan,
            0x01 => Region::Usa,
            0x02 => Region::Europe,
            0x03 => Region::Sweden,
            0x04 => Region::Finland,
            0x05 => Region::Denmark,
            0x06 => Region::France,
            0x07 => Region::Netherlands,
            0x08 => Region::Spain,
            0x09 => Region::Germany,
            0x0A => Region::Italy,
            0x0B => Region::China,
            0x0D => Region::Korea,
            0x0F => Region::Canada,
            0x10 => Region::Brazil,
            0x11 => Region::Australia,
            _ => Region::Unknown,
        };
        vec![region]
    }
}

/// Decode a JIS X 0201 title: ASCII plus half-width katakana
/// (0xA1–0xDF → U+FF61–U+FF9F). Falls back to a lossy rendering of the
/// raw bytes when a byte is outside both ranges.
fn decode_jis_x_0201(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len());
    for &b in data {
        match b {
            0x20..=0x7E => out.push(b as char),
            0xA1..=0xDF => {
                // Half-width katakana block.
                if let Some(c) = char::from_u32(0xFF61 + (b - 0xA1) as u32) {
                    out.push(c);
                }
            }
            0x00 => break,
            _ => return String::from_utf8_lossy(data).trim().to_string(),
        }
    }
    out.trim().to_string()
}

/// Parse a SNES ROM header, probing LoROM and HiROM locations.
pub fn parse_snes(reader: &mut dyn RandomAccess, size: u64) -> Result<SnesInfo, IdentError> {
    // Copier headers offset the ROM image by 512 bytes.
    let has_copier_header = size % 1024 != 0;
    let base = if has_copier_header {
        COPIER_HEADER_SIZE
    } else {
        0
    };

    let mut last_err = IdentError::TooSmall {
        expected: LOROM_OFFSET + HEADER_SIZE as u64,
        actual: size,
    };

    for (offset, is_hirom) in [(LOROM_OFFSET, false), (HIROM_OFFSET, true)] {
        let header_start = base + offset;
        if size < header_start + HEADER_SIZE as u64 {
            continue;
        }

        let mut header = [0u8; HEADER_SIZE];
        reader.read_exact_at(&mut header, header_start)?;

        let complement =
            u16::from_le_bytes([header[COMPLEMENT_OFFSET], header[COMPLEMENT_OFFSET + 1]]);
        let checksum = u16::from_le_bytes([header[CHECKSUM_OFFSET], header[CHECKSUM_OFFSET + 1]]);

        if checksum.wrapping_add(complement) != 0xFFFF {
            last_err = IdentError::invalid_format(format!(
                "SNES checksum pair invalid at 0x{:X}: 0x{:04X} + 0x{:04X} != 0xFFFF",
                header_start, checksum, complement
            ));
            continue;
        }

        return Ok(SnesInfo {
            title: decode_jis_x_0201(&header[..TITLE_LEN]),
            map_mode: header[MAP_MODE_OFFSET],
            cartridge_type: header[CART_TYPE_OFFSET],
            rom_size_code: header[ROM_SIZE_OFFSET],
            ram_size_code: header[RAM_SIZE_OFFSET],
            destination_code: header[DEST_CODE_OFFSET],
            maker_code: header[MAKER_OLD_OFFSET],
            version: header[VERSION_OFFSET],
            checksum,
            complement,
            is_hirom,
            has_copier_header,
        });
    }

    Err(last_err)
}

#[cfg(test)]
#[path = "tests/snes_tests.rs"]
mod tests;
