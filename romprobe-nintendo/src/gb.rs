//! Game Boy / Game Boy Color cartridge header parsing.
//!
//! Header layout (starting at 0x100):
//!
//! ```text
//! Offset  Size  Description
//! 0x100   4     Entry point
//! 0x104   48    Nintendo logo
//! 0x134   16    Title (uppercase ASCII; shorter on newer carts)
//! 0x13F   4     Manufacturer code (newer carts, overlaps title)
//! 0x143   1     CGB flag (0x80 = CGB support, 0xC0 = CGB only)
//! 0x144   2     New licensee code
//! 0x146   1     SGB flag (0x03 = SGB support)
//! 0x147   1     Cartridge type
//! 0x148   1     ROM size code
//! 0x149   1     RAM size code
//! 0x14A   1     Destination (0x00 = Japan, 0x01 = overseas)
//! 0x14B   1     Old licensee code (0x33 = use new code)
//! 0x14C   1     ROM version
//! 0x14D   1     Header checksum
//! 0x14E   2     Global checksum
//! ```
//!
//! Reference: gbdev pandocs, "The Cartridge Header".

use serde::Serialize;

use romprobe_core::text::extract_printable;
use romprobe_core::{GameInfo, IdentError, Platform, RandomAccess, Region};

const HEADER_START: u64 = 0x100;
const HEADER_SIZE: usize = 0x50;

const TITLE_OFFSET: usize = 0x34;
const TITLE_MAX_LEN: usize = 15;
const TITLE_SHORT_LEN: usize = 11;
const MANUFACTURER_OFFSET: usize = 0x3F;
const MANUFACTURER_LEN: usize = 4;
const CGB_FLAG_OFFSET: usize = 0x43;
const NEW_LICENSEE_OFFSET: usize = 0x44;
const SGB_FLAG_OFFSET: usize = 0x46;
const CART_TYPE_OFFSET: usize = 0x47;
const ROM_SIZE_OFFSET: usize = 0x48;
const RAM_SIZE_OFFSET: usize = 0x49;
const DEST_CODE_OFFSET: usize = 0x4A;
const OLD_LICENSEE_OFFSET: usize = 0x4B;
const VERSION_OFFSET: usize = 0x4C;
const HEADER_CHECKSUM_OFFSET: usize = 0x4D;
const GLOBAL_CHECKSUM_OFFSET: usize = 0x4E;

/// CGB flag: supports Color functions, runs on monochrome too.
pub const CGB_SUPPORTED: u8 = 0x80;
/// CGB flag: Color only.
pub const CGB_REQUIRED: u8 = 0xC0;

/// Metadata extracted from a GB/GBC cartridge header.
#[derive(Debug, Clone, Serialize)]
pub struct GbInfo {
    /// Game title (11 or 15 chars depending on header vintage).
    pub title: String,
    /// 4-char manufacturer code on newer cartridges; empty otherwise.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub manufacturer_code: String,
    /// CGB compatibility flag byte.
    pub cgb_flag: u8,
    /// SGB flag byte (0x03 = SGB functions supported).
    pub sgb_flag: u8,
    /// Cartridge type (MBC and features) code.
    pub cartridge_type: u8,
    /// ROM size code (32 KiB << n for the common values).
    pub rom_size_code: u8,
    /// External RAM size code.
    pub ram_size_code: u8,
    /// Destination code: 0x00 Japan, 0x01 overseas.
    pub destination_code: u8,
    /// Licensee code: old code as two hex chars, or the new two-char
    /// ASCII code when the old code is 0x33.
    pub licensee_code: String,
    /// ROM version.
    pub version: u8,
    /// Stored header checksum (0x14D).
    pub header_checksum: u8,
    /// Stored global checksum (0x14E, big-endian).
    pub global_checksum: u16,
    /// GB or GBC depending on the CGB flag.
    pub platform: Platform,
}

impl GbInfo {
    /// Publisher name for the licensee code, when known.
    pub fn licensee_name(&self) -> Option<&'static str> {
        crate::licensee::licensee_name(&self.licensee_code)
    }
}

impl GameInfo for GbInfo {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    fn maker_code(&self) -> String {
        self.licensee_code.clone()
    }

    fn regions(&self) -> Vec<Region> {
        match self.destination_code {
            0x00 => vec![Region::Japan],
            0x01 => vec![Region::World],
            _ => vec![Region::Unknown],
        }
    }
}

/// Newer cartridges shorten the title to 11 chars and use bytes
/// 0x13F–0x142 as an uppercase manufacturer code.
fn has_manufacturer_code(header: &[u8]) -> bool {
    header[MANUFACTURER_OFFSET..MANUFACTURER_OFFSET + MANUFACTURER_LEN]
        .iter()
        .all(|b| b.is_ascii_uppercase())
}

/// Parse a GB/GBC ROM header.
pub fn parse_gb(reader: &mut dyn RandomAccess, size: u64) -> Result<GbInfo, IdentError> {
    let min = HEADER_START + HEADER_SIZE as u64;
    if size < min {
        return Err(IdentError::TooSmall {
            expected: min,
            actual: size,
        });
    }

    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact_at(&mut header, HEADER_START)?;

    let cgb_flag = header[CGB_FLAG_OFFSET];
    let platform = if cgb_flag == CGB_SUPPORTED || cgb_flag == CGB_REQUIRED {
        Platform::GameBoyColor
    } else {
        Platform::GameBoy
    };

    let (title, manufacturer_code) = if has_manufacturer_code(&header) {
        (
            extract_printable(&header[TITLE_OFFSET..TITLE_OFFSET + TITLE_SHORT_LEN]),
            extract_printable(&header[MANUFACTURER_OFFSET..MANUFACTURER_OFFSET + MANUFACTURER_LEN]),
        )
    } else {
        (
            extract_printable(&header[TITLE_OFFSET..TITLE_OFFSET + TITLE_MAX_LEN]),
            String::new(),
        )
    };

    let old_licensee = header[OLD_LICENSEE_OFFSET];
    let licensee_code = if old_licensee == 0x33 {
        extract_printable(&header[NEW_LICENSEE_OFFSET..NEW_LICENSEE_OFFSET + 2])
    } else {
        format!("{:02X}", old_licensee)
    };

    Ok(GbInfo {
        title,
        manufacturer_code,
        cgb_flag,
        sgb_flag: header[SGB_FLAG_OFFSET],
        cartridge_type: header[CART_TYPE_OFFSET],
        rom_size_code: header[ROM_SIZE_OFFSET],
        ram_size_code: header[RAM_SIZE_OFFSET],
        destination_code: header[DEST_CODE_OFFSET],
        licensee_code,
        version: header[VERSION_OFFSET],
        header_checksum: header[HEADER_CHECKSUM_OFFSET],
        global_checksum: u16::from_be_bytes([
            header[GLOBAL_CHECKSUM_OFFSET],
            header[GLOBAL_CHECKSUM_OFFSET + 1],
        ]),
        platform,
    })
}

#[cfg(test)]
#[path = "tests/gb_tests.rs"]
mod tests;
