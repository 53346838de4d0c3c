//! Nintendo DS cartridge header parsing.
//!
//! The header occupies bytes 0x000–0x1FF. All multi-byte integers are
//! little-endian.

use serde::Serialize;

use romprobe_core::text::extract_printable;
use romprobe_core::{GameInfo, IdentError, Platform, RandomAccess, Region};

pub const HEADER_SIZE: u64 = 0x200;

const TITLE_OFFSET: usize = 0x000;
const TITLE_LEN: usize = 12;
const GAME_CODE_OFFSET: usize = 0x00C;
const MAKER_CODE_OFFSET: usize = 0x010;
const UNIT_CODE_OFFSET: usize = 0x012;
const DEVICE_CAPACITY_OFFSET: usize = 0x014;
const VERSION_OFFSET: usize = 0x01E;
const SECURE_AREA_CRC_OFFSET: usize = 0x06C;
const USED_ROM_SIZE_OFFSET: usize = 0x080;

/// Metadata extracted from an NDS cartridge header.
#[derive(Debug, Clone, Serialize)]
pub struct NdsInfo {
    /// Short game title (12 bytes).
    pub title: String,
    /// 4-char game code.
    pub game_code: String,
    /// 2-char maker code.
    pub maker_code: String,
    /// Console type: 0x00 NDS, 0x02 NDS+DSi, 0x03 DSi.
    pub unit_code: u8,
    /// Cartridge chip capacity in bytes (128 KiB << capacity byte).
    pub chip_capacity: u64,
    /// Total used ROM size from the header.
    pub used_rom_size: u32,
    /// Stored secure-area CRC-16.
    pub secure_area_crc: u16,
    /// ROM version.
    pub version: u8,
}

impl NdsInfo {
    /// Publisher name for the maker code, when known.
    pub fn maker_name(&self) -> Option<&'static str> {
        crate::licensee::licensee_name(&self.maker_code)
    }
}

impl GameInfo for NdsInfo {
    fn platform(&self) -> Platform {
        Platform::Ds
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    /// NTR-XXXX for DS cartridges, TWL-XXXX for DSi.
    fn serial(&self) -> String {
        if self.game_code.len() != 4 {
            return String::new();
        }
        let prefix = if self.unit_code & 0x02 != 0 { "TWL" } else { "NTR" };
        format!("{}-{}", prefix, self.game_code)
    }

    fn maker_code(&self) -> String {
        self.maker_code.clone()
    }

    fn regions(&self) -> Vec<Region> {
        let region = match self.game_code.as_bytes().get(3) {
            Some(b'J') => Region::Japan,
            Some(b'E') => Region::Usa,
            Some(b'P') | Some(b'D') | Some(b'F') | Some(b'S') | Some(b'I') | Some(b'U') => {
                Region::Europe
            }
            Some(b'K') => Region::Korea,
            Some(b'C') => Region::China,
            Some(b'A') | Some(b'W') => Region::World,
            _ => return Vec::new(),
        };
        vec![region]
    }
}

/// Parse an NDS cartridge header.
pub fn parse_nds(reader: &mut dyn RandomAccess, size: u64) -> Result<NdsInfo, IdentError> {
    if size < HEADER_SIZE {
        return Err(IdentError::TooSmall {
            expected: HEADER_SIZE,
            actual: size,
        });
    }

    let mut header = [0u8; HEADER_SIZE as usize];
    reader.read_exact_at(&mut header, 0)?;

    let title = extract_printable(&header[TITLE_OFFSET..TITLE_OFFSET + TITLE_LEN]);
    let game_code = extract_printable(&header[GAME_CODE_OFFSET..GAME_CODE_OFFSET + 4]);
    let maker_code = extract_printable(&header[MAKER_CODE_OFFSET..MAKER_CODE_OFFSET + 2]);

    // A plausible header has an ASCII game code; the format has no
    // dedicated magic short of the logo bitmap.
    if game_code.len() != 4 {
        return Err(IdentError::invalid_format(
            "not an NDS ROM: game code is not ASCII",
        ));
    }

    let capacity_byte = header[DEVICE_CAPACITY_OFFSET];
    let chip_capacity = if capacity_byte <= 20 {
        131_072u64 << capacity_byte
    } else {
        0
    };

    Ok(NdsInfo {
        title,
        game_code,
        maker_code,
        unit_code: header[UNIT_CODE_OFFSET],
        chip_capacity,
        used_rom_size: u32::from_le_bytes(
            header[USED_ROM_SIZE_OFFSET..USED_ROM_SIZE_OFFSET + 4]
                .try_into()
                .unwrap(),
        ),
        secure_area_crc: u16::from_le_bytes(
            header[SECURE_AREA_CRC_OFFSET..SECURE_AREA_CRC_OFFSET + 2]
                .try_into()
                .unwrap(),
        ),
        version: header[VERSION_OFFSET],
    })
}

#[cfg(test)]
#[path = "tests/nds_tests.rs"]
mod tests;
