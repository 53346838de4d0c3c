//! Game Boy Advance cartridge header parsing.
//!
//! The header occupies the first 0xC0 bytes. The fixed value 0x96 at
//! 0xB2 doubles as the format magic; the Nintendo logo occupies
//! 0x04–0x9F.

use serde::Serialize;

use romprobe_core::text::extract_printable;
use romprobe_core::{GameInfo, IdentError, Platform, RandomAccess, Region};

pub const HEADER_SIZE: u64 = 0xC0;

/// Fixed byte required at 0xB2.
pub const FIXED_VALUE_OFFSET: u64 = 0xB2;
pub const FIXED_VALUE: u8 = 0x96;

const TITLE_OFFSET: usize = 0xA0;
const TITLE_LEN: usize = 12;
const GAME_CODE_OFFSET: usize = 0xAC;
const GAME_CODE_LEN: usize = 4;
const MAKER_CODE_OFFSET: usize = 0xB0;
const VERSION_OFFSET: usize = 0xBC;

/// Metadata extracted from a GBA cartridge header.
#[derive(Debug, Clone, Serialize)]
pub struct GbaInfo {
    /// Game title (12 bytes, uppercase ASCII).
    pub title: String,
    /// 4-char game code (e.g. "AXVE").
    pub game_code: String,
    /// 2-char maker code.
    pub maker_code: String,
    /// Software version.
    pub version: u8,
}

impl GbaInfo {
    /// Publisher name for the maker code, when known.
    pub fn maker_name(&self) -> Option<&'static str> {
        crate::licensee::licensee_name(&self.maker_code)
    }
}

impl GameInfo for GbaInfo {
    fn platform(&self) -> Platform {
        Platform::Gba
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    fn serial(&self) -> String {
        self.game_code.clone()
    }

    fn maker_code(&self) -> String {
        self.maker_code.clone()
    }

    fn regions(&self) -> Vec<Region> {
        let region = match self.game_code.as_bytes().get(3) {
            Some(b'J') => Region::Japan,
            Some(b'E') => Region::Usa,
            Some(b'P') | Some(b'D') | Some(b'F') | Some(b'I') | Some(b'S') => Region::Europe,
            Some(b'K') => Region::Korea,
            Some(b'C') => Region::China,
            _ => return Vec::new(),
        };
        vec![region]
    }
}

/// Parse a GBA ROM header, verifying the fixed byte at 0xB2.
pub fn parse_gba(reader: &mut dyn RandomAccess, size: u64) -> Result<GbaInfo, IdentError> {
    if size < HEADER_SIZE {
        return Err(IdentError::TooSmall {
            expected: HEADER_SIZE,
            actual: size,
        });
    }

    let mut header = [0u8; HEADER_SIZE as usize];
    reader.read_exact_at(&mut header, 0)?;

    if header[FIXED_VALUE_OFFSET as usize] != FIXED_VALUE {
        return Err(IdentError::invalid_format(
            "not a GBA ROM: fixed value missing at 0xB2",
        ));
    }

    Ok(GbaInfo {
        title: extract_printable(&header[TITLE_OFFSET..TITLE_OFFSET + TITLE_LEN]),
        game_code: extract_printable(&header[GAME_CODE_OFFSET..GAME_CODE_OFFSET + GAME_CODE_LEN]),
        maker_code: extract_printable(&header[MAKER_CODE_OFFSET..MAKER_CODE_OFFSET + 2]),
        version: header[VERSION_OFFSET],
    })
}

#[cfg(test)]
#[path = "tests/gba_tests.rs"]
mod tests;
