//! GameCube / Wii disc header (GCM) parsing.
//!
//! The disc header sits at offset 0. GameCube and Wii share the
//! layout; the magic words at 0x18 (Wii) and 0x1C (GameCube)
//! distinguish the systems and double as the format check.

use serde::Serialize;

use romprobe_core::text::extract_printable;
use romprobe_core::{GameInfo, IdentError, Platform, RandomAccess, Region};

/// Bytes of disc header the parser consumes.
pub const DISC_HEADER_SIZE: usize = 0x60;

/// Magic word at 0x18 on Wii discs.
pub const WII_MAGIC: u32 = 0x5D1C_9EA3;
/// Magic word at 0x1C on GameCube discs.
pub const GC_MAGIC: u32 = 0xC233_9F3D;

const TITLE_OFFSET: usize = 0x20;
const TITLE_LEN: usize = 64;

/// Metadata extracted from a GCM disc header.
#[derive(Debug, Clone, Serialize)]
pub struct GcmInfo {
    /// Full 4-char game code: system, 2-char id, region.
    pub game_code: String,
    /// 2-char maker code.
    pub maker_code: String,
    /// Disc number byte (0-based).
    pub disc_number: u8,
    /// Disc version.
    pub version: u8,
    /// Internal title (up to 64 bytes).
    pub title: String,
    /// True when the Wii magic word matched.
    pub is_wii: bool,
}

impl GameInfo for GcmInfo {
    fn platform(&self) -> Platform {
        if self.is_wii {
            Platform::Wii
        } else {
            Platform::GameCube
        }
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
            Some(b'P') => Region::Europe,
            Some(b'D') => Region::Germany,
            Some(b'F') => Region::France,
            Some(b'I') => Region::Italy,
            Some(b'S') => Region::Spain,
            Some(b'K') => Region::Korea,
            Some(b'A') => Region::World,
            _ => return Vec::new(),
        };
        vec![region]
    }

    fn disc_number(&self) -> Option<u32> {
        Some(self.disc_number as u32 + 1)
    }
}

/// Parse a GCM disc header, verifying one of the system magic words.
pub fn parse_gcm(reader: &mut dyn RandomAccess, size: u64) -> Result<GcmInfo, IdentError> {
    if size < DISC_HEADER_SIZE as u64 {
        return Err(IdentError::TooSmall {
            expected: DISC_HEADER_SIZE as u64,
            actual: size,
        });
    }

    let mut header = [0u8; DISC_HEADER_SIZE];
    reader.read_exact_at(&mut header, 0)?;

    let wii_magic = u32::from_be_bytes(header[0x18..0x1C].try_into().unwrap());
    let gc_magic = u32::from_be_bytes(header[0x1C..0x20].try_into().unwrap());

    let is_wii = wii_magic == WII_MAGIC;
    if !is_wii && gc_magic != GC_MAGIC {
        return Err(IdentError::invalid_format(
            "not a GameCube/Wii disc: magic words missing",
        ));
    }

    Ok(GcmInfo {
        game_code: extract_printable(&header[0..4]),
        maker_code: extract_printable(&header[4..6]),
        disc_number: header[6],
        version: header[7],
        title: extract_printable(&header[TITLE_OFFSET..TITLE_OFFSET + TITLE_LEN]),
        is_wii,
    })
}

#[cfg(test)]
#[path = "tests/gamecube_tests.rs"]
mod tests;
