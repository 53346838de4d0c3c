//! Nintendo 64 ROM header parsing with byte-order auto-detection.
//!
//! N64 ROMs circulate in three byte orderings, distinguishable by
//! where the fixed 0x80 reserved byte lands in the first word:
//!
//! - z64: native big-endian, 0x80 at position 0
//! - v64: 16-bit byte-swapped, 0x80 at position 1
//! - n64: 32-bit word-swapped, 0x80 at position 3
//!
//! Header layout (64 bytes, in native big-endian form):
//!
//! ```text
//! 0x00  1   Reserved (0x80)
//! 0x01  3   PI BSD DOM1 configuration flags
//! 0x04  4   Clock rate
//! 0x08  4   Boot address
//! 0x0C  4   Libultra version
//! 0x10  8   Check code
//! 0x20  20  Title (space-padded ASCII)
//! 0x3B  4   Game code (category, unique code, destination)
//! 0x3F  1   Version
//! ```
//!
//! Reference: n64brew wiki, "ROM Header".

use serde::Serialize;

use romprobe_core::text::extract_printable;
use romprobe_core::{GameInfo, IdentError, Platform, RandomAccess, Region};

pub const HEADER_SIZE: u64 = 0x40;

const RESERVED_BYTE: u8 = 0x80;
const CHECK_CODE_OFFSET: usize = 0x10;
const TITLE_OFFSET: usize = 0x20;
const TITLE_LEN: usize = 20;
const GAME_CODE_OFFSET: usize = 0x3B;
const VERSION_OFFSET: usize = 0x3F;

/// Byte ordering of an N64 ROM dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum N64ByteOrder {
    /// Native big-endian (.z64).
    Z64,
    /// 16-bit byte-swapped (.v64).
    V64,
    /// 32-bit word-swapped (.n64).
    N64,
}

/// Detect byte order from the first four bytes of the ROM.
pub fn detect_byte_order(first4: &[u8; 4]) -> Option<N64ByteOrder> {
    if first4[0] == RESERVED_BYTE {
        Some(N64ByteOrder::Z64)
    } else if first4[1] == RESERVED_BYTE {
        Some(N64ByteOrder::V64)
    } else if first4[3] == RESERVED_BYTE {
        Some(N64ByteOrder::N64)
    } else {
        None
    }
}

/// Metadata extracted from an N64 ROM header.
#[derive(Debug, Clone, Serialize)]
pub struct N64Info {
    /// PI BSD DOM1 configuration flags (24-bit).
    pub pi_bsd_config: u32,
    /// Clock rate override (0 = default).
    pub clock_rate: u32,
    /// Entry point in RDRAM.
    pub boot_address: u32,
    /// SDK (libultra) version word.
    pub libultra_version: u32,
    /// 64-bit integrity check code.
    pub check_code: u64,
    /// Game title, space-padded ASCII.
    pub title: String,
    /// Full 4-char game code.
    pub game_code: String,
    /// Media category: 'N' Game Pak, 'D' 64DD disk, …
    pub category_code: u8,
    /// 2-char unique game identifier.
    pub unique_code: String,
    /// Destination (region) code character.
    pub destination: u8,
    /// ROM version.
    pub version: u8,
    /// Detected byte ordering of the dump.
    pub byte_order: N64ByteOrder,
}

impl GameInfo for N64Info {
    fn platform(&self) -> Platform {
        Platform::N64
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    fn serial(&self) -> String {
        self.game_code.clone()
    }

    fn regions(&self) -> Vec<Region> {
        let region = match self.destination {
            b'A' => Region::World,
            b'B' => Region::Brazil,
            b'C' => Region::China,
            b'D' => Region::Germany,
            b'E' | b'G' => Region::Usa,
            b'F' => Region::France,
            b'H' => Region::Netherlands,
            b'I' => Region::Italy,
            b'J' => Region::Japan,
            b'K' => Region::Korea,
            b'L' | b'P' | b'W' | b'X' | b'Y' | b'Z' => Region::Europe,
            b'N' => Region::Canada,
            b'S' => Region::Spain,
            b'U' => Region::Australia,
            _ => return Vec::new(),
        };
        vec![region]
    }
}

/// Parse an N64 ROM header, auto-detecting and undoing byte swapping.
pub fn parse_n64(reader: &mut dyn RandomAccess, size: u64) -> Result<N64Info, IdentError> {
    if size < HEADER_SIZE {
        return Err(IdentError::TooSmall {
            expected: HEADER_SIZE,
            actual: size,
        });
    }

    let mut header = [0u8; HEADER_SIZE as usize];
    reader.read_exact_at(&mut header, 0)?;

    let first4: [u8; 4] = header[0..4].try_into().unwrap();
    let byte_order = detect_byte_order(&first4).ok_or_else(|| {
        IdentError::invalid_format("not an N64 ROM: could not detect byte order")
    })?;

    match byte_order {
        N64ByteOrder::Z64 => {}
        N64ByteOrder::V64 => swap_bytes_16(&mut header),
        N64ByteOrder::N64 => swap_bytes_32(&mut header),
    }

    let pi_bsd_config =
        (header[1] as u32) << 16 | (header[2] as u32) << 8 | header[3] as u32;
    let clock_rate = u32::from_be_bytes(header[0x04..0x08].try_into().unwrap());
    let boot_address = u32::from_be_bytes(header[0x08..0x0C].try_into().unwrap());
    let libultra_version = u32::from_be_bytes(header[0x0C..0x10].try_into().unwrap());
    let check_code =
        u64::from_be_bytes(header[CHECK_CODE_OFFSET..CHECK_CODE_OFFSET + 8].try_into().unwrap());

    let title = extract_printable(&header[TITLE_OFFSET..TITLE_OFFSET + TITLE_LEN]);
    let game_code_bytes = &header[GAME_CODE_OFFSET..GAME_CODE_OFFSET + 4];
    let game_code = extract_printable(game_code_bytes);

    let (category_code, unique_code, destination) = if game_code.len() >= 4 {
        (
            game_code_bytes[0],
            game_code[1..3].to_string(),
            game_code_bytes[3],
        )
    } else {
        (0, String::new(), 0)
    };

    Ok(N64Info {
        pi_bsd_config,
        clock_rate,
        boot_address,
        libultra_version,
        check_code,
        title,
        game_code,
        category_code,
        unique_code,
        destination,
        version: header[VERSION_OFFSET],
        byte_order,
    })
}

/// Undo v64 ordering: swap each byte pair (AB CD → BA DC).
fn swap_bytes_16(data: &mut [u8]) {
    for pair in data.chunks_exact_mut(2) {
        pair.swap(0, 1);
    }
}

/// Undo n64 ordering: reverse each 4-byte word (ABCD → DCBA).
fn swap_bytes_32(data: &mut [u8]) {
    for word in data.chunks_exact_mut(4) {
        word.reverse();
    }
}

#[cfg(test)]
#[path = "tests/n64_tests.rs"]
mod tests;
