//! Sega Dreamcast disc identification from the ISO 9660 system area.
//!
//! The IP.BIN header sits at the start of sector 0:
//!
//! ```text
//! 0x00  16   Hardware ID: "SEGA SEGAKATANA "
//! 0x10  16   Maker ID
//! 0x20  16   Device info ("D018 GD-ROM1/1")
//! 0x30  8    Area symbols (positional)
//! 0x38  8    Peripherals (hex flags)
//! 0x40  10   Product number
//! 0x4A  6    Version
//! 0x50  8    Release date (YYYYMMDD)
//! 0x60  16   Boot filename ("1ST_READ.BIN")
//! 0x70  16   Software maker name
//! 0x80  128  Title (space-padded)
//! ```

use serde::Serialize;

use romprobe_core::text::extract_printable;
use romprobe_core::{GameInfo, Platform, Region};

pub const DREAMCAST_MAGIC: &[u8; 16] = b"SEGA SEGAKATANA ";
pub const HEADER_SIZE: usize = 256;

/// Metadata extracted from a Dreamcast disc's system area.
#[derive(Debug, Clone, Serialize)]
pub struct DreamcastInfo {
    pub maker_id: String,
    /// Device info; carries disc numbering as "GD-ROMX/Y".
    pub device_info: String,
    /// Raw area symbols; positions are significant, so spaces are kept.
    pub area_symbols: String,
    /// Peripheral support hex flags.
    pub peripherals: String,
    /// Product number (serves as the title ID).
    pub product_number: String,
    pub version: String,
    /// Release date, YYYYMMDD.
    pub release_date: String,
    /// Boot executable name.
    pub boot_filename: String,
    /// Publisher / developer name.
    pub sw_maker_name: String,
    /// Game title.
    pub title: String,
}

impl GameInfo for DreamcastInfo {
    fn platform(&self) -> Platform {
        Platform::Dreamcast
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    fn serial(&self) -> String {
        self.product_number.clone()
    }

    fn maker_code(&self) -> String {
        if self.maker_id.starts_with("SEGA") {
            "SEGA".to_string()
        } else {
            self.maker_id.trim().to_string()
        }
    }

    /// Area symbols are positional: position 0 Japan, 1 USA, 2 Europe.
    /// A space marks the region unsupported.
    fn regions(&self) -> Vec<Region> {
        let mut regions = Vec::new();
        for (i, c) in self.area_symbols.chars().enumerate() {
            if c == ' ' {
                continue;
            }
            let region = match i {
                0 => Region::Japan,
                1 => Region::Usa,
                2 => Region::Europe,
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

    fn disc_number(&self) -> Option<u32> {
        parse_disc_number(&self.device_info)
    }
}

/// Parse Dreamcast metadata out of system-area bytes. Returns `None`
/// when the hardware ID does not match.
pub fn parse_dreamcast_system_area(data: &[u8]) -> Option<DreamcastInfo> {
    if data.len() < HEADER_SIZE || &data[..16] != DREAMCAST_MAGIC {
        return None;
    }

    Some(DreamcastInfo {
        maker_id: extract_printable(&data[0x10..0x20]),
        device_info: extract_printable(&data[0x20..0x30]),
        // Positions matter; keep the field verbatim.
        area_symbols: String::from_utf8_lossy(&data[0x30..0x38]).into_owned(),
        peripherals: extract_printable(&data[0x38..0x40]),
        product_number: extract_printable(&data[0x40..0x4A]),
        version: extract_printable(&data[0x4A..0x50]),
        release_date: extract_printable(&data[0x50..0x58]),
        boot_filename: extract_printable(&data[0x60..0x70]),
        sw_maker_name: extract_printable(&data[0x70..0x80]),
        title: extract_printable(&data[0x80..0x100]),
    })
}

/// Disc number from device info like "D018 GD-ROM1/2".
fn parse_disc_number(device_info: &str) -> Option<u32> {
    let idx = device_info.find("GD-ROM")?;
    let rest = &device_info[idx + "GD-ROM".len()..];
    let number = rest.split('/').next()?.trim();
    let n: u32 = number.parse().ok()?;
    if n > 0 {
        Some(n)
    } else {
        None
    }
}

#[cfg(test)]
#[path = "tests/dreamcast_tests.rs"]
mod tests;
