//! Sega Saturn disc identification from the ISO 9660 system area.
//!
//! The system ID structure sits at the start of sector 0:
//!
//! ```text
//! 0x00  16   Hardware ID: "SEGA SEGASATURN "
//! 0x10  16   Maker ID ("SEGA ENTERPRISES", "SEGA TP T-xxx")
//! 0x20  10   Product number
//! 0x2A  6    Version
//! 0x30  8    Release date (YYYYMMDD)
//! 0x38  8    Device info ("CD-1/1")
//! 0x40  16   Area symbols
//! 0x50  16   Peripherals
//! 0x60  112  Title (space-padded)
//! ```

use serde::Serialize;

use romprobe_core::text::extract_printable;
use romprobe_core::{GameInfo, Platform, Region};

pub const SATURN_MAGIC: &[u8; 16] = b"SEGA SEGASATURN ";
pub const HEADER_SIZE: usize = 256;

/// Metadata extracted from a Saturn disc's system area.
#[derive(Debug, Clone, Serialize)]
pub struct SaturnInfo {
    pub maker_id: String,
    /// Product number (serves as the title ID).
    pub product_number: String,
    pub version: String,
    /// Release date, YYYYMMDD.
    pub release_date: String,
    /// Device info; carries disc numbering as "CD-X/Y".
    pub device_info: String,
    /// Raw area symbol characters.
    pub area_symbols: String,
    pub peripherals: String,
    /// Game title.
    pub title: String,
}

impl GameInfo for SaturnInfo {
    fn platform(&self) -> Platform {
        Platform::Saturn
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    fn serial(&self) -> String {
        self.product_number.clone()
    }

    fn maker_code(&self) -> String {
        extract_maker_code(&self.maker_id)
    }

    fn regions(&self) -> Vec<Region> {
        let mut regions = Vec::new();
        for c in self.area_symbols.chars() {
            let region = match c {
                'J' => Region::Japan,
                'T' => Region::Taiwan,
                'U' => Region::Usa,
                'B' => Region::Brazil,
                'K' => Region::Korea,
                'A' => Region::Asia,
                'E' => Region::Europe,
                'L' => Region::America,
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

/// Parse Saturn metadata out of system-area bytes. Returns `None` when
/// the hardware ID does not match.
pub fn parse_saturn_system_area(data: &[u8]) -> Option<SaturnInfo> {
    if data.len() < HEADER_SIZE || &data[..16] != SATURN_MAGIC {
        return None;
    }

    Some(SaturnInfo {
        maker_id: extract_printable(&data[0x10..0x20]),
        product_number: extract_printable(&data[0x20..0x2A]),
        version: extract_printable(&data[0x2A..0x30]),
        release_date: extract_printable(&data[0x30..0x38]),
        device_info: extract_printable(&data[0x38..0x40]),
        area_symbols: extract_printable(&data[0x40..0x50]),
        peripherals: extract_printable(&data[0x50..0x60]),
        title: extract_printable(&data[0x60..0xD0]),
    })
}

/// First-party discs carry "SEGA ENTERPRISES"; third-party discs use
/// "SEGA TP X-xxx" with the licensee code after the prefix.
fn extract_maker_code(maker_id: &str) -> String {
    if let Some(code) = maker_id.strip_prefix("SEGA TP ") {
        return code.trim().to_string();
    }
    if maker_id.starts_with("SEGA") {
        return "SEGA".to_string();
    }
    maker_id.trim().to_string()
}

/// Disc number from device info like "CD-1/2".
fn parse_disc_number(device_info: &str) -> Option<u32> {
    let rest = device_info.strip_prefix("CD-")?;
    let number = rest.split('/').next()?.trim();
    let n: u32 = number.parse().ok()?;
    if n > 0 {
        Some(n)
    } else {
        None
    }
}

#[cfg(test)]
#[path = "tests/saturn_tests.rs"]
mod tests;
