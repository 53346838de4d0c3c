//! PlayStation 1/2 disc identification.
//!
//! Both consoles ship a `SYSTEM.CNF` at the ISO 9660 root with
//! `KEY = VALUE` lines:
//!
//! ```text
//! BOOT2 = cdrom0:\SLUS_123.45;1     (PS2)
//! BOOT = cdrom:\SCUS_943.00;1       (PS1)
//! VER = 1.00
//! VMODE = NTSC
//! ```
//!
//! The executable filename is the disc ID; its 4-char prefix encodes
//! the region (SLUS/SCUS = US, SLES/SCES = EU, SLPS/SCPS/SLPM = JP,
//! SLKA/SCKA = KR).

use serde::Serialize;

use romprobe_core::{GameInfo, Platform, Region};

/// Metadata extracted from a PlayStation SYSTEM.CNF.
#[derive(Debug, Clone, Serialize)]
pub struct PlayStationInfo {
    /// PS1 or PS2, decided by which boot key is present.
    pub platform: Platform,
    /// Disc ID as written in the boot path (e.g. "SLUS_123.45").
    pub disc_id: String,
    /// Normalized serial: `_` → `-`, periods removed ("SLUS-12345").
    pub serial: String,
    /// VER line (PS2).
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,
    /// VMODE line, NTSC or PAL (PS2).
    #[serde(skip_serializing_if = "String::is_empty")]
    pub video_mode: String,
}

impl GameInfo for PlayStationInfo {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn serial(&self) -> String {
        self.serial.clone()
    }

    fn regions(&self) -> Vec<Region> {
        vec![decode_region(&self.disc_id)]
    }
}

/// Parse SYSTEM.CNF content. Returns `None` when neither boot key is
/// present or the boot path carries no filename.
pub fn parse_system_cnf(data: &[u8]) -> Option<PlayStationInfo> {
    let text = String::from_utf8_lossy(data);

    let mut platform = None;
    let mut disc_id = String::new();
    let mut version = String::new();
    let mut video_mode = String::new();

    for line in text.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();

        match key {
            "BOOT2" => {
                platform = Some(Platform::Ps2);
                disc_id = extract_disc_id(value);
            }
            // BOOT marks a PS1 disc unless BOOT2 was already seen.
            "BOOT" if platform != Some(Platform::Ps2) => {
                platform = Some(Platform::Ps1);
                disc_id = extract_disc_id(value);
            }
            "VER" => version = value.to_string(),
            "VMODE" => video_mode = value.to_string(),
            _ => {}
        }
    }

    let platform = platform?;
    if disc_id.is_empty() {
        return None;
    }

    let serial = disc_id.replace('_', "-").replace('.', "");

    Some(PlayStationInfo {
        platform,
        disc_id,
        serial,
        version,
        video_mode,
    })
}

/// Pull the executable filename out of a boot path like
/// `cdrom0:\SLUS_123.45;1`, stripping the `;N` version suffix.
fn extract_disc_id(boot_path: &str) -> String {
    let after_sep = boot_path
        .rsplit_once('\\')
        .or_else(|| boot_path.rsplit_once('/'))
        .map(|(_, tail)| tail)
        .unwrap_or(boot_path);

    let name = after_sep.split(';').next().unwrap_or(after_sep);
    name.trim().to_string()
}

/// Region from the disc ID's 4-char prefix.
fn decode_region(disc_id: &str) -> Region {
    if disc_id.len() < 4 {
        return Region::Unknown;
    }
    match disc_id[..4].to_ascii_uppercase().as_str() {
        "SLUS" | "SCUS" => Region::Usa,
        "SLES" | "SCES" => Region::Europe,
        "SLPS" | "SCPS" | "SLPM" | "SCPM" | "SLAJ" => Region::Japan,
        "SLKA" | "SCKA" => Region::Korea,
        _ => Region::Unknown,
    }
}

#[cfg(test)]
#[path = "tests/cnf_tests.rs"]
mod tests;
