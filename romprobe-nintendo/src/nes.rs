//! NES ROM header parsing (iNES 1.0 and NES 2.0).
//!
//! Header layout (16 bytes):
//!
//! ```text
//! 0x00  4  Magic: "NES" + 0x1A
//! 0x04  1  PRG-ROM size LSB (16 KiB units in iNES 1.0)
//! 0x05  1  CHR-ROM size LSB (8 KiB units; 0 = CHR-RAM)
//! 0x06  1  Flags 6: mapper low nibble, mirroring, battery, trainer
//! 0x07  1  Flags 7: mapper high nibble, console type, NES 2.0 marker
//! 0x08  1  NES 2.0: mapper MSB + submapper / iNES: PRG-RAM size
//! 0x09  1  NES 2.0: ROM size MSBs / iNES: TV system
//! 0x0A  1  NES 2.0: PRG-RAM/NVRAM shift counts
//! 0x0B  1  NES 2.0: CHR-RAM/NVRAM shift counts
//! 0x0C  1  NES 2.0: CPU/PPU timing
//! 0x0D  1  NES 2.0: Vs. System type / extended console type
//! 0x0E  1  NES 2.0: miscellaneous ROM count
//! 0x0F  1  NES 2.0: default expansion device
//! ```
//!
//! References: nesdev wiki, "INES" and "NES 2.0".

use serde::Serialize;

use romprobe_core::{GameInfo, IdentError, Platform, RandomAccess};

pub const HEADER_SIZE: u64 = 16;

/// "NES" + 0x1A.
pub const NES_MAGIC: [u8; 4] = [0x4E, 0x45, 0x53, 0x1A];

/// Nametable mirroring mode from flags 6 bit 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mirroring {
    Horizontal,
    Vertical,
}

/// Target console from flags 7 bits 0–1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsoleType {
    Nes,
    VsSystem,
    PlayChoice10,
    Extended,
}

/// CPU/PPU timing region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimingMode {
    Ntsc,
    Pal,
    Multi,
    Dendy,
}

/// Metadata extracted from an NES ROM header. NES 2.0 headers fill
/// every field; iNES 1.0 headers populate the common subset.
#[derive(Debug, Clone, Serialize)]
pub struct NesInfo {
    /// PRG-ROM size in bytes.
    pub prg_rom_size: u64,
    /// CHR-ROM size in bytes; zero means CHR-RAM.
    pub chr_rom_size: u64,
    /// Volatile PRG-RAM size in bytes.
    pub prg_ram_size: u64,
    /// Battery-backed PRG-NVRAM size in bytes (NES 2.0).
    pub prg_nvram_size: u64,
    /// Volatile CHR-RAM size in bytes (NES 2.0).
    pub chr_ram_size: u64,
    /// Battery-backed CHR-NVRAM size in bytes (NES 2.0).
    pub chr_nvram_size: u64,
    /// Mapper number (0–255 iNES, 0–4095 NES 2.0).
    pub mapper: u16,
    /// Submapper (NES 2.0 only).
    pub submapper: u8,
    pub mirroring: Mirroring,
    /// Four-screen VRAM layout; overrides mirroring.
    pub four_screen: bool,
    pub has_battery: bool,
    /// 512-byte trainer before PRG-ROM.
    pub has_trainer: bool,
    pub console_type: ConsoleType,
    pub timing_mode: TimingMode,
    /// Vs. System PPU variant (console_type == VsSystem).
    pub vs_ppu_type: u8,
    /// Vs. System hardware variant (console_type == VsSystem).
    pub vs_hardware_type: u8,
    /// Extended console variant (console_type == Extended).
    pub extended_console_type: u8,
    /// Miscellaneous ROM chip count (NES 2.0).
    pub misc_roms: u8,
    /// Default expansion device (NES 2.0).
    pub expansion_device: u8,
    /// True when the header is NES 2.0.
    pub is_nes20: bool,
}

impl GameInfo for NesInfo {
    fn platform(&self) -> Platform {
        Platform::Nes
    }
    // NES ROMs carry neither a title nor a serial.
}

/// Parse an iNES / NES 2.0 header.
pub fn parse_nes(reader: &mut dyn RandomAccess, size: u64) -> Result<NesInfo, IdentError> {
    if size < HEADER_SIZE {
        return Err(IdentError::TooSmall {
            expected: HEADER_SIZE,
            actual: size,
        });
    }

    let mut header = [0u8; HEADER_SIZE as usize];
    reader.read_exact_at(&mut header, 0)?;

    if header[0..4] != NES_MAGIC {
        return Err(IdentError::invalid_format("not an NES ROM: magic mismatch"));
    }

    let flags6 = header[6];
    let flags7 = header[7];

    // NES 2.0 marker: flags 7 bits 2–3 == 0b10.
    let is_nes20 = flags7 & 0x0C == 0x08;

    let mirroring = if flags6 & 0x01 != 0 {
        Mirroring::Vertical
    } else {
        Mirroring::Horizontal
    };
    let console_type = match flags7 & 0x03 {
        0 => ConsoleType::Nes,
        1 => ConsoleType::VsSystem,
        2 => ConsoleType::PlayChoice10,
        _ => ConsoleType::Extended,
    };

    let mut info = NesInfo {
        prg_rom_size: 0,
        chr_rom_size: 0,
        prg_ram_size: 0,
        prg_nvram_size: 0,
        chr_ram_size: 0,
        chr_nvram_size: 0,
        mapper: 0,
        submapper: 0,
        mirroring,
        four_screen: flags6 & 0x08 != 0,
        has_battery: flags6 & 0x02 != 0,
        has_trainer: flags6 & 0x04 != 0,
        console_type,
        timing_mode: TimingMode::Ntsc,
        vs_ppu_type: 0,
        vs_hardware_type: 0,
        extended_console_type: 0,
        misc_roms: 0,
        expansion_device: 0,
        is_nes20,
    };

    if is_nes20 {
        parse_nes20(&header, &mut info);
    } else {
        parse_ines(&header, &mut info);
    }

    Ok(info)
}

fn parse_nes20(header: &[u8; 16], info: &mut NesInfo) {
    let flags6 = header[6];
    let flags7 = header[7];
    let byte8 = header[8];
    let byte9 = header[9];

    // 12-bit mapper: flags6 high nibble, flags7 high nibble, byte 8 low nibble.
    info.mapper = ((byte8 as u16 & 0x0F) << 8) | (flags7 as u16 & 0xF0) | (flags6 as u16 >> 4);
    info.submapper = byte8 >> 4;

    info.prg_rom_size = nes20_rom_size(header[4], byte9 & 0x0F, 16 * 1024);
    info.chr_rom_size = nes20_rom_size(header[5], (byte9 >> 4) & 0x0F, 8 * 1024);

    info.prg_ram_size = nes20_ram_size(header[10] & 0x0F);
    info.prg_nvram_size = nes20_ram_size((header[10] >> 4) & 0x0F);
    info.chr_ram_size = nes20_ram_size(header[11] & 0x0F);
    info.chr_nvram_size = nes20_ram_size((header[11] >> 4) & 0x0F);

    info.timing_mode = match header[12] & 0x03 {
        0 => TimingMode::Ntsc,
        1 => TimingMode::Pal,
        2 => TimingMode::Multi,
        _ => TimingMode::Dendy,
    };

    match info.console_type {
        ConsoleType::VsSystem => {
            info.vs_ppu_type = header[13] & 0x0F;
            info.vs_hardware_type = (header[13] >> 4) & 0x0F;
        }
        ConsoleType::Extended => {
            info.extended_console_type = header[13] & 0x0F;
        }
        _ => {}
    }

    info.misc_roms = header[14] & 0x03;
    info.expansion_device = header[15] & 0x3F;
}

fn parse_ines(header: &[u8; 16], info: &mut NesInfo) {
    let flags6 = header[6];
    let flags7 = header[7];

    info.mapper = (flags7 as u16 & 0xF0) | (flags6 as u16 >> 4);
    info.prg_rom_size = header[4] as u64 * 16 * 1024;
    info.chr_rom_size = header[5] as u64 * 8 * 1024;

    // PRG-RAM in 8 KiB units; 0 implies one bank for compatibility.
    let banks = if header[8] == 0 { 1 } else { header[8] as u64 };
    info.prg_ram_size = banks * 8 * 1024;

    info.timing_mode = if header[9] & 0x01 != 0 {
        TimingMode::Pal
    } else {
        TimingMode::Ntsc
    };
}

/// NES 2.0 ROM sizes: plain 12-bit unit count, or exponent-multiplier
/// form when the MSB nibble is 0xF: 2^(lsb >> 2) × ((lsb & 3) × 2 + 1).
fn nes20_rom_size(lsb: u8, msb: u8, unit: u64) -> u64 {
    if msb < 0x0F {
        ((msb as u64) << 8 | lsb as u64) * unit
    } else {
        let exponent = lsb >> 2;
        let multiplier = (lsb & 3) as u64 * 2 + 1;
        (1u64 << exponent) * multiplier
    }
}

/// NES 2.0 RAM shift counts: 64 << shift, with 0 meaning no RAM.
fn nes20_ram_size(shift: u8) -> u64 {
    if shift == 0 {
        0
    } else {
        64u64 << shift
    }
}

#[cfg(test)]
#[path = "tests/nes_tests.rs"]
mod tests;
