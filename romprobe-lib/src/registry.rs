//! Format registry and dispatcher.
//!
//! A static mapping from lowercase extension to an ordered candidate
//! list, plus a per-format identification function or magic check. The
//! dispatcher runs candidates in order; the first success wins.
//! Generic extensions (`.bin`, none) deliberately return no
//! candidates: there is no magic-only scan against every registered
//! format.

use std::path::Path;

use romprobe_core::{Format, IdentError, RandomAccess};
use romprobe_nintendo as nintendo;
use romprobe_sega as sega;

use crate::disc;
use crate::types::GameIdent;

/// Outcome of one candidate's identification function. The recorded
/// format may be refined from the candidate (ISO 9660 content
/// identified as a PlayStation disc reports `ps1`/`ps2`).
pub struct Identification {
    pub format: Format,
    pub game: Option<GameIdent>,
}

type IdentifyFn = fn(&mut dyn RandomAccess, u64) -> Result<Identification, IdentError>;

/// Candidate formats for a file name, by extension.
pub fn candidates_by_extension(name: &str) -> &'static [Format] {
    let ext = match Path::new(name).extension().and_then(|e| e.to_str()) {
        Some(e) => e.to_ascii_lowercase(),
        None => return &[],
    };

    match ext.as_str() {
        "chd" => &[Format::Chd],
        "zip" => &[Format::Zip],
        // Ambiguous: Xbox XISO and standard ISO 9660 share the extension.
        "iso" => &[Format::Xiso, Format::Iso9660],
        "xiso" => &[Format::Xiso],
        "xbe" => &[Format::Xbe],
        "gba" | "agb" => &[Format::Gba],
        "z64" => &[Format::Z64],
        "v64" => &[Format::V64],
        "n64" => &[Format::N64],
        "gb" | "gbc" => &[Format::Gb],
        "md" | "gen" => &[Format::Md],
        "smd" => &[Format::Smd],
        "nds" | "dsi" | "ids" => &[Format::Nds],
        "nes" => &[Format::Nes],
        "sfc" | "smc" => &[Format::Snes],
        "gcm" => &[Format::Gcm],
        "rvz" | "wia" => &[Format::Rvz],
        // Generic extensions: no candidates.
        _ => &[],
    }
}

/// Identification function for a candidate format, when one exists.
fn identify_fn(format: Format) -> Option<IdentifyFn> {
    match format {
        Format::Gb => Some(|r, s| plain(Format::Gb, nintendo::parse_gb(r, s)?)),
        Format::Gba => Some(|r, s| plain(Format::Gba, nintendo::parse_gba(r, s)?)),
        Format::Nes => Some(|r, s| plain(Format::Nes, nintendo::parse_nes(r, s)?)),
        Format::Snes => Some(|r, s| plain(Format::Snes, nintendo::parse_snes(r, s)?)),
        Format::Nds => Some(|r, s| plain(Format::Nds, nintendo::parse_nds(r, s)?)),
        Format::Gcm => Some(|r, s| plain(Format::Gcm, nintendo::parse_gcm(r, s)?)),
        Format::Rvz => Some(|r, s| plain(Format::Rvz, nintendo::parse_rvz(r, s)?)),
        // All three N64 orderings parse through the same function; the
        // recorded format follows the detected ordering.
        Format::Z64 | Format::V64 | Format::N64 => Some(|r, s| {
            let info = nintendo::parse_n64(r, s)?;
            let format = match info.byte_order {
                nintendo::N64ByteOrder::Z64 => Format::Z64,
                nintendo::N64ByteOrder::V64 => Format::V64,
                nintendo::N64ByteOrder::N64 => Format::N64,
            };
            Ok(Identification {
                format,
                game: Some(GameIdent::from_info(info)),
            })
        }),
        Format::Md => Some(|r, s| plain(Format::Md, sega::parse_md(r, s)?)),
        Format::Smd => Some(|r, s| plain(Format::Smd, sega::parse_smd(r, s)?)),
        Format::Xbe => Some(|r, s| {
            plain(Format::Xbe, romprobe_microsoft::parse_xbe(r, s)?)
        }),
        Format::Xiso => Some(|r, s| {
            plain(Format::Xiso, romprobe_microsoft::parse_xiso(r, s)?)
        }),
        Format::Iso9660 => Some(disc::identify_iso),
        Format::Chd => Some(disc::identify_chd),
        _ => None,
    }
}

fn plain<I>(format: Format, info: I) -> Result<Identification, IdentError>
where
    I: romprobe_core::GameInfo + Into<crate::types::GameExtra>,
{
    Ok(Identification {
        format,
        game: Some(GameIdent::from_info(info)),
    })
}

/// ZIP local-file magic.
pub const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// Verify a candidate by magic bytes alone (formats with no
/// identification function).
fn verify_magic(reader: &mut dyn RandomAccess, size: u64, format: Format) -> bool {
    match format {
        Format::Zip => check_magic(reader, size, 0, &ZIP_MAGIC),
        _ => false,
    }
}

fn check_magic(reader: &mut dyn RandomAccess, size: u64, offset: u64, magic: &[u8]) -> bool {
    if size < offset + magic.len() as u64 {
        return false;
    }
    let mut buf = vec![0u8; magic.len()];
    if reader.read_exact_at(&mut buf, offset).is_err() {
        return false;
    }
    buf == magic
}

/// Run the dispatcher: try each candidate in order, returning the first
/// successful identification. An unknown format is a normal outcome,
/// not an error.
pub fn identify_game(
    reader: &mut dyn RandomAccess,
    size: u64,
    name: &str,
) -> (Format, Option<GameIdent>) {
    for &candidate in candidates_by_extension(name) {
        if let Some(f) = identify_fn(candidate) {
            match f(reader, size) {
                Ok(identification) => {
                    return (identification.format, identification.game);
                }
                Err(e) => {
                    log::debug!("{}: candidate {} rejected: {}", name, candidate, e);
                }
            }
        } else if verify_magic(reader, size, candidate) {
            return (candidate, None);
        }
    }
    (Format::Unknown, None)
}

#[cfg(test)]
#[path = "tests/registry_tests.rs"]
mod tests;
