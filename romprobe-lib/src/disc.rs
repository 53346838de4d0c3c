//! Disc-image identification: ISO 9660 content inspection and CHD
//! composition.
//!
//! Disc platforms are identified from the filesystem rather than a
//! header at a fixed offset: Saturn and Dreamcast stamp the ISO 9660
//! system area, PlayStation discs carry a `SYSTEM.CNF` at the root.
//! CHD images are unwrapped through the sector-translated user-data
//! view and the same content inspection runs inside.

use romprobe_chd::{codec_name, Chd};
use romprobe_core::{Format, IdentError, Platform, RandomAccess};
use romprobe_iso9660::IsoReader;
use romprobe_sega::{parse_dreamcast_system_area, parse_saturn_system_area};
use romprobe_sony::parse_system_cnf;

use crate::registry::Identification;
use crate::types::{ChdDiscInfo, GameExtra, GameIdent};

/// Bytes of system area inspected for Saturn/Dreamcast headers.
const SYSTEM_AREA_PROBE: usize = 0x1000;

/// Upper bound on SYSTEM.CNF size worth reading.
const MAX_SYSTEM_CNF: u64 = 64 * 1024;

/// Identify an ISO 9660 image (any probed sector geometry), refining
/// the format when the content identifies a platform.
pub(crate) fn identify_iso(
    reader: &mut dyn RandomAccess,
    size: u64,
) -> Result<Identification, IdentError> {
    let mut iso = IsoReader::open(&mut *reader, size)?;
    identify_disc_content(&mut iso)
}

/// Inspect an opened ISO 9660 volume for platform markers.
pub(crate) fn identify_disc_content<R: RandomAccess>(
    iso: &mut IsoReader<R>,
) -> Result<Identification, IdentError> {
    // Saturn / Dreamcast headers live in the system area (sector 0).
    let mut area = vec![0u8; SYSTEM_AREA_PROBE];
    let n = iso.read_at(&mut area, 0)?;
    area.truncate(n);

    if let Some(info) = parse_saturn_system_area(&area) {
        return Ok(Identification {
            format: Format::Saturn,
            game: Some(GameIdent::from_info(info)),
        });
    }
    if let Some(info) = parse_dreamcast_system_area(&area) {
        return Ok(Identification {
            format: Format::Dreamcast,
            game: Some(GameIdent::from_info(info)),
        });
    }

    // PlayStation discs boot through SYSTEM.CNF at the root.
    if let Ok((mut file, len)) = iso.open_file("SYSTEM.CNF") {
        let mut data = vec![0u8; len.min(MAX_SYSTEM_CNF) as usize];
        file.read_exact_at(&mut data, 0)?;
        if let Some(info) = parse_system_cnf(&data) {
            let format = match info.platform {
                Platform::Ps2 => Format::Ps2,
                _ => Format::Ps1,
            };
            return Ok(Identification {
                format,
                game: Some(GameIdent::from_info(info)),
            });
        }
    }

    // A well-formed volume with no recognized platform markers.
    Ok(Identification {
        format: Format::Iso9660,
        game: None,
    })
}

/// Identify a CHD image: parse header and track metadata, then run the
/// disc content inspection over the logical user-data view. The format
/// stays `chd`; the contained platform surfaces through the game
/// identification with the CHD payload wrapped around it.
pub(crate) fn identify_chd(
    reader: &mut dyn RandomAccess,
    size: u64,
) -> Result<Identification, IdentError> {
    let mut chd = Chd::open(&mut *reader, size)?;

    let tracks = chd.tracks()?;
    let header = chd.header();
    let disc = ChdDiscInfo {
        version: header.version,
        codecs: header
            .compressors
            .iter()
            .filter(|&&c| c != 0)
            .map(|&c| codec_name(c))
            .collect(),
        logical_bytes: header.logical_bytes,
        hunk_bytes: header.hunk_bytes,
        unit_bytes: header.unit_bytes,
        tracks,
    };

    // Unwrap to a 2048-byte-per-sector view and look inside. Content
    // that fails to identify (audio-only discs, FLAC-compressed data
    // hunks) leaves the identification at the container level.
    let inner = {
        let (mut view, view_len) = chd.user_data();
        match IsoReader::open(&mut view, view_len) {
            Ok(mut iso) => match identify_disc_content(&mut iso) {
                Ok(identification) => identification.game,
                Err(e) => {
                    log::debug!("CHD content identification failed: {}", e);
                    None
                }
            },
            Err(e) => {
                log::debug!("CHD content is not ISO 9660: {}", e);
                None
            }
        }
    };

    let game = inner.map(|ident| GameIdent {
        platform: ident.platform,
        title: ident.title,
        serial: ident.serial,
        maker_code: ident.maker_code,
        regions: ident.regions,
        disc_number: ident.disc_number,
        extra: GameExtra::Chd {
            disc,
            inner: Some(Box::new(ident.extra)),
        },
    });

    // Track metadata alone still identifies the item as a CHD; without
    // an inner platform there is no game identification to attach.
    Ok(Identification {
        format: Format::Chd,
        game,
    })
}

#[cfg(test)]
#[path = "tests/disc_tests.rs"]
mod tests;
