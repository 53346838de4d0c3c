//! Xbox XBE executable parsing.
//!
//! The XBE image header starts with the `XBEH` magic. The certificate,
//! located by subtracting the image base address from the certificate
//! address field, carries the title ID, UTF-16LE title name, alternate
//! title IDs, region flags, and version. All integers are
//! little-endian.

use serde::Serialize;

use romprobe_core::{GameInfo, IdentError, Platform, RandomAccess, Region};

pub const XBE_MAGIC: &[u8; 4] = b"XBEH";

const BASE_ADDRESS_OFFSET: u64 = 0x104;
const CERT_ADDRESS_OFFSET: u64 = 0x118;

/// Certificate size through the version field.
const CERT_SIZE: usize = 0xB0;
const CERT_TITLE_ID: usize = 0x08;
const CERT_TITLE_NAME: usize = 0x0C;
/// Title name field: 40 UTF-16LE code units.
const CERT_TITLE_NAME_LEN: usize = 0x50;
const CERT_ALT_TITLE_IDS: usize = 0x5C;
const CERT_ALT_TITLE_ID_COUNT: usize = 16;
const CERT_GAME_REGION: usize = 0xA0;
const CERT_VERSION: usize = 0xAC;

/// Region flag bits in the certificate.
pub const REGION_NORTH_AMERICA: u32 = 0x0000_0001;
pub const REGION_JAPAN: u32 = 0x0000_0002;
pub const REGION_REST_OF_WORLD: u32 = 0x0000_0004;
pub const REGION_MANUFACTURING: u32 = 0x8000_0000;

/// Metadata extracted from an XBE certificate.
#[derive(Debug, Clone, Serialize)]
pub struct XbeInfo {
    /// 32-bit title ID.
    pub title_id: u32,
    /// Title name decoded from UTF-16LE.
    pub title_name: String,
    /// Alternate title IDs (zero entries dropped).
    pub alt_title_ids: Vec<u32>,
    /// Raw region flags.
    pub region_flags: u32,
    /// Title version.
    pub version: u32,
}

impl GameInfo for XbeInfo {
    fn platform(&self) -> Platform {
        Platform::Xbox
    }

    fn title(&self) -> String {
        self.title_name.clone()
    }

    /// The title ID rendered as 8 uppercase hex digits.
    fn serial(&self) -> String {
        format!("{:08X}", self.title_id)
    }

    fn regions(&self) -> Vec<Region> {
        let mut regions = Vec::new();
        if self.region_flags & REGION_NORTH_AMERICA != 0 {
            regions.push(Region::Usa);
        }
        if self.region_flags & REGION_JAPAN != 0 {
            regions.push(Region::Japan);
        }
        if self.region_flags & REGION_REST_OF_WORLD != 0 {
            regions.push(Region::World);
        }
        if regions.is_empty() {
            regions.push(Region::Unknown);
        }
        regions
    }
}

/// Parse an XBE image header and its certificate.
pub fn parse_xbe(reader: &mut dyn RandomAccess, size: u64) -> Result<XbeInfo, IdentError> {
    let mut magic = [0u8; 4];
    if size < 0x180 {
        return Err(IdentError::TooSmall {
            expected: 0x180,
            actual: size,
        });
    }
    reader.read_exact_at(&mut magic, 0)?;
    if &magic != XBE_MAGIC {
        return Err(IdentError::invalid_format("not an XBE: magic mismatch"));
    }

    let mut word = [0u8; 4];
    reader.read_exact_at(&mut word, BASE_ADDRESS_OFFSET)?;
    let base_address = u32::from_le_bytes(word);
    reader.read_exact_at(&mut word, CERT_ADDRESS_OFFSET)?;
    let cert_address = u32::from_le_bytes(word);

    let cert_offset = cert_address
        .checked_sub(base_address)
        .ok_or_else(|| {
            IdentError::corrupted_header("XBE certificate address below image base")
        })? as u64;
    if cert_offset + CERT_SIZE as u64 > size {
        return Err(IdentError::corrupted_header(
            "XBE certificate extends past end of file",
        ));
    }

    let mut cert = [0u8; CERT_SIZE];
    reader.read_exact_at(&mut cert, cert_offset)?;

    let title_id = u32::from_le_bytes(cert[CERT_TITLE_ID..CERT_TITLE_ID + 4].try_into().unwrap());

    // UTF-16LE, null-terminated within its fixed field.
    let mut units = Vec::with_capacity(CERT_TITLE_NAME_LEN / 2);
    for chunk in cert[CERT_TITLE_NAME..CERT_TITLE_NAME + CERT_TITLE_NAME_LEN].chunks_exact(2) {
        let unit = u16::from_le_bytes([chunk[0], chunk[1]]);
        if unit == 0 {
            break;
        }
        units.push(unit);
    }
    let title_name = String::from_utf16_lossy(&units).trim().to_string();

    let mut alt_title_ids = Vec::new();
    for i in 0..CERT_ALT_TITLE_ID_COUNT {
        let at = CERT_ALT_TITLE_IDS + i * 4;
        let id = u32::from_le_bytes(cert[at..at + 4].try_into().unwrap());
        if id != 0 {
            alt_title_ids.push(id);
        }
    }

    Ok(XbeInfo {
        title_id,
        title_name,
        alt_title_ids,
        region_flags: u32::from_le_bytes(
            cert[CERT_GAME_REGION..CERT_GAME_REGION + 4].try_into().unwrap(),
        ),
        version: u32::from_le_bytes(cert[CERT_VERSION..CERT_VERSION + 4].try_into().unwrap()),
    })
}

#[cfg(test)]
#[path = "tests/xbe_tests.rs"]
mod tests;
