//! Xbox XISO (XDVDFS) disc image parsing.
//!
//! The volume descriptor sits at 0x10000 with the magic
//! `MICROSOFT*XBOX*MEDIA`, followed by the root directory's sector and
//! size. Directory entries form a binary tree of variable-length
//! records; identification walks the root directory for `default.xbe`
//! and delegates to the XBE parser over that file's extent.

use serde::Serialize;

use romprobe_core::{GameInfo, IdentError, Platform, RandomAccess, Region, SectionReader};

use crate::xbe::{parse_xbe, XbeInfo};

pub const XISO_MAGIC: &[u8; 20] = b"MICROSOFT*XBOX*MEDIA";
pub const VOLUME_DESCRIPTOR_OFFSET: u64 = 0x10000;

const SECTOR_SIZE: u64 = 2048;
const ROOT_SECTOR_OFFSET: u64 = VOLUME_DESCRIPTOR_OFFSET + 0x14;
const ROOT_SIZE_OFFSET: u64 = VOLUME_DESCRIPTOR_OFFSET + 0x18;

/// Fixed part of a directory entry before the name bytes.
const DIRENT_FIXED: usize = 14;

/// Metadata extracted from an XISO image via its boot executable.
#[derive(Debug, Clone, Serialize)]
pub struct XisoInfo {
    /// Identification parsed from `default.xbe`.
    pub xbe: XbeInfo,
}

impl GameInfo for XisoInfo {
    fn platform(&self) -> Platform {
        Platform::Xbox
    }

    fn title(&self) -> String {
        self.xbe.title()
    }

    fn serial(&self) -> String {
        self.xbe.serial()
    }

    fn regions(&self) -> Vec<Region> {
        self.xbe.regions()
    }
}

/// Parse an XISO image: verify the volume descriptor, find
/// `default.xbe` in the root directory, and parse it.
pub fn parse_xiso(reader: &mut dyn RandomAccess, size: u64) -> Result<XisoInfo, IdentError> {
    if size < VOLUME_DESCRIPTOR_OFFSET + SECTOR_SIZE {
        return Err(IdentError::TooSmall {
            expected: VOLUME_DESCRIPTOR_OFFSET + SECTOR_SIZE,
            actual: size,
        });
    }

    let mut magic = [0u8; 20];
    reader.read_exact_at(&mut magic, VOLUME_DESCRIPTOR_OFFSET)?;
    if &magic != XISO_MAGIC {
        return Err(IdentError::invalid_format(
            "not an XISO: volume descriptor magic missing",
        ));
    }

    let mut word = [0u8; 4];
    reader.read_exact_at(&mut word, ROOT_SECTOR_OFFSET)?;
    let root_sector = u32::from_le_bytes(word);
    reader.read_exact_at(&mut word, ROOT_SIZE_OFFSET)?;
    let root_size = u32::from_le_bytes(word);

    let mut root = vec![0u8; root_size as usize];
    reader
        .read_exact_at(&mut root, root_sector as u64 * SECTOR_SIZE)
        .map_err(|e| IdentError::corrupted_header(format!("read XDVDFS root directory: {}", e)))?;

    let (xbe_sector, xbe_size) = find_entry(&root, "default.xbe").ok_or_else(|| {
        IdentError::not_found("default.xbe not found in XDVDFS root directory")
    })?;

    let base = xbe_sector as u64 * SECTOR_SIZE;
    if base + xbe_size as u64 > size {
        return Err(IdentError::corrupted_header(
            "default.xbe extends past end of image",
        ));
    }

    let mut window = SectionReader::new(reader, base, xbe_size as u64);
    let xbe = parse_xbe(&mut window, xbe_size as u64)?;

    Ok(XisoInfo { xbe })
}

/// Walk an XDVDFS directory's binary tree looking for `name`.
///
/// Entry layout: left/right subtree offsets (u16, in 4-byte dwords
/// from the directory start; 0 or 0xFFFF = none), start sector (u32),
/// file size (u32), attributes (u8), name length (u8), name bytes.
fn find_entry(dir: &[u8], name: &str) -> Option<(u32, u32)> {
    let mut stack = vec![0usize]; // dword offsets
    let mut seen = std::collections::HashSet::new();

    while let Some(dword) = stack.pop() {
        if !seen.insert(dword) {
            continue;
        }
        let offset = dword * 4;
        if offset + DIRENT_FIXED > dir.len() {
            continue;
        }

        let left = u16::from_le_bytes([dir[offset], dir[offset + 1]]);
        let right = u16::from_le_bytes([dir[offset + 2], dir[offset + 3]]);
        let sector = u32::from_le_bytes(dir[offset + 4..offset + 8].try_into().unwrap());
        let file_size = u32::from_le_bytes(dir[offset + 8..offset + 12].try_into().unwrap());
        let name_len = dir[offset + 13] as usize;

        if offset + DIRENT_FIXED + name_len <= dir.len() {
            let entry_name = &dir[offset + DIRENT_FIXED..offset + DIRENT_FIXED + name_len];
            if entry_name.eq_ignore_ascii_case(name.as_bytes()) {
                return Some((sector, file_size));
            }
        }

        for link in [left, right] {
            if link != 0 && link != 0xFFFF {
                stack.push(link as usize);
            }
        }
    }

    None
}

#[cfg(test)]
#[path = "tests/xiso_tests.rs"]
mod tests;
