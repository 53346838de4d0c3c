//! ISO 9660 filesystem reader.
//!
//! Handles cooked (2048-byte sector) images and raw CD images
//! (MODE1/2352, MODE2/2352) by probing for the primary volume
//! descriptor at each candidate geometry and wrapping raw images in a
//! sector translator.
//!
//! Relevant layout:
//! - Sectors 0–15: system area (platform-specific; Saturn and
//!   Dreamcast put their headers here)
//! - Logical sector 16: Primary Volume Descriptor, `CD001` magic at
//!   byte 1
//! - PVD offset 156: root directory record
//!
//! Joliet and Rock Ridge extensions are ignored; names are matched as
//! uppercase ASCII with the `;N` version suffix stripped.

use romprobe_core::{IdentError, RandomAccess, SectionReader, SectorReader};

const LOGICAL_SECTOR: u64 = 2048;
const PVD_SECTOR: u64 = 16;
const PVD_MAGIC: &[u8; 5] = b"CD001";
const PVD_MAGIC_OFFSET: u64 = 1;
const PVD_ROOT_DIR_OFFSET: usize = 156;

// Offsets within a directory record.
const DIR_EXTENT_LOC: usize = 2;
const DIR_DATA_LEN: usize = 10;
const DIR_FLAGS: usize = 25;
const DIR_NAME_LEN: usize = 32;
const DIR_NAME: usize = 33;

const FLAG_DIRECTORY: u8 = 0x02;

/// One candidate sector geometry probed during open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectorGeometry {
    /// Physical sector size in the image.
    pub sector_size: u64,
    /// Offset of user data within each physical sector.
    pub data_offset: u64,
    /// Human-readable geometry name.
    pub name: &'static str,
}

impl SectorGeometry {
    /// File offset of the PVD magic under this geometry.
    fn magic_offset(&self) -> u64 {
        PVD_SECTOR * self.sector_size + self.data_offset + PVD_MAGIC_OFFSET
    }
}

/// Geometries in probe order: cooked first, then raw MODE1, raw MODE2.
pub const SECTOR_GEOMETRIES: [SectorGeometry; 3] = [
    SectorGeometry {
        sector_size: 2048,
        data_offset: 0,
        name: "MODE1/2048",
    },
    SectorGeometry {
        sector_size: 2352,
        data_offset: 16,
        name: "MODE1/2352",
    },
    SectorGeometry {
        sector_size: 2352,
        data_offset: 24,
        name: "MODE2/2352",
    },
];

/// An open ISO 9660 image exposing a logical 2048-byte-sector view.
pub struct IsoReader<R> {
    reader: SectorReader<R>,
    geometry: SectorGeometry,
    size: u64,
    root_extent: u32,
    root_size: u32,
}

impl<R: RandomAccess> IsoReader<R> {
    /// Open an image, auto-detecting its sector geometry, and locate
    /// the root directory from the PVD.
    pub fn open(mut reader: R, size: u64) -> Result<Self, IdentError> {
        let mut magic = [0u8; 5];
        let mut found = None;

        for geometry in SECTOR_GEOMETRIES {
            let offset = geometry.magic_offset();
            if size < offset + PVD_MAGIC.len() as u64 {
                continue;
            }
            if reader.read_exact_at(&mut magic, offset).is_err() {
                continue;
            }
            if &magic == PVD_MAGIC {
                found = Some(geometry);
                break;
            }
        }

        let geometry = found.ok_or_else(|| {
            IdentError::invalid_format("not a valid ISO 9660 image: no CD001 magic found")
        })?;
        log::debug!("ISO 9660 image detected as {}", geometry.name);

        let mut translated =
            SectorReader::new(reader, geometry.sector_size, geometry.data_offset, size);
        let logical_size = translated.len();

        // Primary Volume Descriptor at logical sector 16.
        let mut pvd = vec![0u8; LOGICAL_SECTOR as usize];
        translated
            .read_exact_at(&mut pvd, PVD_SECTOR * LOGICAL_SECTOR)
            .map_err(|e| IdentError::corrupted_header(format!("read PVD: {}", e)))?;

        let root = &pvd[PVD_ROOT_DIR_OFFSET..];
        let root_extent = u32::from_le_bytes(root[DIR_EXTENT_LOC..DIR_EXTENT_LOC + 4].try_into().unwrap());
        let root_size = u32::from_le_bytes(root[DIR_DATA_LEN..DIR_DATA_LEN + 4].try_into().unwrap());

        Ok(Self {
            reader: translated,
            geometry,
            size: logical_size,
            root_extent,
            root_size,
        })
    }

    /// Logical size of the image (whole sectors × 2048).
    pub fn len(&self) -> u64 {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// The geometry the image was detected as.
    pub fn geometry(&self) -> SectorGeometry {
        self.geometry
    }

    /// Open a file by `/`-separated path (case-insensitive; `;N`
    /// version suffixes ignored). Returns a bounded reader over the
    /// file's extent and the file's length.
    pub fn open_file(&mut self, path: &str) -> Result<(SectionReader<'_>, u64), IdentError> {
        let mut dir_extent = self.root_extent;
        let mut dir_size = self.root_size;

        let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
        if parts.is_empty() {
            return Err(IdentError::not_found("empty path"));
        }

        for (i, part) in parts.iter().enumerate() {
            let is_last = i == parts.len() - 1;
            let (extent, length, is_dir) = self.find_entry(dir_extent, dir_size, part)?;

            if is_last {
                if is_dir {
                    return Err(IdentError::not_found(format!(
                        "{} is a directory, not a file",
                        part
                    )));
                }
                let base = extent as u64 * LOGICAL_SECTOR;
                let reader = SectionReader::new(&mut self.reader, base, length as u64);
                return Ok((reader, length as u64));
            }

            if !is_dir {
                return Err(IdentError::not_found(format!("{} is not a directory", part)));
            }
            dir_extent = extent;
            dir_size = length;
        }

        Err(IdentError::not_found(path.to_string()))
    }

    /// Search one directory extent for an entry by name.
    /// Returns (extent location, data length, directory flag).
    fn find_entry(
        &mut self,
        dir_extent: u32,
        dir_size: u32,
        name: &str,
    ) -> Result<(u32, u32, bool), IdentError> {
        let mut dir = vec![0u8; dir_size as usize];
        self.reader
            .read_exact_at(&mut dir, dir_extent as u64 * LOGICAL_SECTOR)
            .map_err(|e| IdentError::corrupted_header(format!("read directory: {}", e)))?;

        let want = name.to_ascii_uppercase();
        let mut offset = 0usize;
        while offset < dir.len() {
            let record_len = dir[offset] as usize;
            if record_len == 0 {
                // End of records in this sector; continue at the next.
                let next = (offset / LOGICAL_SECTOR as usize + 1) * LOGICAL_SECTOR as usize;
                if next >= dir.len() {
                    break;
                }
                offset = next;
                continue;
            }

            if offset + DIR_NAME >= dir.len() {
                break;
            }
            let name_len = dir[offset + DIR_NAME_LEN] as usize;
            if offset + DIR_NAME + name_len > dir.len() {
                break;
            }

            let raw = &dir[offset + DIR_NAME..offset + DIR_NAME + name_len];
            let mut entry_name = String::from_utf8_lossy(raw).to_ascii_uppercase();
            if let Some(idx) = entry_name.find(';') {
                entry_name.truncate(idx);
            }

            if entry_name == want {
                let extent = u32::from_le_bytes(
                    dir[offset + DIR_EXTENT_LOC..offset + DIR_EXTENT_LOC + 4]
                        .try_into()
                        .unwrap(),
                );
                let length = u32::from_le_bytes(
                    dir[offset + DIR_DATA_LEN..offset + DIR_DATA_LEN + 4]
                        .try_into()
                        .unwrap(),
                );
                let is_dir = dir[offset + DIR_FLAGS] & FLAG_DIRECTORY != 0;
                return Ok((extent, length, is_dir));
            }

            offset += record_len;
        }

        Err(IdentError::not_found(format!("entry not found: {}", name)))
    }
}

impl<R: RandomAccess> RandomAccess for IsoReader<R> {
    /// Reads address the logical 2048-byte-sector view, so the system
    /// area at offset 0 is directly accessible.
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> std::io::Result<usize> {
        self.reader.read_at(buf, offset)
    }
}

#[cfg(test)]
#[path = "tests/iso_tests.rs"]
mod tests;
