//! Sector translation: a logical 2048-byte-per-sector view over raw CD
//! images whose physical sectors carry sync/header/ECC framing.

use std::io;

use crate::reader::RandomAccess;

/// Logical sector size as seen by ISO 9660 and its consumers.
pub const LOGICAL_SECTOR_SIZE: u64 = 2048;

/// Raw CD sector size (sync + header + user data + ECC).
pub const RAW_SECTOR_SIZE: u64 = 2352;

/// Raw CD frame size including the 96 subcode bytes (CHD CD units).
pub const RAW_FRAME_SIZE: u64 = 2448;

/// Translates logical 2048-byte-sector reads onto physical sectors of a
/// configured size, with user data at a fixed offset within each sector
/// (0 for cooked images, 16 for MODE1/2352, 24 for MODE2/2352 and
/// CD-ROM CHDs).
pub struct SectorReader<R> {
    inner: R,
    physical_sector: u64,
    data_offset: u64,
    logical_size: u64,
}

impl<R: RandomAccess> SectorReader<R> {
    /// Wrap `inner` (of `physical_size` total bytes) in a translating view.
    pub fn new(inner: R, physical_sector: u64, data_offset: u64, physical_size: u64) -> Self {
        let sectors = physical_size / physical_sector;
        Self {
            inner,
            physical_sector,
            data_offset,
            logical_size: sectors * LOGICAL_SECTOR_SIZE,
        }
    }

    /// Logical size: number of whole physical sectors × 2048.
    pub fn len(&self) -> u64 {
        self.logical_size
    }

    pub fn is_empty(&self) -> bool {
        self.logical_size == 0
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: RandomAccess> RandomAccess for SectorReader<R> {
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        if offset >= self.logical_size {
            return Ok(0);
        }

        let mut done = 0usize;
        while done < buf.len() {
            let logical = offset + done as u64;
            if logical >= self.logical_size {
                break;
            }

            let sector = logical / LOGICAL_SECTOR_SIZE;
            let in_sector = logical % LOGICAL_SECTOR_SIZE;
            let physical = sector * self.physical_sector + self.data_offset + in_sector;

            // Clip to the end of this sector's data region and to logical EOF.
            let avail = (LOGICAL_SECTOR_SIZE - in_sector).min(self.logical_size - logical);
            let want = (buf.len() - done).min(avail as usize);

            let n = self
                .inner
                .read_at(&mut buf[done..done + want], physical)?;
            done += n;
            if n < want {
                break;
            }
        }
        Ok(done)
    }
}

#[cfg(test)]
#[path = "tests/sector_tests.rs"]
mod tests;
