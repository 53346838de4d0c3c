//! ZIP archive handling.
//!
//! Enumeration is central-directory based and skips directory entries.
//! For random-access sub-reads the entry is wrapped in a lazy
//! decompressor: the entry stream is opened once and decompressed
//! forward on demand into a growing buffer, so header reads (which
//! cluster near the start) stay cheap while a full-file consumer still
//! works.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use romprobe_core::{IdentError, RandomAccess};

const CHUNK_SIZE: usize = 64 * 1024;

/// Metadata for one file entry, from the central directory.
#[derive(Debug, Clone)]
pub struct ZipEntryInfo {
    /// Entry path inside the archive.
    pub name: String,
    /// Uncompressed size.
    pub size: u64,
    /// CRC-32 recorded in the central directory.
    pub crc32: u32,
    /// Index into the archive for opening.
    pub(crate) index: usize,
}

/// An open ZIP archive.
pub struct ZipContainer {
    archive: zip::ZipArchive<File>,
    entries: Vec<ZipEntryInfo>,
}

impl ZipContainer {
    /// Open an archive and enumerate its file entries (directories
    /// excluded), in central-directory order.
    pub fn open(path: &Path) -> Result<Self, IdentError> {
        let file = File::open(path)?;
        let mut archive = zip::ZipArchive::new(file)
            .map_err(|e| IdentError::invalid_format(format!("open ZIP archive: {}", e)))?;

        let mut entries = Vec::new();
        for index in 0..archive.len() {
            let entry = archive
                .by_index(index)
                .map_err(|e| IdentError::corrupted_header(format!("read ZIP entry: {}", e)))?;
            if entry.is_dir() {
                continue;
            }
            entries.push(ZipEntryInfo {
                name: entry.name().to_string(),
                size: entry.size(),
                crc32: entry.crc32(),
                index,
            });
        }

        log::debug!("ZIP archive at {:?}: {} file entries", path, entries.len());
        Ok(Self { archive, entries })
    }

    /// File entries in central-directory order.
    pub fn entries(&self) -> &[ZipEntryInfo] {
        &self.entries
    }

    /// Open one entry for random-access reads through the lazy
    /// decompressor.
    pub fn open_entry(&mut self, entry: &ZipEntryInfo) -> Result<ZipEntryReader<'_>, IdentError> {
        let size = entry.size;
        let file = self
            .archive
            .by_index(entry.index)
            .map_err(|e| IdentError::corrupted_header(format!("open ZIP entry: {}", e)))?;
        Ok(ZipEntryReader {
            stream: Box::new(file),
            buffer: Vec::with_capacity(CHUNK_SIZE),
            size,
            finished: false,
        })
    }
}

/// Random access over a ZIP entry via lazy forward decompression.
///
/// The underlying stream is opened once; reads past the current
/// frontier decompress further, earlier offsets are served from the
/// buffer. The buffer grows monotonically and is never reclaimed.
pub struct ZipEntryReader<'a> {
    stream: Box<dyn Read + 'a>,
    buffer: Vec<u8>,
    size: u64,
    finished: bool,
}

impl ZipEntryReader<'_> {
    /// Uncompressed entry size.
    pub fn len(&self) -> u64 {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Decompress forward until `target` bytes are buffered (or EOF).
    fn fill_to(&mut self, target: u64) -> io::Result<()> {
        let target = target.min(self.size);
        let mut chunk = [0u8; CHUNK_SIZE];
        while (self.buffer.len() as u64) < target && !self.finished {
            match self.stream.read(&mut chunk) {
                Ok(0) => self.finished = true,
                Ok(n) => self.buffer.extend_from_slice(&chunk[..n]),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

impl RandomAccess for ZipEntryReader<'_> {
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        if offset >= self.size {
            return Ok(0);
        }
        self.fill_to(offset + buf.len() as u64)?;

        if offset >= self.buffer.len() as u64 {
            return Ok(0);
        }
        let start = offset as usize;
        let n = buf.len().min(self.buffer.len() - start);
        buf[..n].copy_from_slice(&self.buffer[start..start + n]);
        Ok(n)
    }
}

#[cfg(test)]
#[path = "tests/zip_tests.rs"]
mod tests;
