//! Reader for MAME CHD (Compressed Hunks of Data) v5 disc images.
//!
//! Supports the deflate, LZMA, Zstandard, and Huffman hunk codecs plus
//! their CD-interleaved variants, self-referential hunks, CD sector
//! translation for filesystem access, and track-metadata parsing.
//! Parent-linked images and the FLAC codecs are not supported.
//!
//! Format reference: <https://github.com/mamedev/mame/blob/master/src/lib/util/chd.h>

use std::collections::HashMap;
use std::io;
use std::sync::{PoisonError, RwLock};

use romprobe_core::{IdentError, RandomAccess, SectorReader};

pub mod bitstream;
pub mod codec;
pub mod header;
pub mod map;
#[cfg(test)]
pub mod testutil;
pub mod track;

pub use header::{codec_name, ChdHeader, CHD_MAGIC};
pub use track::Track;

use map::{
    MapEntry, COMPRESSION_NONE, COMPRESSION_PARENT, COMPRESSION_SELF, COMPRESSION_TYPE_0,
    COMPRESSION_TYPE_3,
};

/// Upper bound on resident decompressed hunks.
const MAX_CACHED_HUNKS: usize = 32;

/// Data offset of user data within a CD-ROM CHD's raw frame.
const CD_DATA_OFFSET: u64 = 24;

/// An open CHD file: parsed header, decoded hunk map, and a bounded
/// cache of decompressed hunks. Logical (uncompressed) bytes are read
/// through [`RandomAccess`].
pub struct Chd<R> {
    file: R,
    header: ChdHeader,
    map: Vec<MapEntry>,
    cache: RwLock<HashMap<u32, Vec<u8>>>,
    zstd: zstd::bulk::Decompressor<'static>,
}

impl<R> std::fmt::Debug for Chd<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chd")
            .field("header", &self.header)
            .field("map", &self.map)
            .finish_non_exhaustive()
    }
}

impl<R: RandomAccess> Chd<R> {
    /// Open a CHD file: parse the header, reject parent-linked images,
    /// and decode the hunk map.
    pub fn open(mut file: R, size: u64) -> Result<Self, IdentError> {
        let header = ChdHeader::parse(&mut file, size)?;

        if !header.parent_sha1.is_empty() {
            return Err(IdentError::unsupported(
                "parent CHD references not supported",
            ));
        }

        let map = map::decode_map(&mut file, &header)?;
        log::debug!(
            "opened CHD v{}: {} hunks of {} bytes, unit {}",
            header.version,
            header.total_hunks,
            header.hunk_bytes,
            header.unit_bytes
        );

        let zstd = zstd::bulk::Decompressor::new()
            .map_err(|e| IdentError::other(format!("create zstd decoder: {}", e)))?;

        Ok(Self {
            file,
            header,
            map,
            cache: RwLock::new(HashMap::new()),
            zstd,
        })
    }

    /// The parsed header.
    pub fn header(&self) -> &ChdHeader {
        &self.header
    }

    /// Logical (uncompressed) size in bytes.
    pub fn size(&self) -> u64 {
        self.header.logical_bytes
    }

    /// Parse CD/GD track metadata from the header's metadata chain.
    pub fn tracks(&mut self) -> Result<Vec<Track>, IdentError> {
        track::parse_track_metadata(&mut self.file, self.header.meta_offset)
    }

    /// A reader over one track's raw 2352-byte sector data, skipping
    /// the track's pregap frames.
    pub fn track_reader(&mut self, track: &Track) -> track::TrackReader<'_, R> {
        track::TrackReader::new(self, track)
    }

    /// A logical 2048-byte-per-sector view for filesystem parsing.
    ///
    /// CD-ROM CHDs carry raw frames, so the view extracts user data at
    /// offset 24 within each frame. Non-CD CHDs (DVD images) already
    /// store 2048-byte units and are passed through untranslated.
    pub fn user_data(&mut self) -> (SectorReader<&mut Self>, u64) {
        let unit = self.header.unit_bytes as u64;
        let logical = self.header.logical_bytes;
        let view = if self.header.is_cd_rom() {
            SectorReader::new(self, unit, CD_DATA_OFFSET, logical)
        } else {
            SectorReader::new(self, 2048, 0, logical)
        };
        let len = view.len();
        (view, len)
    }

    #[cfg(test)]
    pub(crate) fn cached_hunks(&self) -> usize {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Copy bytes out of a hunk, consulting and populating the cache.
    fn copy_from_hunk(
        &mut self,
        hunk: u32,
        in_off: usize,
        dst: &mut [u8],
    ) -> Result<usize, IdentError> {
        {
            let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(data) = cache.get(&hunk) {
                return Ok(copy_range(data, in_off, dst));
            }
        }

        let data = self.resolve_hunk(hunk)?;
        let n = copy_range(&data, in_off, dst);

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        if cache.len() < MAX_CACHED_HUNKS {
            cache.insert(hunk, data);
        }
        Ok(n)
    }

    /// A hunk's full decompressed bytes as an owned buffer. A cached
    /// donor is cloned so the returned buffer never aliases a cache
    /// entry.
    fn hunk_data_owned(&mut self, hunk: u32) -> Result<Vec<u8>, IdentError> {
        {
            let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(data) = cache.get(&hunk) {
                return Ok(data.clone());
            }
        }

        let data = self.resolve_hunk(hunk)?;
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        if cache.len() < MAX_CACHED_HUNKS {
            cache.insert(hunk, data.clone());
        }
        Ok(data)
    }

    /// Materialize a hunk according to its map entry.
    fn resolve_hunk(&mut self, hunk: u32) -> Result<Vec<u8>, IdentError> {
        let entry = *self.map.get(hunk as usize).ok_or_else(|| {
            IdentError::corrupted_header(format!(
                "hunk {} out of range (total: {})",
                hunk,
                self.map.len()
            ))
        })?;

        match entry.compression {
            COMPRESSION_NONE => {
                let mut data = vec![0u8; self.header.hunk_bytes as usize];
                self.file
                    .read_exact_at(&mut data, entry.offset)
                    .map_err(|e| {
                        IdentError::corrupted_header(format!(
                            "read uncompressed hunk {}: {}",
                            hunk, e
                        ))
                    })?;
                Ok(data)
            }

            COMPRESSION_TYPE_0..=COMPRESSION_TYPE_3 => {
                let codec_id = self.header.compressors[entry.compression as usize];
                let mut compressed = vec![0u8; entry.length as usize];
                self.file
                    .read_exact_at(&mut compressed, entry.offset)
                    .map_err(|e| {
                        IdentError::corrupted_header(format!(
                            "read compressed hunk {}: {}",
                            hunk, e
                        ))
                    })?;
                codec::decompress_hunk(
                    codec_id,
                    &compressed,
                    self.header.hunk_bytes,
                    &mut self.zstd,
                )
            }

            COMPRESSION_SELF => {
                let referent = entry.offset as u32;
                if referent >= hunk {
                    return Err(IdentError::corrupted_header(format!(
                        "self-reference to hunk {} from hunk {} (forward reference)",
                        referent, hunk
                    )));
                }
                self.hunk_data_owned(referent)
            }

            COMPRESSION_PARENT => Err(IdentError::unsupported(
                "parent CHD references not supported",
            )),

            other => Err(IdentError::corrupted_header(format!(
                "unknown compression type {} for hunk {}",
                other, hunk
            ))),
        }
    }

    fn read_logical(&mut self, buf: &mut [u8], offset: u64) -> Result<usize, IdentError> {
        if offset >= self.header.logical_bytes {
            return Ok(0);
        }

        let hunk_bytes = self.header.hunk_bytes as u64;
        let mut done = 0usize;
        while done < buf.len() {
            let pos = offset + done as u64;
            if pos >= self.header.logical_bytes {
                break;
            }

            let hunk = (pos / hunk_bytes) as u32;
            let in_hunk = (pos % hunk_bytes) as usize;
            let want = (buf.len() - done)
                .min((hunk_bytes as usize) - in_hunk)
                .min((self.header.logical_bytes - pos) as usize);

            let n = self.copy_from_hunk(hunk, in_hunk, &mut buf[done..done + want])?;
            done += n;
            if n < want {
                break;
            }
        }
        Ok(done)
    }
}

impl<R: RandomAccess> RandomAccess for Chd<R> {
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        self.read_logical(buf, offset)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))
    }
}

fn copy_range(data: &[u8], in_off: usize, dst: &mut [u8]) -> usize {
    if in_off >= data.len() {
        return 0;
    }
    let n = dst.len().min(data.len() - in_off);
    dst[..n].copy_from_slice(&data[in_off..in_off + n]);
    n
}

#[cfg(test)]
#[path = "tests/chd_tests.rs"]
mod tests;
