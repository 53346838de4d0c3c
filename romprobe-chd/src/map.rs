//! CHD v5 hunk-map decoding.
//!
//! The map is a Huffman/RLE-compressed table with one entry per hunk.
//! Decoding runs in two phases over the same bit stream: first the
//! compression type of every hunk, then the per-entry length/offset/CRC
//! fields whose presence depends on the type.

use romprobe_core::{IdentError, RandomAccess};

use crate::bitstream::{BitReader, HuffmanDecoder};
use crate::header::ChdHeader;

// V5 map compression types (from MAME chd.h).
pub const COMPRESSION_TYPE_0: u8 = 0; // codec slot 0
pub const COMPRESSION_TYPE_1: u8 = 1; // codec slot 1
pub const COMPRESSION_TYPE_2: u8 = 2; // codec slot 2
pub const COMPRESSION_TYPE_3: u8 = 3; // codec slot 3
pub const COMPRESSION_NONE: u8 = 4; // uncompressed
pub const COMPRESSION_SELF: u8 = 5; // reference to an earlier hunk in this file
pub const COMPRESSION_PARENT: u8 = 6; // reference to the parent image
pub const COMPRESSION_RLE_SMALL: u8 = 7; // RLE escape, small count
pub const COMPRESSION_RLE_LARGE: u8 = 8; // RLE escape, large count
pub const COMPRESSION_SELF_0: u8 = 9; // self reference, last offset
pub const COMPRESSION_SELF_1: u8 = 10; // self reference, last offset + 1
pub const COMPRESSION_PARENT_SELF: u8 = 11; // parent reference at this hunk's unit offset
pub const COMPRESSION_PARENT_0: u8 = 12; // parent reference, last offset
pub const COMPRESSION_PARENT_1: u8 = 13; // parent reference, advanced by hunk units

/// Map header size: compressed length (4), first offset (48-bit),
/// CRC-16 (2), three bit-width bytes, one reserved byte.
pub const MAP_HEADER_SIZE: u64 = 16;

/// One hunk's location and compression info.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapEntry {
    /// Compression type (0–6 after decoding; RLE escapes never survive).
    pub compression: u8,
    /// Compressed length in bytes.
    pub length: u32,
    /// File offset, or referenced hunk index for self references.
    pub offset: u64,
    /// CRC-16 of the uncompressed hunk payload.
    pub crc16: u16,
}

/// Read and decode the hunk map, verifying its CRC-16.
pub fn decode_map(
    reader: &mut dyn RandomAccess,
    header: &ChdHeader,
) -> Result<Vec<MapEntry>, IdentError> {
    if header.total_hunks == 0 {
        return Ok(Vec::new());
    }

    let mut map_header = [0u8; MAP_HEADER_SIZE as usize];
    reader
        .read_exact_at(&mut map_header, header.map_offset)
        .map_err(|e| {
            IdentError::corrupted_header(format!(
                "read map header at offset {}: {}",
                header.map_offset, e
            ))
        })?;

    let compressed_len = u32::from_be_bytes(map_header[0..4].try_into().unwrap());
    let first_offset = read_u48_be(&map_header[4..10]);
    let map_crc = u16::from_be_bytes(map_header[10..12].try_into().unwrap());
    let length_bits = map_header[12] as u32;
    let self_bits = map_header[13] as u32;
    let parent_bits = map_header[14] as u32;

    let mut compressed = vec![0u8; compressed_len as usize];
    reader
        .read_exact_at(&mut compressed, header.map_offset + MAP_HEADER_SIZE)
        .map_err(|e| IdentError::corrupted_header(format!("read compressed map: {}", e)))?;

    let entries = decode_entries(
        &compressed,
        header,
        length_bits,
        self_bits,
        parent_bits,
        first_offset,
    )?;

    let crc = map_crc16(&entries);
    if crc != map_crc {
        return Err(IdentError::ChecksumMismatch {
            expected: format!("{:04x}", map_crc),
            actual: format!("{:04x}", crc),
        });
    }

    Ok(entries)
}

fn decode_entries(
    data: &[u8],
    header: &ChdHeader,
    length_bits: u32,
    self_bits: u32,
    parent_bits: u32,
    first_offset: u64,
) -> Result<Vec<MapEntry>, IdentError> {
    let num_hunks = header.total_hunks as usize;
    let mut reader = BitReader::new(data);

    // 16-symbol alphabet over the compression types, max 8-bit codes.
    let mut huffman = HuffmanDecoder::new(16, 8);
    huffman.import_tree_rle(&mut reader)?;

    // Phase 1: compression type per hunk, with two RLE escape symbols.
    let mut types = vec![0u8; num_hunks];
    let mut last_comp = 0u8;
    let mut rep_count = 0usize;

    for slot in types.iter_mut() {
        if rep_count > 0 {
            *slot = last_comp;
            rep_count -= 1;
            continue;
        }

        let value = huffman.decode(&mut reader)? as u8;
        match value {
            COMPRESSION_RLE_SMALL => {
                let count = huffman.decode(&mut reader)?;
                *slot = last_comp;
                rep_count = 2 + count as usize;
            }
            COMPRESSION_RLE_LARGE => {
                let high = huffman.decode(&mut reader)?;
                let low = huffman.decode(&mut reader)?;
                *slot = last_comp;
                rep_count = 2 + 16 + ((high << 4) + low) as usize;
            }
            _ => {
                *slot = value;
                last_comp = value;
            }
        }
    }

    // Phase 2: per-entry fields; a cursor tracks the next data offset.
    let mut entries = Vec::with_capacity(num_hunks);
    let mut cur_offset = first_offset;
    let mut last_self = 0u64;
    let mut last_parent = 0u64;

    for (hunk, &comp) in types.iter().enumerate() {
        let entry = match comp {
            COMPRESSION_TYPE_0 | COMPRESSION_TYPE_1 | COMPRESSION_TYPE_2 | COMPRESSION_TYPE_3 => {
                let length = reader.read_bits(length_bits)?;
                let crc = reader.read_bits(16)? as u16;
                if length > header.hunk_bytes {
                    return Err(IdentError::corrupted_header(format!(
                        "hunk {}: compressed length {} exceeds hunk size {}",
                        hunk, length, header.hunk_bytes
                    )));
                }
                let offset = cur_offset;
                cur_offset += length as u64;
                MapEntry {
                    compression: comp,
                    length,
                    offset,
                    crc16: crc,
                }
            }

            COMPRESSION_NONE => {
                let crc = reader.read_bits(16)? as u16;
                let offset = cur_offset;
                cur_offset += header.hunk_bytes as u64;
                MapEntry {
                    compression: COMPRESSION_NONE,
                    length: header.hunk_bytes,
                    offset,
                    crc16: crc,
                }
            }

            COMPRESSION_SELF => {
                let target = reader.read_bits(self_bits)? as u64;
                last_self = target;
                MapEntry {
                    compression: COMPRESSION_SELF,
                    length: 0,
                    offset: target,
                    crc16: 0,
                }
            }

            COMPRESSION_SELF_0 => MapEntry {
                compression: COMPRESSION_SELF,
                length: 0,
                offset: last_self,
                crc16: 0,
            },

            COMPRESSION_SELF_1 => {
                last_self += 1;
                MapEntry {
                    compression: COMPRESSION_SELF,
                    length: 0,
                    offset: last_self,
                    crc16: 0,
                }
            }

            COMPRESSION_PARENT => {
                let target = reader.read_bits(parent_bits)? as u64;
                last_parent = target;
                MapEntry {
                    compression: COMPRESSION_PARENT,
                    length: 0,
                    offset: target,
                    crc16: 0,
                }
            }

            COMPRESSION_PARENT_SELF => {
                let offset =
                    (hunk as u64 * header.hunk_bytes as u64) / header.unit_bytes as u64;
                last_parent = offset;
                MapEntry {
                    compression: COMPRESSION_PARENT,
                    length: 0,
                    offset,
                    crc16: 0,
                }
            }

            COMPRESSION_PARENT_0 => MapEntry {
                compression: COMPRESSION_PARENT,
                length: 0,
                offset: last_parent,
                crc16: 0,
            },

            COMPRESSION_PARENT_1 => {
                last_parent += (header.hunk_bytes / header.unit_bytes) as u64;
                MapEntry {
                    compression: COMPRESSION_PARENT,
                    length: 0,
                    offset: last_parent,
                    crc16: 0,
                }
            }

            _ => {
                return Err(IdentError::corrupted_header(format!(
                    "unknown compression type {} for hunk {}",
                    comp, hunk
                )));
            }
        };
        entries.push(entry);
    }

    Ok(entries)
}

fn read_u48_be(b: &[u8]) -> u64 {
    (b[0] as u64) << 40
        | (b[1] as u64) << 32
        | (b[2] as u64) << 24
        | (b[3] as u64) << 16
        | (b[4] as u64) << 8
        | b[5] as u64
}

/// CRC-16 of the decoded map in its canonical 12-byte-per-entry form:
/// 1 type + 24-bit length + 48-bit offset + 16-bit CRC, big-endian.
pub fn map_crc16(entries: &[MapEntry]) -> u16 {
    let mut data = Vec::with_capacity(entries.len() * 12);
    for e in entries {
        data.push(e.compression);
        data.push((e.length >> 16) as u8);
        data.push((e.length >> 8) as u8);
        data.push(e.length as u8);
        data.push((e.offset >> 40) as u8);
        data.push((e.offset >> 32) as u8);
        data.push((e.offset >> 24) as u8);
        data.push((e.offset >> 16) as u8);
        data.push((e.offset >> 8) as u8);
        data.push(e.offset as u8);
        data.push((e.crc16 >> 8) as u8);
        data.push(e.crc16 as u8);
    }
    crc16_ccitt(&data)
}

/// CRC-16-CCITT, polynomial 0x1021, initial value 0xFFFF.
pub fn crc16_ccitt(data: &[u8]) -> u16 {
    let mut crc = 0xFFFFu16;
    for &b in data {
        crc ^= (b as u16) << 8;
        for _ in 0..8 {
            if crc & 0x8000 != 0 {
                crc = (crc << 1) ^ 0x1021;
            } else {
                crc <<= 1;
            }
        }
    }
    crc
}

#[cfg(test)]
#[path = "tests/map_tests.rs"]
mod tests;
