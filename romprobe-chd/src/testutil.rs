//! Shared helpers for building synthetic CHD v5 files in tests.

use std::io::Write;

use crate::header::HEADER_SIZE;
use crate::map::{
    map_crc16, MapEntry, COMPRESSION_NONE, COMPRESSION_SELF,
};

/// MSB-first bit writer, the inverse of [`crate::bitstream::BitReader`].
pub struct BitWriter {
    bytes: Vec<u8>,
    current: u8,
    filled: u32,
}

impl BitWriter {
    pub fn new() -> Self {
        Self {
            bytes: Vec::new(),
            current: 0,
            filled: 0,
        }
    }

    pub fn push_bits(&mut self, value: u32, count: u32) {
        for i in (0..count).rev() {
            let bit = (value >> i) & 1;
            self.current = (self.current << 1) | bit as u8;
            self.filled += 1;
            if self.filled == 8 {
                self.bytes.push(self.current);
                self.current = 0;
                self.filled = 0;
            }
        }
    }

    pub fn finish(mut self) -> Vec<u8> {
        if self.filled > 0 {
            self.current <<= 8 - self.filled;
            self.bytes.push(self.current);
        }
        self.bytes
    }
}

/// Encode a code-length table in the RLE tree format: a 5-bit width
/// field, then values at that width with 0 escaping a zero run whose
/// count follows at the same width.
pub fn encode_tree(lengths: &[u8], len_bits: u32, w: &mut BitWriter) {
    w.push_bits(len_bits, 5);
    let max_run = (1u32 << len_bits) - 1;
    let mut i = 0;
    while i < lengths.len() {
        if lengths[i] == 0 {
            let mut run = 0u32;
            while i < lengths.len() && lengths[i] == 0 && run < max_run {
                run += 1;
                i += 1;
            }
            w.push_bits(0, len_bits);
            w.push_bits(run, len_bits);
        } else {
            w.push_bits(lengths[i] as u32, len_bits);
            i += 1;
        }
    }
}

/// Raw-deflate a buffer (the zlib codec's on-disk form).
pub fn deflate(data: &[u8]) -> Vec<u8> {
    let mut enc =
        flate2::write::DeflateEncoder::new(Vec::new(), flate2::Compression::default());
    enc.write_all(data).unwrap();
    enc.finish().unwrap()
}

/// One hunk of a synthetic CHD.
pub enum HunkSpec {
    /// Stored uncompressed; must be exactly `hunk_bytes` long.
    Uncompressed(Vec<u8>),
    /// Pre-compressed payload routed to the given codec slot (0–3).
    Compressed { slot: u8, data: Vec<u8> },
    /// Self reference to an earlier (or, for negative tests, any) hunk.
    SelfRef(u32),
}

/// Parameters for [`build_chd`].
pub struct ChdSpec {
    pub hunk_bytes: u32,
    pub unit_bytes: u32,
    pub logical_bytes: u64,
    pub compressors: [u32; 4],
    pub hunks: Vec<HunkSpec>,
    pub raw_sha1: [u8; 20],
    pub sha1: [u8; 20],
    pub parent_sha1: [u8; 20],
    /// Metadata entries appended after the map, in chain order.
    pub metadata: Vec<([u8; 4], Vec<u8>)>,
}

impl ChdSpec {
    pub fn new(hunk_bytes: u32, unit_bytes: u32, logical_bytes: u64) -> Self {
        Self {
            hunk_bytes,
            unit_bytes,
            logical_bytes,
            compressors: [crate::header::CODEC_ZLIB, 0, 0, 0],
            hunks: Vec::new(),
            raw_sha1: sha1_bytes("f6348f85d8487e7aff1fa54e5987b172bce2a3a6"),
            sha1: sha1_bytes("cdd8baa51e7b84bb11037fb3415d698d011fe40a"),
            parent_sha1: [0u8; 20],
            metadata: Vec::new(),
        }
    }
}

/// Decode a 40-hex-char SHA1 into its 20 raw bytes.
pub fn sha1_bytes(hex: &str) -> [u8; 20] {
    let mut out = [0u8; 20];
    for (i, byte) in out.iter_mut().enumerate() {
        *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).unwrap();
    }
    out
}

const LENGTH_BITS: u32 = 24;
const SELF_BITS: u32 = 16;
const PARENT_BITS: u32 = 16;

/// Assemble a complete CHD v5 file from the description.
pub fn build_chd(spec: &ChdSpec) -> Vec<u8> {
    // Data section directly follows the header.
    let first_offset = HEADER_SIZE;
    let mut data_section = Vec::new();
    let mut entries = Vec::new();
    let mut cursor = first_offset;

    for hunk in &spec.hunks {
        match hunk {
            HunkSpec::Uncompressed(data) => {
                assert_eq!(data.len(), spec.hunk_bytes as usize);
                entries.push(MapEntry {
                    compression: COMPRESSION_NONE,
                    length: spec.hunk_bytes,
                    offset: cursor,
                    crc16: 0,
                });
                data_section.extend_from_slice(data);
                cursor += spec.hunk_bytes as u64;
            }
            HunkSpec::Compressed { slot, data } => {
                entries.push(MapEntry {
                    compression: *slot,
                    length: data.len() as u32,
                    offset: cursor,
                    crc16: 0,
                });
                data_section.extend_from_slice(data);
                cursor += data.len() as u64;
            }
            HunkSpec::SelfRef(target) => {
                entries.push(MapEntry {
                    compression: COMPRESSION_SELF,
                    length: 0,
                    offset: *target as u64,
                    crc16: 0,
                });
            }
        }
    }

    // Map bit stream: flat 4-bit tree (symbol == code), then phase 1
    // compression types, then phase 2 per-entry fields.
    let mut w = BitWriter::new();
    encode_tree(&[4u8; 16], 4, &mut w);
    for entry in &entries {
        w.push_bits(entry.compression as u32, 4);
    }
    for entry in &entries {
        match entry.compression {
            0..=3 => {
                w.push_bits(entry.length, LENGTH_BITS);
                w.push_bits(entry.crc16 as u32, 16);
            }
            COMPRESSION_NONE => {
                w.push_bits(entry.crc16 as u32, 16);
            }
            COMPRESSION_SELF => {
                w.push_bits(entry.offset as u32, SELF_BITS);
            }
            other => panic!("unsupported test hunk compression {}", other),
        }
    }
    let map_stream = w.finish();

    let map_offset = first_offset + data_section.len() as u64;
    let meta_offset = if spec.metadata.is_empty() {
        0
    } else {
        map_offset + crate::map::MAP_HEADER_SIZE + map_stream.len() as u64
    };

    // 16-byte map header.
    let mut map_section = Vec::new();
    map_section.extend_from_slice(&(map_stream.len() as u32).to_be_bytes());
    let fo = first_offset;
    map_section.extend_from_slice(&[
        (fo >> 40) as u8,
        (fo >> 32) as u8,
        (fo >> 24) as u8,
        (fo >> 16) as u8,
        (fo >> 8) as u8,
        fo as u8,
    ]);
    map_section.extend_from_slice(&map_crc16(&entries).to_be_bytes());
    map_section.push(LENGTH_BITS as u8);
    map_section.push(SELF_BITS as u8);
    map_section.push(PARENT_BITS as u8);
    map_section.push(0);
    map_section.extend_from_slice(&map_stream);

    // Metadata chain.
    let mut meta_section = Vec::new();
    let meta_base = map_offset + map_section.len() as u64;
    for (i, (tag, payload)) in spec.metadata.iter().enumerate() {
        let next = if i + 1 < spec.metadata.len() {
            meta_base + meta_section.len() as u64 + 16 + payload.len() as u64
        } else {
            0
        };
        meta_section.extend_from_slice(tag);
        meta_section.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        meta_section.extend_from_slice(&next.to_be_bytes());
        meta_section.extend_from_slice(payload);
    }

    // 124-byte header.
    let mut file = Vec::new();
    file.extend_from_slice(crate::header::CHD_MAGIC);
    file.extend_from_slice(&(HEADER_SIZE as u32).to_be_bytes());
    file.extend_from_slice(&5u32.to_be_bytes());
    for codec in spec.compressors {
        file.extend_from_slice(&codec.to_be_bytes());
    }
    file.extend_from_slice(&spec.logical_bytes.to_be_bytes());
    file.extend_from_slice(&map_offset.to_be_bytes());
    file.extend_from_slice(&meta_offset.to_be_bytes());
    file.extend_from_slice(&spec.hunk_bytes.to_be_bytes());
    file.extend_from_slice(&spec.unit_bytes.to_be_bytes());
    file.extend_from_slice(&spec.raw_sha1);
    file.extend_from_slice(&spec.sha1);
    file.extend_from_slice(&spec.parent_sha1);
    assert_eq!(file.len() as u64, HEADER_SIZE);

    file.extend_from_slice(&data_section);
    file.extend_from_slice(&map_section);
    file.extend_from_slice(&meta_section);
    file
}
