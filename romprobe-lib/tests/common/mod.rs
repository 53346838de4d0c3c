//! Shared fixture builders for the orchestrator tests.

use std::io::Write;

use romprobe_chd::header::{CHD_MAGIC, CODEC_ZLIB, HEADER_SIZE};
use romprobe_chd::map::{map_crc16, MapEntry, COMPRESSION_NONE, MAP_HEADER_SIZE};

pub const SECTOR: usize = 2048;
pub const CD_FRAME: usize = 2448;
pub const CD_DATA_OFFSET: usize = 24;

/// Build a cooked ISO 9660 volume: optional system-area bytes at
/// sector 0, a PVD at sector 16, and root-directory files from
/// sector 19.
pub fn build_iso(system_area: &[u8], files: &[(&str, &[u8])]) -> Vec<u8> {
    let sectors = 19 + files.len().max(1);
    let mut image = vec![0u8; sectors * SECTOR];

    image[..system_area.len()].copy_from_slice(system_area);

    let pvd = 16 * SECTOR;
    image[pvd] = 1;
    image[pvd + 1..pvd + 6].copy_from_slice(b"CD001");
    let root_rec = dir_record("\0", 18, SECTOR as u32, true);
    image[pvd + 156..pvd + 156 + root_rec.len()].copy_from_slice(&root_rec);

    let mut dir_offset = 18 * SECTOR;
    for (i, (name, content)) in files.iter().enumerate() {
        let extent = (19 + i) as u32;
        let rec = dir_record(name, extent, content.len() as u32, false);
        image[dir_offset..dir_offset + rec.len()].copy_from_slice(&rec);
        dir_offset += rec.len();

        let at = extent as usize * SECTOR;
        image[at..at + content.len()].copy_from_slice(content);
    }

    image
}

fn dir_record(name: &str, extent: u32, len: u32, is_dir: bool) -> Vec<u8> {
    let name_bytes = name.as_bytes();
    let mut rec = vec![0u8; 33 + name_bytes.len()];
    rec[2..6].copy_from_slice(&extent.to_le_bytes());
    rec[10..14].copy_from_slice(&len.to_le_bytes());
    rec[25] = if is_dir { 0x02 } else { 0 };
    rec[32] = name_bytes.len() as u8;
    rec[33..].copy_from_slice(name_bytes);
    if rec.len() % 2 != 0 {
        rec.push(0);
    }
    rec[0] = rec.len() as u8;
    rec
}

/// Re-frame a cooked ISO into raw 2448-byte CD frames (user data at
/// offset 24), the layout of a CD-ROM CHD's logical space.
pub fn frame_iso_as_cd(cooked: &[u8]) -> Vec<u8> {
    let sectors = cooked.len() / SECTOR;
    let mut out = vec![0u8; sectors * CD_FRAME];
    for s in 0..sectors {
        let dst = s * CD_FRAME + CD_DATA_OFFSET;
        out[dst..dst + SECTOR].copy_from_slice(&cooked[s * SECTOR..(s + 1) * SECTOR]);
    }
    out
}

/// Minimal 32 KiB Game Boy ROM.
pub fn make_gb_rom(title: &[u8]) -> Vec<u8> {
    let mut rom = vec![0u8; 0x8000];
    rom[0x134..0x134 + title.len()].copy_from_slice(title);
    rom[0x14A] = 0x01;
    rom[0x14B] = 0x01;
    rom
}

/// Minimal GBA ROM with the fixed byte at 0xB2.
pub fn make_gba_rom(title: &[u8], game_code: &[u8; 4]) -> Vec<u8> {
    let mut rom = vec![0u8; 0x1000];
    rom[0xA0..0xA0 + title.len()].copy_from_slice(title);
    rom[0xAC..0xB0].copy_from_slice(game_code);
    rom[0xB0] = b'0';
    rom[0xB1] = b'1';
    rom[0xB2] = 0x96;
    rom
}

/// Minimal XBE with certificate at 0x400.
pub fn make_xbe(title: &str, title_id: u32) -> Vec<u8> {
    let base: u32 = 0x0001_0000;
    let mut xbe = vec![0u8; 0x1000];
    xbe[0..4].copy_from_slice(b"XBEH");
    xbe[0x104..0x108].copy_from_slice(&base.to_le_bytes());
    xbe[0x118..0x11C].copy_from_slice(&(base + 0x400).to_le_bytes());
    let cert = 0x400;
    xbe[cert + 0x08..cert + 0x0C].copy_from_slice(&title_id.to_le_bytes());
    for (i, unit) in title.encode_utf16().enumerate().take(40) {
        let at = cert + 0x0C + i * 2;
        xbe[at..at + 2].copy_from_slice(&unit.to_le_bytes());
    }
    xbe[cert + 0xA0..cert + 0xA4].copy_from_slice(&1u32.to_le_bytes());
    xbe
}

/// MSB-first bit writer for encoding the CHD hunk map.
struct BitWriter {
    bytes: Vec<u8>,
    current: u8,
    filled: u32,
}

impl BitWriter {
    fn new() -> Self {
        Self {
            bytes: Vec::new(),
            current: 0,
            filled: 0,
        }
    }

    fn push_bits(&mut self, value: u32, count: u32) {
        for i in (0..count).rev() {
            self.current = (self.current << 1) | ((value >> i) & 1) as u8;
            self.filled += 1;
            if self.filled == 8 {
                self.bytes.push(self.current);
                self.current = 0;
                self.filled = 0;
            }
        }
    }

    fn finish(mut self) -> Vec<u8> {
        if self.filled > 0 {
            self.current <<= 8 - self.filled;
            self.bytes.push(self.current);
        }
        self.bytes
    }
}

const LENGTH_BITS: u32 = 24;

/// Known SHA1 strings stamped into the synthetic CHD header.
pub const CHD_RAW_SHA1: &str = "f6348f85d8487e7aff1fa54e5987b172bce2a3a6";
pub const CHD_COMPRESSED_SHA1: &str = "cdd8baa51e7b84bb11037fb3415d698d011fe40a";

fn sha1_bytes(hex: &str) -> [u8; 20] {
    let mut out = [0u8; 20];
    for (i, byte) in out.iter_mut().enumerate() {
        *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).unwrap();
    }
    out
}

/// Build a CHD v5 file holding `logical` as uncompressed hunks, with
/// optional track-metadata records.
pub fn build_uncompressed_chd(
    logical: &[u8],
    hunk_bytes: u32,
    unit_bytes: u32,
    metadata: &[(&[u8; 4], &[u8])],
) -> Vec<u8> {
    let hunks = (logical.len() as u64 + hunk_bytes as u64 - 1) / hunk_bytes as u64;
    let first_offset = HEADER_SIZE;

    // Data section: full hunks, the last one zero-padded.
    let mut data_section = vec![0u8; (hunks * hunk_bytes as u64) as usize];
    data_section[..logical.len()].copy_from_slice(logical);

    let entries: Vec<MapEntry> = (0..hunks)
        .map(|i| MapEntry {
            compression: COMPRESSION_NONE,
            length: hunk_bytes,
            offset: first_offset + i * hunk_bytes as u64,
            crc16: 0,
        })
        .collect();

    // Map stream: flat 4-bit tree (each symbol is its own code),
    // phase-1 types, phase-2 CRC fields.
    let mut w = BitWriter::new();
    w.push_bits(4, 5); // length-field width
    for _ in 0..16 {
        w.push_bits(4, 4); // all 16 symbols carry 4-bit codes
    }
    for entry in &entries {
        w.push_bits(entry.compression as u32, 4);
    }
    for entry in &entries {
        w.push_bits(entry.crc16 as u32, 16);
    }
    let map_stream = w.finish();

    let map_offset = first_offset + data_section.len() as u64;
    let map_total = MAP_HEADER_SIZE + map_stream.len() as u64;
    let meta_offset = if metadata.is_empty() {
        0
    } else {
        map_offset + map_total
    };

    let mut map_section = Vec::new();
    map_section.extend_from_slice(&(map_stream.len() as u32).to_be_bytes());
    map_section.extend_from_slice(&[
        (first_offset >> 40) as u8,
        (first_offset >> 32) as u8,
        (first_offset >> 24) as u8,
        (first_offset >> 16) as u8,
        (first_offset >> 8) as u8,
        first_offset as u8,
    ]);
    map_section.extend_from_slice(&map_crc16(&entries).to_be_bytes());
    map_section.push(LENGTH_BITS as u8);
    map_section.push(16);
    map_section.push(16);
    map_section.push(0);
    map_section.extend_from_slice(&map_stream);

    let mut meta_section = Vec::new();
    let meta_base = map_offset + map_total;
    for (i, (tag, payload)) in metadata.iter().enumerate() {
        let next = if i + 1 < metadata.len() {
            meta_base + meta_section.len() as u64 + 16 + payload.len() as u64
        } else {
            0
        };
        meta_section.extend_from_slice(*tag);
        meta_section.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        meta_section.extend_from_slice(&next.to_be_bytes());
        meta_section.extend_from_slice(payload);
    }

    let mut file = Vec::new();
    file.extend_from_slice(CHD_MAGIC);
    file.extend_from_slice(&(HEADER_SIZE as u32).to_be_bytes());
    file.extend_from_slice(&5u32.to_be_bytes());
    file.extend_from_slice(&CODEC_ZLIB.to_be_bytes());
    file.extend_from_slice(&[0u8; 12]); // remaining codec slots empty
    file.extend_from_slice(&(logical.len() as u64).to_be_bytes());
    file.extend_from_slice(&map_offset.to_be_bytes());
    file.extend_from_slice(&meta_offset.to_be_bytes());
    file.extend_from_slice(&hunk_bytes.to_be_bytes());
    file.extend_from_slice(&unit_bytes.to_be_bytes());
    file.extend_from_slice(&sha1_bytes(CHD_RAW_SHA1));
    file.extend_from_slice(&sha1_bytes(CHD_COMPRESSED_SHA1));
    file.extend_from_slice(&[0u8; 20]);
    assert_eq!(file.len() as u64, HEADER_SIZE);

    file.extend_from_slice(&data_section);
    file.extend_from_slice(&map_section);
    file.extend_from_slice(&meta_section);
    file
}

/// Write a ZIP archive holding the given files (deflate-compressed).
pub fn write_zip(path: &std::path::Path, files: &[(&str, &[u8])]) {
    let file = std::fs::File::create(path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);
    for (name, data) in files {
        writer.start_file(*name, options).unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap();
}
