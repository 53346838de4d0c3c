use super::*;
use crate::reader::MemReader;

/// Build a raw image of `sectors` physical sectors where each sector's
/// data region is filled with the sector index and the framing bytes
/// are 0xEE.
fn make_raw_image(sectors: u64, physical: u64, data_offset: u64) -> Vec<u8> {
    let mut image = vec![0xEEu8; (sectors * physical) as usize];
    for s in 0..sectors {
        let start = (s * physical + data_offset) as usize;
        for b in &mut image[start..start + LOGICAL_SECTOR_SIZE as usize] {
            *b = s as u8;
        }
    }
    image
}

#[test]
fn logical_size_is_sectors_times_2048() {
    let image = make_raw_image(4, RAW_SECTOR_SIZE, 16);
    let r = SectorReader::new(MemReader::new(image), RAW_SECTOR_SIZE, 16, 4 * RAW_SECTOR_SIZE);
    assert_eq!(r.len(), 4 * 2048);
}

#[test]
fn mode1_translation_formula() {
    // physical(logical) = (logical / 2048) * 2352 + 16 + (logical % 2048)
    let image = make_raw_image(3, RAW_SECTOR_SIZE, 16);
    let mut r = SectorReader::new(MemReader::new(image), RAW_SECTOR_SIZE, 16, 3 * RAW_SECTOR_SIZE);

    let mut buf = [0u8; 1];
    for logical in [0u64, 1, 2047, 2048, 4095, 4096] {
        r.read_exact_at(&mut buf, logical).unwrap();
        assert_eq!(buf[0], (logical / 2048) as u8, "offset {}", logical);
    }
}

#[test]
fn reads_straddle_sector_boundaries() {
    let image = make_raw_image(2, RAW_SECTOR_SIZE, 24);
    let mut r = SectorReader::new(MemReader::new(image), RAW_SECTOR_SIZE, 24, 2 * RAW_SECTOR_SIZE);

    let mut buf = [0u8; 8];
    r.read_exact_at(&mut buf, 2044).unwrap();
    assert_eq!(buf, [0, 0, 0, 0, 1, 1, 1, 1]);
}

#[test]
fn cooked_passthrough() {
    let image = make_raw_image(2, LOGICAL_SECTOR_SIZE, 0);
    let mut r = SectorReader::new(
        MemReader::new(image),
        LOGICAL_SECTOR_SIZE,
        0,
        2 * LOGICAL_SECTOR_SIZE,
    );
    let mut buf = [0u8; 4];
    r.read_exact_at(&mut buf, 2046).unwrap();
    assert_eq!(buf, [0, 0, 1, 1]);
}

#[test]
fn clips_at_logical_eof() {
    let image = make_raw_image(1, RAW_SECTOR_SIZE, 16);
    let mut r = SectorReader::new(MemReader::new(image), RAW_SECTOR_SIZE, 16, RAW_SECTOR_SIZE);
    let mut buf = [0u8; 16];
    assert_eq!(r.read_at(&mut buf, 2040).unwrap(), 8);
    assert_eq!(r.read_at(&mut buf, 2048).unwrap(), 0);
}
