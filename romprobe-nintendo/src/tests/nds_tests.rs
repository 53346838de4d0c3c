use super::*;
use romprobe_core::MemReader;

fn make_nds_rom() -> Vec<u8> {
    let mut rom = vec![0u8; 0x1000];
    rom[0x000..0x009].copy_from_slice(b"TESTTITLE");
    rom[0x00C..0x010].copy_from_slice(b"ABCE");
    rom[0x010..0x012].copy_from_slice(b"01");
    rom[0x012] = 0x00; // NDS
    rom[0x014] = 7; // 128 KiB << 7 = 16 MiB
    rom[0x01E] = 1;
    rom[0x06C..0x06E].copy_from_slice(&0xBEEFu16.to_le_bytes());
    rom[0x080..0x084].copy_from_slice(&0x0100_0000u32.to_le_bytes());
    rom
}

#[test]
fn parses_header() {
    let rom = make_nds_rom();
    let size = rom.len() as u64;
    let info = parse_nds(&mut MemReader::new(rom), size).unwrap();

    assert_eq!(info.title, "TESTTITLE");
    assert_eq!(info.game_code, "ABCE");
    assert_eq!(info.maker_code, "01");
    assert_eq!(info.maker_name(), Some("Nintendo"));
    assert_eq!(info.chip_capacity, 16 * 1024 * 1024);
    assert_eq!(info.used_rom_size, 0x0100_0000);
    assert_eq!(info.secure_area_crc, 0xBEEF);
    assert_eq!(info.version, 1);
}

#[test]
fn serial_prefix_tracks_unit_code() {
    let rom = make_nds_rom();
    let size = rom.len() as u64;
    let info = parse_nds(&mut MemReader::new(rom), size).unwrap();
    assert_eq!(info.serial(), "NTR-ABCE");
    assert_eq!(info.regions(), vec![Region::Usa]);

    let mut dsi = make_nds_rom();
    dsi[0x012] = 0x03;
    let size = dsi.len() as u64;
    let info = parse_nds(&mut MemReader::new(dsi), size).unwrap();
    assert_eq!(info.serial(), "TWL-ABCE");
}

#[test]
fn non_ascii_game_code_is_rejected() {
    let mut rom = make_nds_rom();
    rom[0x00C..0x010].copy_from_slice(&[0x01, 0x02, 0x03, 0x04]);
    let size = rom.len() as u64;
    assert!(parse_nds(&mut MemReader::new(rom), size).is_err());
}

#[test]
fn oversized_capacity_byte_yields_zero() {
    let mut rom = make_nds_rom();
    rom[0x014] = 40;
    let size = rom.len() as u64;
    let info = parse_nds(&mut MemReader::new(rom), size).unwrap();
    assert_eq!(info.chip_capacity, 0);
}

#[test]
fn too_small_file_is_rejected() {
    let rom = vec![0u8; 0x100];
    assert!(matches!(
        parse_nds(&mut MemReader::new(rom), 0x100),
        Err(IdentError::TooSmall { .. })
    ));
}
