use super::*;
use romprobe_core::MemReader;

pub fn make_gcm_header(game_code: &[u8; 4], maker: &[u8; 2], title: &str, wii: bool) -> Vec<u8> {
    let mut header = vec![0u8; DISC_HEADER_SIZE];
    header[0..4].copy_from_slice(game_code);
    header[4..6].copy_from_slice(maker);
    header[6] = 0; // disc number
    header[7] = 0; // version
    if wii {
        header[0x18..0x1C].copy_from_slice(&WII_MAGIC.to_be_bytes());
    } else {
        header[0x1C..0x20].copy_from_slice(&GC_MAGIC.to_be_bytes());
    }
    let bytes = title.as_bytes();
    header[TITLE_OFFSET..TITLE_OFFSET + bytes.len()].copy_from_slice(bytes);
    header
}

#[test]
fn parses_gamecube_disc() {
    let header = make_gcm_header(b"GMKE", b"01", "Test Game", false);
    let size = header.len() as u64;
    let info = parse_gcm(&mut MemReader::new(header), size).unwrap();

    assert!(!info.is_wii);
    assert_eq!(info.platform(), Platform::GameCube);
    assert_eq!(info.game_code, "GMKE");
    assert_eq!(info.serial(), "GMKE");
    assert_eq!(info.maker_code, "01");
    assert_eq!(info.title, "Test Game");
    assert_eq!(info.regions(), vec![Region::Usa]);
    assert_eq!(info.disc_number(), Some(1));
}

#[test]
fn parses_wii_disc() {
    let header = make_gcm_header(b"RSPJ", b"01", "Wii Game", true);
    let size = header.len() as u64;
    let info = parse_gcm(&mut MemReader::new(header), size).unwrap();

    assert!(info.is_wii);
    assert_eq!(info.platform(), Platform::Wii);
    assert_eq!(info.regions(), vec![Region::Japan]);
}

#[test]
fn second_disc_number() {
    let mut header = make_gcm_header(b"GMKE", b"01", "Disc Two", false);
    header[6] = 1;
    let size = header.len() as u64;
    let info = parse_gcm(&mut MemReader::new(header), size).unwrap();
    assert_eq!(info.disc_number(), Some(2));
}

#[test]
fn missing_magic_words_are_rejected() {
    let mut header = make_gcm_header(b"GMKE", b"01", "No Magic", false);
    header[0x1C..0x20].copy_from_slice(&[0u8; 4]);
    let size = header.len() as u64;
    assert!(parse_gcm(&mut MemReader::new(header), size).is_err());
}

#[test]
fn too_small_file_is_rejected() {
    let header = vec![0u8; 0x20];
    assert!(matches!(
        parse_gcm(&mut MemReader::new(header), 0x20),
        Err(IdentError::TooSmall { .. })
    ));
}
