use super::*;
use romprobe_core::MemReader;

/// Minimal XBE image with the certificate at file offset 0x400.
fn make_xbe(title: &str, title_id: u32, region_flags: u32) -> Vec<u8> {
    let base: u32 = 0x0001_0000;
    let cert_file_offset: u32 = 0x400;
    let mut xbe = vec![0u8; 0x1000];

    xbe[0..4].copy_from_slice(crate::xbe::XBE_MAGIC);
    xbe[0x104..0x108].copy_from_slice(&base.to_le_bytes());
    xbe[0x118..0x11C].copy_from_slice(&(base + cert_file_offset).to_le_bytes());

    let cert = cert_file_offset as usize;
    xbe[cert + 0x08..cert + 0x0C].copy_from_slice(&title_id.to_le_bytes());
    for (i, unit) in title.encode_utf16().enumerate().take(40) {
        let at = cert + 0x0C + i * 2;
        xbe[at..at + 2].copy_from_slice(&unit.to_le_bytes());
    }
    xbe[cert + 0xA0..cert + 0xA4].copy_from_slice(&region_flags.to_le_bytes());
    xbe
}

/// Build one XDVDFS directory entry at a dword-aligned position.
fn dirent(left: u16, right: u16, sector: u32, size: u32, name: &str) -> Vec<u8> {
    let mut entry = Vec::new();
    entry.extend_from_slice(&left.to_le_bytes());
    entry.extend_from_slice(&right.to_le_bytes());
    entry.extend_from_slice(&sector.to_le_bytes());
    entry.extend_from_slice(&size.to_le_bytes());
    entry.push(0x20); // attributes: archive
    entry.push(name.len() as u8);
    entry.extend_from_slice(name.as_bytes());
    while entry.len() % 4 != 0 {
        entry.push(0xFF);
    }
    entry
}

/// Build an XISO whose root directory holds the given entries and
/// whose sector 48 carries a default.xbe.
pub fn make_xiso(root_entries: &[Vec<u8>]) -> Vec<u8> {
    let mut image = vec![0u8; 50 * 2048];

    let vd = VOLUME_DESCRIPTOR_OFFSET as usize;
    image[vd..vd + 20].copy_from_slice(XISO_MAGIC);
    image[vd + 0x14..vd + 0x18].copy_from_slice(&40u32.to_le_bytes()); // root sector
    image[vd + 0x18..vd + 0x1C].copy_from_slice(&2048u32.to_le_bytes()); // root size

    let mut offset = 40 * 2048;
    for entry in root_entries {
        image[offset..offset + entry.len()].copy_from_slice(entry);
        offset += entry.len();
    }

    let xbe = make_xbe("Xromwell", 0xFFFE_0000, 0x7);
    image[48 * 2048..48 * 2048 + xbe.len()].copy_from_slice(&xbe);
    image
}

#[test]
fn finds_default_xbe_and_delegates() {
    let entries = vec![dirent(0, 0, 48, 0x1000, "default.xbe")];
    let image = make_xiso(&entries);
    let size = image.len() as u64;
    let info = parse_xiso(&mut MemReader::new(image), size).unwrap();

    assert_eq!(info.platform(), Platform::Xbox);
    assert_eq!(info.title(), "Xromwell");
    assert_eq!(info.xbe.title_id, 0xFFFE_0000);
}

#[test]
fn name_match_is_case_insensitive() {
    let entries = vec![dirent(0, 0, 48, 0x1000, "DEFAULT.XBE")];
    let image = make_xiso(&entries);
    let size = image.len() as u64;
    assert!(parse_xiso(&mut MemReader::new(image), size).is_ok());
}

#[test]
fn walks_tree_links() {
    // First entry is another file whose right link points at the
    // default.xbe entry.
    let first = dirent(0, 0, 49, 16, "readme.txt");
    let right_dword = (first.len() / 4) as u16;
    let entries = vec![
        dirent(0, right_dword, 49, 16, "readme.txt"),
        dirent(0, 0, 48, 0x1000, "default.xbe"),
    ];
    let image = make_xiso(&entries);
    let size = image.len() as u64;
    assert!(parse_xiso(&mut MemReader::new(image), size).is_ok());
}

#[test]
fn missing_default_xbe_is_not_found() {
    let entries = vec![dirent(0, 0, 49, 16, "readme.txt")];
    let image = make_xiso(&entries);
    let size = image.len() as u64;
    assert!(matches!(
        parse_xiso(&mut MemReader::new(image), size),
        Err(IdentError::NotFound(_))
    ));
}

#[test]
fn missing_magic_is_rejected() {
    let image = vec![0u8; 0x12000];
    let size = image.len() as u64;
    assert!(matches!(
        parse_xiso(&mut MemReader::new(image), size),
        Err(IdentError::InvalidFormat(_))
    ));
}

#[test]
fn small_file_is_rejected() {
    let image = vec![0u8; 0x8000];
    let size = image.len() as u64;
    assert!(matches!(
        parse_xiso(&mut MemReader::new(image), size),
        Err(IdentError::TooSmall { .. })
    ));
}
