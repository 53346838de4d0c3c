use super::*;
use std::io::Write;

fn write_test_zip(path: &Path, files: &[(&str, &[u8])], with_dir: bool) {
    let file = File::create(path).unwrap();
    let mut writer = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);
    if with_dir {
        writer.add_directory("subdir/", options).unwrap();
    }
    for (name, data) in files {
        writer.start_file(*name, options).unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap();
}

#[test]
fn enumerates_files_and_skips_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.zip");
    write_test_zip(
        &path,
        &[("a.gb", b"aaaa"), ("subdir/b.gba", b"bbbbbbbb")],
        true,
    );

    let container = ZipContainer::open(&path).unwrap();
    let entries = container.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].name, "a.gb");
    assert_eq!(entries[0].size, 4);
    assert_eq!(entries[1].name, "subdir/b.gba");
    assert_eq!(entries[1].size, 8);
    // Central-directory CRCs are present.
    assert_ne!(entries[0].crc32, 0);
}

#[test]
fn lazy_reader_supports_backward_reads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.zip");
    let content: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
    write_test_zip(&path, &[("data.bin", content.as_slice())], false);

    let mut container = ZipContainer::open(&path).unwrap();
    let entry = container.entries()[0].clone();
    let mut reader = container.open_entry(&entry).unwrap();
    assert_eq!(reader.len(), content.len() as u64);

    // Forward read decompresses up to the requested frontier.
    let mut buf = [0u8; 64];
    reader.read_exact_at(&mut buf, 5000).unwrap();
    assert_eq!(&buf[..], &content[5000..5064]);

    // Earlier offsets are served from the buffer.
    reader.read_exact_at(&mut buf, 0).unwrap();
    assert_eq!(&buf[..], &content[..64]);

    // Reads clip at the end of the entry.
    let n = reader.read_at(&mut buf, content.len() as u64 - 10).unwrap();
    assert_eq!(n, 10);
    assert_eq!(reader.read_at(&mut buf, content.len() as u64).unwrap(), 0);
}

#[test]
fn non_zip_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("junk.zip");
    std::fs::write(&path, b"not a zip at all").unwrap();
    assert!(ZipContainer::open(&path).is_err());
}
