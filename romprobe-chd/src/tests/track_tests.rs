use super::*;
use crate::testutil::{build_chd, ChdSpec, HunkSpec};
use romprobe_core::{MemReader, RandomAccess};

#[test]
fn parses_mode1_track_record() {
    let track =
        parse_track_entry(b"TRACK:1 TYPE:MODE1_RAW SUBTYPE:NONE FRAMES:337350").unwrap();
    assert_eq!(track.number, 1);
    assert_eq!(track.track_type, "MODE1_RAW");
    assert_eq!(track.frames, 337350);
    assert_eq!(track.pregap, 0);
}

#[test]
fn parses_pregap_and_ignores_extra_keys() {
    let track = parse_track_entry(
        b"TRACK:2 TYPE:MODE2_RAW SUBTYPE:RW_RAW FRAMES:300000 PREGAP:150 PGTYPE:MODE2 POSTGAP:75",
    )
    .unwrap();
    assert_eq!(track.number, 2);
    assert_eq!(track.track_type, "MODE2_RAW");
    assert_eq!(track.frames, 300000);
    assert_eq!(track.pregap, 150);
}

#[test]
fn empty_or_trackless_records_are_skipped() {
    assert!(parse_track_entry(b"").is_none());
    assert!(parse_track_entry(b"TYPE:AUDIO FRAMES:100").is_none());
}

#[test]
fn null_padding_is_stripped() {
    let track = parse_track_entry(b"TRACK:3 TYPE:AUDIO FRAMES:15000\0\0\0").unwrap();
    assert_eq!(track.number, 3);
    assert_eq!(track.frames, 15000);
}

#[test]
fn track_size_is_frames_times_2352() {
    let track = Track {
        number: 1,
        track_type: "AUDIO".into(),
        frames: 100,
        pregap: 0,
        start_frame: 0,
    };
    assert_eq!(track.size(), 100 * 2352);
}

fn chd_with_tracks(metadata: Vec<([u8; 4], Vec<u8>)>) -> Vec<u8> {
    let mut spec = ChdSpec::new(4896, 2448, 4896);
    spec.hunks = vec![HunkSpec::Uncompressed(vec![0u8; 4896])];
    spec.metadata = metadata;
    build_chd(&spec)
}

#[test]
fn metadata_chain_yields_tracks_in_file_order() {
    let file = chd_with_tracks(vec![
        (
            *TAG_CDROM2,
            b"TRACK:1 TYPE:MODE1_RAW SUBTYPE:NONE FRAMES:1000 PREGAP:0".to_vec(),
        ),
        (*b"GDDD", b"CYLS:16 HEADS:4".to_vec()), // unrelated tag, skipped
        (
            *TAG_CDROM2,
            b"TRACK:2 TYPE:AUDIO SUBTYPE:NONE FRAMES:500 PREGAP:150".to_vec(),
        ),
    ]);
    let size = file.len() as u64;
    let mut chd = Chd::open(MemReader::new(file), size).unwrap();
    let tracks = chd.tracks().unwrap();

    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[0].number, 1);
    assert_eq!(tracks[0].start_frame, 0);
    assert_eq!(tracks[1].number, 2);
    // Track 2 starts after track 1's pregap + frames.
    assert_eq!(tracks[1].start_frame, 1000);
}

#[test]
fn no_metadata_yields_no_tracks() {
    let file = chd_with_tracks(Vec::new());
    let size = file.len() as u64;
    let mut chd = Chd::open(MemReader::new(file), size).unwrap();
    assert!(chd.tracks().unwrap().is_empty());
}

#[test]
fn track_reader_skips_pregap_and_subcode() {
    // Two 2448-byte frames; the track has 1 pregap frame and 1 data
    // frame, so the reader's offset 0 lands on frame 1.
    let mut frames = vec![0u8; 2 * 2448];
    for (i, b) in frames[2448..2448 + 2352].iter_mut().enumerate() {
        *b = (i % 250) as u8;
    }

    let mut spec = ChdSpec::new(2 * 2448, 2448, 2 * 2448);
    spec.hunks = vec![HunkSpec::Uncompressed(frames.clone())];
    spec.metadata = vec![(
        *TAG_CDROM,
        b"TRACK:1 TYPE:MODE1_RAW SUBTYPE:NONE FRAMES:1 PREGAP:1".to_vec(),
    )];
    let file = build_chd(&spec);
    let size = file.len() as u64;
    let mut chd = Chd::open(MemReader::new(file), size).unwrap();

    let tracks = chd.tracks().unwrap();
    assert_eq!(tracks.len(), 1);

    let mut reader = chd.track_reader(&tracks[0]);
    assert_eq!(reader.len(), 2352);

    let mut buf = vec![0u8; 2352];
    reader.read_exact_at(&mut buf, 0).unwrap();
    assert_eq!(buf, &frames[2448..2448 + 2352]);

    // Reads past the track's frames are clipped.
    assert_eq!(reader.read_at(&mut buf, 2352).unwrap(), 0);
}
