use super::*;
use crate::testutil::{deflate, encode_tree, BitWriter};

fn sample(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 7 % 251) as u8).collect()
}

#[test]
fn inflate_round_trip() {
    let data = sample(4096);
    let compressed = deflate(&data);
    let out = inflate(&compressed, data.len()).unwrap();
    assert_eq!(out, data);
}

#[test]
fn inflate_garbage_is_an_error() {
    assert!(inflate(&[0xFF, 0x00, 0xAA, 0x55], 128).is_err());
}

#[test]
fn lzma_headerless_round_trip() {
    let data = sample(4096);

    // lzma-rs emits a full 13-byte header; CHD stores only the payload.
    let mut full = Vec::new();
    lzma_rs::lzma_compress(&mut std::io::Cursor::new(&data), &mut full).unwrap();
    let headerless = &full[13..];

    let out = lzma(headerless, data.len()).unwrap();
    assert_eq!(out, data);
}

#[test]
fn lzma_empty_input_is_an_error() {
    assert!(lzma(&[], 100).is_err());
}

#[test]
fn zstd_round_trip() {
    let data = sample(8192);
    let compressed = zstd::bulk::compress(&data, 3).unwrap();

    let mut decoder = zstd::bulk::Decompressor::new().unwrap();
    let out = zstd_decode(&mut decoder, &compressed, data.len()).unwrap();
    assert_eq!(out, data);
}

/// Encode bytes with the flat 256-symbol / 8-bit tree, under which each
/// symbol's canonical code is the symbol value itself.
fn huffman_encode_flat(data: &[u8]) -> Vec<u8> {
    let mut w = BitWriter::new();
    encode_tree(&[8u8; 256], 4, &mut w);
    for &b in data {
        w.push_bits(b as u32, 8);
    }
    w.finish()
}

#[test]
fn huffman_flat_tree_round_trip() {
    let data = sample(1000);
    let encoded = huffman_encode_flat(&data);
    let out = huffman(&encoded, data.len()).unwrap();
    assert_eq!(out, data);
}

#[test]
fn huffman_truncated_stream_is_an_error() {
    let data = sample(1000);
    let encoded = huffman_encode_flat(&data);
    let truncated = &encoded[..encoded.len() / 2];
    assert!(huffman(truncated, data.len()).is_err());
}

#[test]
fn flac_is_unsupported() {
    let mut decoder = zstd::bulk::Decompressor::new().unwrap();
    for codec in [CODEC_FLAC, CODEC_CD_FLAC] {
        let err = decompress_hunk(codec, &[0u8; 16], 2448, &mut decoder).unwrap_err();
        assert!(matches!(err, romprobe_core::IdentError::Unsupported(_)));
    }
}

/// Build a CD-interleaved hunk: `frames` frames of patterned sector
/// data and subcode, compressed with deflate.
fn build_cd_hunk(frames: usize, with_subcode: bool) -> (Vec<u8>, Vec<u8>) {
    let mut sectors = Vec::new();
    let mut subcode = Vec::new();
    for f in 0..frames {
        sectors.extend(std::iter::repeat((f + 1) as u8).take(2352));
        subcode.extend(std::iter::repeat((0xA0 + f) as u8).take(96));
    }

    let base_compressed = deflate(&sectors);
    let ecc_bytes = (frames + 7) / 8;

    let mut data = vec![0u8; ecc_bytes];
    data.push((base_compressed.len() >> 8) as u8);
    data.push(base_compressed.len() as u8);
    data.extend_from_slice(&base_compressed);
    if with_subcode {
        data.extend_from_slice(&deflate(&subcode));
    }

    // Expected reconstruction: interleaved frames.
    let mut expected = Vec::new();
    for f in 0..frames {
        expected.extend_from_slice(&sectors[f * 2352..(f + 1) * 2352]);
        if with_subcode {
            expected.extend_from_slice(&subcode[f * 96..(f + 1) * 96]);
        } else {
            expected.extend(std::iter::repeat(0u8).take(96));
        }
    }
    (data, expected)
}

#[test]
fn cd_zlib_reassembles_frames() {
    let frames = 4;
    let hunk_bytes = (frames * 2448) as u32;
    let (data, expected) = build_cd_hunk(frames, true);

    let mut decoder = zstd::bulk::Decompressor::new().unwrap();
    let out = decompress_hunk(CODEC_CD_ZLIB, &data, hunk_bytes, &mut decoder).unwrap();
    assert_eq!(out, expected);
}

#[test]
fn cd_missing_subcode_is_zero_filled() {
    let frames = 2;
    let hunk_bytes = (frames * 2448) as u32;
    let (data, expected) = build_cd_hunk(frames, false);

    let mut decoder = zstd::bulk::Decompressor::new().unwrap();
    let out = decompress_hunk(CODEC_CD_ZLIB, &data, hunk_bytes, &mut decoder).unwrap();
    assert_eq!(out, expected);
}

#[test]
fn cd_rejects_undersized_hunk() {
    let mut decoder = zstd::bulk::Decompressor::new().unwrap();
    let err = decompress_hunk(CODEC_CD_ZLIB, &[0u8; 4], 1024, &mut decoder).unwrap_err();
    assert!(matches!(err, romprobe_core::IdentError::CorruptedHeader(_)));
}

#[test]
fn cd_zstd_base_codec() {
    let frames = 1;
    let hunk_bytes = (frames * 2448) as u32;

    let sectors: Vec<u8> = sample(2352);
    let subcode: Vec<u8> = sample(96);
    let base_compressed = zstd::bulk::compress(&sectors, 3).unwrap();

    let mut data = vec![0u8; 1]; // ECC bitmap for 1 frame
    data.push((base_compressed.len() >> 8) as u8);
    data.push(base_compressed.len() as u8);
    data.extend_from_slice(&base_compressed);
    data.extend_from_slice(&deflate(&subcode));

    let mut decoder = zstd::bulk::Decompressor::new().unwrap();
    let out = decompress_hunk(CODEC_CD_ZSTD, &data, hunk_bytes, &mut decoder).unwrap();
    assert_eq!(&out[..2352], &sectors[..]);
    assert_eq!(&out[2352..], &subcode[..]);
}
