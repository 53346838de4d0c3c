//! Hunk decompression codecs.
//!
//! Each codec is a pure function from compressed bytes plus the
//! expected output size to output bytes. CD-interleaved variants wrap a
//! base codec and reassemble 2448-byte frames from separately-stored
//! sector and subcode streams.

use std::io::Read;

use romprobe_core::IdentError;

use crate::bitstream::{BitReader, HuffmanDecoder};
use crate::header::{
    codec_name, CODEC_CD_FLAC, CODEC_CD_LZMA, CODEC_CD_ZLIB, CODEC_CD_ZSTD, CODEC_FLAC,
    CODEC_HUFF, CODEC_LZMA, CODEC_NONE, CODEC_ZLIB, CODEC_ZSTD,
};

/// Raw CD sector data per frame.
const CD_SECTOR_DATA: usize = 2352;
/// Subcode bytes per frame.
const CD_SUBCODE_DATA: usize = 96;
/// Full CD frame (sector data + subcode).
const CD_FRAME_SIZE: usize = 2448;

/// Decompress one hunk with the codec identified by `codec_id`.
pub fn decompress_hunk(
    codec_id: u32,
    data: &[u8],
    hunk_bytes: u32,
    zstd: &mut zstd::bulk::Decompressor<'_>,
) -> Result<Vec<u8>, IdentError> {
    let size = hunk_bytes as usize;
    match codec_id {
        CODEC_NONE => {
            let mut out = vec![0u8; size];
            let n = data.len().min(size);
            out[..n].copy_from_slice(&data[..n]);
            Ok(out)
        }
        CODEC_ZLIB => inflate(data, size),
        CODEC_LZMA => lzma(data, size),
        CODEC_ZSTD => zstd_decode(zstd, data, size),
        CODEC_HUFF => huffman(data, size),
        CODEC_CD_ZLIB => cd_codec(data, hunk_bytes, CODEC_ZLIB, zstd),
        CODEC_CD_LZMA => cd_codec(data, hunk_bytes, CODEC_LZMA, zstd),
        CODEC_CD_ZSTD => cd_codec(data, hunk_bytes, CODEC_ZSTD, zstd),
        CODEC_FLAC | CODEC_CD_FLAC => Err(IdentError::unsupported(
            "FLAC codec not supported (audio only)",
        )),
        other => Err(IdentError::unsupported(format!(
            "unknown CHD codec: {}",
            codec_name(other)
        ))),
    }
}

/// Raw DEFLATE (no zlib wrapper).
pub fn inflate(data: &[u8], output_size: usize) -> Result<Vec<u8>, IdentError> {
    let mut decoder = flate2::read::DeflateDecoder::new(data);
    let mut out = vec![0u8; output_size];
    let mut done = 0;
    while done < output_size {
        match decoder.read(&mut out[done..]) {
            Ok(0) => break,
            Ok(n) => done += n,
            Err(e) => {
                return Err(IdentError::corrupted_header(format!(
                    "deflate decompress: {}",
                    e
                )))
            }
        }
    }
    out.truncate(done);
    Ok(out)
}

/// Headerless LZMA as stored in CHD files.
///
/// The stream omits the standard 13-byte property header, so one is
/// synthesized: properties byte 0x5D (lc=3, lp=0, pb=2), dictionary
/// size max(64 KiB, output size), little-endian uncompressed length.
pub fn lzma(data: &[u8], output_size: usize) -> Result<Vec<u8>, IdentError> {
    if data.is_empty() {
        return Err(IdentError::corrupted_header("LZMA data empty"));
    }

    const PROPS_BYTE: u8 = 0x5D;
    let dict_size = (output_size as u32).max(65536);

    let mut stream = Vec::with_capacity(13 + data.len());
    stream.push(PROPS_BYTE);
    stream.extend_from_slice(&dict_size.to_le_bytes());
    stream.extend_from_slice(&(output_size as u64).to_le_bytes());
    stream.extend_from_slice(data);

    let mut input = std::io::Cursor::new(stream);
    let mut out = Vec::with_capacity(output_size);
    lzma_rs::lzma_decompress(&mut input, &mut out)
        .map_err(|e| IdentError::corrupted_header(format!("LZMA decompress: {:?}", e)))?;
    out.truncate(output_size);
    Ok(out)
}

/// Zstandard via a reused one-shot decoder.
pub fn zstd_decode(
    decoder: &mut zstd::bulk::Decompressor<'_>,
    data: &[u8],
    output_size: usize,
) -> Result<Vec<u8>, IdentError> {
    decoder
        .decompress(data, output_size)
        .map_err(|e| IdentError::corrupted_header(format!("zstd decompress: {}", e)))
}

/// CHD Huffman hunk codec: 256-symbol alphabet, max code length 8,
/// tree imported from the stream head, then exactly `output_size`
/// symbols decoded.
pub fn huffman(data: &[u8], output_size: usize) -> Result<Vec<u8>, IdentError> {
    let mut reader = BitReader::new(data);
    let mut decoder = HuffmanDecoder::new(256, 8);
    decoder.import_tree_rle(&mut reader)?;

    let mut out = vec![0u8; output_size];
    for (i, byte) in out.iter_mut().enumerate() {
        let sym = decoder.decode(&mut reader).map_err(|e| {
            IdentError::corrupted_header(format!("huffman decode at {}: {}", i, e))
        })?;
        *byte = sym as u8;
    }
    Ok(out)
}

/// CD-interleaved codec wrapper.
///
/// Compressed layout: an ECC bitmap of ⌈frames ÷ 8⌉ bytes (parsed but
/// not acted on), a 2-byte compressed-base-length field (3 bytes when
/// hunk_bytes ≥ 65536), the base-codec payload (frames × 2352 bytes of
/// sector data), then a deflated subcode payload (frames × 96 bytes,
/// zero-filled when absent). Output interleaves each frame's sector
/// data and subcode.
fn cd_codec(
    data: &[u8],
    hunk_bytes: u32,
    base_codec: u32,
    zstd: &mut zstd::bulk::Decompressor<'_>,
) -> Result<Vec<u8>, IdentError> {
    let frames = hunk_bytes as usize / CD_FRAME_SIZE;
    if frames == 0 {
        return Err(IdentError::corrupted_header(format!(
            "CD codec: invalid hunk size {}",
            hunk_bytes
        )));
    }

    let ecc_bytes = (frames + 7) / 8;
    let complen_bytes = if hunk_bytes >= 65536 { 3 } else { 2 };
    let header_bytes = ecc_bytes + complen_bytes;

    if data.len() < header_bytes {
        return Err(IdentError::corrupted_header(format!(
            "CD codec: data too short for header (need {}, have {})",
            header_bytes,
            data.len()
        )));
    }

    let complen_base = if complen_bytes == 2 {
        (data[ecc_bytes] as usize) << 8 | data[ecc_bytes + 1] as usize
    } else {
        (data[ecc_bytes] as usize) << 16
            | (data[ecc_bytes + 1] as usize) << 8
            | data[ecc_bytes + 2] as usize
    };

    if data.len() < header_bytes + complen_base {
        return Err(IdentError::corrupted_header(format!(
            "CD codec: data too short for base payload (need {}, have {})",
            header_bytes + complen_base,
            data.len()
        )));
    }

    let base_size = frames * CD_SECTOR_DATA;
    let base_compressed = &data[header_bytes..header_bytes + complen_base];
    let base = match base_codec {
        CODEC_ZLIB => inflate(base_compressed, base_size)?,
        CODEC_LZMA => lzma(base_compressed, base_size)?,
        CODEC_ZSTD => zstd_decode(zstd, base_compressed, base_size)?,
        other => {
            return Err(IdentError::unsupported(format!(
                "CD codec: unsupported base codec {}",
                codec_name(other)
            )))
        }
    };

    let subcode_size = frames * CD_SUBCODE_DATA;
    let subcode_compressed = &data[header_bytes + complen_base..];
    let subcode = if subcode_compressed.is_empty() {
        log::warn!("CD codec: missing subcode payload, zero-filling");
        vec![0u8; subcode_size]
    } else {
        inflate(subcode_compressed, subcode_size)?
    };

    let mut out = vec![0u8; hunk_bytes as usize];
    for frame in 0..frames {
        let sector_src = frame * CD_SECTOR_DATA;
        let subcode_src = frame * CD_SUBCODE_DATA;
        let dst = frame * CD_FRAME_SIZE;
        if sector_src + CD_SECTOR_DATA <= base.len() {
            out[dst..dst + CD_SECTOR_DATA]
                .copy_from_slice(&base[sector_src..sector_src + CD_SECTOR_DATA]);
        }
        if subcode_src + CD_SUBCODE_DATA <= subcode.len() {
            out[dst + CD_SECTOR_DATA..dst + CD_FRAME_SIZE]
                .copy_from_slice(&subcode[subcode_src..subcode_src + CD_SUBCODE_DATA]);
        }
    }

    Ok(out)
}

#[cfg(test)]
#[path = "tests/codec_tests.rs"]
mod tests;
