//! Bit-granular reading and canonical Huffman decoding.
//!
//! The CHD v5 hunk map and the `huff` hunk codec both consume an
//! MSB-first bit stream whose Huffman tree is shipped as RLE-compressed
//! code lengths.

use romprobe_core::IdentError;

/// Reads 1–32 bit unsigned values from a byte buffer, MSB first.
pub struct BitReader<'a> {
    data: &'a [u8],
    bit_pos: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, bit_pos: 0 }
    }

    /// Read a single bit.
    pub fn read_bit(&mut self) -> Result<u32, IdentError> {
        let byte = self.bit_pos / 8;
        if byte >= self.data.len() {
            return Err(IdentError::corrupted_header(
                "bit stream exhausted mid-read",
            ));
        }
        let bit = 7 - (self.bit_pos % 8);
        self.bit_pos += 1;
        Ok(((self.data[byte] >> bit) & 1) as u32)
    }

    /// Read `count` bits (1–32) as an unsigned value.
    pub fn read_bits(&mut self, count: u32) -> Result<u32, IdentError> {
        debug_assert!(count >= 1 && count <= 32);
        let mut value = 0u32;
        for _ in 0..count {
            value = (value << 1) | self.read_bit()?;
        }
        Ok(value)
    }
}

const MAX_CODE_BITS: usize = 8;

/// Canonical Huffman decoder over a configurable alphabet.
///
/// Codes are reconstructed from per-symbol lengths by canonical
/// assignment: symbols sorted by (length, symbol value) receive
/// consecutive codes within each length class.
pub struct HuffmanDecoder {
    num_codes: usize,
    max_bits: u32,
    /// Symbol count per code length (index = length).
    counts: [u32; MAX_CODE_BITS + 1],
    /// First canonical code of each length.
    first_code: [u32; MAX_CODE_BITS + 1],
    /// Index into `symbols` of each length's first symbol.
    offsets: [usize; MAX_CODE_BITS + 1],
    /// Symbols sorted by (length, symbol value), zero-length excluded.
    symbols: Vec<u32>,
}

impl HuffmanDecoder {
    pub fn new(num_codes: usize, max_bits: u32) -> Self {
        debug_assert!(max_bits as usize <= MAX_CODE_BITS);
        Self {
            num_codes,
            max_bits,
            counts: [0; MAX_CODE_BITS + 1],
            first_code: [0; MAX_CODE_BITS + 1],
            offsets: [0; MAX_CODE_BITS + 1],
            symbols: Vec::new(),
        }
    }

    /// Ingest the RLE-compressed code-length tree from the stream head.
    ///
    /// Layout: a 5-bit field giving the width of each length value,
    /// then one value per symbol at that width. Value 0 escapes a run
    /// of consecutive zero-length symbols; the run count follows at the
    /// same width.
    pub fn import_tree_rle(&mut self, reader: &mut BitReader) -> Result<(), IdentError> {
        let len_bits = reader.read_bits(5)?;
        if len_bits == 0 || len_bits > 8 {
            return Err(IdentError::corrupted_header(format!(
                "huffman tree: invalid length-field width {}",
                len_bits
            )));
        }

        let mut lengths = vec![0u8; self.num_codes];
        let mut index = 0usize;
        while index < self.num_codes {
            let value = reader.read_bits(len_bits)?;
            if value == 0 {
                let run = reader.read_bits(len_bits)? as usize;
                if run == 0 {
                    return Err(IdentError::corrupted_header(
                        "huffman tree: zero-length run of zero",
                    ));
                }
                if index + run > self.num_codes {
                    return Err(IdentError::corrupted_header(
                        "huffman tree: zero-length run past alphabet end",
                    ));
                }
                index += run;
            } else {
                if value > self.max_bits {
                    return Err(IdentError::corrupted_header(format!(
                        "huffman tree: code length {} exceeds max {}",
                        value, self.max_bits
                    )));
                }
                lengths[index] = value as u8;
                index += 1;
            }
        }

        self.assign_canonical(&lengths)
    }

    /// Build decode tables from per-symbol code lengths.
    fn assign_canonical(&mut self, lengths: &[u8]) -> Result<(), IdentError> {
        self.counts = [0; MAX_CODE_BITS + 1];
        for &len in lengths {
            if len > 0 {
                self.counts[len as usize] += 1;
            }
        }

        // Kraft check: the code space must not be overfull.
        let mut space = 0u64;
        for len in 1..=self.max_bits as usize {
            space += (self.counts[len] as u64) << (self.max_bits as usize - len);
        }
        if space > 1u64 << self.max_bits {
            return Err(IdentError::corrupted_header(
                "huffman tree: overfull code space",
            ));
        }

        // First code of each length class.
        let mut code = 0u32;
        for len in 1..=self.max_bits as usize {
            code <<= 1;
            self.first_code[len] = code;
            code += self.counts[len];
        }

        // Symbols grouped by length, ascending symbol order within each.
        self.symbols.clear();
        let mut offset = 0usize;
        for len in 1..=self.max_bits as usize {
            self.offsets[len] = offset;
            for (sym, &l) in lengths.iter().enumerate() {
                if l as usize == len {
                    self.symbols.push(sym as u32);
                    offset += 1;
                }
            }
        }

        Ok(())
    }

    /// Decode one symbol from the stream.
    pub fn decode(&self, reader: &mut BitReader) -> Result<u32, IdentError> {
        let mut code = 0u32;
        for len in 1..=self.max_bits as usize {
            code = (code << 1) | reader.read_bit()?;
            let count = self.counts[len];
            if count > 0 && code >= self.first_code[len] && code < self.first_code[len] + count {
                let index = self.offsets[len] + (code - self.first_code[len]) as usize;
                return Ok(self.symbols[index]);
            }
        }
        Err(IdentError::corrupted_header("invalid huffman code"))
    }
}

#[cfg(test)]
#[path = "tests/bitstream_tests.rs"]
mod tests;
