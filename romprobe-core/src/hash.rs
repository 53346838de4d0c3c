//! Streaming multi-digest hashing.
//!
//! One pass over the input feeds all three digests, so a large disc
//! image is read exactly once.

use sha1::Digest;

use crate::error::IdentError;
use crate::format::{HashKind, Hashes};
use crate::reader::RandomAccess;

const CHUNK_SIZE: usize = 64 * 1024;

/// Compute SHA1, MD5, and CRC32 (IEEE) over `size` bytes of `reader` in
/// a single pass. Output keys: `sha1` (40 hex), `md5` (32 hex), `crc32`
/// (8 hex, lowercase, zero-padded).
pub fn compute_hashes(reader: &mut dyn RandomAccess, size: u64) -> Result<Hashes, IdentError> {
    let mut sha = sha1::Sha1::new();
    let mut md5_ctx = md5::Context::new();
    let mut crc = crc32fast::Hasher::new();

    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut offset = 0u64;

    while offset < size {
        let want = CHUNK_SIZE.min((size - offset) as usize);
        let n = reader.read_at(&mut buf[..want], offset)?;
        if n == 0 {
            break;
        }
        sha.update(&buf[..n]);
        md5_ctx.consume(&buf[..n]);
        crc.update(&buf[..n]);
        offset += n as u64;
    }

    let mut hashes = Hashes::new();
    hashes.insert(HashKind::Sha1, format!("{:x}", sha.finalize()));
    hashes.insert(HashKind::Md5, format!("{:x}", md5_ctx.compute()));
    hashes.insert(HashKind::Crc32, format!("{:08x}", crc.finalize()));
    Ok(hashes)
}

#[cfg(test)]
#[path = "tests/hash_tests.rs"]
mod tests;
