//! Random-access reader abstraction.
//!
//! Every binary format in this workspace addresses its headers, tables,
//! and sectors by absolute offset, so the reader contract is positioned:
//! *read up to n bytes at offset o*. This is distinct from sequential
//! streams; a reader has no cursor of its own.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};

/// Positioned reads over an arbitrary byte source.
///
/// A short read at end of data returns the byte count actually read;
/// reading at or past the end returns `Ok(0)`. I/O errors are fatal.
pub trait RandomAccess {
    /// Read up to `buf.len()` bytes at absolute `offset`.
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> io::Result<usize>;

    /// Read exactly `buf.len()` bytes at `offset`, failing with
    /// `UnexpectedEof` on a short read.
    fn read_exact_at(&mut self, buf: &mut [u8], offset: u64) -> io::Result<()> {
        let mut done = 0;
        while done < buf.len() {
            let n = self.read_at(&mut buf[done..], offset + done as u64)?;
            if n == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("short read at offset {}", offset + done as u64),
                ));
            }
            done += n;
        }
        Ok(())
    }
}

impl<T: RandomAccess + ?Sized> RandomAccess for &mut T {
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        (**self).read_at(buf, offset)
    }
}

impl RandomAccess for File {
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        self.seek(SeekFrom::Start(offset))?;
        let mut done = 0;
        while done < buf.len() {
            match Read::read(self, &mut buf[done..]) {
                Ok(0) => break,
                Ok(n) => done += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(done)
    }
}

/// In-memory reader over an owned or borrowed byte buffer.
#[derive(Debug, Clone)]
pub struct MemReader<T: AsRef<[u8]>> {
    data: T,
}

impl<T: AsRef<[u8]>> MemReader<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }

    pub fn len(&self) -> u64 {
        self.data.as_ref().len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.data.as_ref().is_empty()
    }
}

impl<T: AsRef<[u8]>> RandomAccess for MemReader<T> {
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        let data = self.data.as_ref();
        if offset >= data.len() as u64 {
            return Ok(0);
        }
        let start = offset as usize;
        let n = buf.len().min(data.len() - start);
        buf[..n].copy_from_slice(&data[start..start + n]);
        Ok(n)
    }
}

/// A bounded window over another reader: reads are offset by `base` and
/// clipped to `len` bytes. Used for files opened out of a filesystem
/// image (an ISO 9660 extent, an XDVDFS file).
pub struct SectionReader<'a> {
    inner: &'a mut dyn RandomAccess,
    base: u64,
    len: u64,
}

impl<'a> SectionReader<'a> {
    pub fn new(inner: &'a mut dyn RandomAccess, base: u64, len: u64) -> Self {
        Self { inner, base, len }
    }

    /// Size of the window in bytes.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl RandomAccess for SectionReader<'_> {
    fn read_at(&mut self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        if offset >= self.len {
            return Ok(0);
        }
        let n = buf.len().min((self.len - offset) as usize);
        self.inner.read_at(&mut buf[..n], self.base + offset)
    }
}

#[cfg(test)]
#[path = "tests/reader_tests.rs"]
mod tests;
