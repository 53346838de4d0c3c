use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

/// Detected file format of an identifiable item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Unknown,
    Chd,
    Zip,
    Iso9660,
    Gba,
    Gb,
    Nes,
    Snes,
    Nds,
    Md,
    Smd,
    N64,
    Z64,
    V64,
    Gcm,
    Rvz,
    Xbe,
    Xiso,
    Ps1,
    Ps2,
    Saturn,
    Dreamcast,
}

impl Format {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Chd => "chd",
            Self::Zip => "zip",
            Self::Iso9660 => "iso9660",
            Self::Gba => "gba",
            Self::Gb => "gb",
            Self::Nes => "nes",
            Self::Snes => "snes",
            Self::Nds => "nds",
            Self::Md => "md",
            Self::Smd => "smd",
            Self::N64 => "n64",
            Self::Z64 => "z64",
            Self::V64 => "v64",
            Self::Gcm => "gcm",
            Self::Rvz => "rvz",
            Self::Xbe => "xbe",
            Self::Xiso => "xiso",
            Self::Ps1 => "ps1",
            Self::Ps2 => "ps2",
            Self::Saturn => "saturn",
            Self::Dreamcast => "dreamcast",
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for Format {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Fingerprint kind: distinguishes provenance, not just algorithm.
///
/// `Crc32` is computed over the item bytes; `ZipCrc32` is lifted from a
/// ZIP central directory; the CHD kinds are lifted from a CHD header
/// without recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HashKind {
    Sha1,
    Md5,
    Crc32,
    ZipCrc32,
    ChdUncompressedSha1,
    ChdCompressedSha1,
}

impl HashKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha1 => "sha1",
            Self::Md5 => "md5",
            Self::Crc32 => "crc32",
            Self::ZipCrc32 => "zip-crc32",
            Self::ChdUncompressedSha1 => "chd-uncompressed-sha1",
            Self::ChdCompressedSha1 => "chd-compressed-sha1",
        }
    }
}

impl std::fmt::Display for HashKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for HashKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Fingerprints for a single item, keyed by kind.
///
/// The map keying makes each kind unique per item by construction.
pub type Hashes = BTreeMap<HashKind, String>;
