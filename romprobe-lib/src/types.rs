//! Identification result types.

use std::path::PathBuf;

use serde::Serialize;

use romprobe_core::{Format, GameInfo, Hashes, Platform, Region};
use romprobe_chd::Track;
use romprobe_microsoft::{XbeInfo, XisoInfo};
use romprobe_nintendo::{GbInfo, GbaInfo, GcmInfo, N64Info, NdsInfo, NesInfo, RvzInfo, SnesInfo};
use romprobe_sega::{DreamcastInfo, MdInfo, SaturnInfo};
use romprobe_sony::PlayStationInfo;

/// Game identification assembled from a platform parser's payload.
#[derive(Debug, Clone, Serialize)]
pub struct GameIdent {
    pub platform: Platform,
    /// Embedded title; empty for formats without one (NES).
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    /// Serial / title ID; may be empty.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub serial: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub maker_code: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub regions: Vec<Region>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disc_number: Option<u32>,
    /// Parser-specific structured payload.
    pub extra: GameExtra,
}

impl GameIdent {
    /// Build an identification from a parser info struct, carrying the
    /// typed payload along as the extra.
    pub fn from_info<I>(info: I) -> Self
    where
        I: GameInfo + Into<GameExtra>,
    {
        let platform = info.platform();
        let title = info.title();
        let serial = info.serial();
        let maker_code = info.maker_code();
        let regions = info.regions();
        let disc_number = info.disc_number();
        GameIdent {
            platform,
            title,
            serial,
            maker_code,
            regions,
            disc_number,
            extra: info.into(),
        }
    }
}

/// CHD container payload attached to identifications of CHD items.
#[derive(Debug, Clone, Serialize)]
pub struct ChdDiscInfo {
    /// CHD format version.
    pub version: u32,
    /// Codec tags from the header's four slots, rendered as ASCII.
    pub codecs: Vec<String>,
    /// Uncompressed size.
    pub logical_bytes: u64,
    pub hunk_bytes: u32,
    pub unit_bytes: u32,
    /// CD/GD track records in file order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tracks: Vec<Track>,
}

/// Tagged union over the platform parsers' payloads.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GameExtra {
    Gb(GbInfo),
    Gba(GbaInfo),
    N64(N64Info),
    Nes(NesInfo),
    Snes(SnesInfo),
    Nds(NdsInfo),
    Gcm(GcmInfo),
    Rvz(RvzInfo),
    Md(MdInfo),
    Saturn(SaturnInfo),
    Dreamcast(DreamcastInfo),
    PlayStation(PlayStationInfo),
    Xbe(XbeInfo),
    Xiso(XisoInfo),
    /// CHD container: disc payload plus the contained identification's
    /// own payload, when the content identified.
    Chd {
        disc: ChdDiscInfo,
        #[serde(skip_serializing_if = "Option::is_none")]
        inner: Option<Box<GameExtra>>,
    },
}

macro_rules! extra_from {
    ($($ty:ty => $variant:ident),+ $(,)?) => {
        $(impl From<$ty> for GameExtra {
            fn from(info: $ty) -> Self {
                GameExtra::$variant(info)
            }
        })+
    };
}

extra_from! {
    GbInfo => Gb,
    GbaInfo => Gba,
    N64Info => N64,
    NesInfo => Nes,
    SnesInfo => Snes,
    NdsInfo => Nds,
    GcmInfo => Gcm,
    RvzInfo => Rvz,
    MdInfo => Md,
    SaturnInfo => Saturn,
    DreamcastInfo => Dreamcast,
    PlayStationInfo => PlayStation,
    XbeInfo => Xbe,
    XisoInfo => Xiso,
}

/// One identifiable unit: a file, or an entry within a container.
#[derive(Debug, Clone, Serialize)]
pub struct Item {
    /// Basename for single files; relative path inside containers.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Detected format.
    pub format: Format,
    /// Fingerprints by kind.
    #[serde(skip_serializing_if = "Hashes::is_empty")]
    pub hashes: Hashes,
    /// Present only when a platform header decoded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game: Option<GameIdent>,
}

/// The result of identifying one path.
#[derive(Debug, Clone, Serialize)]
pub struct RomResult {
    /// Absolute path that was identified.
    pub path: PathBuf,
    /// One item per contained file, in container order.
    pub items: Vec<Item>,
    /// Top-level error message, for callers that record failures
    /// instead of propagating them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RomResult {
    /// A result recording a failed identification.
    pub fn failure(path: PathBuf, error: impl std::fmt::Display) -> Self {
        RomResult {
            path,
            items: Vec::new(),
            error: Some(error.to_string()),
        }
    }
}

/// How hashes are produced for identified items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashMode {
    /// Compute full hashes for loose files; use fast sources (ZIP
    /// central directory, CHD header) for containers.
    #[default]
    Default,
    /// Like `Default`, but skip hashing for loose files at or above
    /// the large-file threshold.
    Fast,
    /// Always compute full hashes, decompressing archive entries and
    /// running full identification on them.
    Slow,
}

/// Fast mode skips hashing at or above this size (65 MiB: covers
/// cartridge ROMs, skips disc images).
pub const FAST_MODE_SMALL_FILE_THRESHOLD: u64 = 65 * 1024 * 1024;

/// Identification options.
#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    pub hash_mode: HashMode,
}
