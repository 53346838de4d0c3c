//! Core types shared across the romprobe workspace: platform and region
//! vocabularies, format tags, fingerprint kinds, the random-access reader
//! abstraction, and the streaming hash engine.

pub mod error;
pub mod format;
pub mod hash;
pub mod platform;
pub mod reader;
pub mod region;
pub mod sector;
pub mod text;

pub use error::IdentError;
pub use format::{Format, HashKind, Hashes};
pub use hash::compute_hashes;
pub use platform::Platform;
pub use reader::{MemReader, RandomAccess, SectionReader};
pub use region::Region;
pub use sector::SectorReader;

/// Common identification surface implemented by every platform parser's
/// info struct. Parsers expose rich typed payloads; this trait is the
/// lowest common denominator the orchestrator assembles items from.
///
/// A title may be empty (NES carries none); a serial may be empty.
pub trait GameInfo {
    /// The platform this payload identifies.
    fn platform(&self) -> Platform;

    /// Embedded game title, empty when the format has none.
    fn title(&self) -> String {
        String::new()
    }

    /// Serial number / title ID, empty when the format has none.
    fn serial(&self) -> String {
        String::new()
    }

    /// Maker / publisher code.
    fn maker_code(&self) -> String {
        String::new()
    }

    /// Regions the release targets, decoded from the header's area codes.
    fn regions(&self) -> Vec<Region> {
        Vec::new()
    }

    /// Disc number for multi-disc releases.
    fn disc_number(&self) -> Option<u32> {
        None
    }
}
