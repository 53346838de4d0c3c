//! ROM identification library.
//!
//! Given a filesystem path (a loose ROM dump, a disc image, a ZIP
//! archive, or a folder), [`identify`] returns a structured record: one
//! item per contained file, each with a detected format, content
//! fingerprints, and (when a platform header decodes) a
//! game-identification payload.
//!
//! ```no_run
//! use romprobe_lib::{identify, Options};
//!
//! let result = identify("roms/gbtictac.gb", &Options::default())?;
//! for item in &result.items {
//!     println!("{}: {}", item.name, item.format);
//! }
//! # Ok::<(), romprobe_core::IdentError>(())
//! ```

pub mod container;
pub mod disc;
pub mod identify;
pub mod registry;
pub mod types;

pub use identify::identify;
pub use registry::{candidates_by_extension, identify_game};
pub use types::{GameExtra, GameIdent, HashMode, Item, Options, RomResult};

pub use romprobe_core::{Format, GameInfo, HashKind, Hashes, IdentError, Platform, Region};
