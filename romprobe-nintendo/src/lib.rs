//! Header parsers for Nintendo formats: Game Boy / Game Boy Color,
//! Game Boy Advance, Nintendo 64, NES, SNES, Nintendo DS, and
//! GameCube/Wii discs (GCM and RVZ/WIA containers).

pub mod gamecube;
pub mod gb;
pub mod gba;
pub mod licensee;
pub mod n64;
pub mod nds;
pub mod nes;
pub mod rvz;
pub mod snes;

pub use gamecube::{parse_gcm, GcmInfo};
pub use gb::{parse_gb, GbInfo};
pub use gba::{parse_gba, GbaInfo};
pub use n64::{detect_byte_order, parse_n64, N64ByteOrder, N64Info};
pub use nds::{parse_nds, NdsInfo};
pub use nes::{parse_nes, NesInfo};
pub use rvz::{parse_rvz, RvzInfo};
pub use snes::{parse_snes, SnesInfo};
