//! Header parsers for Sega formats: Mega Drive cartridges (plain and
//! SMD-interleaved) and the Saturn / Dreamcast disc system areas.

pub mod dreamcast;
pub mod md;
pub mod saturn;

pub use dreamcast::{parse_dreamcast_system_area, DreamcastInfo};
pub use md::{parse_md, parse_smd, MdInfo};
pub use saturn::{parse_saturn_system_area, SaturnInfo};
