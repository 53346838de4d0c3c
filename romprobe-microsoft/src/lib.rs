//! Header parsers for Microsoft Xbox formats: XBE executables and
//! XISO (XDVDFS) disc images.

pub mod xbe;
pub mod xiso;

pub use xbe::{parse_xbe, XbeInfo};
pub use xiso::{parse_xiso, XisoInfo};
