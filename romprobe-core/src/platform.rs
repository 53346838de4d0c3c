use serde::{Serialize, Serializer};

/// Platform identifiers for all consoles this library can identify.
///
/// Centralizes console identity (short names, display names, and
/// manufacturer) in one place so parsers and consumers never match on
/// ad-hoc strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    // Nintendo
    Nes,
    Snes,
    N64,
    GameCube,
    Wii,
    GameBoy,
    GameBoyColor,
    Gba,
    Ds,

    // Sega
    MegaDrive,
    Saturn,
    Dreamcast,

    // Sony
    Ps1,
    Ps2,

    // Microsoft
    Xbox,
}

impl Platform {
    /// Canonical short name used in serialized output.
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::Nes => "nes",
            Self::Snes => "snes",
            Self::N64 => "n64",
            Self::GameCube => "gamecube",
            Self::Wii => "wii",
            Self::GameBoy => "gb",
            Self::GameBoyColor => "gbc",
            Self::Gba => "gba",
            Self::Ds => "nds",
            Self::MegaDrive => "megadrive",
            Self::Saturn => "saturn",
            Self::Dreamcast => "dreamcast",
            Self::Ps1 => "ps1",
            Self::Ps2 => "ps2",
            Self::Xbox => "xbox",
        }
    }

    /// Full display name for the platform.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Nes => "Nintendo Entertainment System",
            Self::Snes => "Super Nintendo Entertainment System",
            Self::N64 => "Nintendo 64",
            Self::GameCube => "Nintendo GameCube",
            Self::Wii => "Nintendo Wii",
            Self::GameBoy => "Game Boy",
            Self::GameBoyColor => "Game Boy Color",
            Self::Gba => "Game Boy Advance",
            Self::Ds => "Nintendo DS",
            Self::MegaDrive => "Sega Mega Drive / Genesis",
            Self::Saturn => "Sega Saturn",
            Self::Dreamcast => "Sega Dreamcast",
            Self::Ps1 => "Sony PlayStation",
            Self::Ps2 => "Sony PlayStation 2",
            Self::Xbox => "Microsoft Xbox",
        }
    }

    /// Console manufacturer.
    pub fn manufacturer(&self) -> &'static str {
        match self {
            Self::Nes
            | Self::Snes
            | Self::N64
            | Self::GameCube
            | Self::Wii
            | Self::GameBoy
            | Self::GameBoyColor
            | Self::Gba
            | Self::Ds => "Nintendo",

            Self::MegaDrive | Self::Saturn | Self::Dreamcast => "Sega",

            Self::Ps1 | Self::Ps2 => "Sony",

            Self::Xbox => "Microsoft",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl Serialize for Platform {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.short_name())
    }
}
