use serde::{Serialize, Serializer};

/// Geographic regions for ROM releases.
///
/// Regions form a hierarchy (Germany → Europe → World) so downstream
/// consumers can fall back to a broader region when an exact match is
/// unavailable. Parsers translate raw platform area codes into these
/// values; the hierarchy itself never leaks into parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    /// World / region-free
    World,

    // Continents (parent is World)
    Europe,
    Asia,
    America,
    Oceania,

    // Asia
    Japan,
    China,
    Korea,
    Taiwan,

    // America
    Usa,
    Canada,
    Brazil,
    Mexico,

    // Europe
    Germany,
    France,
    Uk,
    Spain,
    Italy,
    Netherlands,
    Sweden,
    Denmark,
    Norway,
    Finland,
    Portugal,
    Russia,

    // Oceania
    Australia,
    NewZealand,

    /// Unknown or undecodable region code
    Unknown,
}

impl Region {
    /// Short region code used in serialized output.
    pub fn code(&self) -> &'static str {
        match self {
            Self::World => "world",
            Self::Europe => "eu",
            Self::Asia => "asia",
            Self::America => "america",
            Self::Oceania => "oceania",
            Self::Japan => "jp",
            Self::China => "cn",
            Self::Korea => "kr",
            Self::Taiwan => "tw",
            Self::Usa => "us",
            Self::Canada => "ca",
            Self::Brazil => "br",
            Self::Mexico => "mx",
            Self::Germany => "de",
            Self::France => "fr",
            Self::Uk => "uk",
            Self::Spain => "es",
            Self::Italy => "it",
            Self::Netherlands => "nl",
            Self::Sweden => "se",
            Self::Denmark => "dk",
            Self::Norway => "no",
            Self::Finland => "fi",
            Self::Portugal => "pt",
            Self::Russia => "ru",
            Self::Australia => "au",
            Self::NewZealand => "nz",
            Self::Unknown => "unknown",
        }
    }

    /// Full name of this region.
    pub fn name(&self) -> &'static str {
        match self {
            Self::World => "World",
            Self::Europe => "Europe",
            Self::Asia => "Asia",
            Self::America => "America",
            Self::Oceania => "Oceania",
            Self::Japan => "Japan",
            Self::China => "China",
            Self::Korea => "Korea",
            Self::Taiwan => "Taiwan",
            Self::Usa => "USA",
            Self::Canada => "Canada",
            Self::Brazil => "Brazil",
            Self::Mexico => "Mexico",
            Self::Germany => "Germany",
            Self::France => "France",
            Self::Uk => "United Kingdom",
            Self::Spain => "Spain",
            Self::Italy => "Italy",
            Self::Netherlands => "Netherlands",
            Self::Sweden => "Sweden",
            Self::Denmark => "Denmark",
            Self::Norway => "Norway",
            Self::Finland => "Finland",
            Self::Portugal => "Portugal",
            Self::Russia => "Russia",
            Self::Australia => "Australia",
            Self::NewZealand => "New Zealand",
            Self::Unknown => "Unknown",
        }
    }

    /// This region's parent in the hierarchy.
    ///
    /// Continents return `World`; `World` and `Unknown` have no parent.
    pub fn parent(&self) -> Option<Region> {
        match self {
            Self::World | Self::Unknown => None,

            Self::Europe | Self::Asia | Self::America | Self::Oceania => Some(Self::World),

            Self::Japan | Self::China | Self::Korea | Self::Taiwan => Some(Self::Asia),

            Self::Usa | Self::Canada | Self::Brazil | Self::Mexico => Some(Self::America),

            Self::Germany
            | Self::France
            | Self::Uk
            | Self::Spain
            | Self::Italy
            | Self::Netherlands
            | Self::Sweden
            | Self::Denmark
            | Self::Norway
            | Self::Finland
            | Self::Portugal
            | Self::Russia => Some(Self::Europe),

            Self::Australia | Self::NewZealand => Some(Self::Oceania),
        }
    }

    /// The chain of ancestors from this region up to `World`.
    ///
    /// `Region::Germany.ancestors()` is `[Europe, World]`; `World` and
    /// `Unknown` have no ancestors.
    pub fn ancestors(&self) -> Vec<Region> {
        let mut chain = Vec::new();
        let mut cur = self.parent();
        while let Some(r) = cur {
            chain.push(r);
            cur = r.parent();
        }
        chain
    }

    /// Whether `self` is an ancestor of `other`, with the hop distance.
    pub fn is_ancestor_of(&self, other: Region) -> Option<usize> {
        let mut dist = 0;
        let mut cur = other.parent();
        while let Some(r) = cur {
            dist += 1;
            if r == *self {
                return Some(dist);
            }
            cur = r.parent();
        }
        None
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Serialize for Region {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

#[cfg(test)]
#[path = "tests/region_tests.rs"]
mod tests;
