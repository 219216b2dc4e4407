use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::DataError;

/// The five fixed administrative layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminLevel {
    Provinces,
    Districts,
    Subdistricts,
    RegionRoyin,
    RegionNesdb,
}

impl AdminLevel {
    pub const ALL: [Self; 5] = [
        Self::Provinces,
        Self::Districts,
        Self::Subdistricts,
        Self::RegionRoyin,
        Self::RegionNesdb,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Provinces => "provinces",
            Self::Districts => "districts",
            Self::Subdistricts => "subdistricts",
            Self::RegionRoyin => "region_royin",
            Self::RegionNesdb => "region_nesdb",
        }
    }

    /// File name of this level's boundary document inside a data directory.
    pub fn file_name(self) -> String {
        format!("{}.geojson", self.as_str())
    }

    /// True for the two region classification schemes.
    pub const fn is_region(self) -> bool {
        matches!(self, Self::RegionRoyin | Self::RegionNesdb)
    }
}

impl fmt::Display for AdminLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdminLevel {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == s.trim())
            .ok_or_else(|| DataError::UnknownLevel(s.to_string()))
    }
}
