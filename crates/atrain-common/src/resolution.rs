//! Along-track footprint resolutions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{MatchupError, MatchupResult};

/// Horizontal averaging of a lidar/radar profile product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Resolution {
    OneKm,
    FiveKm,
}

impl Resolution {
    /// Parse a resolution given in kilometres.
    pub fn from_km(km: u32) -> MatchupResult<Self> {
        match km {
            1 => Ok(Resolution::OneKm),
            5 => Ok(Resolution::FiveKm),
            other => Err(MatchupError::UnsupportedResolution(other)),
        }
    }

    /// Footprint size in kilometres.
    pub fn km(&self) -> u32 {
        match self {
            Resolution::OneKm => 1,
            Resolution::FiveKm => 5,
        }
    }
}

impl TryFrom<u32> for Resolution {
    type Error = MatchupError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::from_km(value)
    }
}

impl From<Resolution> for u32 {
    fn from(resolution: Resolution) -> Self {
        resolution.km()
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}km", self.km())
    }
}

/// A coarse and a fine track sharing an integer oversampling ratio.
///
/// Fine footprint `i` lies inside coarse footprint `i / ratio`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionPair {
    pub coarse: Resolution,
    pub fine: Resolution,
}

impl ResolutionPair {
    /// The standard 5 km / 1 km CALIOP pairing.
    pub fn five_to_one() -> Self {
        Self {
            coarse: Resolution::FiveKm,
            fine: Resolution::OneKm,
        }
    }

    /// Number of fine footprints per coarse footprint.
    pub fn ratio(&self) -> usize {
        (self.coarse.km() / self.fine.km()) as usize
    }

    /// Number of fine footprints covered by `coarse_len` coarse footprints.
    pub fn fine_len(&self, coarse_len: usize) -> usize {
        coarse_len * self.ratio()
    }
}
