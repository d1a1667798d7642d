//! Platform, channel and product identities.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MatchupError;

/// Imager platform carrying the AVHRR instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Platform {
    Noaa17,
    Noaa18,
    Noaa19,
    MetopA,
}

impl Platform {
    /// Lowercase identifier as used in file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Noaa17 => "noaa17",
            Platform::Noaa18 => "noaa18",
            Platform::Noaa19 => "noaa19",
            Platform::MetopA => "metopa",
        }
    }
}

impl FromStr for Platform {
    type Err = MatchupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "").as_str() {
            "noaa17" => Ok(Platform::Noaa17),
            "noaa18" => Ok(Platform::Noaa18),
            "noaa19" => Ok(Platform::Noaa19),
            "metopa" | "metop02" => Ok(Platform::MetopA),
            _ => Err(MatchupError::UnsupportedPlatform(s.to_string())),
        }
    }
}

impl TryFrom<String> for Platform {
    type Error = MatchupError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Platform> for String {
    fn from(platform: Platform) -> Self {
        platform.as_str().to_string()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// AVHRR infrared channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    /// 3.7 micron
    #[serde(rename = "3b")]
    Ch3B,
    /// 11 micron
    #[serde(rename = "4")]
    Ch4,
    /// 12 micron
    #[serde(rename = "5")]
    Ch5,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Ch3B => "3b",
            Channel::Ch4 => "4",
            Channel::Ch5 => "5",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// CloudSat product the partner track was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CloudsatProduct {
    /// Radar reflectivity and cloud mask.
    #[default]
    #[serde(rename = "GEOPROF")]
    Geoprof,
    /// Cloud water content retrievals.
    #[serde(rename = "CWC-RVOD")]
    CwcRvod,
}

impl CloudsatProduct {
    pub fn as_str(&self) -> &'static str {
        match self {
            CloudsatProduct::Geoprof => "GEOPROF",
            CloudsatProduct::CwcRvod => "CWC-RVOD",
        }
    }
}

impl FromStr for CloudsatProduct {
    type Err = MatchupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GEOPROF" => Ok(CloudsatProduct::Geoprof),
            "CWC-RVOD" | "CWC_RVOD" => Ok(CloudsatProduct::CwcRvod),
            _ => Err(MatchupError::UnsupportedProduct(s.to_string())),
        }
    }
}

impl fmt::Display for CloudsatProduct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_from_str() {
        assert_eq!("noaa18".parse::<Platform>().unwrap(), Platform::Noaa18);
        assert_eq!("NOAA19".parse::<Platform>().unwrap(), Platform::Noaa19);
        assert_eq!("metop-a".parse::<Platform>().unwrap(), Platform::MetopA);
        assert!(matches!(
            "noaa15".parse::<Platform>(),
            Err(MatchupError::UnsupportedPlatform(_))
        ));
    }

    #[test]
    fn test_platform_serde() {
        let json = serde_json::to_string(&Platform::MetopA).unwrap();
        assert_eq!(json, "\"metopa\"");
        let parsed: Platform = serde_json::from_str("\"noaa17\"").unwrap();
        assert_eq!(parsed, Platform::Noaa17);
        assert!(serde_json::from_str::<Platform>("\"terra\"").is_err());
    }

    #[test]
    fn test_product_from_str() {
        assert_eq!(
            "geoprof".parse::<CloudsatProduct>().unwrap(),
            CloudsatProduct::Geoprof
        );
        assert_eq!(
            "CWC-RVOD".parse::<CloudsatProduct>().unwrap(),
            CloudsatProduct::CwcRvod
        );
        assert!("2B-TAU".parse::<CloudsatProduct>().is_err());
    }
}
