//! Matched track data handed to the pipeline.
//!
//! All arrays of one track share its footprint count; layer arrays are
//! flat and row-major (`footprint * capacity + layer`).

use atrain_common::{LayerProfiles, MatchupError, MatchupResult};
use serde::{Deserialize, Serialize};

/// Layer arrays of one CALIOP track.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileArrays {
    pub capacity: usize,
    /// Layer top altitude (km).
    pub top: Vec<f64>,
    /// Layer base altitude (km).
    pub base: Vec<f64>,
    pub optical_depth: Vec<f64>,
    pub flags: Vec<i32>,
    pub cloud_fraction: Vec<f64>,
}

impl ProfileArrays {
    pub fn footprints(&self) -> usize {
        self.cloud_fraction.len()
    }

    pub fn into_profiles(self) -> MatchupResult<LayerProfiles> {
        LayerProfiles::new(
            self.capacity,
            self.top,
            self.base,
            self.optical_depth,
            self.flags,
            self.cloud_fraction,
        )
    }
}

impl From<&LayerProfiles> for ProfileArrays {
    fn from(profiles: &LayerProfiles) -> Self {
        Self {
            capacity: profiles.capacity(),
            top: profiles.top().to_vec(),
            base: profiles.base().to_vec(),
            optical_depth: profiles.optical_depth().to_vec(),
            flags: profiles.flags().to_vec(),
            cloud_fraction: profiles.cloud_fraction().to_vec(),
        }
    }
}

/// CALIOP track at the configured resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalipsoTrack {
    pub latitude: Vec<f64>,
    pub longitude: Vec<f64>,
    /// Surface elevation (m).
    pub elevation: Vec<f64>,
    /// Mid-layer temperature of the topmost layer (°C).
    pub mid_temperature: Vec<f64>,
    pub layers: ProfileArrays,
}

/// AVHRR quantities at the CALIOP footprints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvhrrMatch {
    /// 11 micron brightness temperature (K).
    pub bt11micron: Vec<f64>,
    /// Forecast surface temperature (K).
    pub surftemp: Vec<f64>,
    /// PPS cloud top height above ground (m).
    pub ctth_height: Vec<f64>,
}

/// CloudSat partner track with the AVHRR heights matched to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloudsatTrack {
    pub latitude: Vec<f64>,
    pub longitude: Vec<f64>,
    /// Surface elevation (m).
    pub elevation: Vec<f64>,
    /// MODIS cloud flag carried in the CloudSat product.
    pub modis_cloud_flag: Vec<i32>,
    /// PPS cloud top height above ground at the CloudSat footprints (m).
    pub ctth_height: Vec<f64>,
}

impl CloudsatTrack {
    pub fn len(&self) -> usize {
        self.latitude.len()
    }

    pub fn is_empty(&self) -> bool {
        self.latitude.is_empty()
    }
}

/// Everything one matchup run needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchupInput {
    pub calipso: CalipsoTrack,
    pub avhrr: AvhrrMatch,
    #[serde(default)]
    pub cloudsat: Option<CloudsatTrack>,
    /// 1 km layers for refining 5 km detection heights.
    #[serde(default)]
    pub calipso_fine: Option<ProfileArrays>,
}

fn check(field: &str, expected: usize, actual: usize) -> MatchupResult<()> {
    if expected != actual {
        return Err(MatchupError::shape_mismatch(field, expected, actual));
    }
    Ok(())
}

impl MatchupInput {
    pub fn from_json(json: &str) -> MatchupResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Number of CALIOP footprints.
    pub fn footprints(&self) -> usize {
        self.calipso.layers.footprints()
    }

    /// Check that per-footprint arrays agree in length.
    ///
    /// Layer arrays are checked when the profiles are built.
    pub fn validate(&self) -> MatchupResult<()> {
        let n = self.footprints();
        check("calipso.latitude", n, self.calipso.latitude.len())?;
        check("calipso.longitude", n, self.calipso.longitude.len())?;
        check("calipso.elevation", n, self.calipso.elevation.len())?;
        check("calipso.mid_temperature", n, self.calipso.mid_temperature.len())?;
        check("avhrr.bt11micron", n, self.avhrr.bt11micron.len())?;
        check("avhrr.surftemp", n, self.avhrr.surftemp.len())?;
        check("avhrr.ctth_height", n, self.avhrr.ctth_height.len())?;

        if let Some(cloudsat) = &self.cloudsat {
            let m = cloudsat.len();
            check("cloudsat.longitude", m, cloudsat.longitude.len())?;
            check("cloudsat.elevation", m, cloudsat.elevation.len())?;
            check("cloudsat.modis_cloud_flag", m, cloudsat.modis_cloud_flag.len())?;
            check("cloudsat.ctth_height", m, cloudsat.ctth_height.len())?;
        }

        Ok(())
    }
}
