//! Per-footprint summary of the topmost CALIOP layer.

use atrain_common::{is_valid_altitude, LayerProfiles, MatchupError, MatchupResult, SENTINEL};
use serde::{Deserialize, Serialize};

/// Offset between degrees Celsius and Kelvin.
pub const KELVIN_OFFSET: f64 = 273.15;

#[inline]
pub fn celsius_to_kelvin(celsius: f64) -> f64 {
    celsius + KELVIN_OFFSET
}

/// Top-layer quantities for every footprint of a batch.
///
/// Computed from the unfiltered profiles: this is what the imager sees
/// first, regardless of the optical-depth threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopLayerSummary {
    /// Mid-layer temperature of the top layer (K), or -9.
    pub mid_temperature: Vec<f64>,
    /// Geometric thickness of the top layer (m), or -9.
    pub thickness: Vec<f64>,
    /// Highest layer top over all layers (m), or -9.
    pub max_height: Vec<f64>,
}

impl TopLayerSummary {
    /// Summarise `profiles` given the top-layer mid temperature in °C.
    pub fn from_profiles(
        profiles: &LayerProfiles,
        mid_temperature_celsius: &[f64],
    ) -> MatchupResult<Self> {
        if mid_temperature_celsius.len() != profiles.len() {
            return Err(MatchupError::shape_mismatch(
                "midlayer_temperature",
                profiles.len(),
                mid_temperature_celsius.len(),
            ));
        }

        let mut summary = Self {
            mid_temperature: Vec::with_capacity(profiles.len()),
            thickness: Vec::with_capacity(profiles.len()),
            max_height: Vec::with_capacity(profiles.len()),
        };

        for (fp, &celsius) in profiles.iter().zip(mid_temperature_celsius) {
            match (fp.top.first(), fp.base.first()) {
                (Some(&top), Some(&base)) if is_valid_altitude(top) => {
                    summary.mid_temperature.push(celsius_to_kelvin(celsius));
                    summary.thickness.push((top - base) * 1000.0);
                }
                _ => {
                    summary.mid_temperature.push(SENTINEL);
                    summary.thickness.push(SENTINEL);
                }
            }

            let max_height = fp
                .top
                .iter()
                .map(|&top| top * 1000.0)
                .fold(SENTINEL, f64::max);
            summary.max_height.push(max_height);
        }

        Ok(summary)
    }

    pub fn len(&self) -> usize {
        self.max_height.len()
    }

    pub fn is_empty(&self) -> bool {
        self.max_height.is_empty()
    }

    /// Whether the footprint has any layer at all.
    pub fn data_ok(&self, index: usize) -> bool {
        self.max_height
            .get(index)
            .map(|&h| is_valid_altitude(h))
            .unwrap_or(false)
    }

    /// Number of footprints with at least one layer.
    pub fn data_ok_count(&self) -> usize {
        self.max_height.iter().filter(|&&h| is_valid_altitude(h)).count()
    }
}
