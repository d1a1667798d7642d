//! Cloud emissivity and vertical feature classes.
//!
//! Emissivity follows a three-radiance linear model on the 11 micron
//! channel:
//!
//! ```text
//! Ec = (I - Iclear) / (B(Tc) - Iclear)
//! ```
//!
//! where `I` is the observed radiance, `Iclear` the clear-sky radiance from
//! the forecast surface temperature and `B(Tc)` the radiance of the top-layer
//! mid temperature. `Iclear` is raised to `I` when the forecast surface is
//! colder than the observation. Temperature inversions (`B(Tc) >= Iclear`)
//! and footprints without layers yield the sentinel.

use atrain_common::{Channel, MatchupError, MatchupResult, Platform, FLAG_FILL, SENTINEL, SENTINEL_INT};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::radiance::{CentralWavenumbers, RadianceConverter};
use crate::summary::TopLayerSummary;

/// Channel the emissivity is computed on.
pub const EMISSIVITY_CHANNEL: Channel = Channel::Ch4;

/// Temperature (K) the central wavenumbers are looked up at.
pub const REFERENCE_TEMPERATURE: f64 = 273.15;

/// Inputs for one footprint, all temperatures in K.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmissivityRecord {
    pub brightness_temperature: f64,
    pub surface_temperature: f64,
    pub cloud_temperature: f64,
    /// Whether the footprint has a cloud layer at all.
    pub valid: bool,
}

/// Computes cloud emissivities for one platform.
pub struct EmissivityExtractor<'a, C: RadianceConverter + ?Sized> {
    converter: &'a C,
    platform: Platform,
    wavenumbers: CentralWavenumbers,
}

impl<'a, C: RadianceConverter + ?Sized> EmissivityExtractor<'a, C> {
    pub fn new(converter: &'a C, platform: Platform) -> Self {
        let wavenumbers = converter.central_wavenumbers(platform, REFERENCE_TEMPERATURE);
        Self {
            converter,
            platform,
            wavenumbers,
        }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    fn radiance(&self, temperature: f64) -> f64 {
        self.converter
            .radiance(&self.wavenumbers, temperature, self.platform, EMISSIVITY_CHANNEL)
    }

    /// Emissivity of a single footprint, or the sentinel.
    pub fn emissivity(&self, record: &EmissivityRecord) -> f64 {
        if !record.valid {
            return SENTINEL;
        }

        let observed = self.radiance(record.brightness_temperature);
        let clear = self.radiance(record.surface_temperature).max(observed);
        let cloud = self.radiance(record.cloud_temperature);

        if cloud < clear {
            (observed - clear) / (cloud - clear)
        } else {
            SENTINEL
        }
    }

    /// Emissivities for a batch of footprints.
    pub fn emissivities(&self, records: &[EmissivityRecord]) -> Vec<f64> {
        let out: Vec<f64> = records.par_iter().map(|r| self.emissivity(r)).collect();
        debug!(
            platform = %self.platform,
            footprints = records.len(),
            valid = out.iter().filter(|&&e| e != SENTINEL).count(),
            "Cloud emissivities computed"
        );
        out
    }

    /// Emissivities from imager arrays and the top-layer summary.
    ///
    /// Footprints are valid where the summary reports any layer.
    pub fn from_summary(
        &self,
        brightness_temperature: &[f64],
        surface_temperature: &[f64],
        summary: &TopLayerSummary,
    ) -> MatchupResult<Vec<f64>> {
        let records = build_records(brightness_temperature, surface_temperature, summary)?;
        Ok(self.emissivities(&records))
    }
}

/// Pair imager temperatures with the top-layer summary.
pub fn build_records(
    brightness_temperature: &[f64],
    surface_temperature: &[f64],
    summary: &TopLayerSummary,
) -> MatchupResult<Vec<EmissivityRecord>> {
    let n = summary.len();
    if brightness_temperature.len() != n {
        return Err(MatchupError::shape_mismatch(
            "bt11micron",
            n,
            brightness_temperature.len(),
        ));
    }
    if surface_temperature.len() != n {
        return Err(MatchupError::shape_mismatch(
            "surftemp",
            n,
            surface_temperature.len(),
        ));
    }

    Ok((0..n)
        .map(|i| EmissivityRecord {
            brightness_temperature: brightness_temperature[i],
            surface_temperature: surface_temperature[i],
            cloud_temperature: summary.mid_temperature[i],
            valid: summary.data_ok(i),
        })
        .collect())
}

/// Vertical feature class from bits 9 to 11 of a CALIOP flag word.
///
/// The fill word yields the sentinel. Other words are decoded as they come,
/// including negative ones.
#[inline]
pub fn vertical_feature_class(flags: i32) -> i32 {
    if flags == FLAG_FILL {
        return SENTINEL_INT;
    }
    ((flags >> 9) & 1) + 2 * ((flags >> 10) & 1) + 4 * ((flags >> 11) & 1)
}

/// Vertical feature classes of the topmost layers.
pub fn vertical_feature_classes(first_layer_flags: &[i32]) -> Vec<i32> {
    first_layer_flags
        .iter()
        .map(|&f| vertical_feature_class(f))
        .collect()
}
