//! Emissivity filtering of high thin clouds.
//!
//! The imager cannot be expected to see clouds that are both high and
//! radiatively thin. In emissivity-filter mode such footprints are dropped
//! from the validation set; low clouds and clear footprints are kept.

use atrain_common::{MatchupError, MatchupResult, SENTINEL};
use serde::{Deserialize, Serialize};

/// Thresholds for the emissivity filter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmissivityFilter {
    /// Emissivity a high cloud must exceed to be kept.
    pub limit: f64,
    /// Heights (m) at or below this are always kept.
    pub min_height: f64,
}

impl Default for EmissivityFilter {
    fn default() -> Self {
        Self {
            limit: 0.2,
            min_height: 2000.0,
        }
    }
}

impl EmissivityFilter {
    pub fn new(limit: f64, min_height: f64) -> Self {
        Self { limit, min_height }
    }

    /// Whether a footprint with emissivity `ec` and maximum layer height
    /// `max_height` (m) is kept.
    #[inline]
    pub fn keep(&self, ec: f64, max_height: f64) -> bool {
        let high = max_height > self.min_height;
        (ec > self.limit && high) || max_height == SENTINEL || !high
    }

    /// Keep mask for a batch.
    pub fn mask(&self, emissivity: &[f64], max_height: &[f64]) -> MatchupResult<Vec<bool>> {
        if emissivity.len() != max_height.len() {
            return Err(MatchupError::shape_mismatch(
                "emissivity",
                max_height.len(),
                emissivity.len(),
            ));
        }
        Ok(emissivity
            .iter()
            .zip(max_height)
            .map(|(&ec, &h)| self.keep(ec, h))
            .collect())
    }
}
