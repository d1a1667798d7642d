//! Imager cloud top heights relative to sea level.
//!
//! PPS reports cloud top heights above ground while the lidar and radar
//! heights are above sea level. Positive heights get the surface elevation
//! added; where the elevation is not positive the legacy archives add the
//! sentinel instead, which this keeps for comparability.

use atrain_common::{MatchupError, MatchupResult, SENTINEL};

#[inline]
pub fn height_above_sea_level(ctth: f64, elevation: f64) -> f64 {
    if ctth > 0.0 {
        let elevation = if elevation > 0.0 { elevation } else { SENTINEL };
        ctth + elevation
    } else {
        ctth
    }
}

pub fn ctth_above_sea_level(ctth: &[f64], elevation: &[f64]) -> MatchupResult<Vec<f64>> {
    if ctth.len() != elevation.len() {
        return Err(MatchupError::shape_mismatch(
            "elevation",
            ctth.len(),
            elevation.len(),
        ));
    }
    Ok(ctth
        .iter()
        .zip(elevation)
        .map(|(&h, &e)| height_above_sea_level(h, e))
        .collect())
}
