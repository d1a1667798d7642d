//! Start-point displacement between two ground tracks.
//!
//! CloudSat and CALIPSO fly in formation, but a matchup may start with one
//! of them missing for the first part of the cross section. When the first
//! latitudes differ by more than a tolerance, the partner track is scanned
//! for the point closest to the other track's start and the index offset is
//! carried into the resampling.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Tolerances for displacement detection, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplacementTolerance {
    /// Start latitudes differing by more than this mark a displaced track.
    pub start_lat: f64,
    /// Latitude window for the matching partner point.
    pub match_lat: f64,
    /// Longitude window for the matching partner point.
    pub match_lon: f64,
}

impl Default for DisplacementTolerance {
    fn default() -> Self {
        Self {
            start_lat: 0.1,
            match_lat: 0.05,
            match_lon: 0.1,
        }
    }
}

/// Alignment of a track's start relative to its partner track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "offset", rename_all = "snake_case")]
pub enum TrackDisplacement {
    /// Both tracks start at the same place.
    Aligned,
    /// The track starts this many (ratio-scaled) partner footprints late.
    Displaced(usize),
    /// Start points differ but no partner point matched.
    Unresolved,
}

impl TrackDisplacement {
    /// Index offset to add before mapping, if one is known.
    pub fn offset(&self) -> Option<usize> {
        match self {
            TrackDisplacement::Aligned => Some(0),
            TrackDisplacement::Displaced(offset) => Some(*offset),
            TrackDisplacement::Unresolved => None,
        }
    }

    pub fn is_displaced(&self) -> bool {
        !matches!(self, TrackDisplacement::Aligned)
    }
}

/// Detect whether `start` lies off the beginning of the partner track.
///
/// `ratio` is the number of track footprints per partner footprint; the
/// matching partner index is scaled by it (and truncated) to give the offset.
pub fn detect_displacement(
    start: GeoPoint,
    partner_lat: &[f64],
    partner_lon: &[f64],
    ratio: f64,
    tolerance: &DisplacementTolerance,
) -> TrackDisplacement {
    let (Some(&lat0), Some(&lon0)) = (partner_lat.first(), partner_lon.first()) else {
        warn!("Partner track is empty, displacement cannot be resolved");
        return TrackDisplacement::Unresolved;
    };

    let lat_diff = (lat0 - start.lat).abs();
    if lat_diff <= tolerance.start_lat {
        return TrackDisplacement::Aligned;
    }

    info!(
        lat_diff,
        partner_start_lat = lat0,
        partner_start_lon = lon0,
        start_lat = start.lat,
        start_lon = start.lon,
        "Track start points differ"
    );

    let found = partner_lat
        .iter()
        .zip(partner_lon)
        .position(|(&lat, &lon)| {
            (lat - start.lat).abs() < tolerance.match_lat
                && (lon - start.lon).abs() < tolerance.match_lon
        });

    match found {
        Some(index) => {
            let offset = (index as f64 * ratio) as usize;
            info!(partner_index = index, offset, "Track displacement resolved");
            TrackDisplacement::Displaced(offset)
        }
        None => {
            warn!(
                scanned = partner_lat.len(),
                "No partner point near track start, displacement unresolved"
            );
            TrackDisplacement::Unresolved
        }
    }
}
