//! Ragged per-footprint vertical layer arrays.
//!
//! A lidar profile product reports, for every footprint along the ground
//! track, up to `capacity` cloud layers ordered top to bottom. Unused slots
//! hold the sentinel value. Layers are stored row-major
//! (`footprint * capacity + layer`), and the number of leading valid layers of
//! each footprint is computed once at construction so that consumers iterate
//! over an explicit bound instead of re-scanning for sentinels.
//!
//! # Preconditions
//!
//! A sentinel optical depth at layer `k` implies sentinels at every layer
//! below `k`. Profiles violating this are accepted, but every layer after the
//! first sentinel is ignored.

use crate::error::{MatchupError, MatchupResult};

/// Fill value for "no data" in altitude, optical depth and derived fields.
pub const SENTINEL: f64 = -9.0;

/// Integer form of [`SENTINEL`].
pub const SENTINEL_INT: i32 = -9;

/// Classification flag word marking an invalid or absent feature.
pub const FLAG_FILL: i32 = 1;

/// Whether an optical depth value belongs to a real layer.
#[inline]
pub fn is_valid_optical_depth(value: f64) -> bool {
    value >= 0.0
}

/// Whether an altitude value belongs to a real layer.
///
/// Altitudes may legitimately be slightly negative below sea level, so only
/// the sentinel itself (or anything below it) counts as missing.
#[inline]
pub fn is_valid_altitude(value: f64) -> bool {
    value > SENTINEL
}

/// Layer arrays for a batch of footprints.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerProfiles {
    capacity: usize,
    /// Layer top altitude in km.
    top: Vec<f64>,
    /// Layer base altitude in km.
    base: Vec<f64>,
    /// Layer optical depth (532 nm).
    optical_depth: Vec<f64>,
    /// Feature classification flag words.
    flags: Vec<i32>,
    /// Footprint-level cloud fraction.
    cloud_fraction: Vec<f64>,
    valid_layers: Vec<usize>,
}

impl LayerProfiles {
    /// Build profiles from flat row-major arrays.
    ///
    /// The footprint count is taken from `cloud_fraction`; every layer array
    /// must hold `footprints * capacity` values.
    pub fn new(
        capacity: usize,
        top: Vec<f64>,
        base: Vec<f64>,
        optical_depth: Vec<f64>,
        flags: Vec<i32>,
        cloud_fraction: Vec<f64>,
    ) -> MatchupResult<Self> {
        let expected = cloud_fraction.len() * capacity;
        check_len("layer_top_altitude", expected, top.len())?;
        check_len("layer_base_altitude", expected, base.len())?;
        check_len("feature_optical_depth", expected, optical_depth.len())?;
        check_len("feature_classification_flags", expected, flags.len())?;

        let valid_layers = if capacity == 0 {
            vec![0; cloud_fraction.len()]
        } else {
            optical_depth
                .chunks(capacity)
                .map(|row| {
                    row.iter()
                        .take_while(|&&od| is_valid_optical_depth(od))
                        .count()
                })
                .collect()
        };

        Ok(Self {
            capacity,
            top,
            base,
            optical_depth,
            flags,
            cloud_fraction,
            valid_layers,
        })
    }

    /// Build profiles from per-footprint rows.
    ///
    /// All rows must have the same length, which becomes the layer capacity.
    pub fn from_rows(
        top: &[Vec<f64>],
        base: &[Vec<f64>],
        optical_depth: &[Vec<f64>],
        flags: &[Vec<i32>],
        cloud_fraction: Vec<f64>,
    ) -> MatchupResult<Self> {
        let footprints = cloud_fraction.len();
        let capacity = top.first().map(Vec::len).unwrap_or(0);

        let top = flatten_rows("layer_top_altitude", top, footprints, capacity)?;
        let base = flatten_rows("layer_base_altitude", base, footprints, capacity)?;
        let optical_depth =
            flatten_rows("feature_optical_depth", optical_depth, footprints, capacity)?;
        let flags = flatten_rows("feature_classification_flags", flags, footprints, capacity)?;

        Self::new(capacity, top, base, optical_depth, flags, cloud_fraction)
    }

    /// Number of footprints in the batch.
    pub fn len(&self) -> usize {
        self.cloud_fraction.len()
    }

    /// Whether the batch holds no footprints.
    pub fn is_empty(&self) -> bool {
        self.cloud_fraction.is_empty()
    }

    /// Maximum number of layers per footprint.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// All layer tops, row-major.
    pub fn top(&self) -> &[f64] {
        &self.top
    }

    /// All layer bases, row-major.
    pub fn base(&self) -> &[f64] {
        &self.base
    }

    /// All layer optical depths, row-major.
    pub fn optical_depth(&self) -> &[f64] {
        &self.optical_depth
    }

    /// All classification flags, row-major.
    pub fn flags(&self) -> &[i32] {
        &self.flags
    }

    /// Footprint-level cloud fraction.
    pub fn cloud_fraction(&self) -> &[f64] {
        &self.cloud_fraction
    }

    /// Number of leading layers with a valid optical depth, per footprint.
    pub fn valid_layers(&self) -> &[usize] {
        &self.valid_layers
    }

    /// Borrow the layers of a single footprint.
    pub fn footprint(&self, index: usize) -> Option<FootprintLayers<'_>> {
        if index >= self.len() {
            return None;
        }
        let range = index * self.capacity..(index + 1) * self.capacity;
        Some(FootprintLayers {
            index,
            top: &self.top[range.clone()],
            base: &self.base[range.clone()],
            optical_depth: &self.optical_depth[range.clone()],
            flags: &self.flags[range],
            cloud_fraction: self.cloud_fraction[index],
            valid_layers: self.valid_layers[index],
        })
    }

    /// Iterate over all footprints in track order.
    pub fn iter(&self) -> impl Iterator<Item = FootprintLayers<'_>> + '_ {
        (0..self.len()).filter_map(move |i| self.footprint(i))
    }

    /// Classification flag word of the first layer of every footprint.
    pub fn first_layer_flags(&self) -> Vec<i32> {
        if self.capacity == 0 {
            return vec![FLAG_FILL; self.len()];
        }
        self.flags.iter().step_by(self.capacity).copied().collect()
    }
}

/// Read-only view of one footprint's layer stack.
#[derive(Debug, Clone, Copy)]
pub struct FootprintLayers<'a> {
    pub index: usize,
    pub top: &'a [f64],
    pub base: &'a [f64],
    pub optical_depth: &'a [f64],
    pub flags: &'a [i32],
    pub cloud_fraction: f64,
    /// Number of leading layers with a valid optical depth.
    pub valid_layers: usize,
}

impl<'a> FootprintLayers<'a> {
    /// Whether any layer with a valid optical depth exists.
    pub fn has_layers(&self) -> bool {
        self.valid_layers > 0
    }

    /// Optical depths of the valid layers only.
    pub fn valid_optical_depth(&self) -> &'a [f64] {
        &self.optical_depth[..self.valid_layers]
    }

    /// Base altitude of the lowest valid layer.
    pub fn lowest_valid_base(&self) -> Option<f64> {
        self.valid_layers.checked_sub(1).map(|k| self.base[k])
    }
}

fn check_len(field: &str, expected: usize, actual: usize) -> MatchupResult<()> {
    if expected != actual {
        return Err(MatchupError::shape_mismatch(field, expected, actual));
    }
    Ok(())
}

fn flatten_rows<T: Copy>(
    field: &str,
    rows: &[Vec<T>],
    footprints: usize,
    capacity: usize,
) -> MatchupResult<Vec<T>> {
    check_len(field, footprints, rows.len())?;
    let mut flat = Vec::with_capacity(footprints * capacity);
    for row in rows {
        check_len(field, capacity, row.len())?;
        flat.extend_from_slice(row);
    }
    Ok(flat)
}
