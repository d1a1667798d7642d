//! Optical-depth height filtering.
//!
//! The lidar reports every layer it sees, including very thin ones a passive
//! imager cannot detect. To compare against imager cloud tops, each column is
//! reduced to the first layer at which the optical depth accumulated from the
//! top reaches `min_optical_depth`. Layers above it are dropped and the layer
//! arrays are re-aligned so that the detection layer becomes index 0.
//!
//! # Algorithm
//!
//! ```text
//! depth = 0
//! for layer in valid layers (top to bottom):
//!     depth += optical_depth[layer]
//!     if depth >= min_optical_depth:
//!         shift layer arrays left by `layer`
//!         place the reported top inside the layer (HeightMethod)
//!         stop
//! ```
//!
//! Footprints that never reach the threshold keep the batch-wide fallback
//! altitudes, a zero cloud fraction and a sentinel validation height.

use atrain_common::{FootprintLayers, LayerProfiles, FLAG_FILL, SENTINEL};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Penetration limit used when none is configured.
pub const DEFAULT_LIMIT_CTOP: f64 = 0.2;

/// How the reported top is placed inside the detection layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum HeightMethod {
    /// Midpoint between layer top and base, applied to every re-aligned layer.
    Midpoint,
    /// Depth at which `limit_ctop` optical depth is reached, assuming the
    /// layer's optical depth is spread evenly over its geometric depth.
    Penetration { limit_ctop: f64 },
}

impl HeightMethod {
    /// Select a method from the legacy `use_old_method` switch.
    pub fn from_flag(use_old_method: bool, limit_ctop: f64) -> Self {
        if use_old_method {
            HeightMethod::Midpoint
        } else {
            HeightMethod::Penetration { limit_ctop }
        }
    }

    /// Penetration limit, if this is the penetration method.
    pub fn limit_ctop(&self) -> Option<f64> {
        match self {
            HeightMethod::Penetration { limit_ctop } => Some(*limit_ctop),
            HeightMethod::Midpoint => None,
        }
    }
}

impl Default for HeightMethod {
    fn default() -> Self {
        HeightMethod::Penetration {
            limit_ctop: DEFAULT_LIMIT_CTOP,
        }
    }
}

/// Top and base assigned to footprints without a detection layer.
///
/// These are the minimum top and base over the whole batch (sentinels
/// included), which in practice is the sentinel itself. Kept for
/// compatibility with existing matchup archives.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FallbackAltitudes {
    pub top: f64,
    pub base: f64,
}

impl FallbackAltitudes {
    /// Reduce a batch to its minimum top and base.
    pub fn from_profiles(profiles: &LayerProfiles) -> Self {
        Self {
            top: batch_minimum(profiles.top()),
            base: batch_minimum(profiles.base()),
        }
    }
}

fn batch_minimum(values: &[f64]) -> f64 {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    if min.is_finite() {
        min
    } else {
        SENTINEL
    }
}

/// Scalar results for one footprint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FootprintHeights {
    /// Index of the detection layer in the original stack.
    pub detection_layer: Option<usize>,
    /// Footprint cloud fraction, or 0 without detection.
    pub cloud_fraction: f64,
    /// Reported detection-layer top in m, or the sentinel.
    pub validation_height: f64,
    /// Height (m) down to which the lidar had to look: the validation height
    /// when detected, else the base of the lowest layer, else the sentinel.
    pub detection_height: f64,
}

impl Default for FootprintHeights {
    fn default() -> Self {
        Self {
            detection_layer: None,
            cloud_fraction: 0.0,
            validation_height: SENTINEL,
            detection_height: SENTINEL,
        }
    }
}

/// Mutable re-aligned layer rows of one footprint.
///
/// Callers pre-fill the rows with the fallback altitudes and [`FLAG_FILL`].
pub struct LayerOutput<'a> {
    pub top: &'a mut [f64],
    pub base: &'a mut [f64],
    pub flags: &'a mut [i32],
}

/// Convert an altitude in km to m, keeping negative values as the sentinel.
#[inline]
pub fn km_to_height(km: f64) -> f64 {
    if km >= 0.0 {
        km * 1000.0
    } else {
        SENTINEL
    }
}

/// Fraction of a layer's geometric depth the lidar penetrates before the
/// residual optical depth is used up. Clamped to `[0, 1]`.
#[inline]
pub fn penetration_fraction(residual_optical_depth: f64, layer_optical_depth: f64) -> f64 {
    if layer_optical_depth <= 0.0 {
        return if residual_optical_depth > 0.0 { 1.0 } else { 0.0 };
    }
    (residual_optical_depth / layer_optical_depth).clamp(0.0, 1.0)
}

/// Reduce one footprint's layer stack.
///
/// Writes the re-aligned rows into `out` when a detection layer is found and
/// leaves them untouched otherwise.
pub fn filter_footprint(
    fp: &FootprintLayers<'_>,
    min_optical_depth: f64,
    method: HeightMethod,
    out: LayerOutput<'_>,
) -> FootprintHeights {
    let capacity = fp.top.len();
    let mut depth_above = 0.0;

    for (layer, &optical_depth) in fp.valid_optical_depth().iter().enumerate() {
        let accumulated = depth_above + optical_depth;
        if accumulated < min_optical_depth {
            depth_above = accumulated;
            continue;
        }

        let shifted = capacity - layer;
        out.top[..shifted].copy_from_slice(&fp.top[layer..]);
        out.base[..shifted].copy_from_slice(&fp.base[layer..]);
        out.flags[..shifted].copy_from_slice(&fp.flags[layer..]);

        match method {
            HeightMethod::Midpoint => {
                for k in 0..capacity {
                    if out.top[k] < 0.0 {
                        break;
                    }
                    out.top[k] = out.base[k] + (out.top[k] - out.base[k]) * 0.5;
                }
            }
            HeightMethod::Penetration { limit_ctop } => {
                let fraction = penetration_fraction(limit_ctop - depth_above, optical_depth);
                out.top[0] -= fraction * (out.top[0] - out.base[0]);
            }
        }

        let height = km_to_height(out.top[0]);
        return FootprintHeights {
            detection_layer: Some(layer),
            cloud_fraction: fp.cloud_fraction,
            validation_height: height,
            detection_height: height,
        };
    }

    // Threshold never reached: the lidar saw through the whole column.
    FootprintHeights {
        detection_height: fp.lowest_valid_base().map(km_to_height).unwrap_or(SENTINEL),
        ..FootprintHeights::default()
    }
}

/// Detection results for a batch of footprints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionBatch {
    pub capacity: usize,
    /// Re-aligned layer tops (km), row-major.
    pub top: Vec<f64>,
    /// Re-aligned layer bases (km), row-major.
    pub base: Vec<f64>,
    /// Re-aligned classification flags, row-major.
    pub flags: Vec<i32>,
    pub cloud_fraction: Vec<f64>,
    pub detection_layer: Vec<Option<usize>>,
    /// Detection-layer top in m, or -9.
    pub validation_height: Vec<f64>,
    /// Detection height in m, or -9.
    pub detection_height: Vec<f64>,
    pub fallback: FallbackAltitudes,
}

impl DetectionBatch {
    /// Number of footprints.
    pub fn len(&self) -> usize {
        self.cloud_fraction.len()
    }

    /// Whether the batch holds no footprints.
    pub fn is_empty(&self) -> bool {
        self.cloud_fraction.is_empty()
    }

    /// Number of footprints with a detection layer.
    pub fn detected_count(&self) -> usize {
        self.detection_layer.iter().filter(|l| l.is_some()).count()
    }

    /// Re-aligned top row of a footprint.
    pub fn footprint_top(&self, index: usize) -> Option<&[f64]> {
        let start = index.checked_mul(self.capacity)?;
        self.top.get(start..start + self.capacity)
    }

    /// Classification flag word of the detection layer of every footprint.
    pub fn first_layer_flags(&self) -> Vec<i32> {
        if self.capacity == 0 {
            return vec![FLAG_FILL; self.len()];
        }
        self.flags.iter().step_by(self.capacity).copied().collect()
    }
}

/// Apply the optical-depth filter to a batch.
pub fn optical_depth_height_filter(
    profiles: &LayerProfiles,
    min_optical_depth: f64,
    method: HeightMethod,
) -> DetectionBatch {
    let fallback = FallbackAltitudes::from_profiles(profiles);
    filter_with_fallback(profiles, min_optical_depth, method, fallback)
}

/// Apply the optical-depth filter with precomputed fallback altitudes.
pub fn filter_with_fallback(
    profiles: &LayerProfiles,
    min_optical_depth: f64,
    method: HeightMethod,
    fallback: FallbackAltitudes,
) -> DetectionBatch {
    let footprints = profiles.len();
    let capacity = profiles.capacity();

    let mut top = vec![fallback.top; footprints * capacity];
    let mut base = vec![fallback.base; footprints * capacity];
    let mut flags = vec![FLAG_FILL; footprints * capacity];

    let heights: Vec<FootprintHeights> = if capacity == 0 {
        vec![FootprintHeights::default(); footprints]
    } else {
        top.par_chunks_mut(capacity)
            .zip(base.par_chunks_mut(capacity))
            .zip(flags.par_chunks_mut(capacity))
            .enumerate()
            .map(|(i, ((top, base), flags))| {
                profiles
                    .footprint(i)
                    .map(|fp| {
                        filter_footprint(
                            &fp,
                            min_optical_depth,
                            method,
                            LayerOutput { top, base, flags },
                        )
                    })
                    .unwrap_or_default()
            })
            .collect()
    };

    let batch = DetectionBatch {
        capacity,
        top,
        base,
        flags,
        cloud_fraction: heights.iter().map(|h| h.cloud_fraction).collect(),
        detection_layer: heights.iter().map(|h| h.detection_layer).collect(),
        validation_height: heights.iter().map(|h| h.validation_height).collect(),
        detection_height: heights.iter().map(|h| h.detection_height).collect(),
        fallback,
    };

    debug!(
        footprints,
        detected = batch.detected_count(),
        min_optical_depth,
        method = ?method,
        "Optical depth height filter applied"
    );

    batch
}
