//! Propagating per-footprint values between tracks of different sampling.
//!
//! Values are copied, never interpolated: a coarse footprint physically
//! covers several fine footprints equally, and flags or sentinels must
//! survive the transfer unchanged.

use atrain_common::{MatchupError, MatchupResult, LayerProfiles, ResolutionPair, SENTINEL};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::displacement::TrackDisplacement;

/// How a fine-track index is mapped onto the coarse track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IndexMapping {
    /// `floor(i / ratio + 0.5)`: nearest coarse footprint.
    #[default]
    Nearest,
    /// `floor(i / ratio)`: coarse footprint containing the fine one.
    Block,
}

impl IndexMapping {
    /// Coarse index for fine index `fine_index` shifted by `offset`.
    #[inline]
    pub fn coarse_index(&self, fine_index: usize, offset: usize, ratio: f64) -> usize {
        let position = (fine_index + offset) as f64 / ratio;
        match self {
            IndexMapping::Nearest => (position + 0.5).floor() as usize,
            IndexMapping::Block => position.floor() as usize,
        }
    }
}

/// Copy coarse-track values onto a fine track of `fine_len` footprints.
///
/// Indices falling outside the coarse track get `fill`. An unresolved
/// displacement yields an all-`fill` track. `ratio` must be positive.
pub fn resample_track<T: Copy>(
    coarse: &[T],
    fine_len: usize,
    ratio: f64,
    mapping: IndexMapping,
    displacement: TrackDisplacement,
    fill: T,
) -> Vec<T> {
    let Some(offset) = displacement.offset() else {
        warn!(fine_len, "Unresolved track displacement, emitting fill values");
        return vec![fill; fine_len];
    };

    (0..fine_len)
        .map(|i| {
            coarse
                .get(mapping.coarse_index(i, offset, ratio))
                .copied()
                .unwrap_or(fill)
        })
        .collect()
}

/// Nearest-neighbour transfer of detection heights (m) between tracks.
pub fn resample_detection_height(
    coarse: &[f64],
    fine_len: usize,
    ratio: f64,
    displacement: TrackDisplacement,
) -> Vec<f64> {
    resample_track(
        coarse,
        fine_len,
        ratio,
        IndexMapping::Nearest,
        displacement,
        SENTINEL,
    )
}

/// Repeat each coarse value over the fine footprints it contains.
pub fn broadcast_to_fine(coarse: &[f64], pair: ResolutionPair, fine_len: usize) -> Vec<f64> {
    resample_track(
        coarse,
        fine_len,
        pair.ratio() as f64,
        IndexMapping::Block,
        TrackDisplacement::Aligned,
        SENTINEL,
    )
}

/// Keep broadcast detection heights from falling below the base of a layer
/// the fine track resolves on its own.
///
/// For every fine footprint with a valid first layer (top and base
/// non-negative), the height becomes `max(height, base * 1000)`.
pub fn refine_with_fine_layers(heights: &mut [f64], fine: &LayerProfiles) -> MatchupResult<()> {
    if heights.len() != fine.len() {
        return Err(MatchupError::shape_mismatch(
            "detection_height",
            fine.len(),
            heights.len(),
        ));
    }

    for (height, fp) in heights.iter_mut().zip(fine.iter()) {
        let (Some(&top), Some(&base)) = (fp.top.first(), fp.base.first()) else {
            continue;
        };
        if top >= 0.0 && base >= 0.0 {
            *height = height.max(base * 1000.0);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nearest_rounds_half_up() {
        let m = IndexMapping::Nearest;
        assert_eq!(m.coarse_index(0, 0, 5.0), 0);
        assert_eq!(m.coarse_index(2, 0, 5.0), 0);
        assert_eq!(m.coarse_index(3, 0, 5.0), 1);
        // 2.5 / 5 = 0.5 rounds up
        assert_eq!(m.coarse_index(5, 0, 10.0), 1);
    }

    #[test]
    fn test_block_truncates() {
        let m = IndexMapping::Block;
        assert_eq!(m.coarse_index(4, 0, 5.0), 0);
        assert_eq!(m.coarse_index(5, 0, 5.0), 1);
        assert_eq!(m.coarse_index(9, 0, 5.0), 1);
    }

    #[test]
    fn test_out_of_bounds_is_fill() {
        let out = resample_track(&[1, 2], 4, 1.0, IndexMapping::Nearest, TrackDisplacement::Aligned, -9);
        assert_eq!(out, vec![1, 2, -9, -9]);
    }

    #[test]
    fn test_displacement_shifts_lookup() {
        let coarse = [10.0, 20.0, 30.0, 40.0];
        let out = resample_detection_height(&coarse, 3, 1.0, TrackDisplacement::Displaced(2));
        assert_eq!(out, vec![30.0, 40.0, SENTINEL]);
    }

    #[test]
    fn test_unresolved_displacement_is_all_sentinel() {
        let out = resample_detection_height(&[1.0, 2.0], 5, 1.0, TrackDisplacement::Unresolved);
        assert_eq!(out, vec![SENTINEL; 5]);
    }

    #[test]
    fn test_broadcast_repeats_blocks() {
        let out = broadcast_to_fine(&[1.0, 2.0], ResolutionPair::five_to_one(), 12);
        assert_eq!(
            out,
            vec![1.0, 1.0, 1.0, 1.0, 1.0, 2.0, 2.0, 2.0, 2.0, 2.0, SENTINEL, SENTINEL]
        );
    }

    #[test]
    fn test_refine_length_mismatch() {
        let fine = LayerProfiles::new(1, vec![1.0], vec![0.5], vec![0.1], vec![0], vec![1.0]).unwrap();
        let mut heights = vec![0.0, 0.0];
        assert!(refine_with_fine_layers(&mut heights, &fine).is_err());
    }
}
