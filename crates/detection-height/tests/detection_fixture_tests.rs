//! Integration tests against the 5 km / 1 km reference fixture.
//!
//! The heights here are the values the matchup archives were produced with,
//! compared to the nearest metre.

use atrain_common::{ResolutionPair, SENTINEL};
use detection_height::{
    broadcast_to_fine, optical_depth_height_filter, refine_with_fine_layers, HeightMethod,
};
use test_utils::fixtures::{self, MIN_OPTICAL_DEPTH, PENETRATION_LIMIT};
use test_utils::{assert_all_approx_eq, assert_approx_eq};

const METRE: f64 = 1.5;

fn penetration() -> HeightMethod {
    HeightMethod::Penetration {
        limit_ctop: PENETRATION_LIMIT,
    }
}

// =============================================================================
// 5 km detection heights
// =============================================================================

#[test]
fn test_midpoint_heights_match_fixture() {
    let batch = optical_depth_height_filter(
        &fixtures::coarse_profiles(),
        MIN_OPTICAL_DEPTH,
        HeightMethod::Midpoint,
    );
    assert_all_approx_eq!(
        &batch.detection_height,
        &fixtures::EXPECTED_MIDPOINT_HEIGHTS,
        METRE
    );
}

#[test]
fn test_penetration_heights_match_fixture() {
    let batch = optical_depth_height_filter(
        &fixtures::coarse_profiles(),
        MIN_OPTICAL_DEPTH,
        penetration(),
    );
    assert_all_approx_eq!(
        &batch.detection_height,
        &fixtures::EXPECTED_PENETRATION_HEIGHTS,
        METRE
    );
}

#[test]
fn test_detection_layers_in_fixture() {
    let batch = optical_depth_height_filter(
        &fixtures::coarse_profiles(),
        MIN_OPTICAL_DEPTH,
        HeightMethod::Midpoint,
    );
    assert_eq!(
        batch.detection_layer,
        vec![None, Some(0), None, None, Some(0), Some(0), Some(1)]
    );
    assert_eq!(batch.detected_count(), 4);
}

#[test]
fn test_undetected_footprints_have_sentinel_validation_height() {
    let batch = optical_depth_height_filter(
        &fixtures::coarse_profiles(),
        MIN_OPTICAL_DEPTH,
        penetration(),
    );
    for i in [0, 2, 3] {
        assert_eq!(batch.validation_height[i], SENTINEL);
        assert_eq!(batch.cloud_fraction[i], 0.0);
    }
    // Thin columns still report how deep the lidar looked
    assert_approx_eq!(batch.detection_height[2], 7300.0, METRE);
    assert_approx_eq!(batch.detection_height[3], 4600.0, METRE);
}

#[test]
fn test_detection_layer_flags_are_realigned() {
    let batch = optical_depth_height_filter(
        &fixtures::coarse_profiles(),
        MIN_OPTICAL_DEPTH,
        HeightMethod::Midpoint,
    );
    // Footprint 6 detects at its second layer, whose flag word is 2
    assert_eq!(batch.first_layer_flags(), vec![1, 8, 1, 1, 1, 2, 2]);
}

#[test]
fn test_methods_agree_on_unpenetrated_columns() {
    let profiles = fixtures::coarse_profiles();
    let mid = optical_depth_height_filter(&profiles, MIN_OPTICAL_DEPTH, HeightMethod::Midpoint);
    let pen = optical_depth_height_filter(&profiles, MIN_OPTICAL_DEPTH, penetration());
    for i in [0, 2, 3] {
        assert_eq!(mid.detection_height[i], pen.detection_height[i]);
    }
}

// =============================================================================
// 1 km propagation
// =============================================================================

#[test]
fn test_broadcast_to_fine_track() {
    let batch = optical_depth_height_filter(
        &fixtures::coarse_profiles(),
        MIN_OPTICAL_DEPTH,
        penetration(),
    );
    let fine = fixtures::fine_profiles();
    let heights = broadcast_to_fine(
        &batch.detection_height,
        ResolutionPair::five_to_one(),
        fine.len(),
    );
    assert_eq!(heights.len(), 35);
    assert_all_approx_eq!(&heights, &fixtures::broadcast_penetration_heights(), METRE);
}

#[test]
fn test_fine_layers_bound_broadcast_heights() {
    let batch = optical_depth_height_filter(
        &fixtures::coarse_profiles(),
        MIN_OPTICAL_DEPTH,
        penetration(),
    );
    let fine = fixtures::fine_profiles();
    let mut heights = broadcast_to_fine(
        &batch.detection_height,
        ResolutionPair::five_to_one(),
        fine.len(),
    );
    refine_with_fine_layers(&mut heights, &fine).unwrap();

    let expected = [
        (0, SENTINEL),
        (5, 9078.0),
        (10, 7300.0),
        (15, 4700.0),
        (20, 2223.0),
        (25, 2180.0),
        (30, 3100.0),
    ];
    for (index, height) in expected {
        assert_approx_eq!(heights[index], height, METRE);
    }
    // Whole blocks move together
    assert_eq!(heights[15], heights[19]);
    assert_eq!(heights[30], heights[34]);
}

// =============================================================================
// Property checks on synthetic profiles
// =============================================================================

#[test]
fn test_penetration_height_lies_within_detection_layer() {
    let profiles = test_utils::random_profiles(500, 10, 11);
    let batch = optical_depth_height_filter(&profiles, MIN_OPTICAL_DEPTH, penetration());

    for (i, layer) in batch.detection_layer.iter().enumerate() {
        let Some(layer) = layer else {
            assert_eq!(batch.validation_height[i], SENTINEL);
            continue;
        };
        let fp = profiles.footprint(i).unwrap();
        let height = batch.validation_height[i];
        assert!(height <= fp.top[*layer] * 1000.0 + 1e-6);
        assert!(height >= fp.base[*layer] * 1000.0 - 1e-6);
    }
}

#[test]
fn test_midpoint_never_above_penetration_top() {
    let profiles = test_utils::random_profiles(500, 10, 23);
    let mid = optical_depth_height_filter(&profiles, MIN_OPTICAL_DEPTH, HeightMethod::Midpoint);
    let top = optical_depth_height_filter(
        &profiles,
        MIN_OPTICAL_DEPTH,
        HeightMethod::Penetration { limit_ctop: 0.0 },
    );
    for i in 0..profiles.len() {
        assert_eq!(mid.detection_layer[i], top.detection_layer[i]);
        if mid.detection_layer[i].is_some() {
            assert!(mid.validation_height[i] <= top.validation_height[i] + 1e-6);
        }
    }
}

#[test]
fn test_sentinel_rows_stay_untouched() {
    let profiles = test_utils::empty_profiles(20, 10);
    let batch = optical_depth_height_filter(&profiles, MIN_OPTICAL_DEPTH, penetration());
    assert!(batch.detection_height.iter().all(|&h| h == SENTINEL));
    assert!(batch.top.iter().all(|&t| t == SENTINEL));
}
