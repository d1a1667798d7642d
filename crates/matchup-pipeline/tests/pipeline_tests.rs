//! End-to-end runs over the reference fixture.

use atrain_common::{MatchupError, SENTINEL, SENTINEL_INT};
use detection_height::{HeightMethod, TrackDisplacement};
use matchup_pipeline::{
    AvhrrMatch, CalipsoTrack, CloudsatTrack, MatchupInput, MatchupProcessor, PipelineConfig,
    ProcessMode, ProfileArrays,
};
use test_utils::fixtures::{self, COARSE_FOOTPRINTS, PENETRATION_LIMIT};
use test_utils::{assert_all_approx_eq, assert_approx_eq, straight_track};

fn config(mode: ProcessMode) -> PipelineConfig {
    PipelineConfig {
        resolution_km: 5,
        process_mode: mode,
        height_method: HeightMethod::Penetration {
            limit_ctop: PENETRATION_LIMIT,
        },
        ..PipelineConfig::default()
    }
}

fn cloudsat(lat0: f64, lon0: f64, step: f64, len: usize) -> CloudsatTrack {
    let (latitude, longitude) = straight_track(lat0, lon0, step, len);
    CloudsatTrack {
        latitude,
        longitude,
        elevation: vec![0.0; len],
        modis_cloud_flag: (0..len as i32).collect(),
        ctth_height: vec![SENTINEL; len],
    }
}

fn fixture_input() -> MatchupInput {
    let n = COARSE_FOOTPRINTS;
    let (latitude, longitude) = straight_track(40.0, -120.0, 0.05, n);
    MatchupInput {
        calipso: CalipsoTrack {
            latitude,
            longitude,
            elevation: vec![0.0, 150.0, 150.0, 0.0, 300.0, 300.0, 300.0],
            mid_temperature: vec![-45.0; n],
            layers: ProfileArrays::from(&fixtures::coarse_profiles()),
        },
        avhrr: AvhrrMatch {
            bt11micron: vec![255.0; n],
            surftemp: vec![288.0; n],
            ctth_height: vec![SENTINEL, 8000.0, 7000.0, 4000.0, 0.0, 2000.0, 3000.0],
        },
        cloudsat: Some(cloudsat(40.0, -120.0, 0.05, 40)),
        calipso_fine: Some(ProfileArrays::from(&fixtures::fine_profiles())),
    }
}

#[test]
fn test_fixture_detection_heights() {
    let processor = MatchupProcessor::with_klm(config(ProcessMode::Basic)).unwrap();
    let records = processor.process(fixture_input()).unwrap();

    assert_eq!(records.footprints, COARSE_FOOTPRINTS);
    assert_eq!(records.resolution_km, 5);
    assert_all_approx_eq!(
        &records.detection.detection_height,
        &fixtures::EXPECTED_PENETRATION_HEIGHTS,
        1.5
    );
    assert!(records.emissfilt_ok.is_none());
}

#[test]
fn test_fixture_fine_track_refinement() {
    let processor = MatchupProcessor::with_klm(config(ProcessMode::Basic)).unwrap();
    let records = processor.process(fixture_input()).unwrap();

    let fine = records.fine_detection_height.unwrap();
    assert_eq!(fine.len(), 35);
    assert_eq!(fine[0], SENTINEL);
    assert_approx_eq!(fine[7], 9078.0, 1.5);
    assert_approx_eq!(fine[15], 4700.0, 1.5);
    assert_approx_eq!(fine[34], 3100.0, 1.5);
}

#[test]
fn test_fixture_emissivity_and_classes() {
    let processor = MatchupProcessor::with_klm(config(ProcessMode::Basic)).unwrap();
    let records = processor.process(fixture_input()).unwrap();

    assert_eq!(records.emissivity[0], SENTINEL);
    for &ec in &records.emissivity[1..] {
        assert!(ec > 0.0 && ec < 1.0, "emissivity {ec}");
    }
    assert_eq!(records.vertical_feature_class, vec![7, 0, 0, 0, -9, 0, 0]);
    assert_eq!(records.top_layer.max_height[0], SENTINEL);
    assert_approx_eq!(records.top_layer.max_height[1], 9200.0, 1e-6);
    assert_approx_eq!(records.top_layer.mid_temperature[1], 228.15, 1e-9);
}

#[test]
fn test_fixture_ctth_above_sea_level() {
    let processor = MatchupProcessor::with_klm(config(ProcessMode::Basic)).unwrap();
    let records = processor.process(fixture_input()).unwrap();
    assert_eq!(
        records.avhrr_ctth_asl,
        vec![SENTINEL, 8150.0, 7150.0, 3991.0, 0.0, 2300.0, 3300.0]
    );
}

/// Fixture run at 1 km: no fine track, 1 km track ratio.
fn one_km() -> (MatchupProcessor, MatchupInput) {
    let mut config = config(ProcessMode::Basic);
    config.resolution_km = 1;
    let mut input = fixture_input();
    input.calipso_fine = None;
    (MatchupProcessor::with_klm(config).unwrap(), input)
}

#[test]
fn test_aligned_modis_flag_transfer_1km() {
    let (processor, input) = one_km();
    let records = processor.process(input).unwrap();

    assert_eq!(records.displacement, Some(TrackDisplacement::Aligned));
    // round(i / 1.076) for the first seven footprints
    assert_eq!(records.modis_cloud_flag.unwrap(), vec![0, 1, 2, 3, 4, 5, 6]);
}

#[test]
fn test_aligned_modis_flag_transfer_5km() {
    let processor = MatchupProcessor::with_klm(config(ProcessMode::Basic)).unwrap();
    let records = processor.process(fixture_input()).unwrap();

    assert_eq!(records.displacement, Some(TrackDisplacement::Aligned));
    // round(i / 0.2152): each 5 km footprint spans about 4.6 CloudSat profiles
    assert_eq!(records.modis_cloud_flag.unwrap(), vec![0, 5, 9, 14, 19, 23, 28]);
}

#[test]
fn test_displaced_modis_flag_transfer_1km() {
    let (processor, mut input) = one_km();
    // CloudSat starts 2 degrees south; CALIOP's first point is at index 20
    input.cloudsat = Some(cloudsat(38.0, -121.0, 0.1, 60));

    let records = processor.process(input).unwrap();

    assert_eq!(records.displacement, Some(TrackDisplacement::Displaced(21)));
    let flags = records.modis_cloud_flag.unwrap();
    assert_eq!(flags[0], 20);
}

#[test]
fn test_displaced_modis_flag_transfer_5km() {
    let mut input = fixture_input();
    input.cloudsat = Some(cloudsat(38.0, -121.0, 0.1, 60));

    let processor = MatchupProcessor::with_klm(config(ProcessMode::Basic)).unwrap();
    let records = processor.process(input).unwrap();

    // Partner index 20 scaled by 1.076 / 5 and truncated
    assert_eq!(records.displacement, Some(TrackDisplacement::Displaced(4)));
    let flags = records.modis_cloud_flag.unwrap();
    assert_eq!(&flags[..3], &[19, 23, 28]);
}

#[test]
fn test_empty_cloudsat_track_is_rejected() {
    let mut input = fixture_input();
    input.cloudsat = Some(cloudsat(40.0, -120.0, 0.05, 0));

    let processor = MatchupProcessor::with_klm(config(ProcessMode::Basic)).unwrap();
    assert!(matches!(
        processor.process(input),
        Err(MatchupError::InvalidInput(_))
    ));
}

#[test]
fn test_cloudsat_ctth_above_sea_level() {
    let mut input = fixture_input();
    if let Some(track) = input.cloudsat.as_mut() {
        track.elevation[..4].copy_from_slice(&[0.0, 250.0, 250.0, -5.0]);
        track.ctth_height[..4].copy_from_slice(&[SENTINEL, 6000.0, 0.0, 3000.0]);
    }

    let processor = MatchupProcessor::with_klm(config(ProcessMode::Basic)).unwrap();
    let records = processor.process(input).unwrap();

    let ctth = records.cloudsat_avhrr_ctth_asl.unwrap();
    // One value per CloudSat profile, not per CALIOP footprint
    assert_eq!(ctth.len(), 40);
    assert_eq!(&ctth[..4], &[SENTINEL, 6250.0, 0.0, 2991.0]);
    assert!(ctth[4..].iter().all(|&h| h == SENTINEL));
}

#[test]
fn test_no_cloudsat_track_gives_no_cloudsat_records() {
    let mut input = fixture_input();
    input.cloudsat = None;

    let processor = MatchupProcessor::with_klm(config(ProcessMode::Basic)).unwrap();
    let records = processor.process(input).unwrap();
    assert!(records.displacement.is_none());
    assert!(records.modis_cloud_flag.is_none());
    assert!(records.cloudsat_avhrr_ctth_asl.is_none());
}

#[test]
fn test_unresolved_displacement_gives_sentinel_flags() {
    let mut input = fixture_input();
    input.cloudsat = Some(cloudsat(-30.0, 10.0, 0.05, 40));

    let processor = MatchupProcessor::with_klm(config(ProcessMode::Basic)).unwrap();
    let records = processor.process(input).unwrap();

    assert_eq!(records.displacement, Some(TrackDisplacement::Unresolved));
    assert!(records
        .modis_cloud_flag
        .unwrap()
        .iter()
        .all(|&f| f == SENTINEL_INT));
}

#[test]
fn test_emissfilt_mode_masks_thin_high_clouds() {
    let mut config = config(ProcessMode::EmissFilt);
    config.emissivity_filter.limit = 0.99;
    let processor = MatchupProcessor::with_klm(config).unwrap();
    let records = processor.process(fixture_input()).unwrap();

    let mask = records.emissfilt_ok.unwrap();
    assert_eq!(mask.len(), COARSE_FOOTPRINTS);
    // Footprint 0 has no layers and is always kept; the others are high
    assert_eq!(mask, vec![true, false, false, false, false, false, false]);
}

#[test]
fn test_shape_mismatch_is_reported_before_processing() {
    let mut input = fixture_input();
    input.avhrr.bt11micron.pop();
    let processor = MatchupProcessor::with_klm(config(ProcessMode::Basic)).unwrap();
    assert!(matches!(
        processor.process(input),
        Err(MatchupError::ShapeMismatch { .. })
    ));
}

#[test]
fn test_fine_track_requires_five_km() {
    let mut config = config(ProcessMode::Basic);
    config.resolution_km = 1;
    let processor = MatchupProcessor::with_klm(config).unwrap();
    assert!(matches!(
        processor.process(fixture_input()),
        Err(MatchupError::InvalidInput(_))
    ));
}

#[test]
fn test_fine_track_must_cover_coarse_track() {
    let mut input = fixture_input();
    let fine = test_utils::empty_profiles(30, fixtures::CAPACITY);
    input.calipso_fine = Some(ProfileArrays::from(&fine));

    let processor = MatchupProcessor::with_klm(config(ProcessMode::Basic)).unwrap();
    assert!(matches!(
        processor.process(input),
        Err(MatchupError::ShapeMismatch {
            expected: 35,
            actual: 30,
            ..
        })
    ));
}

#[test]
fn test_records_serialize_to_json() {
    let processor = MatchupProcessor::with_klm(config(ProcessMode::Basic)).unwrap();
    let records = processor.process(fixture_input()).unwrap();
    let json = serde_json::to_value(&records).unwrap();
    assert_eq!(json["platform"], "noaa18");
    assert_eq!(json["process_mode"], "BASIC");
    assert_eq!(json["displacement"]["kind"], "aligned");
}
