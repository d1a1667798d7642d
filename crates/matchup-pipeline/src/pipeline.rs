//! Per-orbit derivation of matchup records.

use atrain_common::{
    MatchupError, MatchupResult, Platform, Resolution, ResolutionPair, SENTINEL, SENTINEL_INT,
};
use detection_height::{
    broadcast_to_fine, detect_displacement, optical_depth_height_filter, refine_with_fine_layers,
    resample_track, DetectionBatch, GeoPoint, IndexMapping, TrackDisplacement,
};
use emissivity::{
    vertical_feature_classes, EmissivityExtractor, KlmPlanck, RadianceConverter, TopLayerSummary,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::config::{PipelineConfig, ProcessMode};
use crate::ctth::ctth_above_sea_level;
use crate::input::MatchupInput;

/// Derived per-footprint quantities of one matchup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerivedRecords {
    pub resolution_km: u32,
    pub platform: Platform,
    pub process_mode: ProcessMode,
    pub footprints: usize,
    /// Optical-depth filtered layers and detection heights.
    pub detection: DetectionBatch,
    /// 5 km detection heights carried onto the 1 km track.
    pub fine_detection_height: Option<Vec<f64>>,
    pub top_layer: TopLayerSummary,
    /// Top-layer cloud emissivity, or -9.
    pub emissivity: Vec<f64>,
    /// Vertical feature class of the top layer, or -9.
    pub vertical_feature_class: Vec<i32>,
    pub displacement: Option<TrackDisplacement>,
    /// CloudSat MODIS cloud flag on the CALIOP track.
    pub modis_cloud_flag: Option<Vec<i32>>,
    /// Emissivity filter keep mask (EMISSFILT only).
    pub emissfilt_ok: Option<Vec<bool>>,
    /// AVHRR cloud top height above sea level (m).
    pub avhrr_ctth_asl: Vec<f64>,
    /// AVHRR cloud top height above sea level on the CloudSat track (m).
    pub cloudsat_avhrr_ctth_asl: Option<Vec<f64>>,
}

/// Runs the derivation for one configuration.
pub struct MatchupProcessor<C: RadianceConverter = KlmPlanck> {
    config: PipelineConfig,
    resolution: Resolution,
    platform: Platform,
    converter: C,
}

impl MatchupProcessor<KlmPlanck> {
    /// Processor with the KLM radiance conversion.
    pub fn with_klm(config: PipelineConfig) -> MatchupResult<Self> {
        Self::new(config, KlmPlanck::new())
    }
}

impl<C: RadianceConverter> MatchupProcessor<C> {
    /// Validate `config` and build a processor.
    pub fn new(config: PipelineConfig, converter: C) -> MatchupResult<Self> {
        config.validate()?;
        let resolution = config.resolution()?;
        let platform = config.platform()?;

        debug!(
            resolution = %resolution,
            platform = %platform,
            process_mode = %config.process_mode,
            height_method = ?config.height_method,
            "Matchup processor configured"
        );

        Ok(Self {
            config,
            resolution,
            platform,
            converter,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Derive records for one matchup.
    ///
    /// Input shapes are checked before anything is computed. Footprints that
    /// cannot be resolved carry sentinels rather than failing the batch.
    #[instrument(skip(self, input), fields(footprints = input.footprints(), platform = %self.platform))]
    pub fn process(&self, input: MatchupInput) -> MatchupResult<DerivedRecords> {
        input.validate()?;
        let footprints = input.footprints();
        if footprints == 0 {
            return Err(MatchupError::InvalidInput(
                "CALIOP track has no footprints".to_string(),
            ));
        }
        if input.cloudsat.as_ref().is_some_and(|track| track.is_empty()) {
            return Err(MatchupError::InvalidInput(
                "CloudSat track has no footprints".to_string(),
            ));
        }

        let MatchupInput {
            calipso,
            avhrr,
            cloudsat,
            calipso_fine,
        } = input;

        let profiles = calipso.layers.into_profiles()?;
        let fine_profiles = match calipso_fine {
            Some(_) if self.resolution != Resolution::FiveKm => {
                return Err(MatchupError::InvalidInput(format!(
                    "fine-track layers need 5 km profiles, got {}",
                    self.resolution
                )));
            }
            Some(arrays) => Some(arrays.into_profiles()?),
            None => None,
        };

        let detection = optical_depth_height_filter(
            &profiles,
            self.config.min_optical_depth,
            self.config.height_method,
        );

        let pair = ResolutionPair::five_to_one();
        let fine_detection_height = match &fine_profiles {
            Some(fine) => {
                let expected = pair.fine_len(footprints);
                if fine.len() != expected {
                    return Err(MatchupError::shape_mismatch(
                        "calipso_fine",
                        expected,
                        fine.len(),
                    ));
                }
                let mut heights = broadcast_to_fine(&detection.detection_height, pair, fine.len());
                refine_with_fine_layers(&mut heights, fine)?;
                Some(heights)
            }
            None => None,
        };

        let top_layer = TopLayerSummary::from_profiles(&profiles, &calipso.mid_temperature)?;
        let emissivity = EmissivityExtractor::new(&self.converter, self.platform).from_summary(
            &avhrr.bt11micron,
            &avhrr.surftemp,
            &top_layer,
        )?;
        let vertical_feature_class = vertical_feature_classes(&profiles.first_layer_flags());

        let track_ratio = self.config.track_ratio(self.resolution);
        let (displacement, modis_cloud_flag, cloudsat_avhrr_ctth_asl) = match &cloudsat {
            Some(track) => {
                let start = GeoPoint::new(calipso.latitude[0], calipso.longitude[0]);
                let displacement = detect_displacement(
                    start,
                    &track.latitude,
                    &track.longitude,
                    track_ratio,
                    &self.config.displacement_tolerance,
                );
                let flags = resample_track(
                    &track.modis_cloud_flag,
                    footprints,
                    track_ratio,
                    IndexMapping::Nearest,
                    displacement,
                    SENTINEL_INT,
                );
                let ctth_asl = ctth_above_sea_level(&track.ctth_height, &track.elevation)?;
                (Some(displacement), Some(flags), Some(ctth_asl))
            }
            None => (None, None, None),
        };

        let emissfilt_ok = match self.config.process_mode {
            ProcessMode::EmissFilt => Some(
                self.config
                    .emissivity_filter
                    .mask(&emissivity, &top_layer.max_height)?,
            ),
            ProcessMode::Basic => None,
        };

        let avhrr_ctth_asl = ctth_above_sea_level(&avhrr.ctth_height, &calipso.elevation)?;

        info!(
            detected = detection.detected_count(),
            with_layers = top_layer.data_ok_count(),
            valid_emissivity = emissivity.iter().filter(|&&e| e != SENTINEL).count(),
            kept = emissfilt_ok
                .as_ref()
                .map(|mask| mask.iter().filter(|&&k| k).count())
                .unwrap_or(footprints),
            displaced = displacement.map(|d| d.is_displaced()).unwrap_or(false),
            "Matchup derived"
        );

        Ok(DerivedRecords {
            resolution_km: self.resolution.km(),
            platform: self.platform,
            process_mode: self.config.process_mode,
            footprints,
            detection,
            fine_detection_height,
            top_layer,
            emissivity,
            vertical_feature_class,
            displacement,
            modis_cloud_flag,
            emissfilt_ok,
            avhrr_ctth_asl,
            cloudsat_avhrr_ctth_asl,
        })
    }
}
