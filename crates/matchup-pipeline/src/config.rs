//! Configuration for the matchup pipeline.

use std::fmt;
use std::str::FromStr;

use atrain_common::{CloudsatProduct, MatchupError, MatchupResult, Platform, Resolution};
use detection_height::{DisplacementTolerance, HeightMethod, DEFAULT_LIMIT_CTOP};
use emissivity::EmissivityFilter;
use serde::{Deserialize, Serialize};

/// Empirical number of 1 km CALIPSO footprints per CloudSat footprint.
pub const CLOUDSAT_TRACK_RATIO: f64 = 1.076;

/// Number of 5 km CALIPSO footprints per CloudSat footprint.
pub const CLOUDSAT_5KM_TRACK_RATIO: f64 = CLOUDSAT_TRACK_RATIO / 5.0;

/// Configuration for one matchup run.
///
/// Identities are kept as plain values here and checked by
/// [`PipelineConfig::validate`], so a bad YAML file or environment variable
/// surfaces as a configuration error instead of being silently replaced.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// CALIOP resolution in km (1 or 5).
    pub resolution_km: u32,

    /// Imager platform, e.g. `noaa18`.
    pub platform: String,

    /// CloudSat product of the partner track.
    pub cloudsat_product: String,

    /// Whether emissivity filtering is applied.
    pub process_mode: ProcessMode,

    /// Optical depth a column must accumulate before a layer is detected.
    pub min_optical_depth: f64,

    /// Placement of the reported top inside the detection layer.
    pub height_method: HeightMethod,

    /// 1 km CALIPSO footprints per CloudSat footprint.
    pub track_ratio_1km: f64,

    /// 5 km CALIPSO footprints per CloudSat footprint.
    pub track_ratio_5km: f64,

    /// Thresholds for [`ProcessMode::EmissFilt`].
    pub emissivity_filter: EmissivityFilter,

    /// Tolerances for start-point displacement detection.
    pub displacement_tolerance: DisplacementTolerance,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            resolution_km: 5,
            platform: Platform::Noaa18.to_string(),
            cloudsat_product: CloudsatProduct::Geoprof.to_string(),
            process_mode: ProcessMode::Basic,
            min_optical_depth: 0.5,
            height_method: HeightMethod::default(),
            track_ratio_1km: CLOUDSAT_TRACK_RATIO,
            track_ratio_5km: CLOUDSAT_5KM_TRACK_RATIO,
            emissivity_filter: EmissivityFilter::default(),
            displacement_tolerance: DisplacementTolerance::default(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Parse a YAML document. Missing keys keep their defaults.
    pub fn from_yaml_str(yaml: &str) -> MatchupResult<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| MatchupError::invalid_config(format!("failed to parse YAML: {}", e)))
    }

    /// Override fields from `ATRAIN_*` environment variables.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Override fields from a variable lookup.
    ///
    /// Numeric values that fail to parse are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("ATRAIN_RESOLUTION") {
            if let Ok(km) = val.trim_end_matches("km").parse() {
                self.resolution_km = km;
            }
        }

        if let Some(val) = lookup("ATRAIN_PLATFORM") {
            self.platform = val;
        }

        if let Some(val) = lookup("ATRAIN_CLOUDSAT_PRODUCT") {
            self.cloudsat_product = val;
        }

        if let Some(val) = lookup("ATRAIN_PROCESS_MODE") {
            if let Ok(mode) = val.parse() {
                self.process_mode = mode;
            }
        }

        if let Some(val) = lookup("ATRAIN_MIN_OPTICAL_DEPTH") {
            if let Ok(depth) = val.parse() {
                self.min_optical_depth = depth;
            }
        }

        let use_old_method = lookup("ATRAIN_USE_OLD_METHOD")
            .map(|val| val.to_lowercase() == "true" || val == "1");
        let limit_ctop = lookup("ATRAIN_LIMIT_CTOP").and_then(|val| val.parse().ok());
        if use_old_method.is_some() || limit_ctop.is_some() {
            let current_limit = self.height_method.limit_ctop().unwrap_or(DEFAULT_LIMIT_CTOP);
            let old = use_old_method
                .unwrap_or(matches!(self.height_method, HeightMethod::Midpoint));
            self.height_method = HeightMethod::from_flag(old, limit_ctop.unwrap_or(current_limit));
        }

        if let Some(val) = lookup("ATRAIN_TRACK_RATIO_1KM") {
            if let Ok(ratio) = val.parse() {
                self.track_ratio_1km = ratio;
            }
        }

        if let Some(val) = lookup("ATRAIN_TRACK_RATIO_5KM") {
            if let Ok(ratio) = val.parse() {
                self.track_ratio_5km = ratio;
            }
        }

        if let Some(val) = lookup("ATRAIN_EMISS_LIMIT") {
            if let Ok(limit) = val.parse() {
                self.emissivity_filter.limit = limit;
            }
        }

        if let Some(val) = lookup("ATRAIN_EMISS_MIN_HEIGHT") {
            if let Ok(height) = val.parse() {
                self.emissivity_filter.min_height = height;
            }
        }
    }

    pub fn resolution(&self) -> MatchupResult<Resolution> {
        Resolution::from_km(self.resolution_km)
    }

    pub fn platform(&self) -> MatchupResult<Platform> {
        self.platform.parse()
    }

    pub fn cloudsat_product(&self) -> MatchupResult<CloudsatProduct> {
        self.cloudsat_product.parse()
    }

    /// CALIPSO footprints per CloudSat footprint at `resolution`.
    pub fn track_ratio(&self, resolution: Resolution) -> f64 {
        match resolution {
            Resolution::OneKm => self.track_ratio_1km,
            Resolution::FiveKm => self.track_ratio_5km,
        }
    }

    /// Validate the configuration.
    ///
    /// Every error returned here is fatal for the run.
    pub fn validate(&self) -> MatchupResult<()> {
        let resolution = self.resolution()?;
        self.platform()?;

        if self.cloudsat_product()? == CloudsatProduct::CwcRvod {
            return Err(MatchupError::UnimplementedCombination {
                product: CloudsatProduct::CwcRvod.to_string(),
                resolution_km: resolution.km(),
            });
        }

        if !self.min_optical_depth.is_finite() || self.min_optical_depth < 0.0 {
            return Err(MatchupError::invalid_config(
                "min_optical_depth must be a finite value >= 0",
            ));
        }

        if let HeightMethod::Penetration { limit_ctop } = self.height_method {
            if !limit_ctop.is_finite() || limit_ctop < 0.0 {
                return Err(MatchupError::invalid_config(
                    "limit_ctop must be a finite value >= 0",
                ));
            }
        }

        let ratio = self.track_ratio(resolution);
        if !ratio.is_finite() || ratio <= 0.0 {
            return Err(MatchupError::invalid_config(format!(
                "track_ratio_{}km must be > 0",
                resolution.km()
            )));
        }

        if !self.emissivity_filter.limit.is_finite()
            || !self.emissivity_filter.min_height.is_finite()
        {
            return Err(MatchupError::invalid_config(
                "emissivity filter thresholds must be finite",
            ));
        }

        let tol = &self.displacement_tolerance;
        if tol.start_lat <= 0.0 || tol.match_lat <= 0.0 || tol.match_lon <= 0.0 {
            return Err(MatchupError::invalid_config(
                "displacement tolerances must be > 0",
            ));
        }

        Ok(())
    }
}

/// Processing mode of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ProcessMode {
    /// All footprints are kept.
    #[default]
    #[serde(rename = "BASIC")]
    Basic,
    /// High, radiatively thin clouds are masked out.
    #[serde(rename = "EMISSFILT")]
    EmissFilt,
}

impl ProcessMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessMode::Basic => "BASIC",
            ProcessMode::EmissFilt => "EMISSFILT",
        }
    }
}

impl FromStr for ProcessMode {
    type Err = MatchupError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "BASIC" => Ok(ProcessMode::Basic),
            "EMISSFILT" => Ok(ProcessMode::EmissFilt),
            _ => Err(MatchupError::invalid_config(format!(
                "unknown process mode: {}",
                s
            ))),
        }
    }
}

impl fmt::Display for ProcessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
