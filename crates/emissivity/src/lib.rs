//! Imager-side quantities for the CALIOP matchups.
//!
//! Converts AVHRR 11 micron brightness temperatures to radiances, derives
//! the emissivity of the topmost CALIOP layer and decodes the vertical
//! feature class of that layer. The radiance conversion sits behind
//! [`RadianceConverter`] so calibrations can be swapped per platform.
//!
//! # Example
//!
//! ```ignore
//! use emissivity::{EmissivityExtractor, KlmPlanck, TopLayerSummary};
//!
//! let summary = TopLayerSummary::from_profiles(&profiles, &mid_temperature_celsius)?;
//! let converter = KlmPlanck::new();
//! let extractor = EmissivityExtractor::new(&converter, Platform::Noaa18);
//! let ec = extractor.from_summary(&bt11, &surftemp, &summary)?;
//! ```

pub mod extractor;
pub mod filter;
pub mod radiance;
pub mod summary;

pub use extractor::{
    build_records, vertical_feature_class, vertical_feature_classes, EmissivityExtractor,
    EmissivityRecord, EMISSIVITY_CHANNEL, REFERENCE_TEMPERATURE,
};
pub use filter::EmissivityFilter;
pub use radiance::{planck, BandCoefficients, CentralWavenumbers, KlmPlanck, RadianceConverter};
pub use summary::{celsius_to_kelvin, TopLayerSummary, KELVIN_OFFSET};
