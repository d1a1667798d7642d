//! End-to-end derivation for one CALIOP/CloudSat/AVHRR matchup.
//!
//! Takes the matched track arrays of one orbit crossing and produces the
//! per-footprint records the validation statistics are computed from:
//!
//! 1. optical-depth filtered detection heights (optionally refined on 1 km)
//! 2. top-layer summary and cloud emissivity
//! 3. vertical feature class of the top layer
//! 4. CloudSat MODIS cloud flag moved onto the CALIOP track
//! 5. emissivity filter mask (EMISSFILT mode)
//! 6. AVHRR cloud top heights above sea level on the CALIOP and CloudSat tracks
//!
//! Configuration problems are reported by [`MatchupProcessor::new`] before
//! any data is touched.

pub mod config;
pub mod ctth;
pub mod input;
pub mod pipeline;

pub use config::{PipelineConfig, ProcessMode, CLOUDSAT_5KM_TRACK_RATIO, CLOUDSAT_TRACK_RATIO};
pub use ctth::{ctth_above_sea_level, height_above_sea_level};
pub use input::{AvhrrMatch, CalipsoTrack, CloudsatTrack, MatchupInput, ProfileArrays};
pub use pipeline::{DerivedRecords, MatchupProcessor};
