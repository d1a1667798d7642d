//! Common types shared across the A-Train matchup derivation crates.
//!
//! CALIOP and CloudSat profiles are matched against AVHRR pixels upstream;
//! what reaches this workspace are per-footprint layer arrays plus the
//! imager quantities at the matched pixels. This crate holds the layer
//! profile model, the sentinel convention, and the identities used to pick
//! algorithm variants.

pub mod error;
pub mod platform;
pub mod profile;
pub mod resolution;

pub use error::{MatchupError, MatchupResult};
pub use platform::{Channel, CloudsatProduct, Platform};
pub use profile::{
    is_valid_altitude, is_valid_optical_depth, FootprintLayers, LayerProfiles, FLAG_FILL,
    SENTINEL, SENTINEL_INT,
};
pub use resolution::{Resolution, ResolutionPair};
