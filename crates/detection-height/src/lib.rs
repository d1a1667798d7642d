//! Detection heights for CALIOP layer profiles.
//!
//! Reduces ragged per-footprint layer stacks to the height at which the
//! lidar column becomes optically thick enough for a passive imager to see
//! it, and carries those heights between tracks of different resolution.
//!
//! # Architecture
//!
//! ```text
//! LayerProfiles (5 km)
//!      │
//!      ▼
//! optical_depth_height_filter()   ── batch-wide fallback pre-pass
//!      │                             then one independent pass per footprint
//!      ▼
//! DetectionBatch.detection_height
//!      │
//!      ├─► broadcast_to_fine()            (5 km → 1 km, block mapping)
//!      │        │
//!      │        ▼
//!      │   refine_with_fine_layers()      (1 km layers bound the height)
//!      │
//!      └─► resample_detection_height()    (nearest mapping, with the
//!                                           offset from detect_displacement)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use detection_height::{optical_depth_height_filter, HeightMethod};
//!
//! let batch = optical_depth_height_filter(
//!     &profiles_5km,
//!     0.5,
//!     HeightMethod::Penetration { limit_ctop: 1.0 },
//! );
//! for height in &batch.detection_height {
//!     // ...
//! }
//! ```

pub mod displacement;
pub mod filter;
pub mod resample;

pub use displacement::{detect_displacement, DisplacementTolerance, GeoPoint, TrackDisplacement};
pub use filter::{
    filter_footprint, filter_with_fallback, km_to_height, optical_depth_height_filter,
    penetration_fraction, DetectionBatch, FallbackAltitudes, FootprintHeights, HeightMethod,
    LayerOutput, DEFAULT_LIMIT_CTOP,
};
pub use resample::{
    broadcast_to_fine, refine_with_fine_layers, resample_detection_height, resample_track,
    IndexMapping,
};
