//! Reference fixture shared by the derivation tests.
//!
//! Seven 5 km CALIOP footprints with up to three cloud layers each, and the
//! 1 km track obtained by repeating every 5 km footprint five times (with a
//! few 1 km top-layer bases moved so that the fine-track refinement kicks in).

use atrain_common::{LayerProfiles, SENTINEL, SENTINEL_INT};

/// Layer capacity of the CALIOP layer products.
pub const CAPACITY: usize = 10;

/// Number of 5 km footprints in the fixture.
pub const COARSE_FOOTPRINTS: usize = 7;

/// Fine footprints per coarse footprint.
pub const RATIO: usize = 5;

/// Optical depth a column must accumulate before a layer counts as detected.
pub const MIN_OPTICAL_DEPTH: f64 = 0.5;

const S: f64 = SENTINEL;
const SI: i32 = SENTINEL_INT;

/// Layer tops (km) per layer index, one entry per footprint.
pub const LAYER_TOP: [[f64; COARSE_FOOTPRINTS]; 3] = [
    [S, 9.2, 8.3, 7.6, 5.3, 2.2, 5.0],
    [S, S, S, 6.1, 4.3, 1.2, 4.9],
    [S, S, S, 5.6, 3.3, 0.6, 4.8],
];

/// Layer bases (km) per layer index.
pub const LAYER_BASE: [[f64; COARSE_FOOTPRINTS]; 3] = [
    [S, 8.2, 7.3, 6.6, 1.3, 2.0, 3.1],
    [S, S, S, 4.6, 1.2, 0.2, 2.1],
    [S, S, S, S, 1.1, 0.1, 1.1],
];

/// Layer optical depths per layer index.
pub const OPTICAL_DEPTH: [[f64; COARSE_FOOTPRINTS]; 3] = [
    [S, 8.2, 0.3, 0.1, 1.3, 10.0, 0.3],
    [S, S, S, 0.1, 1.2, 0.2, 0.3],
    [S, S, S, S, 1.1, 0.1, 0.3],
];

/// Feature classification flags per layer index.
pub const FLAGS: [[i32; COARSE_FOOTPRINTS]; 3] = [
    [SI, 8, 7, 6, 1, 2, 3],
    [SI, SI, SI, 4, 1, 2, 2],
    [SI, SI, SI, SI, 9, 1, 1],
];

/// 1 km top-layer bases (km), one per coarse footprint.
pub const FINE_FIRST_BASE: [f64; COARSE_FOOTPRINTS] = [S, 2.4, 6.7, 4.7, 1.3, 2.0, 3.1];

/// Detection heights (m) with the midpoint method.
pub const EXPECTED_MIDPOINT_HEIGHTS: [f64; COARSE_FOOTPRINTS] =
    [-9.0, 8700.0, 7300.0, 4600.0, 3300.0, 2100.0, 3500.0];

/// Detection heights (m) with the penetration method and `limit_ctop = 1.0`.
pub const EXPECTED_PENETRATION_HEIGHTS: [f64; COARSE_FOOTPRINTS] =
    [-9.0, 9078.0, 7300.0, 4600.0, 2223.0, 2180.0, 2100.0];

/// Penetration limit used for [`EXPECTED_PENETRATION_HEIGHTS`].
pub const PENETRATION_LIMIT: f64 = 1.0;

fn rows<T: Copy>(columns: &[[T; COARSE_FOOTPRINTS]; 3], fill: T) -> Vec<Vec<T>> {
    (0..COARSE_FOOTPRINTS)
        .map(|fp| {
            let mut row = vec![fill; CAPACITY];
            for (layer, column) in columns.iter().enumerate() {
                row[layer] = column[fp];
            }
            row
        })
        .collect()
}

fn repeat_rows<T: Clone>(rows: Vec<Vec<T>>, times: usize) -> Vec<Vec<T>> {
    rows.into_iter()
        .flat_map(|row| std::iter::repeat(row).take(times))
        .collect()
}

/// The 5 km reference profiles.
pub fn coarse_profiles() -> LayerProfiles {
    LayerProfiles::from_rows(
        &rows(&LAYER_TOP, S),
        &rows(&LAYER_BASE, S),
        &rows(&OPTICAL_DEPTH, S),
        &rows(&FLAGS, SI),
        vec![1.0; COARSE_FOOTPRINTS],
    )
    .expect("fixture shapes are consistent")
}

/// The 1 km reference profiles (no optical depth at this resolution).
pub fn fine_profiles() -> LayerProfiles {
    let top = repeat_rows(rows(&LAYER_TOP, S), RATIO);
    let mut base = repeat_rows(rows(&LAYER_BASE, S), RATIO);
    for (i, row) in base.iter_mut().enumerate() {
        row[0] = FINE_FIRST_BASE[i / RATIO];
    }
    let footprints = COARSE_FOOTPRINTS * RATIO;
    LayerProfiles::from_rows(
        &top,
        &base,
        &vec![vec![S; CAPACITY]; footprints],
        &vec![vec![SI; CAPACITY]; footprints],
        vec![1.0; footprints],
    )
    .expect("fixture shapes are consistent")
}

/// Expected penetration-method heights repeated onto the 1 km track.
pub fn broadcast_penetration_heights() -> Vec<f64> {
    EXPECTED_PENETRATION_HEIGHTS
        .iter()
        .flat_map(|&h| std::iter::repeat(h).take(RATIO))
        .collect()
}

/// Common imager scenes for emissivity tests (Kelvin).
pub mod scenes {
    /// Warm ocean surface under a thin cirrus.
    pub const THIN_CIRRUS: (f64, f64, f64) = (270.0, 290.0, 220.0);

    /// Opaque cloud: measured brightness temperature equals the cloud temperature.
    pub const OPAQUE: (f64, f64, f64) = (240.0, 290.0, 240.0);

    /// Cloud warmer than the surface (inversion).
    pub const INVERSION: (f64, f64, f64) = (250.0, 245.0, 255.0);

    /// Observation warmer than the surface forecast.
    pub const WARM_BIAS: (f64, f64, f64) = (295.0, 290.0, 250.0);
}
