//! Synthetic layer-profile generators.
//!
//! All generators respect the ragged-termination invariant: once a layer is
//! invalid, every layer below it is invalid too.

use atrain_common::{LayerProfiles, SENTINEL, SENTINEL_INT};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Creates profiles with randomly sized layer stacks.
///
/// Each footprint gets between 0 and `capacity` layers, stacked top to bottom
/// below 18 km with random thickness and optical depth in `[0, 3)`. The same
/// `seed` always yields the same profiles.
pub fn random_profiles(footprints: usize, capacity: usize, seed: u64) -> LayerProfiles {
    let mut rng = StdRng::seed_from_u64(seed);

    let mut top = vec![SENTINEL; footprints * capacity];
    let mut base = vec![SENTINEL; footprints * capacity];
    let mut optical_depth = vec![SENTINEL; footprints * capacity];
    let mut flags = vec![SENTINEL_INT; footprints * capacity];
    let mut cloud_fraction = vec![0.0; footprints];

    for fp in 0..footprints {
        let layers = rng.gen_range(0..=capacity);
        let mut altitude = 18.0;
        for layer in 0..layers {
            let gap = rng.gen_range(0.1..2.0);
            let thickness = rng.gen_range(0.1..2.5);
            let layer_top: f64 = altitude - gap;
            let layer_base = (layer_top - thickness).max(0.0);
            if layer_top <= 0.0 {
                break;
            }
            let idx = fp * capacity + layer;
            top[idx] = layer_top;
            base[idx] = layer_base;
            optical_depth[idx] = rng.gen_range(0.0..3.0);
            flags[idx] = rng.gen_range(0..0xFFFF);
            altitude = layer_base;
        }
        if layers > 0 {
            cloud_fraction[fp] = rng.gen_range(0.0..=1.0);
        }
    }

    LayerProfiles::new(capacity, top, base, optical_depth, flags, cloud_fraction)
        .expect("generated shapes are consistent")
}

/// Creates profiles where every footprint has a single layer.
///
/// Footprint `i` spans `[base_km, base_km + 1]` shifted up by `i * 0.1` km
/// and carries the given optical depth.
pub fn single_layer_profiles(
    footprints: usize,
    capacity: usize,
    base_km: f64,
    optical_depth: f64,
) -> LayerProfiles {
    let mut top = vec![SENTINEL; footprints * capacity];
    let mut base = vec![SENTINEL; footprints * capacity];
    let mut od = vec![SENTINEL; footprints * capacity];
    let mut flags = vec![SENTINEL_INT; footprints * capacity];

    for fp in 0..footprints {
        let idx = fp * capacity;
        let shift = fp as f64 * 0.1;
        base[idx] = base_km + shift;
        top[idx] = base_km + shift + 1.0;
        od[idx] = optical_depth;
        flags[idx] = 0;
    }

    LayerProfiles::new(capacity, top, base, od, flags, vec![1.0; footprints])
        .expect("generated shapes are consistent")
}

/// Creates profiles with no layers at all.
pub fn empty_profiles(footprints: usize, capacity: usize) -> LayerProfiles {
    let n = footprints * capacity;
    LayerProfiles::new(
        capacity,
        vec![SENTINEL; n],
        vec![SENTINEL; n],
        vec![SENTINEL; n],
        vec![SENTINEL_INT; n],
        vec![0.0; footprints],
    )
    .expect("generated shapes are consistent")
}

/// Creates a straight ground track heading north-east.
///
/// Returns `(latitudes, longitudes)` starting at `(lat0, lon0)` with the
/// given step in degrees.
pub fn straight_track(lat0: f64, lon0: f64, step: f64, len: usize) -> (Vec<f64>, Vec<f64>) {
    let lats = (0..len).map(|i| lat0 + i as f64 * step).collect();
    let lons = (0..len).map(|i| lon0 + i as f64 * step * 0.5).collect();
    (lats, lons)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_profiles_are_reproducible() {
        let a = random_profiles(50, 10, 42);
        let b = random_profiles(50, 10, 42);
        assert_eq!(a, b);
    }

    #[test]
    fn test_random_profiles_respect_ragged_termination() {
        let profiles = random_profiles(200, 10, 7);
        for fp in profiles.iter() {
            for layer in fp.valid_layers..profiles.capacity() {
                assert_eq!(fp.optical_depth[layer], SENTINEL);
            }
        }
    }

    #[test]
    fn test_single_layer_profiles() {
        let profiles = single_layer_profiles(3, 4, 2.0, 1.5);
        assert_eq!(profiles.valid_layers(), &[1, 1, 1]);
        let fp = profiles.footprint(2).unwrap();
        assert!((fp.base[0] - 2.2).abs() < 1e-12);
        assert!((fp.top[0] - 3.2).abs() < 1e-12);
    }

    #[test]
    fn test_empty_profiles() {
        let profiles = empty_profiles(4, 10);
        assert!(profiles.valid_layers().iter().all(|&n| n == 0));
    }

    #[test]
    fn test_straight_track() {
        let (lats, lons) = straight_track(10.0, 20.0, 0.01, 3);
        assert_eq!(lats.len(), 3);
        assert!((lats[2] - 10.02).abs() < 1e-12);
        assert!((lons[2] - 20.01).abs() < 1e-12);
    }
}
