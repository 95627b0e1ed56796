//! # Terrain Blending
//!
//! Combines several fractal layers into a single elevation field:
//!
//! - Continents: low-frequency fBm deciding land and water
//! - Mountains: ridged fBm, faded in only where the continent layer is high
//! - Detail: high-frequency fBm adding small bumps everywhere
//!
//! The blend is then reshaped by a piecewise terrain curve that flattens
//! plains and keeps mountains steep.

use crate::error::GenResult;
use crate::fractal::{Fbm, OctaveSpec};
use crate::hash::WorldSeed;
use crate::noise::NoiseKind;

/// Seed purposes for each layer.
const CONTINENT: u64 = 3;
const DETAIL: u64 = 4;
const MOUNTAIN: u64 = 5;

/// Layered elevation model over world coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainBlender {
    continent: Fbm,
    mountains: Fbm,
    detail: Fbm,
}

impl TerrainBlender {
    /// Scale for continent noise (larger = smaller landmasses).
    const CONTINENT_SCALE: f64 = 0.0025;
    /// Mountains vary faster than continents.
    const MOUNTAIN_SCALE: f64 = Self::CONTINENT_SCALE * 1.5;
    /// Scale for detail noise.
    const DETAIL_SCALE: f64 = 0.02;

    /// Share of the continent layer in the blend.
    const CONTINENT_WEIGHT: f64 = 0.8;
    /// Share of the ridged layer where fully unmasked.
    const MOUNTAIN_WEIGHT: f64 = 0.2;
    /// Share of the detail layer.
    const DETAIL_WEIGHT: f64 = 0.05;

    /// Creates a blender with the default layer shapes.
    ///
    /// # Errors
    ///
    /// Never fails for the built-in shapes; the signature matches the other
    /// field constructors.
    pub fn new(seed: WorldSeed) -> GenResult<Self> {
        let blender = Self {
            continent: Fbm::new(
                NoiseKind::Simplex,
                OctaveSpec::new(4, 0.5, 2.0)?,
                seed.derive(CONTINENT),
            )?,
            mountains: Fbm::ridged(
                NoiseKind::Simplex,
                OctaveSpec::new(3, 0.5, 2.0)?,
                seed.derive(MOUNTAIN),
            )?,
            detail: Fbm::new(
                NoiseKind::Simplex,
                OctaveSpec::new(3, 0.5, 2.0)?,
                seed.derive(DETAIL),
            )?,
        };
        tracing::debug!(seed = seed.value(), "built terrain blender");
        Ok(blender)
    }

    /// How much of the mountain layer shows at a continent height.
    ///
    /// 0 at or below the coast, 1 from `0.5` upwards, smooth in between.
    #[inline]
    #[must_use]
    pub fn mountain_mask(continent: f64) -> f64 {
        let t = (continent / 0.5).clamp(0.0, 1.0);
        t * t * (3.0 - 2.0 * t)
    }

    /// Elevation in `[-1, 1]` at world coordinates.
    ///
    /// - < -0.5: deep water
    /// - < -0.2: water
    /// - < 0.1: lowland
    /// - < 0.4: hills
    /// - >= 0.4: mountains
    #[must_use]
    pub fn elevation(&self, x: f64, z: f64) -> f64 {
        let base = self
            .continent
            .sample2(x * Self::CONTINENT_SCALE, z * Self::CONTINENT_SCALE);
        let ridged = self
            .mountains
            .sample2(x * Self::MOUNTAIN_SCALE, z * Self::MOUNTAIN_SCALE);
        let detail = self
            .detail
            .sample2(x * Self::DETAIL_SCALE, z * Self::DETAIL_SCALE);

        let raw = base * Self::CONTINENT_WEIGHT
            + ridged * Self::MOUNTAIN_WEIGHT * Self::mountain_mask(base)
            + detail * Self::DETAIL_WEIGHT;
        terrain_curve(raw.clamp(-1.0, 1.0))
    }

    /// Column height for a world with `sea_level` and `max_height`.
    ///
    /// Negative elevation maps to `[0, sea_level)`, non-negative elevation
    /// to `[sea_level, max_height]`.
    #[must_use]
    pub fn height(&self, x: f64, z: f64, sea_level: i32, max_height: i32) -> i32 {
        let e = self.elevation(x, z);
        let sea = f64::from(sea_level.max(0));
        let top = f64::from(max_height.max(sea_level.max(0)));
        let h = if e < 0.0 {
            sea + e * sea
        } else {
            sea + e * (top - sea)
        };
        h.round().clamp(0.0, top) as i32
    }
}

/// Reshapes a raw elevation in `[-1, 1]`.
///
/// Continuous and non-decreasing, fixing `-1` and `1`:
///
/// - `[-1, -0.3)`: deep water, unchanged
/// - `[-0.3, -0.1)`: shore, halved slope
/// - `[-0.1, 0.3)`: plains, squeezed into `[-0.2, 0.1)`
/// - `[0.3, 0.5)`: hills, mapped to `[0.1, 0.4)`
/// - `[0.5, 1]`: mountains, stretched to `[0.4, 1]`
#[inline]
#[must_use]
pub fn terrain_curve(elevation: f64) -> f64 {
    if elevation < -0.3 {
        elevation
    } else if elevation < -0.1 {
        -0.3 + (elevation + 0.3) * 0.5
    } else if elevation < 0.3 {
        let t = (elevation + 0.1) / 0.4;
        -0.2 + t * 0.3
    } else if elevation < 0.5 {
        let t = (elevation - 0.3) / 0.2;
        0.1 + t * 0.3
    } else {
        let t = (elevation - 0.5) / 0.5;
        0.4 + t * 0.6
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blender() -> TerrainBlender {
        TerrainBlender::new(WorldSeed::new(42)).expect("built-in shapes are valid")
    }

    #[test]
    fn test_terrain_determinism() {
        let a = blender();
        let b = blender();
        for i in 0..100i32 {
            let x = f64::from(i) * 100.0;
            let z = f64::from(i) * 73.0;
            assert_eq!(a.elevation(x, z).to_bits(), b.elevation(x, z).to_bits());
        }
    }

    #[test]
    fn test_elevation_range() {
        let t = blender();
        for i in 0..1000i32 {
            let x = (f64::from(i) - 500.0) * 10.0;
            let z = (f64::from(i) * 0.7 - 350.0) * 10.0;
            let e = t.elevation(x, z);
            assert!((-1.0..=1.0).contains(&e), "elevation {e} out of range");
        }
    }

    #[test]
    fn test_curve_is_continuous_and_monotonic() {
        assert_eq!(terrain_curve(-1.0), -1.0);
        assert!((terrain_curve(1.0) - 1.0).abs() < 1e-12);
        for edge in [-0.3, -0.1, 0.3, 0.5] {
            let below = terrain_curve(edge - 1e-9);
            let above = terrain_curve(edge);
            assert!((above - below).abs() < 1e-8, "jump at {edge}");
        }
        let mut prev = terrain_curve(-1.0);
        for i in 1..=2000i32 {
            let v = terrain_curve(-1.0 + f64::from(i) * 0.001);
            assert!(v >= prev - 1e-12);
            prev = v;
        }
    }

    #[test]
    fn test_mountain_mask() {
        assert_eq!(TerrainBlender::mountain_mask(-0.4), 0.0);
        assert_eq!(TerrainBlender::mountain_mask(0.0), 0.0);
        assert_eq!(TerrainBlender::mountain_mask(0.8), 1.0);
        let mid = TerrainBlender::mountain_mask(0.25);
        assert!((mid - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_terrain_height() {
        let t = blender();
        let sea_level = 64;
        let max_height = 256;
        let mut above = 0;
        for i in 0..400i32 {
            let x = f64::from(i) * 37.0;
            let z = f64::from(i) * -29.0;
            let h = t.height(x, z, sea_level, max_height);
            assert!((0..=max_height).contains(&h), "height {h} out of range");
            if h >= sea_level {
                above += 1;
            }
        }
        assert!(above > 0 && above < 400, "no land/water mix: {above} of 400 above sea");
    }
}
