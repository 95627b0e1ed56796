//! # Coordinate Hashing
//!
//! The leaf primitive of the pipeline: `(coordinates, salt, seed) -> u64`.
//!
//! ## Width
//!
//! Every hash in this workspace is **64 bits wide**. Callers never choose a
//! width per call site; narrower values are taken from the top bits through
//! [`crate::stream`].
//!
//! ## Construction
//!
//! 1. The salt is spread by an odd multiplier and folded into the seed, then
//!    finalized once: `key = mix64(seed ^ salt * K_SALT)`.
//! 2. Each coordinate component is absorbed with its own large odd axis
//!    multiplier followed by a full SplitMix64 finalizer round:
//!    `h = mix64((h + GAMMA) ^ c * K_AXIS[i])`.
//!
//! One full finalizer round per component gives avalanche on every input
//! independently of how close two salts are numerically.
//!
//! ## Determinism Guarantee
//!
//! Only `u64` wrapping arithmetic is used. No floating point value ever
//! enters the integer path, so results are bit-identical on every platform.

use serde::{Deserialize, Serialize};

use crate::error::{check_coords, GenResult};

/// Golden-ratio increment (SplitMix64 gamma).
pub const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

/// Salt spreading multiplier.
const SALT_MULTIPLIER: u64 = 0xD6E8_FEB8_6659_FD93;

/// Per-axis multipliers (x, y, z). Distinct so axes never alias.
const AXIS_MULTIPLIERS: [u64; 3] = [
    0xC2B2_AE3D_27D4_EB4F,
    0x1656_67B1_9E37_79F9,
    0x27D4_EB2F_1656_67C5,
];

/// World seed for deterministic generation.
///
/// Selects an independent universe: every value in a run derives from it.
/// Serialized through [`crate::wide`], so seeds at or above 2^63 still fit
/// in TOML.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorldSeed(#[serde(with = "crate::wide")] u64);

impl WorldSeed {
    /// Creates a new world seed.
    #[inline]
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// Returns the raw seed value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Derives a sub-seed for a specific purpose (e.g., the warp fields).
    ///
    /// Runs the full finalizer, so `derive(1)` and `derive(2)` are unrelated.
    #[inline]
    #[must_use]
    pub const fn derive(self, purpose: u64) -> Self {
        Self(mix64(
            self.0.wrapping_add(GOLDEN_GAMMA) ^ purpose.wrapping_mul(SALT_MULTIPLIER),
        ))
    }

    /// Offsets the seed by `delta` with wrapping addition.
    ///
    /// Used for per-octave seeds (`seed + i * 1000`).
    #[inline]
    #[must_use]
    pub const fn offset(self, delta: u64) -> Self {
        Self(self.0.wrapping_add(delta))
    }
}

impl Default for WorldSeed {
    fn default() -> Self {
        Self(0xDEAD_BEEF_CAFE_BABE)
    }
}

impl From<u64> for WorldSeed {
    fn from(seed: u64) -> Self {
        Self(seed)
    }
}

/// SplitMix64 finalizer.
///
/// Bijective on `u64`; flipping any input bit flips about half the output bits.
#[inline]
#[must_use]
pub const fn mix64(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Starting state for a given salt and seed.
#[inline]
const fn key(salt: u64, seed: WorldSeed) -> u64 {
    mix64(seed.value() ^ salt.wrapping_mul(SALT_MULTIPLIER))
}

/// Absorbs one coordinate component into the running state.
///
/// Negative components are reinterpreted as two's complement `u64`.
#[inline]
const fn absorb(state: u64, component: i64, axis: usize) -> u64 {
    mix64(
        state.wrapping_add(GOLDEN_GAMMA)
            ^ (component as u64).wrapping_mul(AXIS_MULTIPLIERS[axis % 3]),
    )
}

/// Hashes a 2D integer coordinate.
#[inline]
#[must_use]
pub const fn hash2(x: i64, y: i64, salt: u64, seed: WorldSeed) -> u64 {
    absorb(absorb(key(salt, seed), x, 0), y, 1)
}

/// Hashes a 3D integer coordinate.
#[inline]
#[must_use]
pub const fn hash3(x: i64, y: i64, z: i64, salt: u64, seed: WorldSeed) -> u64 {
    absorb(hash2(x, y, salt, seed), z, 2)
}

/// Hashes an integer coordinate of any arity.
///
/// `hash_coords(&[x, y], ..)` equals [`hash2`] and `hash_coords(&[x, y, z], ..)`
/// equals [`hash3`].
#[must_use]
pub fn hash_coords(coords: &[i64], salt: u64, seed: WorldSeed) -> u64 {
    coords
        .iter()
        .enumerate()
        .fold(key(salt, seed), |state, (axis, &c)| absorb(state, c, axis))
}

/// Hashes the lattice cell containing a float coordinate.
///
/// Each component is floored to its integer cell before hashing.
///
/// # Errors
///
/// Returns [`crate::GenError::InvalidCoordinate`] for NaN, infinite, or
/// out-of-lattice components.
pub fn hash_cell(coords: &[f64], salt: u64, seed: WorldSeed) -> GenResult<u64> {
    check_coords(coords)?;
    Ok(coords
        .iter()
        .enumerate()
        .fold(key(salt, seed), |state, (axis, &c)| {
            absorb(state, fast_floor(c), axis)
        }))
}

/// Floor to the containing lattice cell.
///
/// Faster than `f64::floor()` followed by a cast.
#[inline]
#[must_use]
pub fn fast_floor(x: f64) -> i64 {
    let xi = x as i64;
    if x < xi as f64 {
        xi.saturating_sub(1)
    } else {
        xi
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_determinism() {
        let seed = WorldSeed::new(42);
        for x in -50..50 {
            assert_eq!(hash2(x, x * 3, 9, seed), hash2(x, x * 3, 9, seed));
            assert_eq!(hash3(x, 1, -x, 9, seed), hash3(x, 1, -x, 9, seed));
        }
    }

    #[test]
    fn test_pinned_literal() {
        let seed = WorldSeed::new(42);
        assert_eq!(hash2(0, 0, 0, seed), 0x5599_B3E0_6D07_3327);
        assert_eq!(hash2(0, 0, 0, seed), 6_168_158_941_143_839_527);
    }

    #[test]
    fn test_salt_changes_output() {
        let seed = WorldSeed::new(42);
        assert_ne!(hash2(0, 0, 0, seed), hash2(0, 0, 1, seed));
    }

    #[test]
    fn test_slice_matches_fixed_arity() {
        let seed = WorldSeed::new(7);
        assert_eq!(hash_coords(&[3, -4], 11, seed), hash2(3, -4, 11, seed));
        assert_eq!(hash_coords(&[3, -4, 5], 11, seed), hash3(3, -4, 5, 11, seed));
        assert_ne!(hash_coords(&[3, -4], 11, seed), hash_coords(&[3, -4, 0], 11, seed));
    }

    #[test]
    fn test_axes_do_not_alias() {
        let seed = WorldSeed::new(1);
        assert_ne!(hash2(1, 2, 0, seed), hash2(2, 1, 0, seed));
        assert_ne!(hash2(-1, 0, 0, seed), hash2(1, 0, 0, seed));
    }

    #[test]
    fn test_zero_inputs_do_not_collapse() {
        let seed = WorldSeed::new(0);
        assert_ne!(hash2(0, 0, 0, seed), 0);
        assert_ne!(hash3(0, 0, 0, 0, seed), 0);
    }

    #[test]
    fn test_hash_cell_floors_and_validates() {
        let seed = WorldSeed::new(3);
        assert_eq!(hash_cell(&[1.7, -0.2], 5, seed), Ok(hash2(1, -1, 5, seed)));
        assert!(hash_cell(&[f64::NAN, 0.0], 5, seed).is_err());
        assert!(hash_cell(&[0.0, f64::INFINITY], 5, seed).is_err());
    }

    #[test]
    fn test_fast_floor() {
        assert_eq!(fast_floor(1.5), 1);
        assert_eq!(fast_floor(-1.5), -2);
        assert_eq!(fast_floor(-2.0), -2);
        assert_eq!(fast_floor(0.0), 0);
        assert_eq!(fast_floor(1.0e300), i64::MAX);
        assert_eq!(fast_floor(-1.0e300), i64::MIN);
    }

    #[test]
    fn test_seed_derivation() {
        let base = WorldSeed::new(42);
        let derived1 = base.derive(1);
        let derived2 = base.derive(2);

        assert_ne!(derived1, derived2, "Different purposes should give different seeds");
        assert_eq!(derived1, base.derive(1), "Same purpose should give same seed");
        assert_ne!(derived1, base, "Derived seed should differ from base");
        assert_eq!(base.offset(1000).value(), 1042);
        assert_eq!(WorldSeed::new(u64::MAX).offset(1).value(), 0);
    }
}
