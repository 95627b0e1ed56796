//! # Domain Warping
//!
//! Feeds fBm output back into the coordinates of another fBm evaluation:
//!
//! ```text
//! q      = (fbm_x(p + A), fbm_y(p + B))
//! warp(p) = fbm(p + strength * q)
//! ```
//!
//! The displacement fields use seeds derived from the base seed and fixed,
//! distinct offsets so `qx` and `qy` are decorrelated. The base field uses
//! the base seed itself, and `strength == 0` returns the base field without
//! touching the coordinates, so a zero-strength warp is exactly plain fBm.

use serde::{Deserialize, Serialize};

use crate::error::{check_reach, GenError, GenResult};
use crate::fractal::{Fbm, OctaveSpec};
use crate::hash::WorldSeed;
use crate::noise::NoiseKind;

/// Seed purposes for the displacement fields.
const WARP_X: u64 = 0x57A2_9F01;
const WARP_Y: u64 = 0x57A2_9F03;
const WARP_Z: u64 = 0x57A2_9F05;

/// Offsets decorrelating the first-order displacement components.
const OFFSET_A: [f64; 3] = [0.0, 0.0, 0.0];
const OFFSET_B: [f64; 3] = [5.2, 1.3, 7.1];
const OFFSET_C: [f64; 3] = [9.7, 2.8, 4.4];

/// Offsets for the second-order displacement.
const OFFSET_D: [f64; 3] = [1.7, 9.2, 3.5];
const OFFSET_E: [f64; 3] = [8.3, 2.8, 6.1];
const OFFSET_F: [f64; 3] = [4.9, 6.6, 0.3];

/// Upper bound on the absolute value of any offset above.
const OFFSET_REACH: f64 = 10.0;

/// Warp strength above which a configuration is considered suspicious.
const STRONG_WARP: f64 = 100.0;

/// How far and how often coordinates are displaced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WarpSpec {
    /// Displacement multiplier, finite and `>= 0`.
    pub strength: f64,
    /// Warp the already-warped point once more.
    #[serde(default)]
    pub second_order: bool,
}

impl WarpSpec {
    /// Creates a validated warp spec.
    ///
    /// # Errors
    ///
    /// See [`WarpSpec::validate`].
    pub fn new(strength: f64, second_order: bool) -> GenResult<Self> {
        let spec = Self {
            strength,
            second_order,
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Checks the strength.
    ///
    /// # Errors
    ///
    /// Returns [`GenError::InvalidParameter`] for negative or non-finite
    /// strength.
    pub fn validate(&self) -> GenResult<()> {
        if !(self.strength >= 0.0 && self.strength.is_finite()) {
            return Err(GenError::invalid(
                "warp_strength",
                format!("{} must be finite and non-negative", self.strength),
            ));
        }
        if self.strength > STRONG_WARP {
            tracing::warn!(strength = self.strength, "warp strength is unusually high");
        }
        Ok(())
    }
}

/// A domain-warped fBm field.
#[derive(Clone, Debug, PartialEq)]
pub struct DomainWarp {
    base: Fbm,
    warp_x: Fbm,
    warp_y: Fbm,
    warp_z: Fbm,
    spec: WarpSpec,
}

impl DomainWarp {
    /// Builds a warp over `octaves`, with displacement fields of shape
    /// `warp_octaves`.
    ///
    /// # Errors
    ///
    /// Returns [`GenError::InvalidParameter`] for an invalid octave or warp
    /// spec.
    pub fn new(
        kind: NoiseKind,
        octaves: OctaveSpec,
        warp_octaves: OctaveSpec,
        spec: WarpSpec,
        seed: WorldSeed,
    ) -> GenResult<Self> {
        spec.validate()?;
        let warp = Self {
            base: Fbm::new(kind, octaves, seed)?,
            warp_x: Fbm::new(kind, warp_octaves, seed.derive(WARP_X))?,
            warp_y: Fbm::new(kind, warp_octaves, seed.derive(WARP_Y))?,
            warp_z: Fbm::new(kind, warp_octaves, seed.derive(WARP_Z))?,
            spec,
        };
        tracing::debug!(
            strength = spec.strength,
            second_order = spec.second_order,
            seed = seed.value(),
            "built domain warp"
        );
        Ok(warp)
    }

    /// Builds a warp whose displacement fields share the base octave shape.
    ///
    /// # Errors
    ///
    /// Same as [`DomainWarp::new`].
    pub fn uniform(
        kind: NoiseKind,
        octaves: OctaveSpec,
        spec: WarpSpec,
        seed: WorldSeed,
    ) -> GenResult<Self> {
        Self::new(kind, octaves, octaves, spec, seed)
    }

    /// The warp spec.
    #[must_use]
    pub const fn spec(&self) -> WarpSpec {
        self.spec
    }

    /// The unwarped base field.
    #[must_use]
    pub const fn base(&self) -> &Fbm {
        &self.base
    }

    /// Checks that every field this warp evaluates around `point` stays on
    /// the lattice, displacement and offsets included.
    ///
    /// # Errors
    ///
    /// Returns [`GenError::InvalidCoordinate`] for a non-finite coordinate or
    /// one whose furthest sample reaches [`crate::error::MAX_LATTICE`].
    pub fn check_point(&self, point: &[f64]) -> GenResult<()> {
        let s = self.spec.strength;
        if s == 0.0 {
            return self.base.check_point(point);
        }
        let frequency = self
            .base
            .max_frequency()
            .max(self.warp_x.max_frequency());
        check_reach(point, s + OFFSET_REACH, frequency)
    }

    #[inline]
    fn field2(&self, x: f64, y: f64, a: [f64; 3], b: [f64; 3]) -> (f64, f64) {
        (
            self.warp_x.sample2(x + a[0], y + a[1]),
            self.warp_y.sample2(x + b[0], y + b[1]),
        )
    }

    #[inline]
    fn field3(&self, p: [f64; 3], a: [f64; 3], b: [f64; 3], c: [f64; 3]) -> [f64; 3] {
        [
            self.warp_x.sample3(p[0] + a[0], p[1] + a[1], p[2] + a[2]),
            self.warp_y.sample3(p[0] + b[0], p[1] + b[1], p[2] + b[2]),
            self.warp_z.sample3(p[0] + c[0], p[1] + c[1], p[2] + c[2]),
        ]
    }

    /// Coordinate displacement applied at `(x, y)`.
    ///
    /// Scales linearly with strength for first-order warps.
    #[must_use]
    pub fn displacement2(&self, x: f64, y: f64) -> (f64, f64) {
        let s = self.spec.strength;
        if s == 0.0 {
            return (0.0, 0.0);
        }
        let (qx, qy) = self.field2(x, y, OFFSET_A, OFFSET_B);
        if !self.spec.second_order {
            return (s * qx, s * qy);
        }
        let (rx, ry) = self.field2(x + s * qx, y + s * qy, OFFSET_D, OFFSET_E);
        (s * rx, s * ry)
    }

    /// Samples the warped field in 2D.
    #[must_use]
    pub fn sample2(&self, x: f64, y: f64) -> f64 {
        if self.spec.strength == 0.0 {
            return self.base.sample2(x, y);
        }
        let (dx, dy) = self.displacement2(x, y);
        self.base.sample2(x + dx, y + dy)
    }

    /// Samples the warped field in 3D.
    #[must_use]
    pub fn sample3(&self, x: f64, y: f64, z: f64) -> f64 {
        let s = self.spec.strength;
        if s == 0.0 {
            return self.base.sample3(x, y, z);
        }
        let q = self.field3([x, y, z], OFFSET_A, OFFSET_B, OFFSET_C);
        let mut p = [x + s * q[0], y + s * q[1], z + s * q[2]];
        if self.spec.second_order {
            let r = self.field3(p, OFFSET_D, OFFSET_E, OFFSET_F);
            p = [x + s * r[0], y + s * r[1], z + s * r[2]];
        }
        self.base.sample3(p[0], p[1], p[2])
    }
}

/// Simplex domain warp at a 2D point, validating every input.
///
/// Builds the warp on every call; hold a [`DomainWarp`] for loops.
///
/// # Errors
///
/// Returns [`GenError::InvalidCoordinate`] for coordinates that are not
/// finite or whose warped samples leave the lattice, and
/// [`GenError::InvalidParameter`] for a negative strength or invalid spec.
pub fn warp2(
    point: [f64; 2],
    strength: f64,
    octaves: &OctaveSpec,
    seed: WorldSeed,
) -> GenResult<f64> {
    let spec = WarpSpec::new(strength, false)?;
    let warp = DomainWarp::uniform(NoiseKind::Simplex, *octaves, spec, seed)?;
    warp.check_point(&point)?;
    Ok(warp.sample2(point[0], point[1]))
}
