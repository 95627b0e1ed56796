//! # Fractal Sum (fBm)
//!
//! Stacks octaves of coherent noise at growing frequency and shrinking
//! amplitude, then divides by the accumulated amplitude so the result stays
//! in the range of a single noise call.
//!
//! Each octave owns its own generator seeded with `seed + i * 1000`, so the
//! octaves are not scaled copies of one another. Octave 0 uses `seed`
//! itself, which makes a one-octave sum identical to plain noise.

use serde::{Deserialize, Serialize};

use crate::error::{check_reach, GenError, GenResult};
use crate::hash::WorldSeed;
use crate::noise::{Noise2, Noise3, NoiseKind, NoiseSource};

/// Seed distance between consecutive octaves.
pub const OCTAVE_SEED_STRIDE: u64 = 1000;

/// Octave count above which a configuration is considered suspicious.
const MANY_OCTAVES: u32 = 16;

/// Shape of a fractal sum.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OctaveSpec {
    /// Number of noise layers (at least 1, typically 4-8).
    pub count: u32,
    /// Amplitude decay per octave, in `(0, 1)` (typically 0.5).
    pub persistence: f64,
    /// Frequency growth per octave, above 1 (typically 2.0).
    pub lacunarity: f64,
}

impl OctaveSpec {
    /// Creates a validated octave spec.
    ///
    /// # Errors
    ///
    /// See [`OctaveSpec::validate`].
    pub fn new(count: u32, persistence: f64, lacunarity: f64) -> GenResult<Self> {
        let spec = Self {
            count,
            persistence,
            lacunarity,
        };
        spec.validate()?;
        Ok(spec)
    }

    /// Checks every field against its domain.
    ///
    /// # Errors
    ///
    /// Returns [`GenError::InvalidParameter`] when `count < 1`,
    /// `persistence ∉ (0, 1)` or `lacunarity <= 1` (NaN included).
    pub fn validate(&self) -> GenResult<()> {
        if self.count == 0 {
            return Err(GenError::invalid("octaves", "at least one octave is required"));
        }
        if !(self.persistence > 0.0 && self.persistence < 1.0) {
            return Err(GenError::invalid(
                "persistence",
                format!("{} is outside (0, 1)", self.persistence),
            ));
        }
        if !(self.lacunarity > 1.0 && self.lacunarity.is_finite()) {
            return Err(GenError::invalid(
                "lacunarity",
                format!("{} must be a finite value above 1", self.lacunarity),
            ));
        }
        if self.count > MANY_OCTAVES {
            tracing::warn!(octaves = self.count, "octave count is unusually high");
        }
        Ok(())
    }

    /// Sum of all octave amplitudes, the normalization divisor.
    #[must_use]
    pub fn max_amplitude(&self) -> f64 {
        let mut amplitude = 1.0;
        let mut total = 0.0;
        for _ in 0..self.count {
            total += amplitude;
            amplitude *= self.persistence;
        }
        total
    }
}

impl Default for OctaveSpec {
    fn default() -> Self {
        Self {
            count: 6,
            persistence: 0.5,
            lacunarity: 2.0,
        }
    }
}

/// How each octave's noise is shaped before it is summed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FractalMode {
    /// Plain fBm, range `[-1, 1]`.
    #[default]
    Standard,
    /// Ridged multifractal `(1 - |n|)^2` per octave, range `[0, 1]`.
    /// Creates sharp ridges, good for mountains.
    Ridged,
}

/// A fractal noise sum with one generator per octave.
///
/// # Example
///
/// ```rust
/// use seedscape_procedural::{Fbm, NoiseKind, OctaveSpec, WorldSeed};
///
/// let spec = OctaveSpec::new(6, 0.5, 2.0)?;
/// let fbm = Fbm::new(NoiseKind::Simplex, spec, WorldSeed::new(7))?;
/// let value = fbm.sample2(1.5, 2.5);
/// assert!((-1.0..=1.0).contains(&value));
/// # Ok::<(), seedscape_procedural::GenError>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Fbm {
    spec: OctaveSpec,
    mode: FractalMode,
    octaves: Vec<NoiseSource>,
    max_amplitude: f64,
    max_frequency: f64,
}

impl Fbm {
    /// Builds a standard fBm stack.
    ///
    /// # Errors
    ///
    /// Returns [`GenError::InvalidParameter`] for an invalid [`OctaveSpec`].
    pub fn new(kind: NoiseKind, spec: OctaveSpec, seed: WorldSeed) -> GenResult<Self> {
        Self::with_mode(kind, spec, FractalMode::Standard, seed)
    }

    /// Builds a ridged multifractal stack.
    ///
    /// # Errors
    ///
    /// Returns [`GenError::InvalidParameter`] for an invalid [`OctaveSpec`].
    pub fn ridged(kind: NoiseKind, spec: OctaveSpec, seed: WorldSeed) -> GenResult<Self> {
        Self::with_mode(kind, spec, FractalMode::Ridged, seed)
    }

    /// Builds a stack with an explicit mode.
    ///
    /// # Errors
    ///
    /// Returns [`GenError::InvalidParameter`] for an invalid [`OctaveSpec`].
    pub fn with_mode(
        kind: NoiseKind,
        spec: OctaveSpec,
        mode: FractalMode,
        seed: WorldSeed,
    ) -> GenResult<Self> {
        spec.validate()?;
        let octaves = (0..u64::from(spec.count))
            .map(|i| NoiseSource::new(kind, seed.offset(i.wrapping_mul(OCTAVE_SEED_STRIDE))))
            .collect();
        tracing::debug!(
            ?kind,
            ?mode,
            octaves = spec.count,
            seed = seed.value(),
            "built fractal noise stack"
        );
        Ok(Self {
            spec,
            mode,
            octaves,
            max_amplitude: spec.max_amplitude(),
            max_frequency: spec.lacunarity.powf(f64::from(spec.count - 1)),
        })
    }

    /// The octave spec this stack was built with.
    #[must_use]
    pub const fn spec(&self) -> OctaveSpec {
        self.spec
    }

    /// The per-octave shaping mode.
    #[must_use]
    pub const fn mode(&self) -> FractalMode {
        self.mode
    }

    /// Frequency multiplier of the top octave, `lacunarity^(count - 1)`.
    #[must_use]
    pub const fn max_frequency(&self) -> f64 {
        self.max_frequency
    }

    /// Checks that every octave of a sample at `point` stays on the lattice.
    ///
    /// # Errors
    ///
    /// Returns [`GenError::InvalidCoordinate`] for a non-finite coordinate or
    /// one whose top-octave position reaches [`crate::error::MAX_LATTICE`].
    pub fn check_point(&self, point: &[f64]) -> GenResult<()> {
        check_reach(point, 0.0, self.max_frequency)
    }

    #[inline]
    fn shape(&self, noise: f64) -> f64 {
        match self.mode {
            FractalMode::Standard => noise,
            FractalMode::Ridged => {
                let ridge = 1.0 - noise.abs();
                ridge * ridge
            }
        }
    }

    /// Accumulates the octaves for a per-octave sampler.
    ///
    /// The loop is sequential by construction: octave `i + 1` depends on the
    /// amplitude and frequency left behind by octave `i`.
    #[inline]
    fn accumulate(&self, mut sample: impl FnMut(&NoiseSource, f64) -> f64) -> f64 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;

        for octave in &self.octaves {
            total += self.shape(sample(octave, frequency)) * amplitude;
            amplitude *= self.spec.persistence;
            frequency *= self.spec.lacunarity;
        }

        // Normalize to the single-octave range
        total / self.max_amplitude
    }

    /// Samples the sum in 2D.
    #[must_use]
    pub fn sample2(&self, x: f64, y: f64) -> f64 {
        self.accumulate(|noise, frequency| noise.sample(x * frequency, y * frequency))
    }

    /// Samples the sum in 3D.
    #[must_use]
    pub fn sample3(&self, x: f64, y: f64, z: f64) -> f64 {
        self.accumulate(|noise, frequency| {
            noise.sample3(x * frequency, y * frequency, z * frequency)
        })
    }
}

/// Simplex fBm at a 2D point, validating every input.
///
/// Builds the stack on every call; hold an [`Fbm`] for loops.
///
/// # Errors
///
/// Returns [`GenError::InvalidCoordinate`] for coordinates that are not
/// finite or that leave the lattice at the top octave, and
/// [`GenError::InvalidParameter`] for an invalid spec.
pub fn fbm2(point: [f64; 2], spec: &OctaveSpec, seed: WorldSeed) -> GenResult<f64> {
    let fbm = Fbm::new(NoiseKind::Simplex, *spec, seed)?;
    fbm.check_point(&point)?;
    Ok(fbm.sample2(point[0], point[1]))
}

/// Simplex fBm at a 3D point, validating every input.
///
/// # Errors
///
/// Same as [`fbm2`].
pub fn fbm3(point: [f64; 3], spec: &OctaveSpec, seed: WorldSeed) -> GenResult<f64> {
    let fbm = Fbm::new(NoiseKind::Simplex, *spec, seed)?;
    fbm.check_point(&point)?;
    Ok(fbm.sample3(point[0], point[1], point[2]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::SimplexNoise;

    #[test]
    fn test_spec_validation() {
        assert!(OctaveSpec::new(0, 0.5, 2.0).is_err());
        assert!(OctaveSpec::new(4, 0.0, 2.0).is_err());
        assert!(OctaveSpec::new(4, 1.0, 2.0).is_err());
        assert!(OctaveSpec::new(4, f64::NAN, 2.0).is_err());
        assert!(OctaveSpec::new(4, 0.5, 1.0).is_err());
        assert!(OctaveSpec::new(4, 0.5, f64::INFINITY).is_err());
        assert!(OctaveSpec::new(1, 0.5, 2.0).is_ok());
        assert_eq!(OctaveSpec::default(), OctaveSpec { count: 6, persistence: 0.5, lacunarity: 2.0 });
    }

    #[test]
    fn test_max_amplitude() {
        let spec = OctaveSpec { count: 3, persistence: 0.5, lacunarity: 2.0 };
        assert!((spec.max_amplitude() - 1.75).abs() < 1e-12);
    }

    #[test]
    fn test_one_octave_is_plain_noise() {
        let seed = WorldSeed::new(31);
        let spec = OctaveSpec { count: 1, persistence: 0.5, lacunarity: 2.0 };
        for kind in [NoiseKind::Value, NoiseKind::Perlin, NoiseKind::Simplex] {
            let fbm = Fbm::new(kind, spec, seed).expect("valid spec");
            let noise = NoiseSource::new(kind, seed);
            for i in 0..200i32 {
                let x = f64::from(i) * 0.37 - 20.0;
                let y = f64::from(i) * -0.21 + 3.0;
                assert_eq!(fbm.sample2(x, y), noise.sample(x, y));
                assert_eq!(fbm.sample3(x, y, 0.5), noise.sample3(x, y, 0.5));
            }
        }
    }

    #[test]
    fn test_octaves_use_distinct_seeds() {
        let fbm = Fbm::new(NoiseKind::Simplex, OctaveSpec::default(), WorldSeed::new(1))
            .expect("valid spec");
        assert_eq!(fbm.octaves[0], NoiseSource::Simplex(SimplexNoise::new(WorldSeed::new(1))));
        assert_eq!(fbm.octaves[1], NoiseSource::Simplex(SimplexNoise::new(WorldSeed::new(1001))));
        assert_eq!(fbm.octaves[5], NoiseSource::Simplex(SimplexNoise::new(WorldSeed::new(5001))));
    }

    #[test]
    fn test_range_holds_for_any_octave_count() {
        for count in [1, 2, 4, 8, 12] {
            let spec = OctaveSpec { count, persistence: 0.65, lacunarity: 1.9 };
            let fbm = Fbm::new(NoiseKind::Simplex, spec, WorldSeed::new(2))
                .expect("valid spec");
            for i in 0..2000i32 {
                let x = f64::from(i) * 0.173 - 150.0;
                let y = f64::from(i) * 0.311 - 300.0;
                let v = fbm.sample2(x, y);
                assert!((-1.0..=1.0).contains(&v), "{count} octaves: {v}");
            }
        }
    }

    #[test]
    fn test_ridged_range() {
        let fbm = Fbm::ridged(NoiseKind::Simplex, OctaveSpec::new(4, 0.5, 2.0).expect("valid spec"), WorldSeed::new(4))
            .expect("valid spec");
        assert_eq!(fbm.mode(), FractalMode::Ridged);
        for i in 0..2000i32 {
            let v = fbm.sample2(f64::from(i) * 0.21, f64::from(i) * 0.07);
            assert!((0.0..=1.0).contains(&v), "ridged value {v}");
        }
    }

    #[test]
    fn test_scenario_fixed_point() {
        let spec = OctaveSpec { count: 6, persistence: 0.5, lacunarity: 2.0 };
        let first = fbm2([1.5, 2.5], &spec, WorldSeed::new(7)).unwrap_or(f64::NAN);
        assert!((-1.0..=1.0).contains(&first));
        for _ in 0..1000 {
            let again = fbm2([1.5, 2.5], &spec, WorldSeed::new(7)).unwrap_or(f64::NAN);
            assert_eq!(again.to_bits(), first.to_bits());
        }
    }

    #[test]
    fn test_top_octave_must_stay_on_lattice() {
        let spec = OctaveSpec::new(10, 0.5, 2.0).expect("valid spec");
        let fbm = Fbm::new(NoiseKind::Simplex, spec, WorldSeed::new(1)).expect("valid spec");
        assert!((fbm.max_frequency() - 512.0).abs() < 1e-12);

        // Finite and on the lattice for octave 0, but not for octave 9
        assert!(matches!(
            fbm2([9.0e15, 9.0e15], &spec, WorldSeed::new(1)),
            Err(GenError::InvalidCoordinate { axis: 0, .. })
        ));
        assert!(matches!(
            fbm3([0.0, 0.0, -1.0e14], &spec, WorldSeed::new(1)),
            Err(GenError::InvalidCoordinate { axis: 2, .. })
        ));

        let far = fbm2([1.0e12, -1.0e12], &spec, WorldSeed::new(1)).expect("on the lattice");
        assert!((-1.0..=1.0).contains(&far));
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        let spec = OctaveSpec::default();
        assert!(fbm2([f64::NAN, 0.0], &spec, WorldSeed::new(1)).is_err());
        let bad = OctaveSpec { count: 0, ..spec };
        assert!(matches!(
            fbm3([0.0, 0.0, 0.0], &bad, WorldSeed::new(1)),
            Err(GenError::InvalidParameter { name: "octaves", .. })
        ));
    }
}
