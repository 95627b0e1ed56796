//! # Stellar Formulas
//!
//! Main-sequence relations in solar units (M☉, L☉, R☉) and AU.
//! Every function is a pure formula; inputs are expected to be positive.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Solar effective temperature in kelvin.
pub const SOLAR_TEMPERATURE_K: f64 = 5772.0;

/// Lightest star the mass sampler produces, in M☉.
pub const MIN_STAR_MASS: f64 = 0.08;
/// Heaviest star the mass sampler produces, in M☉.
pub const MAX_STAR_MASS: f64 = 100.0;
/// Salpeter initial mass function slope.
pub const SALPETER_ALPHA: f64 = 2.35;

/// Luminosity from mass (piecewise mass-luminosity relation).
#[must_use]
pub fn luminosity_from_mass(mass: f64) -> f64 {
    if mass < 0.43 {
        0.23 * mass.powf(2.3)
    } else if mass < 2.0 {
        mass.powi(4)
    } else if mass < 55.0 {
        1.4 * mass.powf(3.5)
    } else {
        32_000.0 * mass
    }
}

/// Radius from mass.
#[must_use]
pub fn radius_from_mass(mass: f64) -> f64 {
    if mass < 1.0 {
        mass.powf(0.8)
    } else {
        mass.powf(0.57)
    }
}

/// Effective temperature from luminosity and radius (Stefan-Boltzmann).
#[must_use]
pub fn temperature_from(luminosity: f64, radius: f64) -> f64 {
    SOLAR_TEMPERATURE_K * (luminosity / (radius * radius)).powf(0.25)
}

/// Inner and outer edge of the habitable zone in AU.
#[must_use]
pub fn habitable_zone(luminosity: f64) -> (f64, f64) {
    ((luminosity / 1.1).sqrt(), (luminosity / 0.53).sqrt())
}

/// Distance beyond which volatiles condense into ice, in AU.
#[must_use]
pub fn frost_line(luminosity: f64) -> f64 {
    2.7 * luminosity.sqrt()
}

/// Orbital period in years for semi-major axis `a` (AU) around `mass` (M☉).
#[must_use]
pub fn orbital_period_years(a: f64, mass: f64) -> f64 {
    (a * a * a / mass).sqrt()
}

/// Samples the Salpeter IMF by inverse CDF.
///
/// `u` in `[0, 1)` maps to a mass in `[MIN_STAR_MASS, MAX_STAR_MASS)`.
/// `bias` in `[0, 1)` skews the roll towards light stars.
#[must_use]
pub fn imf_mass(u: f64, bias: f64) -> f64 {
    let u = u.clamp(0.0, 1.0).powf(1.0 + 2.0 * bias.clamp(0.0, 1.0));
    let a = 1.0 - SALPETER_ALPHA;
    let lo = MIN_STAR_MASS.powf(a);
    let hi = MAX_STAR_MASS.powf(a);
    (lo + u * (hi - lo)).powf(1.0 / a).clamp(MIN_STAR_MASS, MAX_STAR_MASS)
}

/// Harvard spectral class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SpectralClass {
    /// Above 30,000 K.
    O,
    /// 10,000 - 30,000 K.
    B,
    /// 7,500 - 10,000 K.
    A,
    /// 6,000 - 7,500 K.
    F,
    /// 5,200 - 6,000 K.
    G,
    /// 3,700 - 5,200 K.
    K,
    /// Below 3,700 K.
    M,
}

impl SpectralClass {
    /// Class for an effective temperature in kelvin.
    #[must_use]
    pub fn from_temperature(kelvin: f64) -> Self {
        if kelvin >= 30_000.0 {
            Self::O
        } else if kelvin >= 10_000.0 {
            Self::B
        } else if kelvin >= 7_500.0 {
            Self::A
        } else if kelvin >= 6_000.0 {
            Self::F
        } else if kelvin >= 5_200.0 {
            Self::G
        } else if kelvin >= 3_700.0 {
            Self::K
        } else {
            Self::M
        }
    }

    /// Single-letter label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::O => "O",
            Self::B => "B",
            Self::A => "A",
            Self::F => "F",
            Self::G => "G",
            Self::K => "K",
            Self::M => "M",
        }
    }
}

impl fmt::Display for SpectralClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sun() {
        assert!((luminosity_from_mass(1.0) - 1.0).abs() < 1e-12);
        assert!((radius_from_mass(1.0) - 1.0).abs() < 1e-12);
        assert!((temperature_from(1.0, 1.0) - SOLAR_TEMPERATURE_K).abs() < 1e-9);
        assert_eq!(SpectralClass::from_temperature(SOLAR_TEMPERATURE_K), SpectralClass::G);
        let (inner, outer) = habitable_zone(1.0);
        assert!(inner < 1.0 && outer > 1.0, "Earth outside ({inner}, {outer})");
        assert!((orbital_period_years(1.0, 1.0) - 1.0).abs() < 1e-12);
        assert!((frost_line(1.0) - 2.7).abs() < 1e-12);
    }

    #[test]
    fn test_heavier_is_brighter() {
        let mut prev = 0.0;
        for i in 1..=1000i32 {
            let mass = f64::from(i) * 0.1;
            let l = luminosity_from_mass(mass);
            assert!(l > prev, "luminosity drops at {mass}");
            prev = l;
        }
    }

    #[test]
    fn test_spectral_boundaries() {
        assert_eq!(SpectralClass::from_temperature(40_000.0), SpectralClass::O);
        assert_eq!(SpectralClass::from_temperature(10_000.0), SpectralClass::B);
        assert_eq!(SpectralClass::from_temperature(3_000.0), SpectralClass::M);
        assert_eq!(SpectralClass::K.to_string(), "K");
    }

    #[test]
    fn test_imf_bounds_and_skew() {
        assert!((imf_mass(0.0, 0.0) - MIN_STAR_MASS).abs() < 1e-12);
        assert!((imf_mass(1.0, 0.0) - MAX_STAR_MASS).abs() < 1e-9);
        let light = (0..1000i32)
            .filter(|&i| imf_mass(f64::from(i) / 1000.0, 0.0) < 0.5)
            .count();
        assert!(light > 800, "Salpeter should favour light stars: {light}");
        for i in 0..100i32 {
            let u = f64::from(i) / 100.0;
            assert!(imf_mass(u, 0.8) <= imf_mass(u, 0.0));
        }
    }
}
