//! # Generator Configuration
//!
//! Loads a complete generator description from TOML:
//!
//! ```toml
//! seed = 42
//! noise = "simplex"
//!
//! [octaves]
//! count = 6
//! persistence = 0.5
//! lacunarity = 2.0
//!
//! [warp]
//! strength = 4.0
//! second_order = false
//!
//! [[layers]]
//! name = "temperature"
//! salt = 0x2F0D_8C4B_1A6E_9D37
//! decode = { kind = "float_range", min = 2500.0, max = 40000.0 }
//! ```
//!
//! Every section is optional. Loading always validates, so a config that
//! parsed successfully can build its runtime objects without further checks.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GenError, GenResult};
use crate::fractal::{Fbm, OctaveSpec};
use crate::hash::WorldSeed;
use crate::layer::{LayeredExtractor, PropertyLayer};
use crate::noise::NoiseKind;
use crate::warp::{DomainWarp, WarpSpec};

/// Domain warp settings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WarpConfig {
    /// Displacement multiplier.
    pub strength: f64,
    /// Warp twice.
    #[serde(default)]
    pub second_order: bool,
    /// Octave shape of the displacement fields; the main shape if absent.
    #[serde(default)]
    pub octaves: Option<OctaveSpec>,
}

impl WarpConfig {
    /// The runtime warp spec.
    #[must_use]
    pub const fn spec(&self) -> WarpSpec {
        WarpSpec {
            strength: self.strength,
            second_order: self.second_order,
        }
    }
}

/// A full generator description.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// World seed.
    pub seed: WorldSeed,
    /// Noise family for every fractal layer.
    pub noise: NoiseKind,
    /// Main fractal shape.
    pub octaves: OctaveSpec,
    /// Optional domain warp.
    pub warp: Option<WarpConfig>,
    /// Property layers, in extraction order.
    pub layers: Vec<PropertyLayer>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: WorldSeed::default(),
            noise: NoiseKind::Simplex,
            octaves: OctaveSpec::default(),
            warp: None,
            layers: Vec::new(),
        }
    }
}

impl GeneratorConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`GenError::Config`] for malformed TOML and the relevant
    /// validation error for out-of-domain values.
    pub fn from_toml_str(source: &str) -> GenResult<Self> {
        let config: Self = toml::from_str(source).map_err(|e| GenError::Config(e.to_string()))?;
        config.validate()?;
        tracing::debug!(
            seed = config.seed.value(),
            noise = ?config.noise,
            octaves = config.octaves.count,
            layers = config.layers.len(),
            "loaded generator config"
        );
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`GenError::Io`] if the file cannot be read, otherwise the
    /// same errors as [`GeneratorConfig::from_toml_str`].
    pub fn from_file(path: impl AsRef<Path>) -> GenResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| GenError::Io(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&source)
    }

    /// Serializes the config back to TOML.
    ///
    /// # Errors
    ///
    /// Returns [`GenError::Config`] if a value cannot be represented. Seeds
    /// and salts at or above 2^63 are written as hex strings, see
    /// [`crate::wide`].
    pub fn to_toml_string(&self) -> GenResult<String> {
        toml::to_string(self).map_err(|e| GenError::Config(e.to_string()))
    }

    /// Checks every parameter with the runtime constructors' rules.
    ///
    /// # Errors
    ///
    /// Returns [`GenError::InvalidParameter`] for a bad octave, warp or layer
    /// parameter and [`GenError::Config`] for duplicate layer names.
    pub fn validate(&self) -> GenResult<()> {
        self.octaves.validate()?;
        if let Some(warp) = &self.warp {
            warp.spec().validate()?;
            if let Some(octaves) = &warp.octaves {
                octaves.validate()?;
            }
        }
        let mut names = BTreeSet::new();
        for layer in &self.layers {
            layer.validate()?;
            if !names.insert(layer.name.as_str()) {
                return Err(GenError::Config(format!("duplicate layer `{}`", layer.name)));
            }
        }
        Ok(())
    }

    /// The main fBm stack.
    ///
    /// # Errors
    ///
    /// Returns [`GenError::InvalidParameter`] for an invalid octave spec.
    pub fn build_fbm(&self) -> GenResult<Fbm> {
        Fbm::new(self.noise, self.octaves, self.seed)
    }

    /// The configured domain warp, or a zero-strength warp without a
    /// `[warp]` section.
    ///
    /// # Errors
    ///
    /// Returns [`GenError::InvalidParameter`] for an invalid octave or warp
    /// spec.
    pub fn build_warp(&self) -> GenResult<DomainWarp> {
        let warp = self.warp.unwrap_or_default();
        DomainWarp::new(
            self.noise,
            self.octaves,
            warp.octaves.unwrap_or(self.octaves),
            warp.spec(),
            self.seed,
        )
    }

    /// An extractor for the configured seed.
    #[must_use]
    pub const fn build_extractor(&self) -> LayeredExtractor {
        LayeredExtractor::new(self.seed)
    }
}
