//! # Layered Property Extraction
//!
//! One coordinate, many independent properties. Each semantic property
//! (existence, category, temperature, ...) hashes the same coordinate with
//! its own salt, and a [`LayerDecode`] rule turns the raw hash into a typed
//! [`LayerValue`].
//!
//! Salts are widely spaced odd constants (see [`salt`]). Independence does
//! not rely on the spacing though: the hash finalizes the salt before any
//! coordinate is absorbed, so even salts `0` and `1` are uncorrelated.

use serde::{Deserialize, Serialize};

use crate::error::{GenError, GenResult};
use crate::hash::{hash_coords, WorldSeed};
use crate::stream::{bounded, chance, pick, range_f64, unit_f64};

/// Named salt constants for the property layers used across the workspace.
///
/// All values are odd and below 2^63, so TOML files carry them as plain
/// integers.
pub mod salt {
    /// Whether something exists at a coordinate.
    pub const EXISTENCE: u64 = 0x1F83_D9AB_FB41_BD6B;
    /// Categorical type selection.
    pub const CATEGORY: u64 = 0x5BE0_CD19_137E_2179;
    /// Temperature layer.
    pub const TEMPERATURE: u64 = 0x2F0D_8C4B_1A6E_9D37;
    /// Danger / hazard layer.
    pub const DANGER: u64 = 0x3C6E_F372_FE94_F82D;
    /// Resource abundance layer.
    pub const RESOURCE: u64 = 0x510E_527F_ADE6_82D1;
    /// Mass sampling layer.
    pub const MASS: u64 = 0x6A09_E667_F3BC_C909;
    /// Orbital distance layer.
    pub const ORBIT: u64 = 0x1B87_3593_C5D1_4E1B;
    /// Age layer.
    pub const AGE: u64 = 0x4CF5_AD43_2745_937F;
    /// Metallicity layer.
    pub const METALLICITY: u64 = 0x0A54_FF53_A5F1_D36F;
    /// Density layer.
    pub const DENSITY: u64 = 0x7137_449A_23EF_65CD;
    /// Population / count layer.
    pub const COUNT: u64 = 0x3956_C25B_F348_B539;
    /// Child seed derivation in the entity hierarchy.
    pub const CHILD_SEED: u64 = 0x59F1_11F1_B605_D019;
    /// Terrain seed for planetary surfaces.
    pub const TERRAIN: u64 = 0x123B_E7C1_88F2_A6B5;
}

/// Rule that decodes a raw hash into a typed value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayerDecode {
    /// Float in `[0, 1)`.
    Unit,
    /// Float in `[min, max)`.
    FloatRange {
        /// Inclusive lower bound.
        min: f64,
        /// Exclusive upper bound.
        max: f64,
    },
    /// Integer in `[0, n)`.
    IntRange {
        /// Number of values.
        #[serde(with = "crate::wide")]
        n: u64,
    },
    /// Boolean that is `true` with probability `p`.
    Chance {
        /// Probability in `[0, 1]`.
        p: f64,
    },
    /// One entry of a category table.
    Category {
        /// Category names.
        items: Vec<String>,
    },
}

impl LayerDecode {
    /// Checks the rule's parameters.
    ///
    /// # Errors
    ///
    /// Returns [`GenError::InvalidParameter`] for empty ranges or tables and
    /// probabilities outside `[0, 1]`.
    pub fn validate(&self) -> GenResult<()> {
        match self {
            Self::Unit => Ok(()),
            Self::FloatRange { min, max } => {
                if min.is_finite() && max.is_finite() && min < max {
                    Ok(())
                } else {
                    Err(GenError::invalid("float_range", format!("empty range [{min}, {max})")))
                }
            }
            Self::IntRange { n } if *n == 0 => {
                Err(GenError::invalid("int_range", "n must be at least 1"))
            }
            Self::IntRange { .. } => Ok(()),
            Self::Chance { p } if !(0.0..=1.0).contains(p) => {
                Err(GenError::invalid("chance", format!("probability {p} outside [0, 1]")))
            }
            Self::Chance { .. } => Ok(()),
            Self::Category { items } if items.is_empty() => {
                Err(GenError::invalid("category", "category table is empty"))
            }
            Self::Category { .. } => Ok(()),
        }
    }

    /// Decodes a hash with this rule.
    ///
    /// # Errors
    ///
    /// Propagates the same errors as [`LayerDecode::validate`].
    pub fn decode(&self, h: u64) -> GenResult<LayerValue> {
        Ok(match self {
            Self::Unit => LayerValue::Float(unit_f64(h)),
            Self::FloatRange { min, max } => {
                self.validate()?;
                LayerValue::Float(range_f64(h, *min, *max))
            }
            Self::IntRange { n } => LayerValue::Int(bounded(h, *n)?),
            Self::Chance { p } => LayerValue::Bool(chance(h, *p)?),
            Self::Category { items } => LayerValue::Category(pick(h, items)?.clone()),
        })
    }
}

/// A decoded property value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LayerValue {
    /// Continuous value.
    Float(f64),
    /// Integer value.
    Int(u64),
    /// Boolean flag.
    Bool(bool),
    /// Category name.
    Category(String),
}

/// A named salt plus its decoding rule.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropertyLayer {
    /// Property name (e.g. `"temperature"`).
    pub name: String,
    /// Salt selecting this layer's hash stream.
    #[serde(with = "crate::wide")]
    pub salt: u64,
    /// How the hash becomes a value.
    pub decode: LayerDecode,
}

impl PropertyLayer {
    /// Creates a layer.
    #[must_use]
    pub fn new(name: impl Into<String>, salt: u64, decode: LayerDecode) -> Self {
        Self {
            name: name.into(),
            salt,
            decode,
        }
    }

    /// Checks the decoding rule.
    ///
    /// # Errors
    ///
    /// See [`LayerDecode::validate`].
    pub fn validate(&self) -> GenResult<()> {
        self.decode.validate()
    }
}

/// Draws independent property streams from coordinates under one seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayeredExtractor {
    seed: WorldSeed,
}

impl LayeredExtractor {
    /// Creates an extractor for a seed.
    #[inline]
    #[must_use]
    pub const fn new(seed: WorldSeed) -> Self {
        Self { seed }
    }

    /// The seed this extractor hashes under.
    #[inline]
    #[must_use]
    pub const fn seed(&self) -> WorldSeed {
        self.seed
    }

    /// Raw hash of one property layer at a coordinate.
    #[inline]
    #[must_use]
    pub fn property(&self, coords: &[i64], layer_salt: u64) -> u64 {
        hash_coords(coords, layer_salt, self.seed)
    }

    /// Decodes one layer at a coordinate.
    ///
    /// # Errors
    ///
    /// Returns the layer's validation error if its rule is malformed.
    pub fn decode(&self, coords: &[i64], layer: &PropertyLayer) -> GenResult<LayerValue> {
        layer.decode.decode(self.property(coords, layer.salt))
    }

    /// Decodes every layer at a coordinate, in table order.
    ///
    /// # Errors
    ///
    /// Returns the first layer error encountered.
    pub fn extract(
        &self,
        coords: &[i64],
        layers: &[PropertyLayer],
    ) -> GenResult<Vec<(String, LayerValue)>> {
        layers
            .iter()
            .map(|layer| Ok((layer.name.clone(), self.decode(coords, layer)?)))
            .collect()
    }
}
