//! # Constraint Sets
//!
//! The named, typed properties an entity carries. A child's set is built by
//! copying its parent's set and adding new keys; existing keys are never
//! overwritten.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use seedscape_procedural::{LayerValue, WideU64};

use crate::error::{CosmosError, CosmosResult};

/// One constraint value.
///
/// Serializes as a bare value. Integers that do not fit in `i64` are written
/// as `{ hex = "0x..." }` so they stay integers in TOML without colliding
/// with text.
#[derive(Clone, Debug, PartialEq)]
pub enum ConstraintValue {
    /// Count, index or seed.
    Int(u64),
    /// Continuous quantity.
    Float(f64),
    /// Flag.
    Bool(bool),
    /// Label such as a class name.
    Text(String),
}

impl ConstraintValue {
    /// Human-readable type name.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Float(_) => "float",
            Self::Int(_) => "integer",
            Self::Bool(_) => "bool",
            Self::Text(_) => "text",
        }
    }
}

/// An integer too wide for a signed format.
#[derive(Serialize, Deserialize)]
struct HexInt {
    hex: WideU64,
}

/// Accepted input shapes. `Int` precedes `Float` so integers stay exact.
#[derive(Deserialize)]
#[serde(untagged)]
enum Repr {
    Int(u64),
    Wide(HexInt),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl Serialize for ConstraintValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Int(v) if i64::try_from(*v).is_err() => {
                HexInt { hex: WideU64(*v) }.serialize(serializer)
            }
            Self::Int(v) => serializer.serialize_u64(*v),
            Self::Float(v) => serializer.serialize_f64(*v),
            Self::Bool(v) => serializer.serialize_bool(*v),
            Self::Text(v) => serializer.serialize_str(v),
        }
    }
}

impl<'de> Deserialize<'de> for ConstraintValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Repr::deserialize(deserializer)? {
            Repr::Int(v) | Repr::Wide(HexInt { hex: WideU64(v) }) => Self::Int(v),
            Repr::Float(v) => Self::Float(v),
            Repr::Bool(v) => Self::Bool(v),
            Repr::Text(v) => Self::Text(v),
        })
    }
}

impl From<LayerValue> for ConstraintValue {
    fn from(value: LayerValue) -> Self {
        match value {
            LayerValue::Float(v) => Self::Float(v),
            LayerValue::Int(v) => Self::Int(v),
            LayerValue::Bool(v) => Self::Bool(v),
            LayerValue::Category(v) => Self::Text(v),
        }
    }
}

impl From<f64> for ConstraintValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<u64> for ConstraintValue {
    fn from(value: u64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for ConstraintValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for ConstraintValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

/// An ordered, read-only set of named constraints.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Constraints {
    values: BTreeMap<String, ConstraintValue>,
}

impl Constraints {
    /// An empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from fresh properties.
    ///
    /// # Errors
    ///
    /// Returns [`CosmosError::ConstraintConflict`] if a key appears twice.
    pub fn from_properties<I>(properties: I) -> CosmosResult<Self>
    where
        I: IntoIterator<Item = (String, ConstraintValue)>,
    {
        Self::new().extended(properties)
    }

    /// A copy of this set plus `properties`.
    ///
    /// # Errors
    ///
    /// Returns [`CosmosError::ConstraintConflict`] if any new key is already
    /// present, either in this set or earlier in `properties`.
    pub fn extended<I>(&self, properties: I) -> CosmosResult<Self>
    where
        I: IntoIterator<Item = (String, ConstraintValue)>,
    {
        let mut values = self.values.clone();
        for (key, value) in properties {
            if values.contains_key(&key) {
                return Err(CosmosError::ConstraintConflict { key });
            }
            values.insert(key, value);
        }
        Ok(Self { values })
    }

    /// Number of constraints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when no constraint is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// True when `key` is set.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// The raw value of `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ConstraintValue> {
        self.values.get(key)
    }

    /// Iterates in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConstraintValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn require(&self, key: &str) -> CosmosResult<&ConstraintValue> {
        self.values.get(key).ok_or_else(|| CosmosError::MissingConstraint {
            key: key.to_owned(),
        })
    }

    fn mismatch(key: &str, expected: &'static str) -> CosmosError {
        CosmosError::ConstraintType {
            key: key.to_owned(),
            expected,
        }
    }

    /// Reads a float constraint.
    ///
    /// # Errors
    ///
    /// Returns [`CosmosError::MissingConstraint`] or
    /// [`CosmosError::ConstraintType`].
    pub fn get_f64(&self, key: &str) -> CosmosResult<f64> {
        match self.require(key)? {
            ConstraintValue::Float(v) => Ok(*v),
            _ => Err(Self::mismatch(key, "float")),
        }
    }

    /// Reads an integer constraint.
    ///
    /// # Errors
    ///
    /// Returns [`CosmosError::MissingConstraint`] or
    /// [`CosmosError::ConstraintType`].
    pub fn get_u64(&self, key: &str) -> CosmosResult<u64> {
        match self.require(key)? {
            ConstraintValue::Int(v) => Ok(*v),
            _ => Err(Self::mismatch(key, "integer")),
        }
    }

    /// Reads a boolean constraint.
    ///
    /// # Errors
    ///
    /// Returns [`CosmosError::MissingConstraint`] or
    /// [`CosmosError::ConstraintType`].
    pub fn get_bool(&self, key: &str) -> CosmosResult<bool> {
        match self.require(key)? {
            ConstraintValue::Bool(v) => Ok(*v),
            _ => Err(Self::mismatch(key, "bool")),
        }
    }

    /// Reads a text constraint.
    ///
    /// # Errors
    ///
    /// Returns [`CosmosError::MissingConstraint`] or
    /// [`CosmosError::ConstraintType`].
    pub fn get_text(&self, key: &str) -> CosmosResult<&str> {
        match self.require(key)? {
            ConstraintValue::Text(v) => Ok(v.as_str()),
            _ => Err(Self::mismatch(key, "text")),
        }
    }
}
