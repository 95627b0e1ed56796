//! # Hierarchical Constraint Propagation
//!
//! Derives child entities from a parent and a child index:
//!
//! ```text
//! child.seed        = hash([index], CHILD_SEED, parent.seed)
//! child.constraints = parent.constraints ∪ rule(parent, hash(index, depth, salt_k, parent.seed))
//! ```
//!
//! Nothing is stored. Any entity is reachable from the root by walking its
//! index path, and walking the same path twice yields the same entity.

use serde::{Deserialize, Serialize};
use seedscape_procedural::{
    hash_coords, salt, LayerValue, LayeredExtractor, PropertyLayer, ValueStream, WorldSeed,
};

use crate::constraints::{ConstraintValue, Constraints};
use crate::error::{CosmosError, CosmosResult};

/// A derived entity: a seed, its address and its constraints.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    kind: String,
    seed: WorldSeed,
    #[serde(with = "seedscape_procedural::wide::vec")]
    path: Vec<u64>,
    constraints: Constraints,
}

impl Entity {
    /// Creates a root entity.
    #[must_use]
    pub fn root(kind: impl Into<String>, seed: WorldSeed, constraints: Constraints) -> Self {
        Self {
            kind: kind.into(),
            seed,
            path: Vec::new(),
            constraints,
        }
    }

    /// Entity kind (e.g. `"star"`).
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Seed scoping every child of this entity.
    #[must_use]
    pub const fn seed(&self) -> WorldSeed {
        self.seed
    }

    /// Child indices from the root down to this entity.
    #[must_use]
    pub fn path(&self) -> &[u64] {
        &self.path
    }

    /// Distance from the root.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// Inherited plus own constraints.
    #[must_use]
    pub const fn constraints(&self) -> &Constraints {
        &self.constraints
    }
}

/// What a rule sees while deriving one child.
#[derive(Clone, Copy, Debug)]
pub struct ChildContext<'a> {
    parent: &'a Entity,
    index: u64,
    coords: [i64; 2],
    extractor: LayeredExtractor,
}

impl<'a> ChildContext<'a> {
    fn new(parent: &'a Entity, index: u64) -> Self {
        // Indices above i64::MAX wrap onto negative coordinates; the
        // mapping is still one-to-one.
        let depth = (parent.depth() + 1) as i64;
        Self {
            parent,
            index,
            coords: [index as i64, depth],
            extractor: LayeredExtractor::new(parent.seed),
        }
    }

    /// The parent entity.
    #[must_use]
    pub const fn parent(&self) -> &'a Entity {
        self.parent
    }

    /// The child's index under its parent.
    #[must_use]
    pub const fn index(&self) -> u64 {
        self.index
    }

    /// The parent's constraints.
    #[must_use]
    pub const fn inherited(&self) -> &'a Constraints {
        &self.parent.constraints
    }

    /// Raw hash of one property layer at the child's coordinate.
    #[must_use]
    pub fn hash(&self, layer_salt: u64) -> u64 {
        self.extractor.property(&self.coords, layer_salt)
    }

    /// Several values from one property layer.
    #[must_use]
    pub fn stream(&self, layer_salt: u64) -> ValueStream {
        ValueStream::new(self.hash(layer_salt))
    }

    /// Decodes a property layer at the child's coordinate.
    ///
    /// # Errors
    ///
    /// Returns the layer's validation error if its rule is malformed.
    pub fn decode(&self, layer: &PropertyLayer) -> CosmosResult<LayerValue> {
        Ok(self.extractor.decode(&self.coords, layer)?)
    }
}

/// Produces a child's new properties from its context.
pub trait DerivationRule {
    /// Kind of the entities this rule produces.
    fn kind(&self) -> &str;

    /// New properties for one child; must not repeat inherited keys.
    ///
    /// # Errors
    ///
    /// Returns an error when an inherited constraint the rule needs is
    /// missing or mistyped, or a generation parameter is out of domain.
    fn derive(&self, ctx: &ChildContext<'_>) -> CosmosResult<Vec<(String, ConstraintValue)>>;
}

/// Seed of a parent's `index`-th child.
#[must_use]
pub fn child_seed(parent_seed: WorldSeed, index: u64) -> WorldSeed {
    WorldSeed::new(hash_coords(&[index as i64], salt::CHILD_SEED, parent_seed))
}

/// Derives the `index`-th child of `parent`.
///
/// # Errors
///
/// Returns [`CosmosError::ConstraintConflict`] if the rule redefines an
/// inherited key, or whatever error the rule itself reports.
pub fn derive_child<R>(parent: &Entity, index: u64, rule: &R) -> CosmosResult<Entity>
where
    R: DerivationRule + ?Sized,
{
    let ctx = ChildContext::new(parent, index);
    let properties = rule.derive(&ctx)?;
    let constraints = parent.constraints.extended(properties)?;

    let mut path = Vec::with_capacity(parent.path.len() + 1);
    path.extend_from_slice(&parent.path);
    path.push(index);

    tracing::trace!(
        kind = rule.kind(),
        depth = path.len(),
        index,
        constraints = constraints.len(),
        "derived child entity"
    );

    Ok(Entity {
        kind: rule.kind().to_owned(),
        seed: child_seed(parent.seed, index),
        path,
        constraints,
    })
}

/// Walks `indices` down from `root`, applying `rules[d]` at depth `d`.
///
/// # Errors
///
/// Returns [`CosmosError::PathTooDeep`] when there are more indices than
/// rules, otherwise the first derivation error.
pub fn derive_path(
    root: &Entity,
    indices: &[u64],
    rules: &[&dyn DerivationRule],
) -> CosmosResult<Entity> {
    if indices.len() > rules.len() {
        return Err(CosmosError::PathTooDeep {
            depth: indices.len(),
            available: rules.len(),
        });
    }
    let mut entity = root.clone();
    for (&index, rule) in indices.iter().zip(rules) {
        entity = derive_child(&entity, index, *rule)?;
    }
    Ok(entity)
}

/// A rule that decodes a fixed table of property layers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayerRule {
    kind: String,
    layers: Vec<PropertyLayer>,
}

impl LayerRule {
    /// Creates a rule, validating every layer.
    ///
    /// # Errors
    ///
    /// Returns the first layer validation error.
    pub fn new(kind: impl Into<String>, layers: Vec<PropertyLayer>) -> CosmosResult<Self> {
        for layer in &layers {
            layer.validate()?;
        }
        Ok(Self {
            kind: kind.into(),
            layers,
        })
    }

    /// The layer table.
    #[must_use]
    pub fn layers(&self) -> &[PropertyLayer] {
        &self.layers
    }
}

impl DerivationRule for LayerRule {
    fn kind(&self) -> &str {
        &self.kind
    }

    fn derive(&self, ctx: &ChildContext<'_>) -> CosmosResult<Vec<(String, ConstraintValue)>> {
        self.layers
            .iter()
            .map(|layer| Ok((layer.name.clone(), ctx.decode(layer)?.into())))
            .collect()
    }
}
