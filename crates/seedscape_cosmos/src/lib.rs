//! # SEEDSCAPE Cosmos
//!
//! Hierarchical constraint propagation: galaxy → region → cluster → star →
//! planet → surface, every level derived on demand from its parent and an
//! index.
//!
//! ## Design Principles
//!
//! 1. **Immutable**: Entities are values; a child owns a copy of its
//!    parent's constraints plus its own
//! 2. **Additive**: A child never redefines an inherited key
//! 3. **Addressable**: Any entity is reachable by its index path alone
//! 4. **Bounded**: Star and planet indices stop at the count their parent
//!    declares
//!
//! ## Example
//!
//! ```rust
//! use seedscape_cosmos::{Galaxy, PlanetSurface};
//! use seedscape_procedural::WorldSeed;
//!
//! let galaxy = Galaxy::new(WorldSeed::new(42))?;
//! let star = galaxy.star(3, 1, 4)?;
//! assert!(star.constraints().get_u64("planet_count")? > 1);
//! let planet = galaxy.planet(3, 1, 4, 1)?;
//! let orbit = planet.constraints().get_f64("orbit_au")?;
//! assert!(orbit > 0.0);
//!
//! let surface = PlanetSurface::from_entity(&planet)?;
//! let height = surface.elevation(45.0, -120.0)?;
//! assert!((-1.0..=1.0).contains(&height));
//! # Ok::<(), seedscape_cosmos::CosmosError>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod constraints;
pub mod error;
pub mod galaxy;
pub mod planet;
pub mod propagate;
pub mod stellar;

pub use constraints::{ConstraintValue, Constraints};
pub use error::{CosmosError, CosmosResult};
pub use galaxy::{planet_class, ClusterRule, Galaxy, PlanetRule, RegionRule, StarRule};
pub use planet::PlanetSurface;
pub use propagate::{
    child_seed, derive_child, derive_path, ChildContext, DerivationRule, Entity, LayerRule,
};
pub use stellar::SpectralClass;
