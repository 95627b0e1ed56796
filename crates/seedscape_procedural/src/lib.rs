//! # SEEDSCAPE Procedural Generation
//!
//! Position-is-seed generation: every value is a pure function of
//! `(coordinates, salt, seed)`. Nothing is stored, nothing is iterated in
//! sequence, and any point can be evaluated without visiting its
//! neighbours.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: Same seed always produces the same world
//! 2. **Stateless**: No generator state; every call is a pure function
//! 3. **Independent layers**: Distinct salts give uncorrelated properties
//! 4. **Bounded**: Noise, fBm and warped fields all stay in `[-1, 1]`
//!
//! ## Core Components
//!
//! - `hash`: 64-bit coordinate hashing and `WorldSeed`
//! - `stream`: hash to unit floats, bounded integers, chances and picks
//! - `layer`: salted property layers over one coordinate
//! - `noise`: white, value, Perlin and simplex noise
//! - `fractal`: octave stacking (fBm and ridged)
//! - `warp`: domain warping
//! - `sphere`: seamless spherical heightfields
//! - `terrain`: layered elevation blending
//! - `grid`: batch and parallel evaluation
//! - `config`: TOML generator descriptions
//! - `wide`: full-range `u64` in text formats
//!
//! ## Example
//!
//! ```rust
//! use seedscape_procedural::{hash2, Fbm, NoiseKind, OctaveSpec, WorldSeed};
//!
//! let seed = WorldSeed::new(42);
//! assert_eq!(hash2(0, 0, 0, seed), hash2(0, 0, 0, seed));
//!
//! let fbm = Fbm::new(NoiseKind::Simplex, OctaveSpec::default(), seed)?;
//! let height = fbm.sample2(12.5, -3.25);
//! assert!((-1.0..=1.0).contains(&height));
//! # Ok::<(), seedscape_procedural::GenError>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod error;
pub mod fractal;
pub mod grid;
pub mod hash;
pub mod layer;
pub mod noise;
pub mod sphere;
pub mod stream;
pub mod terrain;
pub mod warp;
pub mod wide;

pub use config::{GeneratorConfig, WarpConfig};
pub use error::{GenError, GenResult};
pub use fractal::{fbm2, fbm3, Fbm, FractalMode, OctaveSpec};
pub use grid::{
    hash_batch, par_hash_batch, par_sample_grid, sample_grid, GridSpec, ScalarField2, Viewport,
};
pub use hash::{hash2, hash3, hash_cell, hash_coords, WorldSeed};
pub use layer::{salt, LayerDecode, LayerValue, LayeredExtractor, PropertyLayer};
pub use noise::{
    noise2, noise3, Noise2, Noise3, NoiseKind, NoiseSource, PerlinNoise, SimplexNoise,
    ValueNoise, WhiteNoise,
};
pub use sphere::{
    equirectangular_points, to_unit_sphere, SpherePoint, SphericalHeightfield, SurfaceSource,
};
pub use stream::ValueStream;
pub use terrain::TerrainBlender;
pub use warp::{warp2, DomainWarp, WarpSpec};
pub use wide::WideU64;
