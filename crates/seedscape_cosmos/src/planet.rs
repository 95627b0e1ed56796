//! # Planet Surfaces
//!
//! Binds a planet entity's `terrain_seed` to a spherical heightfield, so the
//! surface is as reproducible as the planet itself: same galaxy seed and
//! same index path, same mountains.

use seedscape_procedural::{
    DomainWarp, Fbm, NoiseKind, OctaveSpec, SphericalHeightfield, WarpSpec, WorldSeed,
};

use crate::error::CosmosResult;
use crate::galaxy::planet_class;
use crate::propagate::Entity;

/// The sampled surface of one planet.
#[derive(Clone, Debug, PartialEq)]
pub struct PlanetSurface {
    seed: WorldSeed,
    heightfield: SphericalHeightfield,
}

impl PlanetSurface {
    /// Builds the surface of a planet entity.
    ///
    /// Rocky planets get warped, detailed terrain; giants get smooth,
    /// low-frequency cloud bands.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CosmosError::MissingConstraint`] or
    /// [`crate::CosmosError::ConstraintType`] if `terrain_seed` or
    /// `planet_class` is absent or mistyped.
    pub fn from_entity(planet: &Entity) -> CosmosResult<Self> {
        let constraints = planet.constraints();
        let seed = WorldSeed::new(constraints.get_u64("terrain_seed")?);
        let class = constraints.get_text("planet_class")?;
        let rocky = class == planet_class::TERRESTRIAL || class == planet_class::SUPER_EARTH;

        let heightfield = if rocky {
            let warp = DomainWarp::new(
                NoiseKind::Simplex,
                OctaveSpec::new(6, 0.5, 2.0)?,
                OctaveSpec::new(3, 0.5, 2.0)?,
                WarpSpec::new(0.4, false)?,
                seed,
            )?;
            SphericalHeightfield::new(warp, 1.5)?
        } else {
            let bands = Fbm::new(NoiseKind::Simplex, OctaveSpec::new(3, 0.5, 2.0)?, seed)?;
            SphericalHeightfield::new(bands, 0.8)?
        };
        tracing::debug!(
            path = ?planet.path(),
            class,
            terrain_seed = seed.value(),
            "built planet surface"
        );
        Ok(Self { seed, heightfield })
    }

    /// Seed of the surface field.
    #[must_use]
    pub const fn seed(&self) -> WorldSeed {
        self.seed
    }

    /// The underlying heightfield.
    #[must_use]
    pub const fn heightfield(&self) -> &SphericalHeightfield {
        &self.heightfield
    }

    /// Surface height in `[-1, 1]` at latitude/longitude in degrees.
    ///
    /// # Errors
    ///
    /// Returns an invalid-coordinate error for non-finite input or a
    /// latitude outside `[-90, 90]`.
    pub fn elevation(&self, lat_deg: f64, lon_deg: f64) -> CosmosResult<f64> {
        Ok(self.heightfield.sample(lat_deg, lon_deg)?)
    }

    /// Row-major equirectangular height map, evaluated in parallel.
    ///
    /// # Errors
    ///
    /// Returns an invalid-parameter error for a zero dimension.
    pub fn map(&self, width: usize, height: usize) -> CosmosResult<Vec<f64>> {
        Ok(self.heightfield.par_equirectangular(width, height)?)
    }
}
