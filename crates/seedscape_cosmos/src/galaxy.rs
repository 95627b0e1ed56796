//! # Galaxy Chain
//!
//! The concrete hierarchy `galaxy -> region -> cluster -> star -> planet`.
//!
//! Each level reads what it needs from its ancestors and adds its own keys:
//!
//! | Level   | Reads                                  | Adds |
//! |---------|----------------------------------------|------|
//! | galaxy  |                                        | `galaxy_age_gyr`, `spiral_arms` |
//! | region  | `galaxy_age_gyr`                       | `region_age_gyr`, `metallicity`, `stellar_density` |
//! | cluster | `region_age_gyr`, `stellar_density`    | `star_count`, `dominant_type_bias` |
//! | star    | `dominant_type_bias`                   | mass, luminosity, radius, temperature, class, zones, `planet_count` |
//! | planet  | star mass, zones, frost line           | orbit, period, habitability, class, mass, `terrain_seed` |

use seedscape_procedural::stream::{bounded, range_f64, unit_f64};
use seedscape_procedural::{salt, LayeredExtractor, WorldSeed};

use crate::constraints::{ConstraintValue, Constraints};
use crate::error::{CosmosError, CosmosResult};
use crate::propagate::{derive_path, ChildContext, DerivationRule, Entity};
use crate::stellar::{
    frost_line, habitable_zone, imf_mass, luminosity_from_mass, orbital_period_years,
    radius_from_mass, temperature_from, SpectralClass,
};

/// Oldest possible galaxy, in Gyr.
const MAX_GALAXY_AGE: f64 = 13.5;

fn prop(key: &str, value: impl Into<ConstraintValue>) -> (String, ConstraintValue) {
    (key.to_owned(), value.into())
}

/// Rejects a child index the parent's `key` count does not cover.
fn check_index(ctx: &ChildContext<'_>, key: &'static str) -> CosmosResult<()> {
    let count = ctx.inherited().get_u64(key)?;
    if ctx.index() >= count {
        return Err(CosmosError::IndexOutOfRange {
            index: ctx.index(),
            key,
            count,
        });
    }
    Ok(())
}

/// Regions: age, metallicity and stellar density.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegionRule;

impl DerivationRule for RegionRule {
    fn kind(&self) -> &str {
        "region"
    }

    fn derive(&self, ctx: &ChildContext<'_>) -> CosmosResult<Vec<(String, ConstraintValue)>> {
        let galaxy_age = ctx.inherited().get_f64("galaxy_age_gyr")?;
        let age = range_f64(ctx.hash(salt::AGE), 0.5, galaxy_age);
        // older gas has been enriched less
        let metallicity = 0.3 - 0.08 * age + range_f64(ctx.hash(salt::METALLICITY), -0.3, 0.3);
        let density = range_f64(ctx.hash(salt::DENSITY), 0.1, 1.0);
        Ok(vec![
            prop("region_age_gyr", age),
            prop("metallicity", metallicity),
            prop("stellar_density", density),
        ])
    }
}

/// Clusters: star count and the light-star bias of old regions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClusterRule;

impl ClusterRule {
    /// Bias towards light stars for a region age in Gyr, in `[0, 0.8]`.
    #[must_use]
    pub fn dominant_type_bias(region_age_gyr: f64) -> f64 {
        (region_age_gyr / MAX_GALAXY_AGE).clamp(0.0, 1.0) * 0.8
    }
}

impl DerivationRule for ClusterRule {
    fn kind(&self) -> &str {
        "cluster"
    }

    fn derive(&self, ctx: &ChildContext<'_>) -> CosmosResult<Vec<(String, ConstraintValue)>> {
        let parent = ctx.inherited();
        let age = parent.get_f64("region_age_gyr")?;
        let density = parent.get_f64("stellar_density")?;
        let span = 1 + (density * 190.0) as u64;
        let star_count = 10 + bounded(ctx.hash(salt::COUNT), span)?;
        Ok(vec![
            prop("star_count", star_count),
            prop("dominant_type_bias", Self::dominant_type_bias(age)),
        ])
    }
}

/// Stars: IMF mass and the stellar formula chain.
///
/// Only indices below the cluster's `star_count` exist.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StarRule;

impl DerivationRule for StarRule {
    fn kind(&self) -> &str {
        "star"
    }

    fn derive(&self, ctx: &ChildContext<'_>) -> CosmosResult<Vec<(String, ConstraintValue)>> {
        let bias = ctx.inherited().get_f64("dominant_type_bias")?;
        check_index(ctx, "star_count")?;
        let mass = imf_mass(unit_f64(ctx.hash(salt::MASS)), bias);
        let luminosity = luminosity_from_mass(mass);
        let radius = radius_from_mass(mass);
        let temperature = temperature_from(luminosity, radius);
        let class = SpectralClass::from_temperature(temperature);
        let (hz_inner, hz_outer) = habitable_zone(luminosity);
        let planet_count = bounded(ctx.hash(salt::COUNT), 10)?;
        Ok(vec![
            prop("star_mass", mass),
            prop("luminosity", luminosity),
            prop("radius", radius),
            prop("temperature_k", temperature),
            prop("spectral_class", class.as_str()),
            prop("hz_inner_au", hz_inner),
            prop("hz_outer_au", hz_outer),
            prop("frost_line_au", frost_line(luminosity)),
            prop("planet_count", planet_count),
        ])
    }
}

/// Planet families.
pub mod planet_class {
    /// Small rocky world.
    pub const TERRESTRIAL: &str = "terrestrial";
    /// Rocky world up to ten Earth masses.
    pub const SUPER_EARTH: &str = "super_earth";
    /// Cold giant dominated by ices.
    pub const ICE_GIANT: &str = "ice_giant";
    /// Hydrogen giant.
    pub const GAS_GIANT: &str = "gas_giant";
}

/// Planets: orbit, habitability and class.
///
/// Only indices below the star's `planet_count` exist.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlanetRule;

impl PlanetRule {
    /// Innermost orbit, in AU.
    const MIN_ORBIT: f64 = 0.05;
    /// Outermost orbit, in AU.
    const MAX_ORBIT: f64 = 50.0;
}

impl DerivationRule for PlanetRule {
    fn kind(&self) -> &str {
        "planet"
    }

    fn derive(&self, ctx: &ChildContext<'_>) -> CosmosResult<Vec<(String, ConstraintValue)>> {
        let star = ctx.inherited();
        let star_mass = star.get_f64("star_mass")?;
        let hz_inner = star.get_f64("hz_inner_au")?;
        let hz_outer = star.get_f64("hz_outer_au")?;
        let frost = star.get_f64("frost_line_au")?;
        check_index(ctx, "planet_count")?;

        // log-uniform orbit
        let u = unit_f64(ctx.hash(salt::ORBIT));
        let orbit = Self::MIN_ORBIT * (Self::MAX_ORBIT / Self::MIN_ORBIT).powf(u);

        let mut roll = ctx.stream(salt::MASS);
        let (class, mass_earth) = if orbit < frost {
            let mass = 0.05 * 200.0f64.powf(roll.next_f64());
            let class = if mass < 2.0 {
                planet_class::TERRESTRIAL
            } else {
                planet_class::SUPER_EARTH
            };
            (class, mass)
        } else if roll.next_f64() < 0.5 {
            (planet_class::ICE_GIANT, roll.next_range(10.0, 50.0))
        } else {
            (planet_class::GAS_GIANT, roll.next_range(50.0, 4000.0))
        };

        Ok(vec![
            prop("orbit_au", orbit),
            prop("orbital_period_years", orbital_period_years(orbit, star_mass)),
            prop("in_habitable_zone", (hz_inner..=hz_outer).contains(&orbit)),
            prop("planet_class", class),
            prop("planet_mass_earth", mass_earth),
            prop("terrain_seed", ctx.hash(salt::TERRAIN)),
        ])
    }
}

/// A galaxy and its drill-down chain.
#[derive(Clone, Debug, PartialEq)]
pub struct Galaxy {
    root: Entity,
}

impl Galaxy {
    /// Creates the galaxy for a seed.
    ///
    /// # Errors
    ///
    /// Never fails for a fresh root; the signature matches the derivation
    /// functions.
    pub fn new(seed: WorldSeed) -> CosmosResult<Self> {
        let extractor = LayeredExtractor::new(seed);
        let age = range_f64(extractor.property(&[], salt::AGE), 8.0, MAX_GALAXY_AGE);
        let arms = 2 + bounded(extractor.property(&[], salt::COUNT), 5)?;
        let constraints = Constraints::from_properties([
            prop("galaxy_age_gyr", age),
            prop("spiral_arms", arms),
        ])?;
        tracing::debug!(seed = seed.value(), age_gyr = age, arms, "created galaxy");
        Ok(Self {
            root: Entity::root("galaxy", seed, constraints),
        })
    }

    /// The galaxy entity.
    #[must_use]
    pub const fn root(&self) -> &Entity {
        &self.root
    }

    /// Rules applied at depths 1 to 4.
    #[must_use]
    pub fn rules() -> [&'static dyn DerivationRule; 4] {
        [&RegionRule, &ClusterRule, &StarRule, &PlanetRule]
    }

    /// Any entity by index path (at most four levels deep).
    ///
    /// # Errors
    ///
    /// Returns [`CosmosError::PathTooDeep`] beyond the planet level and
    /// [`CosmosError::IndexOutOfRange`] for a star or planet index past its
    /// parent's count.
    pub fn entity(&self, path: &[u64]) -> CosmosResult<Entity> {
        derive_path(&self.root, path, &Self::rules())
    }

    /// Region `r`.
    ///
    /// # Errors
    ///
    /// Propagates derivation errors.
    pub fn region(&self, r: u64) -> CosmosResult<Entity> {
        self.entity(&[r])
    }

    /// Cluster `c` of region `r`.
    ///
    /// # Errors
    ///
    /// Propagates derivation errors.
    pub fn cluster(&self, r: u64, c: u64) -> CosmosResult<Entity> {
        self.entity(&[r, c])
    }

    /// Star `s` of cluster `(r, c)`.
    ///
    /// # Errors
    ///
    /// Propagates derivation errors.
    pub fn star(&self, r: u64, c: u64, s: u64) -> CosmosResult<Entity> {
        self.entity(&[r, c, s])
    }

    /// Planet `p` of star `(r, c, s)`.
    ///
    /// # Errors
    ///
    /// Propagates derivation errors.
    pub fn planet(&self, r: u64, c: u64, s: u64, p: u64) -> CosmosResult<Entity> {
        self.entity(&[r, c, s, p])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::propagate::derive_child;

    fn galaxy() -> Galaxy {
        Galaxy::new(WorldSeed::new(42)).expect("fresh galaxy")
    }

    #[test]
    fn test_galaxy_root() {
        let g = galaxy();
        let age = g.root().constraints().get_f64("galaxy_age_gyr").expect("set");
        assert!((8.0..MAX_GALAXY_AGE).contains(&age));
        let arms = g.root().constraints().get_u64("spiral_arms").expect("set");
        assert!((2..7).contains(&arms));
        assert_eq!(g, galaxy());
    }

    #[test]
    fn test_planet_is_deterministic() {
        // star (3, 1, 4) has three planets
        let a = galaxy().planet(3, 1, 4, 1).expect("derivable");
        let b = galaxy().planet(3, 1, 4, 1).expect("derivable");
        assert_eq!(a, b);
        assert_eq!(a.kind(), "planet");
        assert_eq!(a.path(), &[3, 1, 4, 1]);
    }

    #[test]
    fn test_chain_accumulates_constraints() {
        let g = galaxy();
        let planet = g.planet(0, 0, 0, 0).expect("derivable");
        let c = planet.constraints();
        for key in [
            "galaxy_age_gyr",
            "region_age_gyr",
            "star_count",
            "dominant_type_bias",
            "star_mass",
            "spectral_class",
            "orbit_au",
            "terrain_seed",
        ] {
            assert!(c.contains(key), "missing {key}");
        }
        let region_age = c.get_f64("region_age_gyr").expect("set");
        assert!(region_age <= c.get_f64("galaxy_age_gyr").expect("set"));
    }

    #[test]
    fn test_star_properties_are_consistent() {
        let g = galaxy();
        let count = g.cluster(1, 2).expect("derivable").constraints().get_u64("star_count");
        let count = count.expect("set");
        assert!((10..=200).contains(&count));
        for s in 0..count {
            let star = g.star(1, 2, s).expect("derivable");
            let c = star.constraints();
            let mass = c.get_f64("star_mass").expect("set");
            assert!((0.08..=100.0).contains(&mass));
            let t = c.get_f64("temperature_k").expect("set");
            assert_eq!(
                c.get_text("spectral_class").expect("set"),
                SpectralClass::from_temperature(t).as_str()
            );
            assert!(c.get_f64("hz_inner_au").expect("set") < c.get_f64("hz_outer_au").expect("set"));
        }
    }

    #[test]
    fn test_habitable_flag_matches_zone() {
        let g = galaxy();
        let mut checked = 0;
        for s in 0..10 {
            let count = g.star(1, 2, s).expect("derivable").constraints().get_u64("planet_count");
            for p in 0..count.expect("set") {
                checked += 1;
                let planet = g.planet(1, 2, s, p).expect("derivable");
                let c = planet.constraints();
                let orbit = c.get_f64("orbit_au").expect("set");
                assert!((0.05..=50.0).contains(&orbit));
                let inside = orbit >= c.get_f64("hz_inner_au").expect("set")
                    && orbit <= c.get_f64("hz_outer_au").expect("set");
                assert_eq!(c.get_bool("in_habitable_zone"), Ok(inside));
                let rocky = orbit < c.get_f64("frost_line_au").expect("set");
                let class = c.get_text("planet_class").expect("set");
                assert_eq!(
                    rocky,
                    class == planet_class::TERRESTRIAL || class == planet_class::SUPER_EARTH
                );
            }
        }
        assert!(checked > 20, "only {checked} planets derived");
    }

    #[test]
    fn test_indices_stop_at_the_parent_count() {
        let g = galaxy();
        let stars = g.cluster(1, 2).expect("derivable").constraints().get_u64("star_count");
        let stars = stars.expect("set");
        assert!(g.star(1, 2, stars - 1).is_ok());
        assert_eq!(
            g.star(1, 2, stars),
            Err(CosmosError::IndexOutOfRange { index: stars, key: "star_count", count: stars })
        );
        assert!(matches!(
            g.planet(1, 2, stars + 5, 0),
            Err(CosmosError::IndexOutOfRange { key: "star_count", .. })
        ));

        let star = g.star(3, 1, 4).expect("derivable");
        let planets = star.constraints().get_u64("planet_count").expect("set");
        assert_eq!(planets, 3);
        assert!(g.planet(3, 1, 4, planets - 1).is_ok());
        assert_eq!(
            g.planet(3, 1, 4, planets),
            Err(CosmosError::IndexOutOfRange { index: 3, key: "planet_count", count: 3 })
        );
        assert!(g.planet(3, 1, 4, u64::MAX).is_err());
    }

    #[test]
    fn test_planetless_star_has_no_planets() {
        let g = galaxy();
        let star = g.star(2, 0, 1).expect("derivable");
        assert_eq!(star.constraints().get_u64("planet_count"), Ok(0));
        assert!(matches!(
            g.planet(2, 0, 1, 0),
            Err(CosmosError::IndexOutOfRange { index: 0, count: 0, .. })
        ));
    }

    #[test]
    fn test_old_regions_favour_light_stars() {
        assert_eq!(ClusterRule::dominant_type_bias(0.0), 0.0);
        assert!(ClusterRule::dominant_type_bias(12.0) > ClusterRule::dominant_type_bias(2.0));
        assert!(ClusterRule::dominant_type_bias(100.0) <= 0.8);
    }

    #[test]
    fn test_rules_need_their_parents() {
        let g = galaxy();
        assert_eq!(
            derive_child(g.root(), 0, &StarRule),
            Err(CosmosError::MissingConstraint { key: "dominant_type_bias".into() })
        );
        assert!(matches!(
            g.entity(&[0, 0, 0, 0, 0]),
            Err(CosmosError::PathTooDeep { depth: 5, available: 4 })
        ));
    }
}
