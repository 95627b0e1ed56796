//! # Pipeline Quality Tests
//!
//! Statistical checks over large random samples: hash avalanche, layer
//! independence, lattice artifacts, output ranges and seamlessness.
//!
//! Sample points come from a fixed-seed `ChaCha8Rng`, so every run sees the
//! same points.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use seedscape_procedural::{
    fbm2, hash2, par_sample_grid, salt, sample_grid, stream::unit_f64, warp2, DomainWarp, Fbm,
    GridSpec, LayeredExtractor, Noise2, NoiseKind, NoiseSource, OctaveSpec, SphericalHeightfield,
    TerrainBlender, WarpSpec, WorldSeed,
};

fn rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(0x5EED_5CA9E)
}

fn pearson(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len() as f64;
    let ma = a.iter().sum::<f64>() / n;
    let mb = b.iter().sum::<f64>() / n;
    let (mut cov, mut va, mut vb) = (0.0, 0.0, 0.0);
    for (x, y) in a.iter().zip(b) {
        cov += (x - ma) * (y - mb);
        va += (x - ma) * (x - ma);
        vb += (y - mb) * (y - mb);
    }
    cov / (va * vb).sqrt()
}

/// Test: Flipping one input bit flips about half of the output bits.
#[test]
fn test_hash_avalanche() {
    let mut rng = rng();
    let seed = WorldSeed::new(42);
    let mut flipped = 0u64;
    let mut trials = 0u64;

    for _ in 0..2000 {
        let x: i64 = rng.gen();
        let y: i64 = rng.gen();
        let s: u64 = rng.gen::<u64>() >> 1;
        let base = hash2(x, y, s, seed);
        for bit in 0..64 {
            let mask = 1i64 << bit;
            flipped += u64::from((base ^ hash2(x ^ mask, y, s, seed)).count_ones());
            flipped += u64::from((base ^ hash2(x, y ^ mask, s, seed)).count_ones());
            flipped += u64::from((base ^ hash2(x, y, s ^ (1u64 << bit), seed)).count_ones());
            flipped += u64::from(
                (base ^ hash2(x, y, s, WorldSeed::new(seed.value() ^ (1u64 << bit)))).count_ones(),
            );
            trials += 4;
        }
    }

    let mean = flipped as f64 / trials as f64;
    println!("Average flipped bits: {mean:.3} / 64");
    assert!((31.5..=32.5).contains(&mean), "poor avalanche: {mean}");
}

/// Test: Property layers at random coordinates are uncorrelated.
#[test]
fn test_layer_independence_at_random_coordinates() {
    let mut rng = rng();
    let extractor = LayeredExtractor::new(WorldSeed::new(1234));
    let coords: Vec<[i64; 3]> = (0..20_000)
        .map(|_| {
            [
                rng.gen_range(-1_000_000..1_000_000),
                rng.gen_range(-1_000_000..1_000_000),
                rng.gen_range(0..8),
            ]
        })
        .collect();

    let layers = [salt::EXISTENCE, salt::TEMPERATURE, salt::MASS, salt::ORBIT, 0, 1];
    let series: Vec<Vec<f64>> = layers
        .iter()
        .map(|&s| coords.iter().map(|c| unit_f64(extractor.property(c, s))).collect())
        .collect();

    for i in 0..series.len() {
        for j in (i + 1)..series.len() {
            let r = pearson(&series[i], &series[j]);
            println!("r(layer {i}, layer {j}) = {r:+.4}");
            assert!(r.abs() < 0.04, "layers {i} and {j} correlate: r = {r}");
        }
    }
}

/// Ratio of mean squared noise on lattice rows to rows halfway between.
fn lattice_row_ratio(noise: &NoiseSource, rng: &mut ChaCha8Rng) -> f64 {
    let mut on_row = 0.0;
    let mut between = 0.0;
    let n = 20_000;
    for _ in 0..n {
        let x: f64 = rng.gen_range(-500.0..500.0);
        let k = f64::from(rng.gen_range(-500i32..=500));
        on_row += noise.sample(x, k).powi(2);
        between += noise.sample(x, k + 0.5).powi(2);
    }
    on_row / between
}

/// Test: Simplex noise shows no square-lattice variance pattern while value
/// noise does.
#[test]
fn test_simplex_has_no_grid_artifacts() {
    let mut rng = rng();
    let simplex = NoiseSource::new(NoiseKind::Simplex, WorldSeed::new(42));
    let value = NoiseSource::new(NoiseKind::Value, WorldSeed::new(42));

    let simplex_ratio = lattice_row_ratio(&simplex, &mut rng);
    let value_ratio = lattice_row_ratio(&value, &mut rng);
    println!("Variance ratio on/between lattice rows: simplex {simplex_ratio:.3}, value {value_ratio:.3}");

    assert!(
        (0.9..=1.1).contains(&simplex_ratio),
        "simplex variance depends on lattice rows: {simplex_ratio}"
    );
    assert!(value_ratio > 1.5, "value noise ratio unexpectedly flat: {value_ratio}");
}

/// Test: fBm stays in range everywhere, even far from the origin.
#[test]
fn test_fbm_range_at_random_points() {
    let mut rng = rng();
    let spec = OctaveSpec::new(8, 0.6, 2.1).expect("valid spec");
    for kind in [NoiseKind::Value, NoiseKind::Perlin, NoiseKind::Simplex] {
        let fbm = Fbm::new(kind, spec, WorldSeed::new(99)).expect("valid spec");
        let ridged = Fbm::ridged(kind, spec, WorldSeed::new(99)).expect("valid spec");
        for _ in 0..20_000 {
            let x: f64 = rng.gen_range(-1.0e6..1.0e6);
            let y: f64 = rng.gen_range(-1.0e6..1.0e6);
            let v = fbm.sample2(x, y);
            assert!((-1.0..=1.0).contains(&v), "{kind:?} fbm {v} at ({x}, {y})");
            let r = ridged.sample2(x, y);
            assert!((0.0..=1.0).contains(&r), "{kind:?} ridged {r} at ({x}, {y})");
        }
    }
}

/// Test: A fixed fBm query gives the same bits every time.
#[test]
fn test_fbm_fixed_query_is_stable() {
    let spec = OctaveSpec::new(6, 0.5, 2.0).expect("valid spec");
    let first = fbm2([1.5, 2.5], &spec, WorldSeed::new(7)).expect("finite point");
    for _ in 0..1000 {
        let again = fbm2([1.5, 2.5], &spec, WorldSeed::new(7)).expect("finite point");
        assert_eq!(first.to_bits(), again.to_bits());
    }
}

/// Test: Zero-strength warp reproduces fBm at random points.
#[test]
fn test_zero_warp_matches_fbm() {
    let mut rng = rng();
    let spec = OctaveSpec::default();
    for _ in 0..500 {
        let p = [rng.gen_range(-1000.0..1000.0), rng.gen_range(-1000.0..1000.0)];
        assert_eq!(warp2(p, 0.0, &spec, WorldSeed::new(5)), fbm2(p, &spec, WorldSeed::new(5)));
    }
}

/// Test: Warped fields differ from the base field but keep its range.
#[test]
fn test_warp_distorts_within_range() {
    let mut rng = rng();
    let warp = DomainWarp::uniform(
        NoiseKind::Simplex,
        OctaveSpec::default(),
        WarpSpec::new(6.0, true).expect("valid warp"),
        WorldSeed::new(8),
    )
    .expect("valid warp");

    let mut diff = 0.0;
    for _ in 0..5000 {
        let x: f64 = rng.gen_range(-200.0..200.0);
        let y: f64 = rng.gen_range(-200.0..200.0);
        let w = warp.sample2(x, y);
        assert!((-1.0..=1.0).contains(&w));
        diff += (w - warp.base().sample2(x, y)).abs();
    }
    let mean_diff = diff / 5000.0;
    println!("Mean |warp - fbm|: {mean_diff:.4}");
    assert!(mean_diff > 0.05);
}

/// Test: Planet surfaces close up at the antimeridian at every latitude.
#[test]
fn test_planet_surface_is_seamless() {
    let fbm = Fbm::new(NoiseKind::Simplex, OctaveSpec::default(), WorldSeed::new(31))
        .expect("valid spec");
    let surface = SphericalHeightfield::new(fbm, 3.0).expect("valid frequency");
    let map = surface.equirectangular(360, 181).expect("valid size");

    let mut max_jump = 0.0f64;
    for row in 0..181 {
        let west = map[row * 360];
        let east = map[row * 360 + 359];
        max_jump = max_jump.max((west - east).abs());
    }
    let mut max_step = 0.0f64;
    for row in 0..181 {
        for col in 1..360 {
            max_step = max_step.max((map[row * 360 + col] - map[row * 360 + col - 1]).abs());
        }
    }
    println!("Seam jump {max_jump:.4}, largest interior step {max_step:.4}");
    assert!(max_jump <= max_step, "seam is rougher than the interior");
}

/// Test: Parallel grid evaluation matches sequential output bit for bit.
#[test]
fn test_parallel_grids_match() {
    let grid = GridSpec::new([-512.0, 256.0], 4.0, 128, 96).expect("valid grid");
    let terrain = TerrainBlender::new(WorldSeed::new(2024)).expect("valid terrain");
    let seq = sample_grid(&terrain, &grid);
    let par = par_sample_grid(&terrain, &grid);
    assert!(seq.iter().zip(&par).all(|(a, b)| a.to_bits() == b.to_bits()));
}

/// Test: Terrain has both water and mountains in a large area.
#[test]
fn test_terrain_variety() {
    let terrain = TerrainBlender::new(WorldSeed::new(42)).expect("valid terrain");
    let mut water = 0;
    let mut mountains = 0;
    let mut total = 0;
    for z in (-2000..2000i32).step_by(20) {
        for x in (-2000..2000i32).step_by(20) {
            let e = terrain.elevation(f64::from(x), f64::from(z));
            if e < -0.2 {
                water += 1;
            }
            if e >= 0.4 {
                mountains += 1;
            }
            total += 1;
        }
    }
    println!("Water {water} / {total}, mountains {mountains} / {total}");
    assert!(water > 0, "no water in a 4000x4000 area");
    assert!(mountains > 0, "no mountains in a 4000x4000 area");
}
