//! # Batch Evaluation
//!
//! Evaluates fields over regular grids and hashes coordinate batches.
//!
//! Every sample is independent of its neighbours, so grids split cleanly
//! across threads. The parallel functions compute each cell with exactly the
//! same arithmetic as the sequential ones and therefore return bit-identical
//! buffers.

use rayon::prelude::*;

use crate::error::{check_coords, GenError, GenResult};
use crate::fractal::Fbm;
use crate::hash::{hash_coords, WorldSeed};
use crate::noise::{Noise2, NoiseSource};
use crate::terrain::TerrainBlender;
use crate::warp::DomainWarp;

/// A continuous 2D field that can be sampled anywhere.
pub trait ScalarField2: Sync {
    /// Value of the field at `(x, y)`.
    fn value_at(&self, x: f64, y: f64) -> f64;
}

impl ScalarField2 for NoiseSource {
    #[inline]
    fn value_at(&self, x: f64, y: f64) -> f64 {
        self.sample(x, y)
    }
}

impl ScalarField2 for Fbm {
    #[inline]
    fn value_at(&self, x: f64, y: f64) -> f64 {
        self.sample2(x, y)
    }
}

impl ScalarField2 for DomainWarp {
    #[inline]
    fn value_at(&self, x: f64, y: f64) -> f64 {
        self.sample2(x, y)
    }
}

impl ScalarField2 for TerrainBlender {
    #[inline]
    fn value_at(&self, x: f64, y: f64) -> f64 {
        self.elevation(x, y)
    }
}

/// A regular, row-major sampling grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridSpec {
    origin: [f64; 2],
    step: f64,
    width: usize,
    height: usize,
}

impl GridSpec {
    /// Creates a grid whose cell `(col, row)` sits at
    /// `origin + (col, row) * step`.
    ///
    /// # Errors
    ///
    /// Returns [`GenError::InvalidParameter`] for a zero dimension or a
    /// non-positive step, and [`GenError::InvalidCoordinate`] if any corner
    /// is not a usable coordinate.
    pub fn new(origin: [f64; 2], step: f64, width: usize, height: usize) -> GenResult<Self> {
        if width == 0 || height == 0 {
            return Err(GenError::invalid(
                "dimensions",
                format!("{width}x{height} grid has no cells"),
            ));
        }
        if !(step > 0.0 && step.is_finite()) {
            return Err(GenError::invalid(
                "step",
                format!("{step} must be finite and positive"),
            ));
        }
        let grid = Self {
            origin,
            step,
            width,
            height,
        };
        let (far_x, far_y) = grid.world_at(width - 1, height - 1);
        check_coords(&origin)?;
        check_coords(&[far_x, far_y])?;
        Ok(grid)
    }

    /// Grid origin (cell `(0, 0)`).
    #[must_use]
    pub const fn origin(&self) -> [f64; 2] {
        self.origin
    }

    /// Distance between neighbouring cells.
    #[must_use]
    pub const fn step(&self) -> f64 {
        self.step
    }

    /// Columns.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Rows.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Total number of cells.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.width * self.height
    }

    /// Always false; a grid has at least one cell.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// World coordinate of a cell.
    #[inline]
    #[must_use]
    pub fn world_at(&self, col: usize, row: usize) -> (f64, f64) {
        (
            self.origin[0] + col as f64 * self.step,
            self.origin[1] + row as f64 * self.step,
        )
    }
}

/// A view onto a field at some magnification.
///
/// Every zoom level samples the same continuous field, so zooming in only
/// reveals finer detail of what was already there.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    center: [f64; 2],
    zoom: f64,
    base_step: f64,
}

impl Viewport {
    /// Creates a viewport; at `zoom = 1` neighbouring pixels are
    /// `base_step` apart.
    ///
    /// # Errors
    ///
    /// Returns [`GenError::InvalidParameter`] for a non-positive zoom or
    /// step, and [`GenError::InvalidCoordinate`] for a non-finite center.
    pub fn new(center: [f64; 2], zoom: f64, base_step: f64) -> GenResult<Self> {
        check_coords(&center)?;
        if !(zoom > 0.0 && zoom.is_finite()) {
            return Err(GenError::invalid("zoom", format!("{zoom} must be finite and positive")));
        }
        if !(base_step > 0.0 && base_step.is_finite()) {
            return Err(GenError::invalid(
                "base_step",
                format!("{base_step} must be finite and positive"),
            ));
        }
        Ok(Self {
            center,
            zoom,
            base_step,
        })
    }

    /// Current magnification.
    #[must_use]
    pub const fn zoom(&self) -> f64 {
        self.zoom
    }

    /// World coordinate at the middle of the view.
    #[must_use]
    pub const fn center(&self) -> [f64; 2] {
        self.center
    }

    /// The same view magnified by `factor`.
    ///
    /// # Errors
    ///
    /// Returns [`GenError::InvalidParameter`] if the new zoom is not finite
    /// and positive.
    pub fn zoomed(&self, factor: f64) -> GenResult<Self> {
        Self::new(self.center, self.zoom * factor, self.base_step)
    }

    /// The same view moved to a new center.
    ///
    /// # Errors
    ///
    /// Returns [`GenError::InvalidCoordinate`] for a non-finite center.
    pub fn panned(&self, center: [f64; 2]) -> GenResult<Self> {
        Self::new(center, self.zoom, self.base_step)
    }

    /// The sampling grid for a `width x height` pixel view.
    ///
    /// # Errors
    ///
    /// See [`GridSpec::new`].
    pub fn grid(&self, width: usize, height: usize) -> GenResult<GridSpec> {
        let step = self.base_step / self.zoom;
        let half_w = (width.saturating_sub(1)) as f64 * 0.5;
        let half_h = (height.saturating_sub(1)) as f64 * 0.5;
        GridSpec::new(
            [self.center[0] - half_w * step, self.center[1] - half_h * step],
            step,
            width,
            height,
        )
    }
}

/// Samples a field over a grid, row-major.
pub fn sample_grid<F: ScalarField2 + ?Sized>(field: &F, grid: &GridSpec) -> Vec<f64> {
    let mut out = Vec::with_capacity(grid.len());
    for row in 0..grid.height {
        for col in 0..grid.width {
            let (x, y) = grid.world_at(col, row);
            out.push(field.value_at(x, y));
        }
    }
    out
}

/// Parallel [`sample_grid`], one row per task.
pub fn par_sample_grid<F: ScalarField2 + ?Sized>(field: &F, grid: &GridSpec) -> Vec<f64> {
    let mut out = vec![0.0; grid.len()];
    out.par_chunks_mut(grid.width)
        .enumerate()
        .for_each(|(row, cells)| {
            for (col, cell) in cells.iter_mut().enumerate() {
                let (x, y) = grid.world_at(col, row);
                *cell = field.value_at(x, y);
            }
        });
    out
}

/// Hashes a batch of integer coordinates under one salt.
#[must_use]
pub fn hash_batch<const N: usize>(coords: &[[i64; N]], salt: u64, seed: WorldSeed) -> Vec<u64> {
    coords.iter().map(|c| hash_coords(c, salt, seed)).collect()
}

/// Parallel [`hash_batch`]; the result is in input order.
#[must_use]
pub fn par_hash_batch<const N: usize>(coords: &[[i64; N]], salt: u64, seed: WorldSeed) -> Vec<u64> {
    coords.par_iter().map(|c| hash_coords(c, salt, seed)).collect()
}
