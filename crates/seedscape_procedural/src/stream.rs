//! # Value Streams
//!
//! Turns a raw 64-bit hash into typed ranges: unit floats, bounded integers,
//! weighted booleans and categorical picks.
//!
//! Every function here is a pure conversion of its `u64` argument. There is
//! no hidden generator state anywhere; drawing several values from one key
//! goes through [`ValueStream`], which is itself a plain value.

use crate::error::{GenError, GenResult};
use crate::hash::{mix64, GOLDEN_GAMMA};

/// Scale from a 53-bit integer to `[0, 1)`.
const UNIT_SCALE: f64 = 1.0 / (1u64 << 53) as f64;

/// Maps a hash to `[0, 1)` using its top 53 bits.
#[inline]
#[must_use]
pub fn unit_f64(h: u64) -> f64 {
    (h >> 11) as f64 * UNIT_SCALE
}

/// Maps a hash to `[-1, 1)`.
#[inline]
#[must_use]
pub fn signed_unit(h: u64) -> f64 {
    unit_f64(h).mul_add(2.0, -1.0)
}

/// Maps a hash to `[min, max)`.
#[inline]
#[must_use]
pub fn range_f64(h: u64, min: f64, max: f64) -> f64 {
    min + (max - min) * unit_f64(h)
}

/// Maps a hash to `[0, n)` with a multiply-high reduction.
///
/// Bias is at most `n / 2^64` per bucket, which is negligible for every `n`
/// this crate deals with. Unlike `h % n`, the high bits decide the result.
///
/// # Errors
///
/// Returns [`GenError::InvalidParameter`] when `n == 0`.
#[inline]
pub fn bounded(h: u64, n: u64) -> GenResult<u64> {
    if n == 0 {
        return Err(GenError::invalid("n", "bound must be at least 1"));
    }
    Ok(bounded_unchecked(h, n))
}

/// Multiply-high reduction without the `n > 0` check.
///
/// Returns 0 when `n == 0`.
#[inline]
#[must_use]
pub(crate) fn bounded_unchecked(h: u64, n: u64) -> u64 {
    ((u128::from(h) * u128::from(n)) >> 64) as u64
}

/// Returns `true` with probability `p`.
///
/// # Errors
///
/// Returns [`GenError::InvalidParameter`] unless `0 <= p <= 1`.
#[inline]
pub fn chance(h: u64, p: f64) -> GenResult<bool> {
    if !(0.0..=1.0).contains(&p) {
        return Err(GenError::invalid("p", format!("probability {p} outside [0, 1]")));
    }
    Ok(unit_f64(h) < p)
}

/// Picks one item from a non-empty slice.
///
/// # Errors
///
/// Returns [`GenError::InvalidParameter`] for an empty slice.
#[inline]
pub fn pick<T>(h: u64, items: &[T]) -> GenResult<&T> {
    let index = bounded(h, items.len() as u64)
        .map_err(|_| GenError::invalid("items", "cannot pick from an empty list"))?;
    // bounded() keeps index < len
    items
        .get(index as usize)
        .ok_or_else(|| GenError::invalid("items", "index out of range"))
}

/// A counter-keyed stream of values derived from one base hash.
///
/// `draw(k)` is a pure function of `(base, k)`; `next_*` merely walks `k`
/// forward on a local copy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ValueStream {
    base: u64,
    counter: u64,
}

impl ValueStream {
    /// Creates a stream over a base hash.
    #[inline]
    #[must_use]
    pub const fn new(base: u64) -> Self {
        Self { base, counter: 0 }
    }

    /// The `k`-th value of the stream.
    #[inline]
    #[must_use]
    pub const fn draw(&self, k: u64) -> u64 {
        mix64(self.base.wrapping_add(k.wrapping_add(1).wrapping_mul(GOLDEN_GAMMA)))
    }

    /// Next raw value.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let value = self.draw(self.counter);
        self.counter = self.counter.wrapping_add(1);
        value
    }

    /// Next value in `[0, 1)`.
    #[inline]
    pub fn next_f64(&mut self) -> f64 {
        unit_f64(self.next_u64())
    }

    /// Next value in `[min, max)`.
    #[inline]
    pub fn next_range(&mut self, min: f64, max: f64) -> f64 {
        range_f64(self.next_u64(), min, max)
    }
}
