//! # Generation Error Types
//!
//! All errors that can occur while evaluating the generation pipeline.
//!
//! Every error here is a programmer error: an out-of-domain parameter or a
//! coordinate that cannot be placed on the integer lattice. None of them are
//! retryable. Integer wraparound inside the hash is *not* an error; all hash
//! arithmetic is defined as wrapping `u64` arithmetic.

use thiserror::Error;

/// Errors that can occur in the generation pipeline.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenError {
    /// A parameter is outside its valid domain.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// A coordinate is NaN, infinite, or outside the hashable lattice range.
    #[error("invalid coordinate on axis {axis}: {value}")]
    InvalidCoordinate {
        /// Index of the offending axis (0 = x, 1 = y, 2 = z).
        axis: usize,
        /// The rejected value.
        value: f64,
    },

    /// A configuration document could not be parsed or validated.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A configuration file could not be read.
    #[error("io error: {0}")]
    Io(String),
}

impl GenError {
    /// Shorthand for [`GenError::InvalidParameter`].
    #[must_use]
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}

/// Result type for generation operations.
pub type GenResult<T> = Result<T, GenError>;

/// Largest lattice magnitude a float coordinate may floor to.
///
/// Beyond 2^53 consecutive integers are no longer representable in `f64`,
/// so distinct cells would collapse onto the same lattice point.
pub const MAX_LATTICE: f64 = 9_007_199_254_740_992.0;

/// Rejects non-finite coordinates and coordinates outside `±MAX_LATTICE`.
///
/// # Errors
///
/// Returns [`GenError::InvalidCoordinate`] naming the first offending axis.
pub fn check_coords(coords: &[f64]) -> GenResult<()> {
    check_reach(coords, 0.0, 1.0)
}

/// Rejects coordinates whose furthest sample leaves the lattice range.
///
/// A field that pads a point by up to `pad` and then scales it by up to
/// `frequency` reaches `(|c| + pad) * frequency`; that reach must stay
/// below `MAX_LATTICE`.
///
/// # Errors
///
/// Returns [`GenError::InvalidCoordinate`] naming the first offending axis.
pub fn check_reach(coords: &[f64], pad: f64, frequency: f64) -> GenResult<()> {
    for (axis, &value) in coords.iter().enumerate() {
        if !value.is_finite() || (value.abs() + pad) * frequency >= MAX_LATTICE {
            return Err(GenError::InvalidCoordinate { axis, value });
        }
    }
    Ok(())
}
