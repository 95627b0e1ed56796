//! # Cosmos Error Types
//!
//! All errors that can occur while deriving entities.

use seedscape_procedural::GenError;
use thiserror::Error;

/// Errors that can occur in the entity hierarchy.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CosmosError {
    /// The underlying generation pipeline rejected a parameter.
    #[error(transparent)]
    Generation(#[from] GenError),

    /// A child tried to redefine a constraint inherited from its parent.
    #[error("constraint conflict: `{key}` is already defined by an ancestor")]
    ConstraintConflict {
        /// The contested key.
        key: String,
    },

    /// A rule needs a parent constraint that is not present.
    #[error("missing constraint: `{key}`")]
    MissingConstraint {
        /// The absent key.
        key: String,
    },

    /// A constraint exists but holds a different type.
    #[error("constraint `{key}` is not a {expected}")]
    ConstraintType {
        /// The key that was read.
        key: String,
        /// The requested type.
        expected: &'static str,
    },

    /// A child index at or past the count its parent declares.
    #[error("index {index} is out of range for `{key}` = {count}")]
    IndexOutOfRange {
        /// The requested child index.
        index: u64,
        /// The parent constraint holding the count.
        key: &'static str,
        /// Number of children the parent has.
        count: u64,
    },

    /// An index path is longer than the rule chain walking it.
    #[error("path depth {depth} exceeds the {available} available derivation rules")]
    PathTooDeep {
        /// Requested depth.
        depth: usize,
        /// Number of rules supplied.
        available: usize,
    },
}

/// Result type for hierarchy operations.
pub type CosmosResult<T> = Result<T, CosmosError>;
