//! Error types for query rewriting.

use thiserror::Error;

/// Errors that can occur while rewriting a query tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RewriteError {
    /// An adjacency operator is already at the largest representable distance.
    #[error("adjacency distance {distance} cannot be widened")]
    DistanceOverflow {
        /// The distance that could not be incremented.
        distance: u32,
    },

    /// A transformation name did not match any known transformation.
    #[error("unknown transformation: {name}")]
    UnknownTransformation {
        /// The rejected name.
        name: String,
    },
}
