//! Syntactic rewrites of Boolean query trees.
//!
//! Each transformation maps a query to a set of nearby variants:
//!
//! - [`LogicalOperatorReplacement`]: `AND` ↔ `OR`, at most two operators changed
//! - [`AdjacencyRange`]: `ADJn` → `ADJ(n±1)`, never below `ADJ1`
//! - [`MeshExplosion`]: toggle MeSH heading explosion
//! - [`FieldRestrictions`]: move keywords between title and abstract
//!
//! Variants are deduplicated per transformation by a canonical signature (see
//! [`signature`]). Output order is deterministic for a given input.
//!
//! # Example
//!
//! ```
//! use refine_query::parse;
//! use refine_rewrite::{Transformation, TransformationKind};
//!
//! let query = parse("cancer[title] AND (breast ADJ1 tumor)").unwrap().unwrap();
//! let variants = TransformationKind::AdjacencyRange.apply(&query).unwrap();
//! assert_eq!(variants[0].to_query_string(), "(cancer[title] AND (breast ADJ2 tumor))");
//! ```

#![warn(missing_docs)]

mod adjacency;
mod error;
mod fields;
mod logical;
mod mesh;
pub mod signature;

use std::{fmt, str::FromStr};

pub use adjacency::AdjacencyRange;
pub use error::RewriteError;
pub use fields::FieldRestrictions;
pub use logical::LogicalOperatorReplacement;
pub use mesh::MeshExplosion;
use refine_query::QueryNode;

/// A family of syntactic mutations of a query tree.
pub trait Transformation {
    /// Returns the stable, snake_case name of this transformation.
    fn name(&self) -> &'static str;

    /// Returns the deduplicated variants of `query`.
    ///
    /// An empty vector means the transformation does not apply; it is not an error.
    fn apply(&self, query: &QueryNode) -> Result<Vec<QueryNode>, RewriteError>;
}

/// The closed set of built-in transformations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformationKind {
    /// See [`LogicalOperatorReplacement`].
    LogicalOperatorReplacement,
    /// See [`AdjacencyRange`].
    AdjacencyRange,
    /// See [`MeshExplosion`].
    MeshExplosion,
    /// See [`FieldRestrictions`].
    FieldRestrictions,
}

impl TransformationKind {
    /// Every transformation, in the default application order.
    pub const ALL: [Self; 4] = [
        Self::LogicalOperatorReplacement,
        Self::AdjacencyRange,
        Self::MeshExplosion,
        Self::FieldRestrictions,
    ];

    /// Returns the implementation behind this kind.
    fn implementation(self) -> &'static dyn Transformation {
        match self {
            Self::LogicalOperatorReplacement => &LogicalOperatorReplacement,
            Self::AdjacencyRange => &AdjacencyRange,
            Self::MeshExplosion => &MeshExplosion,
            Self::FieldRestrictions => &FieldRestrictions,
        }
    }
}

impl Transformation for TransformationKind {
    fn name(&self) -> &'static str {
        self.implementation().name()
    }

    fn apply(&self, query: &QueryNode) -> Result<Vec<QueryNode>, RewriteError> {
        self.implementation().apply(query)
    }
}

impl FromStr for TransformationKind {
    type Err = RewriteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == normalized)
            .ok_or_else(|| RewriteError::UnknownTransformation {
                name: s.to_string(),
            })
    }
}

impl fmt::Display for TransformationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
