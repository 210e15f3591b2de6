//! Learning-to-rank driven refinement of Boolean queries.
//!
//! A refinement starts from a seed [`Candidate`]. Each step enumerates the variants every
//! configured transformation produces ([`variations`]), attaches features to them
//! ([`Featurizer`]), and asks a [`CandidateSelector`] to pick the best one. The selectors shell
//! out to an external ranker (SVM-rank or QuickRank), exchanging LibSVM-rank feature files and
//! one-score-per-line result files through a per-call temporary directory.
//!
//! # Example
//!
//! ```no_run
//! use refine_learning::{Candidate, Refiner, StructuralFeatures, SvmRankSelector};
//! use refine_rewrite::TransformationKind;
//!
//! let seed = Candidate::seed(
//!     "CD008643",
//!     refine_query::parse("cancer[title] AND (breast ADJ1 tumor)")?.unwrap(),
//! );
//! let mut refiner = Refiner::new(
//!     TransformationKind::ALL.to_vec(),
//!     Box::new(StructuralFeatures),
//!     Box::new(SvmRankSelector::new("svm_rank_classify", "model.dat")),
//! );
//! let refinement = refiner.run(seed)?;
//! println!("{}", refinement.best.query);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]

mod candidate;
mod error;
mod exchange;
mod features;
mod featurize;
mod process;
mod refine;
mod retry;
pub mod selector;
mod variations;

pub use candidate::Candidate;
pub use error::LearningError;
pub use features::{Feature, FeatureVector, LearntFeature};
pub use featurize::{Featurizer, StructuralFeatures};
pub use refine::{Refinement, Refiner, TerminationReason};
pub use retry::RetryPolicy;
pub use selector::{
    CandidateSelector, DEFAULT_STOPPING_THRESHOLD, Progress, QuickRankSelector, SelectionState,
    StopReason, SvmRankSelector,
};
pub use variations::variations;
