//! Semantic similarity scoring for ontology annotation corpora
//!
//! `owlsim` compares annotated entities (genes, individuals, patients) by the
//! ontology classes they are annotated to. It derives the reflexive-transitive
//! ancestor closure of every class and entity, builds an information-content
//! model from annotation frequencies and provides the common similarity
//! scores on top of it: Jaccard and asymmetric Jaccard, `simGIC`, Resnik-style
//! LCS information content and best-match-average aggregates.
//!
//! # Examples
//!
//! ```
//! use owlsim::CorpusBuilder;
//!
//! let mut builder = CorpusBuilder::new();
//! builder.add_class("GO:0008150", "biological_process");
//! builder.add_class("GO:0007610", "behavior");
//! builder.add_class("GO:0035640", "exploration behavior");
//! builder.add_edge("GO:0007610", "GO:0008150");
//! builder.add_edge("GO:0035640", "GO:0007610");
//!
//! builder.add_annotation("gene:A", "GO:0035640");
//! builder.add_annotation("gene:B", "GO:0007610");
//!
//! let corpus = builder.build().unwrap();
//! let scores = corpus.pair_scores("gene:A", "gene:B").unwrap();
//! assert!(scores.simj > 0.0);
//! ```
use thiserror::Error;

pub mod class;
pub mod entity;
pub mod similarity;
pub mod stats;
mod corpus;
mod ic;
mod matrix;

pub use class::{Class, ClassId, ClassIdx, ClassSet};
pub use corpus::{ClosureProvider, Corpus, CorpusBuilder};
pub use entity::{Entity, EntityId};
pub use ic::IcModel;
pub use matrix::{CancelToken, Matrix, RankMetric, ScoreMatrix, ScoreMatrixBuilder};
pub use similarity::{ElementPairScores, LcsScore, SimilarityKind};

pub(crate) const DEFAULT_NUM_PARENTS: usize = 10;
pub(crate) const DEFAULT_NUM_ANCESTORS: usize = 50;
pub(crate) const DEFAULT_NUM_ANNOTATIONS: usize = 20;

/// Errors of the `owlsim` crate
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    /// An annotation or hierarchy edge references a class that is not part
    /// of the loaded ontology. This usually indicates a stale or mismatched
    /// ontology/annotation pairing and is never silently skipped.
    #[error("unknown ontology class: {0}")]
    UnknownClass(ClassId),
    /// A scoring request referenced an entity that is not in the corpus
    #[error("unknown entity: {0}")]
    UnknownEntity(EntityId),
    /// The class hierarchy contains a cycle and no closure can be derived
    #[error("cycle in class hierarchy involving {0}")]
    CyclicHierarchy(ClassId),
    /// A score-matrix build was cancelled through its [`CancelToken`]
    #[error("score matrix build cancelled")]
    Cancelled,
}

/// Crate-wide `Result` with [`SimError`]
pub type SimResult<T> = Result<T, SimError>;
