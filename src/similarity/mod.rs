//! Similarity scores between classes and between annotated entities
//!
//! The pairwise scorers are pure functions over two ancestor closures and
//! the [`IcModel`]; they have no side effects and no state. [`SimilarityKind`]
//! is the strategy table on top of them: a fixed enumeration of algorithms
//! selected by configuration instead of a trait-object hierarchy.
//!
//! Group-wise scoring of two multi-attribute entities lives in
//! [`ElementPairScores`].
use smallvec::SmallVec;
use tracing::debug;

use crate::ic::IcModel;
use crate::{ClassIdx, ClassSet};

mod groupwise;

pub use groupwise::ElementPairScores;

/// Returns the number of common subsumers of two closures, `|A ∩ B|`
pub fn overlap(a: &ClassSet, b: &ClassSet) -> usize {
    a.intersection_len(b)
}

/// Returns `|A ∪ B|`
pub fn union_size(a: &ClassSet, b: &ClassSet) -> usize {
    a.union_len(b)
}

/// Jaccard similarity `|A ∩ B| / |A ∪ B|`
///
/// The degenerate `0/0` case is defined as `0.0` by convention.
pub fn simj(a: &ClassSet, b: &ClassSet) -> f64 {
    let union = union_size(a, b);
    if union == 0 {
        debug!("simj of two empty closures, defaulting to 0");
        return 0.0;
    }
    overlap(a, b) as f64 / union as f64
}

/// Asymmetric Jaccard similarity `|A ∩ B| / |A|`
///
/// `a` is the query, `b` the reference. `0.0` when `a` is empty.
pub fn asymmetric_simj(a: &ClassSet, b: &ClassSet) -> f64 {
    if a.is_empty() {
        debug!("asymmetric simj with empty query closure, defaulting to 0");
        return 0.0;
    }
    overlap(a, b) as f64 / a.len() as f64
}

/// Graph information-content similarity `Σ IC(A ∩ B) / Σ IC(A ∪ B)`
///
/// Classes without defined IC contribute nothing to either sum. `0.0` when
/// the union carries no information.
pub fn sim_gic(a: &ClassSet, b: &ClassSet, ic: &IcModel) -> f64 {
    let ic_union: f64 = (a | b).iter().filter_map(|idx| ic.ic(idx)).sum();
    if ic_union == 0.0 {
        return 0.0;
    }
    let ic_common: f64 = (a & b).iter().filter_map(|idx| ic.ic(idx)).sum();
    ic_common / ic_union
}

/// The most informative common ancestor(s) of two closures
///
/// `ic` is the information content of the winning class(es); `witnesses`
/// holds every class tying for it, in ascending index order. Since dense
/// indices follow lexical class-id order, the first witness is the
/// lexically lowest id, making the tie-break reproducible.
#[derive(Debug, Clone, PartialEq)]
pub struct LcsScore {
    /// Information content of the most informative common ancestor
    pub ic: f64,
    /// All classes achieving that IC, ascending
    pub witnesses: SmallVec<[ClassIdx; 2]>,
}

impl LcsScore {
    /// Returns the deterministic representative witness: the one with the
    /// lexically lowest class id
    pub fn witness(&self) -> ClassIdx {
        self.witnesses[0]
    }
}

/// IC ties closer than this are treated as equal when collecting witnesses
const LCS_TIE_EPSILON: f64 = 1e-9;

/// Finds the most informative common ancestor of two closures
///
/// Returns `None` if the closures share no ancestor with defined IC; callers
/// must treat that as disqualifying the pair, not as a score of 0 with a
/// witness.
pub fn lcs(a: &ClassSet, b: &ClassSet, ic: &IcModel) -> Option<LcsScore> {
    let mut best: Option<LcsScore> = None;
    for idx in &(a & b) {
        let Some(value) = ic.ic(idx) else {
            continue;
        };
        match best {
            Some(ref mut score) if (value - score.ic).abs() < LCS_TIE_EPSILON => {
                score.witnesses.push(idx);
            }
            Some(ref score) if value <= score.ic => {}
            _ => {
                best = Some(LcsScore {
                    ic: value,
                    witnesses: SmallVec::from_slice(&[idx]),
                });
            }
        }
    }
    best
}

/// Resnik similarity: the IC of the most informative common ancestor
///
/// `0.0` when no common ancestor has defined IC.
pub fn resnik(a: &ClassSet, b: &ClassSet, ic: &IcModel) -> f64 {
    lcs(a, b, ic).map_or(0.0, |score| score.ic)
}

/// The fixed set of pairwise scoring strategies
///
/// Every variant is a pure function of two ancestor closures and the IC
/// model. The enum exists so callers (and the score-matrix builder) can
/// select an algorithm by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimilarityKind {
    /// Jaccard similarity over the two closures
    Jaccard,
    /// `|A ∩ B| / |A|` with the first argument as query
    AsymmetricJaccard,
    /// `|A ∩ B| / |B|` with the second argument as query
    InverseAsymmetricJaccard,
    /// IC-weighted Jaccard (`simGIC`)
    GraphIc,
    /// IC of the most informative common ancestor
    Resnik,
}

impl SimilarityKind {
    /// Calculates the similarity of two ancestor closures
    pub fn score(&self, a: &ClassSet, b: &ClassSet, ic: &IcModel) -> f64 {
        match self {
            SimilarityKind::Jaccard => simj(a, b),
            SimilarityKind::AsymmetricJaccard => asymmetric_simj(a, b),
            SimilarityKind::InverseAsymmetricJaccard => asymmetric_simj(b, a),
            SimilarityKind::GraphIc => sim_gic(a, b, ic),
            SimilarityKind::Resnik => resnik(a, b, ic),
        }
    }
}
