//! Statistical analyses over annotation corpora
//!
//! Currently this is the hypergeometric enrichment analysis: given a sample
//! of entities, which ontology classes are over-represented compared to the
//! corpus as a whole?

use crate::ClassIdx;

pub mod hypergeom;

/// Fold enrichment and p-value of one class within a sample
///
/// Returned by [`hypergeom::class_enrichment`]. Results are unsorted;
/// callers usually sort ascending by p-value.
#[derive(Debug, Clone, PartialEq)]
pub struct Enrichment {
    class: ClassIdx,
    count: u64,
    fold: f64,
    pvalue: f64,
}

impl Enrichment {
    pub(crate) fn new(class: ClassIdx, count: u64, fold: f64, pvalue: f64) -> Self {
        Self {
            class,
            count,
            fold,
            pvalue,
        }
    }

    /// Returns the enriched class
    pub fn class(&self) -> ClassIdx {
        self.class
    }

    /// Returns how many sample entities carry the class in their closure
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Returns the fold enrichment over the corpus background
    pub fn fold(&self) -> f64 {
        self.fold
    }

    /// Returns the probability of observing at least `count` carriers in a
    /// sample of this size by chance
    pub fn pvalue(&self) -> f64 {
        self.pvalue
    }
}
