//! The information-content model of a corpus
use tracing::debug;

use crate::{ClassIdx, ClassSet};

/// Per-class information content derived from annotation frequencies
///
/// The model is computed once when the corpus is built and is immutable
/// afterwards. Scoring only ever reads it, so a single model can be shared
/// across threads without synchronization.
///
/// The information content of a class is `-log2(frequency / corpus_size)`
/// where `frequency` is the number of entities whose closure contains the
/// class. A class that is never annotated has no defined IC: [`IcModel::ic`]
/// returns `None` and the scorers skip such classes when selecting best
/// matches.
#[derive(Debug, Clone)]
pub struct IcModel {
    ic: Vec<Option<f64>>,
    frequencies: Vec<u64>,
    corpus_size: u64,
}

impl IcModel {
    pub(crate) fn new(frequencies: Vec<u64>, corpus_size: u64) -> Self {
        let ic = frequencies
            .iter()
            .map(|freq| match (*freq, corpus_size) {
                (0, _) | (_, 0) => None,
                (freq, size) => Some(-((freq as f64) / (size as f64)).log2()),
            })
            .collect();
        debug!(classes = frequencies.len(), corpus_size, "IC model computed");
        Self {
            ic,
            frequencies,
            corpus_size,
        }
    }

    /// Returns the information content of a class
    ///
    /// `None` is the "undefined" sentinel for classes with zero corpus
    /// frequency; it disqualifies the class from best-match selection but
    /// is never an error.
    pub fn ic(&self, idx: ClassIdx) -> Option<f64> {
        self.ic.get(idx.to_usize()).copied().flatten()
    }

    /// Returns the number of entities whose closure contains the class
    pub fn frequency(&self, idx: ClassIdx) -> u64 {
        self.frequencies.get(idx.to_usize()).copied().unwrap_or(0)
    }

    /// Returns the number of entities in the corpus
    pub fn corpus_size(&self) -> u64 {
        self.corpus_size
    }

    /// Returns the number of classes the model covers
    pub fn len(&self) -> usize {
        self.ic.len()
    }

    /// Returns `true` if the model covers no classes
    pub fn is_empty(&self) -> bool {
        self.ic.is_empty()
    }

    /// Returns the entropy `-Σ p * log2(p)` over the given classes
    ///
    /// Classes with zero frequency contribute nothing. An empty subset has
    /// entropy `0.0`, never `NaN`.
    pub fn entropy_of(&self, subset: &ClassSet) -> f64 {
        self.entropy_iter(subset.iter())
    }

    /// Returns the entropy over all classes of the corpus
    pub fn entropy(&self) -> f64 {
        self.entropy_iter((0..self.ic.len()).map(ClassIdx::from))
    }

    fn entropy_iter(&self, classes: impl Iterator<Item = ClassIdx>) -> f64 {
        if self.corpus_size == 0 {
            return 0.0;
        }
        let mut e = 0.0;
        for idx in classes {
            let freq = self.frequency(idx);
            if freq == 0 {
                continue;
            }
            let p = freq as f64 / self.corpus_size as f64;
            e += p * p.log2();
        }
        -e
    }
}
