//! Hypergeometric enrichment of ontology classes within an entity sample
//!
//! Compares how often each class occurs in the closures of a sample of
//! entities against how often it occurs in the whole corpus, and computes
//! the probability of the observed (or a higher) count under the
//! hypergeometric distribution.
//!
//! # Examples
//!
//! ```
//! use owlsim::CorpusBuilder;
//! use owlsim::stats::hypergeom::class_enrichment;
//!
//! let mut builder = CorpusBuilder::new();
//! builder.add_class("T:0", "root");
//! builder.add_class("T:1", "specific");
//! builder.add_edge("T:1", "T:0");
//! builder.add_annotation("e1", "T:1");
//! builder.add_annotation("e2", "T:1");
//! builder.add_annotation("e3", "T:0");
//! builder.add_annotation("e4", "T:0");
//! let corpus = builder.build().unwrap();
//!
//! let sample = vec!["e1".into(), "e2".into()];
//! let mut enrichments = class_enrichment(&corpus, &sample).unwrap();
//! enrichments.sort_by(|a, b| a.pvalue().partial_cmp(&b.pvalue()).unwrap());
//!
//! // T:1 occurs in both sample entities but only half the corpus
//! let top = corpus.class(enrichments[0].class()).unwrap();
//! assert_eq!(top.id().as_str(), "T:1");
//! ```

use std::collections::{HashMap, HashSet};

use statrs::distribution::{DiscreteCDF, Hypergeometric};
use tracing::debug;

use crate::corpus::Corpus;
use crate::stats::Enrichment;
use crate::{ClassIdx, EntityId, SimError, SimResult};

/// Calculates the enrichment of every class occurring in the sample
///
/// Population is the whole corpus, successes the corpus frequency of the
/// class, draws the number of distinct sample entities. Duplicate sample ids
/// are counted once. Results are unsorted.
///
/// # Errors
///
/// [`SimError::UnknownEntity`] if a sample id is not part of the corpus.
pub fn class_enrichment(corpus: &Corpus, sample: &[EntityId]) -> SimResult<Vec<Enrichment>> {
    let population = corpus.num_entities() as u64;

    let mut observed: HashMap<ClassIdx, u64> = HashMap::new();
    let mut seen: HashSet<&EntityId> = HashSet::with_capacity(sample.len());
    let mut draws = 0u64;
    for id in sample {
        if !seen.insert(id) {
            continue;
        }
        let entity = corpus
            .entity_by_id(id)
            .ok_or_else(|| SimError::UnknownEntity(id.clone()))?;
        draws += 1;
        for idx in entity.closure_idxs() {
            *observed.entry(idx).or_insert(0) += 1;
        }
    }

    let mut res = Vec::with_capacity(observed.len());
    for (idx, count) in observed {
        let successes = corpus.ic_model().frequency(idx);
        let hyper = Hypergeometric::new(population, successes, draws)
            .expect("sample entities are corpus members, so draws <= population");

        // subtracting 1, because we want the probability including `count`,
        // e.g. "7 or more", but sf calculates "more than 7"
        let pvalue = hyper.sf(count - 1);
        let fold = (count as f64 / draws as f64) / (successes as f64 / population as f64);
        debug!(
            class = %idx,
            population,
            successes,
            draws,
            count,
            "class enrichment"
        );
        res.push(Enrichment::new(idx, count, fold, pvalue));
    }
    Ok(res)
}
