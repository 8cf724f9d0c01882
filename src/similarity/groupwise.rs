//! Group-wise similarity of two annotated entities
use std::cmp::Ordering;

use smallvec::SmallVec;

use crate::corpus::ClosureProvider;
use crate::ic::IcModel;
use crate::matrix::Matrix;
use crate::similarity::{asymmetric_simj, lcs, sim_gic, simj, LcsScore};
use crate::{ClassIdx, ClassSet, EntityId};

/// The full bag of similarity scores between two entities
///
/// Produced by [`Corpus::pair_scores`](crate::Corpus::pair_scores). The
/// entity-level ratios are computed over the two full attribute closures;
/// the best-match averages come from the LCS-IC grid over the entities'
/// *direct* annotations, where each annotation of one entity is matched
/// against its best-scoring partner annotation of the other.
///
/// An entity with an empty attribute set yields all-zero scores against any
/// partner; that is a defined result, not an error.
#[derive(Debug, Clone)]
pub struct ElementPairScores {
    /// The first compared entity (the "query" of the asymmetric scores)
    pub a: EntityId,
    /// The second compared entity
    pub b: EntityId,
    /// `|A ∩ B|` over the entity closures
    pub overlap: usize,
    /// `|A ∪ B|` over the entity closures
    pub union_size: usize,
    /// Jaccard similarity of the entity closures
    pub simj: f64,
    /// `|A ∩ B| / |A|`
    pub asymmetric_simj: f64,
    /// `|A ∩ B| / |B|`
    pub inverse_asymmetric_simj: f64,
    /// IC-weighted Jaccard similarity of the entity closures
    pub sim_gic: f64,
    /// Mean LCS IC over all annotation pairs (undefined cells count as 0)
    pub avg_ic: f64,
    /// Best-match average with `a`'s annotations as queries
    pub bma_asym_ic: f64,
    /// Best-match average with `b`'s annotations as queries
    pub bma_inverse_asym_ic: f64,
    /// Symmetric best-match average over both directions
    pub bma_sym_ic: f64,
    /// The single highest LCS IC across all annotation pairs
    pub max_ic: f64,
    /// The common subsumers achieving `max_ic`, ascending; empty if none
    pub max_ic_witnesses: SmallVec<[ClassIdx; 2]>,
    /// Integer ranking score, `round(sim_gic * 100)`
    pub combined_score: i32,
    /// `a`'s direct annotations: the rows of the LCS grid
    pub rows: Vec<ClassIdx>,
    /// `b`'s direct annotations: the columns of the LCS grid
    pub cols: Vec<ClassIdx>,
    /// The annotation × annotation LCS grid
    pub lcs_matrix: Matrix<Option<LcsScore>>,
    /// Best cell per row; `None` for rows without a defined match
    pub best_for_row: Vec<Option<LcsScore>>,
    /// Best cell per column
    pub best_for_col: Vec<Option<LcsScore>>,
}

impl ElementPairScores {
    /// Compares two entities given their closures and direct annotations
    ///
    /// `closures` resolves each annotation to its reflexive ancestor set;
    /// inputs must come from the same corpus as the IC model.
    pub(crate) fn compute(
        a: EntityId,
        b: EntityId,
        a_closure: &ClassSet,
        b_closure: &ClassSet,
        a_annotations: &ClassSet,
        b_annotations: &ClassSet,
        closures: &impl ClosureProvider,
        ic: &IcModel,
    ) -> Self {
        let rows: Vec<ClassIdx> = a_annotations.iter().collect();
        let cols: Vec<ClassIdx> = b_annotations.iter().collect();
        let csize = rows.len();
        let dsize = cols.len();

        let mut cells: Vec<Option<LcsScore>> = Vec::with_capacity(csize * dsize);
        let mut best: Option<LcsScore> = None;
        let mut best_for_row: Vec<Option<LcsScore>> = vec![None; csize];
        let mut best_for_col: Vec<Option<LcsScore>> = vec![None; dsize];
        let mut total = 0.0;

        for (cx, c) in rows.iter().enumerate() {
            let c_ancestors = closures
                .ancestors_reflexive(*c)
                .expect("annotations resolve within their corpus");
            for (dx, d) in cols.iter().enumerate() {
                let d_ancestors = closures
                    .ancestors_reflexive(*d)
                    .expect("annotations resolve within their corpus");
                let cell = lcs(c_ancestors, d_ancestors, ic);
                if let Some(score) = &cell {
                    total += score.ic;
                    replace_if_better(&mut best, score);
                    replace_if_better(&mut best_for_row[cx], score);
                    replace_if_better(&mut best_for_col[dx], score);
                }
                cells.push(cell);
            }
        }

        let row_total: f64 = best_for_row.iter().flatten().map(|s| s.ic).sum();
        let col_total: f64 = best_for_col.iter().flatten().map(|s| s.ic).sum();

        let (max_ic, max_ic_witnesses) = match best {
            Some(score) => (score.ic, score.witnesses),
            None => (0.0, SmallVec::new()),
        };

        let sim_gic = sim_gic(a_closure, b_closure, ic);

        ElementPairScores {
            a,
            b,
            overlap: a_closure.intersection_len(b_closure),
            union_size: a_closure.union_len(b_closure),
            simj: simj(a_closure, b_closure),
            asymmetric_simj: asymmetric_simj(a_closure, b_closure),
            inverse_asymmetric_simj: asymmetric_simj(b_closure, a_closure),
            sim_gic,
            avg_ic: ratio(total, (csize * dsize) as f64),
            bma_asym_ic: ratio(row_total, csize as f64),
            bma_inverse_asym_ic: ratio(col_total, dsize as f64),
            bma_sym_ic: ratio(row_total + col_total, (csize + dsize) as f64),
            max_ic,
            max_ic_witnesses,
            combined_score: (sim_gic * 100.0).round() as i32,
            rows,
            cols,
            lcs_matrix: Matrix::new(csize, dsize, cells),
            best_for_row,
            best_for_col,
        }
    }
}

/// Keeps the strictly better score; ties keep the earlier (lexically lower)
/// cell so repeated runs pick the same winner
fn replace_if_better(slot: &mut Option<LcsScore>, candidate: &LcsScore) {
    match slot {
        Some(current) if candidate.ic <= current.ic => {}
        _ => *slot = Some(candidate.clone()),
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Pair results order by descending combined score; ties break on the
/// ascending entity id pair so batch rankings are reproducible
impl Ord for ElementPairScores {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .combined_score
            .cmp(&self.combined_score)
            .then_with(|| self.a.cmp(&other.a))
            .then_with(|| self.b.cmp(&other.b))
    }
}

impl PartialOrd for ElementPairScores {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ElementPairScores {
    fn eq(&self, other: &Self) -> bool {
        self.combined_score == other.combined_score && self.a == other.a && self.b == other.b
    }
}

impl Eq for ElementPairScores {}

#[cfg(test)]
mod tests {
    use super::*;

    /// Closure table standing in for a corpus: index i's reflexive ancestor
    /// set lives at position i
    struct Closures(Vec<ClassSet>);

    impl ClosureProvider for Closures {
        fn ancestors_reflexive(&self, class: ClassIdx) -> Option<&ClassSet> {
            self.0.get(class.to_usize())
        }
    }

    fn set(ids: &[u32]) -> ClassSet {
        ids.iter().map(|n| ClassIdx::from(*n)).collect()
    }

    /// Three-class chain 0 <- 1 <- 2 with frequencies 4, 2, 1 of 4:
    /// IC = 0, 1, 2
    fn chain() -> (Closures, IcModel) {
        let closures = Closures(vec![set(&[0]), set(&[0, 1]), set(&[0, 1, 2])]);
        let ic = IcModel::new(vec![4, 2, 1], 4);
        (closures, ic)
    }

    fn compute(
        a_annotations: &[u32],
        b_annotations: &[u32],
        closures: &Closures,
        ic: &IcModel,
    ) -> ElementPairScores {
        let union = |annotations: &[u32]| {
            annotations
                .iter()
                .fold(ClassSet::new(), |acc, n| &acc | &closures.0[*n as usize])
        };
        let a_closure = union(a_annotations);
        let b_closure = union(b_annotations);
        ElementPairScores::compute(
            "a".into(),
            "b".into(),
            &a_closure,
            &b_closure,
            &set(a_annotations),
            &set(b_annotations),
            closures,
            ic,
        )
    }

    #[test]
    fn identical_entities_score_one() {
        let (closures, ic) = chain();
        let scores = compute(&[2], &[2], &closures, &ic);
        assert_eq!(scores.overlap, 3);
        assert_eq!(scores.union_size, 3);
        assert!((scores.simj - 1.0).abs() < f64::EPSILON);
        assert!((scores.sim_gic - 1.0).abs() < f64::EPSILON);
        // the single cell is lcs(closure(2), closure(2)) = IC(2) = 2
        assert!((scores.max_ic - 2.0).abs() < f64::EPSILON);
        assert!((scores.bma_sym_ic - 2.0).abs() < f64::EPSILON);
        assert_eq!(scores.max_ic_witnesses.as_slice(), &[2u32.into()]);
    }

    #[test]
    fn asymmetric_best_match_average() {
        // A annotated to class 1 (IC 1), B to classes 1 and 2 (IC 2).
        // A's only annotation best-matches itself: bmaAsym = IC(1) = 1.
        // B's annotation 2 also best-matches via LCS 1: col bests are 1, 1.
        let (closures, ic) = chain();
        let scores = compute(&[1], &[1, 2], &closures, &ic);
        assert!((scores.bma_asym_ic - 1.0).abs() < f64::EPSILON);
        assert!((scores.bma_inverse_asym_ic - 1.0).abs() < f64::EPSILON);
        assert!((scores.bma_sym_ic - 1.0).abs() < f64::EPSILON);
        assert!((scores.max_ic - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_entity_scores_zero() {
        let (closures, ic) = chain();
        let scores = compute(&[], &[2], &closures, &ic);
        assert_eq!(scores.overlap, 0);
        assert_eq!(scores.union_size, 3);
        assert_eq!(scores.simj, 0.0);
        assert_eq!(scores.bma_sym_ic, 0.0);
        assert_eq!(scores.bma_asym_ic, 0.0);
        assert_eq!(scores.max_ic, 0.0);
        assert!(scores.max_ic_witnesses.is_empty());
        assert_eq!(scores.combined_score, 0);
        assert!(scores.lcs_matrix.is_empty());

        // with the empty entity on the column side the grid is 1 x 0
        let scores = compute(&[2], &[], &closures, &ic);
        assert_eq!(scores.lcs_matrix.dim(), (1, 0));
        assert_eq!(scores.lcs_matrix.rows().count(), 1);
        assert_eq!(scores.bma_sym_ic, 0.0);
    }

    #[test]
    fn grid_winners_attain_row_maxima() {
        let (closures, ic) = chain();
        let scores = compute(&[1, 2], &[0, 2], &closures, &ic);
        for (row, best) in scores.best_for_row.iter().enumerate() {
            let best = best.as_ref().expect("chain closures always share root");
            for col in 0..scores.cols.len() {
                if let Some(Some(cell)) = scores.lcs_matrix.get(row, col) {
                    assert!(cell.ic <= best.ic);
                }
            }
        }
    }

    #[test]
    fn compute_is_deterministic() {
        let (closures, ic) = chain();
        let first = compute(&[1, 2], &[0, 2], &closures, &ic);
        let second = compute(&[1, 2], &[0, 2], &closures, &ic);
        assert!((first.bma_sym_ic - second.bma_sym_ic).abs() < f64::EPSILON);
        assert_eq!(first.max_ic_witnesses, second.max_ic_witnesses);
        assert_eq!(first.combined_score, second.combined_score);
    }

    #[test]
    fn ordering_ranks_descending_with_id_tiebreak() {
        let (closures, ic) = chain();
        let high = compute(&[2], &[2], &closures, &ic);
        let mut low = compute(&[], &[2], &closures, &ic);
        low.a = "z".into();

        let mut ranked = vec![low.clone(), high.clone()];
        ranked.sort();
        assert_eq!(ranked[0].combined_score, high.combined_score);

        let mut tie_a = high.clone();
        tie_a.a = "a".into();
        let mut tie_b = high.clone();
        tie_b.a = "b".into();
        let mut tied = vec![tie_b.clone(), tie_a.clone()];
        tied.sort();
        assert_eq!(tied[0].a, tie_a.a);
    }
}
