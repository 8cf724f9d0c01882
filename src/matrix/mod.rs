//! Owned row-major grids and the all-pairs entity score matrix
//!
//! [`Matrix`] is the plain storage primitive with row and column iterators.
//! [`ScoreMatrixBuilder`] fills an entity × entity grid of
//! [`ElementPairScores`] and derives the per-row and per-column winners for
//! a selected metric; the resulting [`ScoreMatrix`] is immutable and safe to
//! read from multiple threads.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::corpus::Corpus;
use crate::similarity::ElementPairScores;
use crate::{EntityId, SimError, SimResult};

/// An owned row-major grid
///
/// ```text
///    ||   0|   1|   2|   3|
/// =========================
/// 0  ||  11|  12|  13|  14|
/// 1  ||  21|  22|  23|  24|
/// 2  ||  31|  32|  33|  34|
/// ```
///
/// There are no logic checks that `rows * cols` matches the data length;
/// the constructors of this crate guarantee it.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T> {
    rows: usize,
    cols: usize,
    data: Vec<T>,
}

impl<T> Matrix<T> {
    pub(crate) fn new(rows: usize, cols: usize, data: Vec<T>) -> Self {
        debug_assert_eq!(rows * cols, data.len());
        Self { rows, cols, data }
    }

    /// Returns the number of cells
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the grid has no cells
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the dimension as `(rows, cols)`
    pub fn dim(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Returns the cell at `(row, col)`, if in bounds
    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.data.get(row * self.cols + col)
    }

    /// Returns an iterator over the rows, each an iterator over cells
    ///
    /// A zero-width grid still yields one (empty) iterator per row, so the
    /// row count always matches [`dim`](Matrix::dim).
    pub fn rows(&self) -> impl Iterator<Item = std::slice::Iter<'_, T>> {
        (0..self.rows).map(move |row| self.data[row * self.cols..(row + 1) * self.cols].iter())
    }

    /// Returns an iterator over the columns, each an iterator over cells
    pub fn cols(&self) -> impl Iterator<Item = impl Iterator<Item = &T>> {
        (0..self.cols).map(move |col| self.data.iter().skip(col).step_by(self.cols))
    }
}

/// Selects which score of an [`ElementPairScores`] ranks matrix cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RankMetric {
    /// The integer combined score (default)
    #[default]
    CombinedScore,
    /// The maximum LCS information content
    MaxIc,
    /// Symmetric best-match-average IC
    BmaSymIc,
    /// Entity-level Jaccard similarity
    SimJ,
    /// Entity-level graph information-content similarity
    SimGic,
}

impl RankMetric {
    /// Extracts the selected score from a pair result
    pub fn value(&self, scores: &ElementPairScores) -> f64 {
        match self {
            RankMetric::CombinedScore => f64::from(scores.combined_score),
            RankMetric::MaxIc => scores.max_ic,
            RankMetric::BmaSymIc => scores.bma_sym_ic,
            RankMetric::SimJ => scores.simj,
            RankMetric::SimGic => scores.sim_gic,
        }
    }
}

/// Cooperative cancellation handle for long matrix builds
///
/// Cloning shares the flag. The builder checks it between cells, never
/// mid-cell.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Constructs a new, un-cancelled token
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Returns `true` if cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Configures and runs an all-pairs entity comparison
///
/// The build is a one-shot operation: the matrix is populated cell by cell
/// and only returned once complete, so a [`ScoreMatrix`] in client hands is
/// always safe to read. Entities missing from the corpus do not abort the
/// batch; they are excluded and reported in
/// [`ScoreMatrix::failures`].
#[derive(Debug, Default)]
pub struct ScoreMatrixBuilder {
    metric: RankMetric,
    include_diagonal: bool,
    cancel: Option<CancelToken>,
}

impl ScoreMatrixBuilder {
    /// Constructs a builder with the default ranking metric
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the score used for best-of-row / best-of-column ranking
    pub fn metric(mut self, metric: RankMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Also scores each entity against itself
    pub fn include_diagonal(mut self, include: bool) -> Self {
        self.include_diagonal = include;
        self
    }

    /// Attaches a cancellation token, checked between cells
    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Builds the full N×N score matrix for the given entities
    ///
    /// # Errors
    ///
    /// [`SimError::Cancelled`] if the attached token was triggered. Unknown
    /// entity ids are not an error here; they end up in the result's
    /// failure list.
    pub fn build(self, corpus: &Corpus, ids: &[EntityId]) -> SimResult<ScoreMatrix> {
        let mut resolved = Vec::with_capacity(ids.len());
        let mut failures = Vec::new();
        for id in ids {
            if corpus.entity_by_id(id).is_some() {
                resolved.push(id.clone());
            } else {
                failures.push(id.clone());
            }
        }
        if !failures.is_empty() {
            debug!(failed = failures.len(), "entities missing from corpus");
        }

        let n = resolved.len();
        let mut cells: Vec<Option<ElementPairScores>> = Vec::with_capacity(n * n);
        for (row, a) in resolved.iter().enumerate() {
            for (col, b) in resolved.iter().enumerate() {
                if let Some(token) = &self.cancel {
                    if token.is_cancelled() {
                        return Err(SimError::Cancelled);
                    }
                }
                if row == col && !self.include_diagonal {
                    cells.push(None);
                    continue;
                }
                cells.push(Some(corpus.pair_scores(a.as_str(), b.as_str())?));
            }
        }

        let grid = Matrix::new(n, n, cells);
        let best_for_row = (0..n)
            .map(|row| best_indices(&self.metric, (0..n).map(|col| (col, grid.get(row, col)))))
            .collect();
        let best_for_col = (0..n)
            .map(|col| best_indices(&self.metric, (0..n).map(|row| (row, grid.get(row, col)))))
            .collect();

        Ok(ScoreMatrix {
            ids: resolved,
            grid,
            metric: self.metric,
            best_for_row,
            best_for_col,
            failures,
        })
    }
}

/// Returns the indices attaining the maximum metric value, ascending
fn best_indices<'a>(
    metric: &RankMetric,
    cells: impl Iterator<Item = (usize, Option<&'a Option<ElementPairScores>>)>,
) -> Vec<usize> {
    let mut best: f64 = f64::NEG_INFINITY;
    let mut winners: Vec<usize> = Vec::new();
    for (index, cell) in cells {
        let Some(Some(scores)) = cell else {
            continue;
        };
        let value = metric.value(scores);
        if value > best {
            best = value;
            winners.clear();
            winners.push(index);
        } else if value == best {
            winners.push(index);
        }
    }
    winners
}

/// The completed all-pairs comparison of a set of entities
///
/// Immutable once built. Cells on the diagonal are `None` unless the
/// builder was configured to include self-comparison; rebuilding is the only
/// way to reflect a changed corpus.
#[derive(Debug)]
pub struct ScoreMatrix {
    ids: Vec<EntityId>,
    grid: Matrix<Option<ElementPairScores>>,
    metric: RankMetric,
    best_for_row: Vec<Vec<usize>>,
    best_for_col: Vec<Vec<usize>>,
    failures: Vec<EntityId>,
}

impl ScoreMatrix {
    /// Returns the compared entity ids, in grid order
    pub fn ids(&self) -> &[EntityId] {
        &self.ids
    }

    /// Returns the underlying grid
    pub fn grid(&self) -> &Matrix<Option<ElementPairScores>> {
        &self.grid
    }

    /// Returns the scores of the cell at `(row, col)`, if computed
    pub fn get(&self, row: usize, col: usize) -> Option<&ElementPairScores> {
        self.grid.get(row, col).and_then(Option::as_ref)
    }

    /// Returns the metric the winners were ranked by
    pub fn metric(&self) -> RankMetric {
        self.metric
    }

    /// Returns the column indices attaining the row maximum, ascending
    ///
    /// Empty for rows without any computed cell.
    pub fn best_for_row(&self, row: usize) -> &[usize] {
        self.best_for_row.get(row).map_or(&[], Vec::as_slice)
    }

    /// Returns the row indices attaining the column maximum, ascending
    pub fn best_for_col(&self, col: usize) -> &[usize] {
        self.best_for_col.get(col).map_or(&[], Vec::as_slice)
    }

    /// Returns the entity ids that could not be scored
    ///
    /// The rest of the batch is still fully populated.
    pub fn failures(&self) -> &[EntityId] {
        &self.failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matrix_rows_and_cols() {
        let m = Matrix::new(2, 3, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(m.dim(), (2, 3));
        assert_eq!(m.len(), 6);
        assert_eq!(m.get(0, 1), Some(&2));
        assert_eq!(m.get(1, 2), Some(&6));
        assert_eq!(m.get(2, 0), None);

        let rows: Vec<Vec<i32>> = m.rows().map(|row| row.copied().collect()).collect();
        assert_eq!(rows, vec![vec![1, 2, 3], vec![4, 5, 6]]);

        let cols: Vec<Vec<i32>> = m.cols().map(|col| col.copied().collect()).collect();
        assert_eq!(cols, vec![vec![1, 4], vec![2, 5], vec![3, 6]]);
    }

    #[test]
    fn matrix_row_sums() {
        let m = Matrix::new(2, 3, vec![1, 2, 3, 4, 5, 6]);
        let sums: Vec<i32> = m.rows().map(|row| row.sum()).collect();
        assert_eq!(sums, vec![6, 15]);
    }

    #[test]
    fn empty_matrix() {
        let m: Matrix<i32> = Matrix::new(0, 0, Vec::new());
        assert!(m.is_empty());
        assert_eq!(m.rows().count(), 0);
        assert_eq!(m.cols().count(), 0);
    }

    #[test]
    fn zero_width_matrix_keeps_its_rows() {
        let m: Matrix<i32> = Matrix::new(2, 0, Vec::new());
        assert_eq!(m.dim(), (2, 0));
        assert_eq!(m.rows().count(), 2);
        assert!(m.rows().all(|mut row| row.next().is_none()));
        assert_eq!(m.cols().count(), 0);
    }

    #[test]
    fn cancel_token_round_trip() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        let shared = token.clone();
        shared.cancel();
        assert!(token.is_cancelled());
    }

    mod score_matrix {
        use super::*;
        use crate::CorpusBuilder;

        /// gene:a and gene:b overlap heavily, gene:c only via the root
        fn corpus() -> Corpus {
            let mut builder = CorpusBuilder::new();
            builder.add_class("T:0", "root");
            builder.add_class("T:1", "left");
            builder.add_class("T:2", "left leaf");
            builder.add_class("T:3", "right");
            builder.add_edge("T:1", "T:0");
            builder.add_edge("T:2", "T:1");
            builder.add_edge("T:3", "T:0");
            builder.add_annotation("gene:a", "T:2");
            builder.add_annotation("gene:b", "T:1");
            builder.add_annotation("gene:c", "T:3");
            builder.build().unwrap()
        }

        fn ids(names: &[&str]) -> Vec<EntityId> {
            names.iter().map(|n| EntityId::from(*n)).collect()
        }

        #[test]
        fn winners_attain_the_row_maximum() {
            let corpus = corpus();
            let matrix = ScoreMatrixBuilder::new()
                .metric(RankMetric::SimJ)
                .build(&corpus, &ids(&["gene:a", "gene:b", "gene:c"]))
                .unwrap();

            assert_eq!(matrix.ids().len(), 3);
            for row in 0..3 {
                let winners = matrix.best_for_row(row);
                assert!(!winners.is_empty());
                let best = matrix.get(row, winners[0]).map(|s| s.simj).unwrap();
                for col in 0..3 {
                    if let Some(scores) = matrix.get(row, col) {
                        assert!(scores.simj <= best);
                    }
                }
            }
            // a and b share T:0 and T:1, c only shares the root
            assert_eq!(matrix.best_for_row(0), &[1]);
            assert_eq!(matrix.best_for_col(0), &[1]);
        }

        #[test]
        fn diagonal_is_excluded_by_default() {
            let corpus = corpus();
            let names = ids(&["gene:a", "gene:b"]);
            let matrix = ScoreMatrixBuilder::new().build(&corpus, &names).unwrap();
            assert!(matrix.get(0, 0).is_none());
            assert!(matrix.get(0, 1).is_some());

            let with_diagonal = ScoreMatrixBuilder::new()
                .include_diagonal(true)
                .build(&corpus, &names)
                .unwrap();
            let own = with_diagonal.get(0, 0).unwrap();
            assert!((own.simj - 1.0).abs() < f64::EPSILON);
        }

        #[test]
        fn unknown_entities_fail_without_aborting_the_batch() {
            let corpus = corpus();
            let matrix = ScoreMatrixBuilder::new()
                .build(&corpus, &ids(&["gene:a", "gene:x", "gene:b"]))
                .unwrap();

            assert_eq!(matrix.failures(), &[EntityId::from("gene:x")]);
            assert_eq!(matrix.ids().len(), 2);
            assert!(matrix.get(0, 1).is_some());
        }

        #[test]
        fn cancelled_build_returns_no_matrix() {
            let corpus = corpus();
            let token = CancelToken::new();
            token.cancel();
            let result = ScoreMatrixBuilder::new()
                .cancel_token(token)
                .build(&corpus, &ids(&["gene:a", "gene:b"]));
            assert_eq!(result.unwrap_err(), SimError::Cancelled);
        }

        #[test]
        fn repeated_builds_pick_the_same_winners() {
            let corpus = corpus();
            let names = ids(&["gene:a", "gene:b", "gene:c"]);
            let first = ScoreMatrixBuilder::new()
                .metric(RankMetric::BmaSymIc)
                .build(&corpus, &names)
                .unwrap();
            let second = ScoreMatrixBuilder::new()
                .metric(RankMetric::BmaSymIc)
                .build(&corpus, &names)
                .unwrap();
            for row in 0..names.len() {
                assert_eq!(first.best_for_row(row), second.best_for_row(row));
            }
        }
    }
}
