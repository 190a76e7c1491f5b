//! calibration::offsets — per-column offset search and offset application.
//!
//! Purpose
//! -------
//! For each predicted column of a raw contingency table, find the
//! destination category that minimizes the kappa-complement when that
//! column alone is moved, and rewrite the table according to the chosen
//! offsets.
//!
//! Key behaviors
//! -------------
//! - [`kappa_parts`] gives one column's contribution to the global kappa
//!   numerator and denominator when weighted by a given weight column.
//! - [`compute_offsets`] evaluates every destination in the category range
//!   with an incremental delta against a fixed [`KappaBaseline`], reading
//!   weights from [`WeightColumns`] split once per run:
//!
//!   ```text
//!   k(dest) = (num₀ + num(dest) − num(src)) / (den₀ + den(dest) − den(src))
//!   ```
//!
//!   and keeps the first minimum in ascending destination order.
//! - [`offset_contingency_matrix`] moves each source column's mass to its
//!   destination, leaving a zero-valued marker at the source.
//!
//! Invariants & assumptions
//! ------------------------
//! - The bounded source column is always a candidate and its delta is
//!   exactly zero, so a record's kappa-complement never exceeds the
//!   baseline: the search is non-regressive per column.
//! - Columns are searched independently against the same baseline; moving
//!   one column never changes another column's candidates.
//! - Offsetting preserves total mass for any table whose source columns are
//!   a subset of the matrix's columns.
//!
//! Conventions
//! -----------
//! - `source_column` and `offset` are real because raw scores may be
//!   fractional; `dest_column` is always an integer inside the range.
use std::cmp::Ordering;

use tracing::debug;

use crate::kappa::{
    errors::KappaResult,
    qwk::{QwkOutcome, kappa_ratio},
    range::CategoryRange,
};
use crate::sparse::{
    Matrix, RawMatrix, SparseEntry, SparseError, SparseTensor, get_column, inner_product,
};

/// KappaParts — one column's share of the kappa numerator and denominator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KappaParts {
    pub numerator: f64,
    pub denominator: f64,
}

/// KappaBaseline — global kappa of the bounded matrix, fixed for a search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KappaBaseline {
    pub kappa_complement: f64,
    pub numerator: f64,
    pub denominator: f64,
}

impl From<&QwkOutcome> for KappaBaseline {
    fn from(outcome: &QwkOutcome) -> Self {
        KappaBaseline {
            kappa_complement: outcome.kappa_complement,
            numerator: outcome.numerator,
            denominator: outcome.denominator,
        }
    }
}

/// OffsetRecord — chosen recalibration for one predicted column.
///
/// Fields
/// ------
/// - `source_column`: `f64` — raw predicted score the column is keyed by.
/// - `dest_column`: `i64` — category the column's mass is moved to.
/// - `offset`: `f64` — `dest_column − source_column`.
/// - `kappa_complement`: `f64` — delta-adjusted kappa-complement at the
///   chosen destination (`≤` the baseline).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OffsetRecord {
    pub source_column: f64,
    pub dest_column: i64,
    pub offset: f64,
    pub kappa_complement: f64,
}

/// Column `col` of `m` and `e` weighted by column `weight_col` of `w`.
///
/// Parameters
/// ----------
/// - `m`: `&RawMatrix` — raw contingency table.
/// - `e`: `&RawMatrix` — expected-value matrix of `m`.
/// - `w`: `&Matrix` — weight matrix over the category range.
/// - `col`: `f64` — raw column to read from `m` and `e`.
/// - `weight_col`: `i64` — category whose weights are applied; for an
///   unmoved column this is `range.clamp_floor(col)`.
///
/// Returns
/// -------
/// `KappaResult<KappaParts>` with
/// `numerator = ⟨m[:, col], w[:, weight_col]⟩` and
/// `denominator = ⟨e[:, col], w[:, weight_col]⟩`.
///
/// Errors
/// ------
/// - `KappaError::InvalidMatrix` when a row index of `m` or `e` is not
///   integral.
pub fn kappa_parts(
    m: &RawMatrix, e: &RawMatrix, w: &Matrix, col: f64, weight_col: i64,
) -> KappaResult<KappaParts> {
    let m_col = get_column(m, col)?.to_integral()?;
    let e_col = get_column(e, col)?.to_integral()?;
    column_parts(&m_col, &e_col, &get_column(w, weight_col)?)
}

fn column_parts(
    m_col: &SparseTensor<i64>, e_col: &SparseTensor<i64>, w_col: &SparseTensor<i64>,
) -> KappaResult<KappaParts> {
    Ok(KappaParts {
        numerator: inner_product(m_col, w_col)?,
        denominator: inner_product(e_col, w_col)?,
    })
}

/// WeightColumns — weight matrix split into dense per-destination columns.
///
/// Built once per optimizer run so each candidate destination in
/// [`compute_offsets`] is scored with a single pass over the source
/// column's non-zeros, instead of filtering `W` again per candidate.
///
/// Invariants
/// ----------
/// - `columns[d - lo][r - lo] == W[r, d]` for `r, d` in `range`; cells
///   absent from `W` are `0.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightColumns {
    range: CategoryRange,
    columns: Vec<Vec<f64>>,
}

impl WeightColumns {
    /// Split `w` over `range`; entries of `w` outside `range` are dropped.
    ///
    /// # Errors
    /// - `KappaError::Sparse` when `w` is not a matrix.
    pub fn new(w: &Matrix, range: CategoryRange) -> KappaResult<Self> {
        if w.arity() != 2 {
            return Err(SparseError::ArityMismatch { expected: 2, found: w.arity() }.into());
        }
        let size = (range.width() + 1) as usize;
        let mut columns = vec![vec![0.0; size]; size];
        for entry in w.iter() {
            let (row, col) = (entry.index[0], entry.index[1]);
            if range.contains(row) && range.contains(col) {
                columns[(col - range.lo()) as usize][(row - range.lo()) as usize] += entry.value;
            }
        }
        Ok(WeightColumns { range, columns })
    }

    /// `⟨col, W[:, dest]⟩`; zero when `dest` lies outside the range.
    fn weighted(&self, col: &SparseTensor<i64>, dest: i64) -> f64 {
        if !self.range.contains(dest) {
            return 0.0;
        }
        let weights = &self.columns[(dest - self.range.lo()) as usize];
        col.iter()
            .filter(|e| self.range.contains(e.index[0]))
            .map(|e| e.value * weights[(e.index[0] - self.range.lo()) as usize])
            .sum()
    }

    fn parts(
        &self, m_col: &SparseTensor<i64>, e_col: &SparseTensor<i64>, dest: i64,
    ) -> KappaParts {
        KappaParts {
            numerator: self.weighted(m_col, dest),
            denominator: self.weighted(e_col, dest),
        }
    }
}

/// Search the best destination category for one predicted column.
///
/// Parameters
/// ----------
/// - `m_raw`: `&RawMatrix` — raw contingency table.
/// - `e_raw`: `&RawMatrix` — expected-value matrix of `m_raw`.
/// - `weights`: [`WeightColumns`] — weight matrix over `rows_range`, split
///   once per run.
/// - `baseline`: [`KappaBaseline`] — global kappa of the bounded table.
/// - `rows_range`: [`CategoryRange`] — candidate destinations.
/// - `source_col`: `f64` — raw column being recalibrated.
///
/// Returns
/// -------
/// `KappaResult<OffsetRecord>`
///   The destination minimizing the delta-adjusted kappa-complement; ties
///   go to the smallest destination.
///
/// Errors
/// ------
/// - `KappaError::InvalidMatrix` when row indices are not integral.
///
/// Notes
/// -----
/// - Extracting the column costs one pass over `m_raw` and `e_raw`; each
///   candidate then costs O(nnz(column)), independent of the size of `W`.
pub fn compute_offsets(
    m_raw: &RawMatrix, e_raw: &RawMatrix, weights: &WeightColumns, baseline: KappaBaseline,
    rows_range: CategoryRange, source_col: f64,
) -> KappaResult<OffsetRecord> {
    let m_col = get_column(m_raw, source_col)?.to_integral()?;
    let e_col = get_column(e_raw, source_col)?.to_integral()?;

    let bounded_source = rows_range.clamp_floor(source_col);
    let at_source = weights.parts(&m_col, &e_col, bounded_source);

    let mut best_dest = bounded_source;
    let mut best_kappa = f64::INFINITY;
    for dest in rows_range.iter() {
        let at_dest = weights.parts(&m_col, &e_col, dest);
        let numerator = baseline.numerator + (at_dest.numerator - at_source.numerator);
        let denominator = baseline.denominator + (at_dest.denominator - at_source.denominator);
        let kappa = kappa_ratio(numerator, denominator);
        if kappa.total_cmp(&best_kappa) == Ordering::Less {
            best_dest = dest;
            best_kappa = kappa;
        }
    }

    debug!(
        source = source_col,
        dest = best_dest,
        kappac = best_kappa,
        baseline = baseline.kappa_complement,
        "column offset selected"
    );

    Ok(OffsetRecord {
        source_column: source_col,
        dest_column: best_dest,
        offset: best_dest as f64 - source_col,
        kappa_complement: best_kappa,
    })
}

/// Move every source column of `m_raw` to its destination category.
///
/// Parameters
/// ----------
/// - `m_raw`: `&RawMatrix` — raw contingency table.
/// - `offsets`: `&[OffsetRecord]` — offset table; columns absent from it
///   are left where they are.
///
/// Returns
/// -------
/// `KappaResult<RawMatrix>`
///   Canonical table in which each `(row, source, v)` became
///   `(row, dest, v)` plus a zero-valued `(row, source, 0)` marker. Several
///   sources mapping to one destination are summed.
///
/// Errors
/// ------
/// - `KappaError::Sparse` when `m_raw` is not a matrix.
pub fn offset_contingency_matrix(
    m_raw: &RawMatrix, offsets: &[OffsetRecord],
) -> KappaResult<RawMatrix> {
    let mut table: Vec<&OffsetRecord> = offsets.iter().collect();
    table.sort_by(|a, b| a.source_column.total_cmp(&b.source_column));

    let mut moved: Vec<SparseEntry<f64>> = Vec::with_capacity(m_raw.len() * 2);
    for entry in m_raw.iter() {
        let (row, col) = (entry.index[0], entry.index[1]);
        match table.binary_search_by(|r| r.source_column.total_cmp(&col)) {
            Ok(pos) => {
                let dest = table[pos].dest_column as f64;
                moved.push(SparseEntry::new(vec![row, dest], entry.value));
                moved.push(SparseEntry::new(vec![row, col], 0.0));
            }
            Err(_) => moved.push(entry.clone()),
        }
    }
    Ok(RawMatrix::from_entries(2, moved)?)
}
