//! calibration::optimizer — bound, score, recalibrate, re-score.
//!
//! Purpose
//! -------
//! Compose the kappa engine and the offset search into one entry point:
//! bound the raw table, compute its kappa-complement, search one offset per
//! predicted column, apply the offsets, re-bound and re-score.
//!
//! Key behaviors
//! -------------
//! - The category range comes from [`OptimizeOptions::category_range`] when
//!   set, otherwise from the rows present in the raw table.
//! - A table with more distinct rows than columns is processed but logged
//!   with `warn!`; it usually indicates a malformed contingency table.
//! - Per-column searches share one fixed baseline and may run on the rayon
//!   pool; the offset table is always in ascending source-column order.
//!
//! Invariants & assumptions
//! ------------------------
//! - `adj_contingency` and `adj_kappac` are `Some` exactly when
//!   optimization ran; `offsets` is empty otherwise.
//! - Every offset record's kappa-complement is `≤ kappac`.
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::calibration::{
    offsets::{
        KappaBaseline, OffsetRecord, WeightColumns, compute_offsets, offset_contingency_matrix,
    },
    options::OptimizeOptions,
};
use crate::kappa::{
    bounding::bound_matrix,
    errors::{KappaError, KappaResult},
    qwk::{expected_value_matrix, quadratically_weighted_kappa_over},
    range::CategoryRange,
    validation::validate_raw_matrix,
};
use crate::sparse::{Matrix, RawMatrix, column_sums, row_sums};

/// OptimizationOutcome — result record of one optimizer run.
///
/// Fields
/// ------
/// - `range`: [`CategoryRange`] — category range used for bounding/weights.
/// - `contingency`: [`Matrix`] — bounded raw table.
/// - `kappac`: `f64` — kappa-complement of `contingency`.
/// - `offsets`: `Vec<OffsetRecord>` — one record per raw column, ascending.
/// - `adj_contingency`: `Option<Matrix>` — bounded table after offsets.
/// - `adj_kappac`: `Option<f64>` — kappa-complement of `adj_contingency`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OptimizationOutcome {
    pub range: CategoryRange,
    pub contingency: Matrix,
    pub kappac: f64,
    pub offsets: Vec<OffsetRecord>,
    pub adj_contingency: Option<Matrix>,
    pub adj_kappac: Option<f64>,
}

/// Bound a raw contingency table, score it, and optionally recalibrate it.
///
/// Parameters
/// ----------
/// - `m_raw`: `&RawMatrix`
///   Raw table keyed `(actual category, predicted score)`.
/// - `options`: `&OptimizeOptions`
///   Whether to search offsets, optional category range, parallelism.
///
/// Returns
/// -------
/// `KappaResult<OptimizationOutcome>`
///
/// Errors
/// ------
/// - `KappaError::InvalidMatrix` for malformed input (see
///   `kappa::validation`).
/// - `KappaError::EmptyDataset` when the table has no rows or zero mass.
///
/// Notes
/// -----
/// - The expected-value matrix used by the search is computed from the raw
///   table, so each raw column's expected counts are available; it agrees
///   with the bounded table's expected matrix column-sum by column-sum.
///
/// Examples
/// --------
/// ```rust
/// use qwk_calibration::calibration::{OptimizeOptions, optimize_contingency_matrix};
/// use qwk_calibration::kappa::{ContingencyTriple, raw_matrix_from_triples};
///
/// let raw = raw_matrix_from_triples(vec![
///     ContingencyTriple::new(0, 0.2, 5.0),
///     ContingencyTriple::new(1, 1.9, 4.0),
///     ContingencyTriple::new(2, 2.5, 5.0),
/// ])?;
/// let outcome = optimize_contingency_matrix(&raw, &OptimizeOptions::default())?;
///
/// assert_eq!(outcome.offsets.len(), 3);
/// assert!(outcome.adj_kappac.unwrap() <= outcome.kappac);
/// # Ok::<(), qwk_calibration::kappa::KappaError>(())
/// ```
pub fn optimize_contingency_matrix(
    m_raw: &RawMatrix, options: &OptimizeOptions,
) -> KappaResult<OptimizationOutcome> {
    validate_raw_matrix(m_raw, options.category_range)?;

    let rows = row_sums(m_raw)?.to_integral()?;
    let cols = column_sums(m_raw)?;
    let range = match options.category_range {
        Some(range) => range,
        None => CategoryRange::spanning(&rows).ok_or(KappaError::EmptyDataset)?,
    };
    if rows.len() > cols.len() {
        warn!(
            rows = rows.len(),
            columns = cols.len(),
            "contingency matrix has more rows than columns; continuing"
        );
    }

    let expected_raw = expected_value_matrix(m_raw)?;
    let contingency = bound_matrix(m_raw, range)?;
    let baseline = quadratically_weighted_kappa_over(&contingency, range)?;
    debug!(kappac = baseline.kappa_complement, lo = range.lo(), hi = range.hi(), "baseline kappa");

    if !options.enable_optimization {
        return Ok(OptimizationOutcome {
            range,
            contingency,
            kappac: baseline.kappa_complement,
            offsets: Vec::new(),
            adj_contingency: None,
            adj_kappac: None,
        });
    }

    let fixed = KappaBaseline::from(&baseline);
    let weights = WeightColumns::new(&baseline.weights, range)?;
    let sources: Vec<f64> = cols.iter().map(|e| e.index[0]).collect();
    let search =
        |source: f64| compute_offsets(m_raw, &expected_raw, &weights, fixed, range, source);
    let offsets: Vec<OffsetRecord> = if options.parallel {
        sources.par_iter().map(|&source| search(source)).collect::<KappaResult<_>>()?
    } else {
        sources.iter().map(|&source| search(source)).collect::<KappaResult<_>>()?
    };

    let adjusted_raw = offset_contingency_matrix(m_raw, &offsets)?;
    let adj_contingency = bound_matrix(&adjusted_raw, range)?;
    let adjusted = quadratically_weighted_kappa_over(&adj_contingency, range)?;
    debug!(
        kappac = baseline.kappa_complement,
        adj_kappac = adjusted.kappa_complement,
        columns = offsets.len(),
        "offsets applied"
    );

    Ok(OptimizationOutcome {
        range,
        contingency,
        kappac: baseline.kappa_complement,
        offsets,
        adj_contingency: Some(adj_contingency),
        adj_kappac: Some(adjusted.kappa_complement),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kappa::contingency::{ContingencyTriple, raw_matrix_from_triples};
    use crate::sparse::total_sum;

    fn raw(triples: &[(i64, f64, f64)]) -> RawMatrix {
        raw_matrix_from_triples(triples.iter().map(|&(a, p, c)| ContingencyTriple::new(a, p, c)))
            .unwrap()
    }

    #[test]
    // Purpose
    // -------
    // With optimization disabled only the bounded table and its kappa are
    // reported.
    fn disabled_optimization_omits_adjusted_fields() {
        let m = raw(&[(0, 0.0, 3.0), (1, 1.5, 2.0), (2, 2.0, 1.0)]);
        let opts = OptimizeOptions { enable_optimization: false, ..OptimizeOptions::default() };

        let outcome = optimize_contingency_matrix(&m, &opts).unwrap();

        assert!(outcome.offsets.is_empty());
        assert_eq!(outcome.adj_contingency, None);
        assert_eq!(outcome.adj_kappac, None);
        assert_eq!(outcome.kappac, 0.0);
    }

    #[test]
    fn parallel_and_sequential_runs_agree() {
        let m = raw(&[
            (0, -0.5, 4.0),
            (0, 1.2, 1.0),
            (1, 1.8, 3.0),
            (1, 3.4, 2.0),
            (2, 2.2, 2.0),
            (2, 3.9, 5.0),
            (3, 3.1, 4.0),
        ]);
        let sequential = OptimizeOptions::default();
        let parallel = OptimizeOptions { parallel: true, ..OptimizeOptions::default() };

        let a = optimize_contingency_matrix(&m, &sequential).unwrap();
        let b = optimize_contingency_matrix(&m, &parallel).unwrap();

        assert_eq!(a, b);
        assert!(a.offsets.iter().all(|r| r.kappa_complement <= a.kappac));
        assert_eq!(total_sum(a.adj_contingency.as_ref().unwrap()), total_sum(&m));
    }

    #[test]
    fn explicit_range_rejects_rows_outside_it() {
        let m = raw(&[(0, 0.0, 1.0), (5, 5.0, 1.0)]);
        let opts = OptimizeOptions::new(true, Some((0, 3)), false).unwrap();

        let result = optimize_contingency_matrix(&m, &opts);

        assert!(matches!(result, Err(KappaError::InvalidMatrix { .. })));
    }

    #[test]
    fn zero_mass_table_is_an_empty_dataset() {
        let m = raw(&[(0, 0.0, 0.0), (1, 1.0, 0.0)]);

        let result = optimize_contingency_matrix(&m, &OptimizeOptions::default());

        assert_eq!(result, Err(KappaError::EmptyDataset));
    }

    #[test]
    fn single_category_problem_reports_zero() {
        let m = raw(&[(2, 0.5, 3.0), (2, 4.0, 1.0)]);

        let outcome = optimize_contingency_matrix(&m, &OptimizeOptions::default()).unwrap();

        assert_eq!(outcome.kappac, 0.0);
        assert_eq!(outcome.adj_kappac, Some(0.0));
        assert!(outcome.offsets.iter().all(|r| r.dest_column == 2));
    }
}
