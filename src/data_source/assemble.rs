//! data_source::assemble — build raw contingency tables from a data source.
//!
//! Each score interval becomes one predicted column keyed by the interval's
//! lower bound; the partition's category distribution fills that column.
use tracing::{debug, warn};

use crate::calibration::{OptimizationOutcome, OptimizeOptions, optimize_contingency_matrix};
use crate::data_source::{DataSource, ScoreInterval};
use crate::kappa::{
    contingency::{ContingencyTriple, raw_matrix_from_triples},
    errors::{KappaError, KappaResult},
};
use crate::sparse::RawMatrix;

/// Tile `[lo, hi)` into consecutive intervals of width `step`.
///
/// The last interval is truncated to end at `hi`.
///
/// # Errors
/// - [`KappaError::InvalidMatrix`] if `step` is not finite and positive or
///   `[lo, hi)` is empty.
pub fn score_intervals(lo: f64, hi: f64, step: f64) -> KappaResult<Vec<ScoreInterval>> {
    ScoreInterval::new(lo, hi)?;
    if !step.is_finite() || step <= 0.0 {
        return Err(KappaError::invalid(format!("score interval step {step} must be positive")));
    }

    let mut intervals = Vec::new();
    let mut k = 0_u32;
    loop {
        let start = lo + f64::from(k) * step;
        if start >= hi {
            break;
        }
        let end = (lo + f64::from(k + 1) * step).min(hi);
        intervals.push(ScoreInterval::new(start, end)?);
        k += 1;
    }
    Ok(intervals)
}

/// Assemble a raw contingency table from per-interval partitions.
///
/// Parameters
/// ----------
/// - `source`: `&S` where `S: DataSource`
///   Collaborator holding the labelled predictions.
/// - `intervals`: `&[ScoreInterval]`
///   Score bins; each non-empty bin contributes the column `interval.lo()`.
///
/// Returns
/// -------
/// `KappaResult<RawMatrix>`
///   Canonical raw table keyed `(actual category, interval lower bound)`.
///
/// Errors
/// ------
/// - `KappaError::DataSource` when the category range or a partition cannot
///   be obtained.
/// - `KappaError::InvalidMatrix` when a partition reports a category
///   outside the source's range or an invalid count.
///
/// Notes
/// -----
/// - A failed distribution fetch is logged and treated as an empty
///   distribution for that partition; it does not abort assembly.
pub fn assemble_contingency<S>(source: &S, intervals: &[ScoreInterval]) -> KappaResult<RawMatrix>
where
    S: DataSource + ?Sized,
{
    let range = source.category_range()?;
    let mut triples: Vec<ContingencyTriple> = Vec::new();

    for interval in intervals {
        let Some(partition) = source.create_partition(*interval)? else {
            debug!(lo = interval.lo(), hi = interval.hi(), "score interval selects no rows");
            continue;
        };
        let distribution = match source.category_distribution(&partition) {
            Ok(distribution) => distribution,
            Err(err) => {
                warn!(
                    %partition,
                    error = %err,
                    "category distribution unavailable; using empty distribution"
                );
                Vec::new()
            }
        };
        for (category, count) in distribution {
            if !range.contains(category) {
                return Err(KappaError::invalid(format!(
                    "partition {partition} reports category {category} outside [{}, {}]",
                    range.lo(),
                    range.hi()
                )));
            }
            triples.push(ContingencyTriple::new(category, interval.lo(), count));
        }
    }

    raw_matrix_from_triples(triples)
}

/// Assemble from `source` and run the optimizer with the source's range.
///
/// `options.category_range` is replaced by the range reported by `source`.
pub fn optimize_from_source<S>(
    source: &S, intervals: &[ScoreInterval], options: &OptimizeOptions,
) -> KappaResult<OptimizationOutcome>
where
    S: DataSource + ?Sized,
{
    let range = source.category_range()?;
    let raw = assemble_contingency(source, intervals)?;
    let pinned = OptimizeOptions { category_range: Some(range), ..*options };
    optimize_contingency_matrix(&raw, &pinned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_intervals_tiles_and_truncates() {
        let intervals = score_intervals(0.0, 2.5, 1.0).unwrap();

        let bounds: Vec<(f64, f64)> = intervals.iter().map(|i| (i.lo(), i.hi())).collect();
        assert_eq!(bounds, vec![(0.0, 1.0), (1.0, 2.0), (2.0, 2.5)]);
    }

    #[test]
    fn score_intervals_rejects_bad_step() {
        assert!(score_intervals(0.0, 1.0, 0.0).is_err());
        assert!(score_intervals(0.0, 1.0, f64::NAN).is_err());
    }
}
