//! kappa::bounding — map raw predicted scores into valid ordinal bins.
//!
//! Purpose
//! -------
//! Convert a raw contingency table, whose predicted axis holds continuous
//! or out-of-range model scores, into a proper ordinal contingency matrix
//! over the category range.
//!
//! Key behaviors
//! -------------
//! - Partition entries into three bands by predicted score: below `lo`
//!   (forced to `lo`), above `hi` (forced to `hi`), and within `[lo, hi]`
//!   (floored to an integer).
//! - Recombine the bands with a sorted merge and re-reduce so cells that
//!   collide after forcing/flooring are summed.
//!
//! Invariants & assumptions
//! ------------------------
//! - Mass is preserved: `total_sum(bound_matrix(m, r)) == total_sum(m)`;
//!   only column placement changes.
//! - Row indices must already be integral; a fractional or non-finite
//!   coordinate surfaces as `KappaError::InvalidMatrix`.
use tracing::trace;

use crate::kappa::{errors::KappaResult, range::CategoryRange};
use crate::sparse::{Matrix, RawMatrix, SparseEntry, combine, relabel_column};

/// Clip and floor the predicted axis of `m` into `range`.
///
/// Parameters
/// ----------
/// - `m`: `&RawMatrix`
///   Raw table keyed `(actual, predicted score)`.
/// - `range`: [`CategoryRange`]
///   Valid category interval for the predicted axis.
///
/// Returns
/// -------
/// `KappaResult<Matrix>`
///   Canonical integer matrix whose columns all lie in `range`.
///
/// Errors
/// ------
/// - `KappaError::InvalidMatrix` when a row index is not integral or a
///   score is not finite.
/// - `KappaError::Sparse` when `m` is not a matrix.
pub fn bound_matrix(m: &RawMatrix, range: CategoryRange) -> KappaResult<Matrix> {
    let (lo, hi) = (range.lo() as f64, range.hi() as f64);

    let mut below: Vec<SparseEntry<f64>> = Vec::new();
    let mut above: Vec<SparseEntry<f64>> = Vec::new();
    let mut within: Vec<SparseEntry<f64>> = Vec::new();
    for entry in m.iter() {
        let score = entry.index[1];
        if score < lo {
            below.push(entry.clone());
        } else if score > hi {
            above.push(entry.clone());
        } else {
            within.push(entry.clone());
        }
    }
    trace!(
        below = below.len(),
        above = above.len(),
        within = within.len(),
        lo = range.lo(),
        hi = range.hi(),
        "bounding contingency matrix"
    );

    let below = relabel_column(&RawMatrix::from_entries(2, below)?, lo)?;
    let above = relabel_column(&RawMatrix::from_entries(2, above)?, hi)?;
    let within = RawMatrix::from_entries(2, within)?
        .map_index(|index| Ok(vec![index[0], index[1].floor()]))?;

    let forced = combine(|a, b| a + b, &below, &above)?;
    let merged = combine(|a, b| a + b, &forced, &within)?;
    Ok(merged.to_integral()?)
}
