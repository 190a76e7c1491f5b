//! kappa::weights — quadratic disagreement weights.
//!
//! The weight of predicting category `j` when the truth is `i` is the
//! normalized squared distance `(i - j)² / (hi - lo)²`, so the diagonal is 0
//! and the two extreme corners are 1.
use crate::kappa::{
    errors::{KappaError, KappaResult},
    range::CategoryRange,
};
use crate::sparse::Matrix;

/// Dense-as-sparse quadratic weight matrix over `range × range`.
///
/// Parameters
/// ----------
/// - `range`: [`CategoryRange`]
///   Closed category interval `[lo, hi]`.
///
/// Returns
/// -------
/// `KappaResult<Matrix>`
///   `(hi - lo + 1)²` entries in canonical order, including the zero-valued
///   diagonal.
///
/// Errors
/// ------
/// - `KappaError::DegenerateRange` when `lo == hi`; the normalization would
///   divide by zero. Kappa entry points report a kappa-complement of 0 for
///   that case instead of calling this function.
pub fn weight_matrix(range: CategoryRange) -> KappaResult<Matrix> {
    if range.is_degenerate() {
        return Err(KappaError::DegenerateRange { lo: range.lo(), hi: range.hi() });
    }
    let norm = (range.width() as f64).powi(2);
    Ok(Matrix::from_triples(range.iter().flat_map(|i| {
        range.iter().map(move |j| (i, j, ((i - j) as f64).powi(2) / norm))
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Pin the literal 3×3 weight matrix over [0, 2].
    fn weight_matrix_zero_to_two_matches_literal() {
        let range = CategoryRange::new(0, 2).unwrap();

        let w = weight_matrix(range).unwrap();

        let expected = Matrix::from_triples(vec![
            (0, 0, 0.0),
            (0, 1, 0.25),
            (0, 2, 1.0),
            (1, 0, 0.25),
            (1, 1, 0.0),
            (1, 2, 0.25),
            (2, 0, 1.0),
            (2, 1, 0.25),
            (2, 2, 0.0),
        ]);
        assert_eq!(w, expected);
    }

    #[test]
    fn weight_matrix_is_shift_invariant() {
        let shifted = weight_matrix(CategoryRange::new(3, 5).unwrap()).unwrap();

        assert_eq!(shifted.len(), 9);
        assert_eq!(shifted.get(&[3, 5]), Some(1.0));
        assert_eq!(shifted.get(&[4, 3]), Some(0.25));
    }

    #[test]
    fn weight_matrix_rejects_single_category() {
        let result = weight_matrix(CategoryRange::new(1, 1).unwrap());

        assert_eq!(result, Err(KappaError::DegenerateRange { lo: 1, hi: 1 }));
    }
}
