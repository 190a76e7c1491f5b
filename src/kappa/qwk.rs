//! kappa::qwk — expected-value matrix and the quadratically weighted kappa.
//!
//! Purpose
//! -------
//! Compute the kappa-complement of a bounded contingency matrix,
//!
//! ```text
//! k = ⟨M, W⟩_F / ⟨E, W⟩_F
//! ```
//!
//! where `W` is the quadratic weight matrix over the row category range and
//! `E` is the expected contingency table under independence of the actual
//! and predicted axes.
//!
//! Key behaviors
//! -------------
//! - [`expected_value_matrix`] builds `E[i, j] = rowsum(i) · colsum(j) / total`.
//! - [`frobenius_product`] is the matrix inner product `Σ A[i,j]·B[i,j]`.
//! - [`quadratically_weighted_kappa`] returns the kappa-complement together
//!   with `W`, `E` and the raw numerator/denominator the offset optimizer
//!   uses as its fixed baseline.
//!
//! Invariants & assumptions
//! ------------------------
//! - Smaller is better: `k = 0` is a perfectly diagonal matrix. This is the
//!   complement `1 − κ` of the conventional statistic and is reported as is.
//! - A single-category row range reports `k = 0` with a one-cell zero weight
//!   matrix; there is no disagreement to measure.
//! - A zero weighted expected disagreement (`⟨E, W⟩ = 0`) also reports
//!   `k = 0`; this only happens when every row but one carries zero mass.
//!
//! Testing notes
//! -------------
//! - Unit tests pin the perfect-agreement and maximal-disagreement cases,
//!   the degenerate range, the empty-table error, and agreement with a
//!   dense hand computation via `ndarray`.
use crate::kappa::{
    errors::{KappaError, KappaResult},
    range::CategoryRange,
    weights::weight_matrix,
};
use crate::sparse::{
    Coordinate, Matrix, SparseTensor, column_sums, combine, row_sums, total_sum,
};

/// QwkOutcome — kappa-complement and the pieces it was computed from.
///
/// Fields
/// ------
/// - `kappa_complement`: `f64` — `numerator / denominator` (0 when the
///   denominator vanishes).
/// - `numerator`: `f64` — `⟨M, W⟩_F`, observed weighted disagreement.
/// - `denominator`: `f64` — `⟨E, W⟩_F`, expected weighted disagreement.
/// - `weights`: [`Matrix`] — `W` over `range × range`.
/// - `expected`: [`Matrix`] — `E` for the input matrix.
/// - `range`: [`CategoryRange`] — row category range `W` was built over.
#[derive(Debug, Clone, PartialEq)]
pub struct QwkOutcome {
    pub kappa_complement: f64,
    pub numerator: f64,
    pub denominator: f64,
    pub weights: Matrix,
    pub expected: Matrix,
    pub range: CategoryRange,
}

/// Expected contingency counts under independence.
///
/// Parameters
/// ----------
/// - `m`: `&SparseTensor<C>`
///   Contingency matrix; works for integer and raw real coordinates alike.
///
/// Returns
/// -------
/// `KappaResult<SparseTensor<C>>`
///   `E[i, j] = rowsum(i) · colsum(j) / total` for every present row `i`
///   and present column `j`, in canonical order.
///
/// Errors
/// ------
/// - `KappaError::EmptyDataset` when `total_sum(m) == 0`.
/// - `KappaError::Sparse` when `m` is not a matrix.
pub fn expected_value_matrix<C: Coordinate>(m: &SparseTensor<C>) -> KappaResult<SparseTensor<C>> {
    let total = total_sum(m);
    if total == 0.0 {
        return Err(KappaError::EmptyDataset);
    }
    let rows = row_sums(m)?;
    let cols = column_sums(m)?;
    let inv_total = 1.0 / total;

    let cells = rows.iter().flat_map(|r| {
        cols.iter().map(move |c| (r.index[0], c.index[0], r.value * c.value * inv_total))
    });
    Ok(SparseTensor::from_triples(cells))
}

/// Frobenius (matrix inner) product `Σ A[i,j]·B[i,j]`.
pub fn frobenius_product<C: Coordinate>(
    a: &SparseTensor<C>, b: &SparseTensor<C>,
) -> KappaResult<f64> {
    Ok(total_sum(&combine(|x, y| x * y, a, b)?))
}

/// `numerator / denominator`, reporting 0 when the denominator vanishes.
#[inline]
pub(crate) fn kappa_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 { 0.0 } else { numerator / denominator }
}

/// Quadratically weighted kappa-complement of a bounded contingency matrix.
///
/// Parameters
/// ----------
/// - `m`: `&Matrix`
///   Contingency matrix over integer categories; the weight matrix is built
///   over the range spanned by its rows.
///
/// Returns
/// -------
/// `KappaResult<QwkOutcome>`
///   Kappa-complement plus `W`, `E`, numerator and denominator.
///
/// Errors
/// ------
/// - `KappaError::EmptyDataset` when `m` has no rows or zero total mass.
/// - `KappaError::Sparse` when `m` is not a matrix.
///
/// Notes
/// -----
/// - Columns of `m` outside the row range have no weights and therefore do
///   not contribute; callers bound the matrix first.
///
/// Examples
/// --------
/// ```rust
/// use qwk_calibration::kappa::qwk::quadratically_weighted_kappa;
/// use qwk_calibration::sparse::Matrix;
///
/// let diagonal = Matrix::from_triples(vec![(0, 0, 5.0), (1, 1, 4.0), (2, 2, 5.0)]);
/// let outcome = quadratically_weighted_kappa(&diagonal)?;
/// assert_eq!(outcome.kappa_complement, 0.0);
/// # Ok::<(), qwk_calibration::kappa::KappaError>(())
/// ```
pub fn quadratically_weighted_kappa(m: &Matrix) -> KappaResult<QwkOutcome> {
    let rows = row_sums(m)?;
    let range = CategoryRange::spanning(&rows).ok_or(KappaError::EmptyDataset)?;
    quadratically_weighted_kappa_over(m, range)
}

/// Kappa-complement with the weight matrix built over an explicit range.
///
/// Used when the category range of the objective field is known up front
/// and may be wider than the rows present in `m`. Rows or columns of `m`
/// outside `range` carry no weight.
///
/// Errors
/// ------
/// - `KappaError::EmptyDataset` when `m` has zero total mass.
/// - `KappaError::Sparse` when `m` is not a matrix.
pub fn quadratically_weighted_kappa_over(
    m: &Matrix, range: CategoryRange,
) -> KappaResult<QwkOutcome> {
    let expected = expected_value_matrix(m)?;

    if range.is_degenerate() {
        return Ok(QwkOutcome {
            kappa_complement: 0.0,
            numerator: 0.0,
            denominator: 0.0,
            weights: Matrix::from_triples(vec![(range.lo(), range.lo(), 0.0)]),
            expected,
            range,
        });
    }

    let weights = weight_matrix(range)?;
    let numerator = frobenius_product(m, &weights)?;
    let denominator = frobenius_product(&expected, &weights)?;

    Ok(QwkOutcome {
        kappa_complement: kappa_ratio(numerator, denominator),
        numerator,
        denominator,
        weights,
        expected,
        range,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kappa::contingency::to_dense;
    use approx::assert_relative_eq;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // - Expected-value matrix: values, mass preservation, empty input.
    // - Kappa-complement: perfect agreement, maximal disagreement,
    //   degenerate range, and a dense cross-check.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // `E` is the outer product of row and column sums scaled by 1/total and
    // carries the same total mass as the input.
    //
    // Given
    // -----
    // - M = [[2, 1], [0, 1]] (row sums 3, 1; column sums 2, 2; total 4).
    //
    // Expect
    // ------
    // - E = [[1.5, 1.5], [0.5, 0.5]].
    fn expected_value_matrix_is_scaled_outer_product() {
        // Arrange
        let m = Matrix::from_triples(vec![(0, 0, 2.0), (0, 1, 1.0), (1, 1, 1.0)]);

        // Act
        let e = expected_value_matrix(&m).unwrap();

        // Assert
        assert_eq!(
            e,
            Matrix::from_triples(vec![(0, 0, 1.5), (0, 1, 1.5), (1, 0, 0.5), (1, 1, 0.5)])
        );
        assert_relative_eq!(total_sum(&e), total_sum(&m));
    }

    #[test]
    fn expected_value_matrix_rejects_zero_mass() {
        let zeros = Matrix::from_triples(vec![(0, 0, 0.0), (1, 1, 0.0)]);

        assert_eq!(expected_value_matrix(&zeros), Err(KappaError::EmptyDataset));
    }

    #[test]
    fn frobenius_product_sums_elementwise_products() {
        let a = Matrix::from_triples(vec![(0, 0, 2.0), (0, 1, 3.0)]);
        let b = Matrix::from_triples(vec![(0, 1, 4.0), (1, 1, 5.0)]);

        assert_eq!(frobenius_product(&a, &b).unwrap(), 12.0);
    }

    #[test]
    fn diagonal_matrix_has_zero_kappa_complement() {
        let m = Matrix::from_triples(vec![(0, 0, 5.0), (1, 1, 4.0), (2, 2, 5.0)]);

        let outcome = quadratically_weighted_kappa(&m).unwrap();

        assert_eq!(outcome.kappa_complement, 0.0);
        assert_eq!(outcome.numerator, 0.0);
        assert!(outcome.denominator > 0.0);
        assert_eq!(outcome.range, CategoryRange::new(0, 2).unwrap());
    }

    #[test]
    // Purpose
    // -------
    // All mass on the anti-diagonal corners gives the largest possible
    // disagreement: observed weighted disagreement is 2× the expected one.
    //
    // Given
    // -----
    // - M = {(0, 2): 5, (2, 0): 5} over [0, 2].
    //
    // Expect
    // ------
    // - numerator = 10 · 1 = 10; E = 2.5 in each corner, so
    //   denominator = 2.5 · 1 · 2 = 5 and k = 2 (> 0 and ≥ 1).
    fn anti_diagonal_matrix_maximizes_kappa_complement() {
        // Arrange
        let m = Matrix::from_triples(vec![(0, 2, 5.0), (2, 0, 5.0)]);

        // Act
        let outcome = quadratically_weighted_kappa(&m).unwrap();

        // Assert
        assert_relative_eq!(outcome.numerator, 10.0);
        assert_relative_eq!(outcome.denominator, 5.0);
        assert_relative_eq!(outcome.kappa_complement, 2.0);
    }

    #[test]
    fn single_category_reports_zero_without_error() {
        let m = Matrix::from_triples(vec![(3, 3, 7.0), (3, 5, 1.0)]);

        let outcome = quadratically_weighted_kappa(&m).unwrap();

        assert_eq!(outcome.kappa_complement, 0.0);
        assert_eq!(outcome.weights, Matrix::from_triples(vec![(3, 3, 0.0)]));
    }

    #[test]
    fn explicit_range_wider_than_rows_adds_weight_columns() {
        let m = Matrix::from_triples(vec![(1, 1, 2.0), (1, 2, 1.0), (2, 2, 3.0)]);
        let range = CategoryRange::new(0, 4).unwrap();

        let outcome = quadratically_weighted_kappa_over(&m, range).unwrap();

        assert_eq!(outcome.weights.len(), 25);
        assert_relative_eq!(outcome.numerator, 1.0 / 16.0);
        assert!(outcome.kappa_complement > 0.0);
    }

    #[test]
    fn empty_matrix_is_an_empty_dataset() {
        let empty = Matrix::empty(2);

        assert_eq!(quadratically_weighted_kappa(&empty), Err(KappaError::EmptyDataset));
    }

    #[test]
    // Purpose
    // -------
    // The sparse computation agrees with a dense evaluation of the same
    // formula using `ndarray`.
    fn sparse_kappa_matches_dense_computation() {
        // Arrange
        let m = Matrix::from_triples(vec![
            (0, 0, 3.0),
            (0, 1, 1.0),
            (1, 0, 2.0),
            (1, 2, 0.5),
            (2, 1, 1.5),
            (2, 2, 4.0),
        ]);
        let range = CategoryRange::new(0, 2).unwrap();
        let dense = to_dense(&m, range, range);
        let total = dense.sum();
        let row = dense.sum_axis(ndarray::Axis(1));
        let col = dense.sum_axis(ndarray::Axis(0));
        let (mut num, mut den) = (0.0, 0.0);
        for i in 0..3 {
            for j in 0..3 {
                let w = ((i as f64) - (j as f64)).powi(2) / 4.0;
                num += dense[[i, j]] * w;
                den += row[i] * col[j] / total * w;
            }
        }

        // Act
        let outcome = quadratically_weighted_kappa(&m).unwrap();

        // Assert
        assert_relative_eq!(outcome.numerator, num, epsilon = 1e-12);
        assert_relative_eq!(outcome.denominator, den, epsilon = 1e-12);
        assert_relative_eq!(outcome.kappa_complement, num / den, epsilon = 1e-12);
    }
}
