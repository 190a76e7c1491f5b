//! kappa::contingency — raw contingency input and dense rendering.
//!
//! Purpose
//! -------
//! Turn the boundary representation of a contingency table (an
//! arbitrary-order collection of `(actual, predicted, count)` triples) into
//! a canonical [`RawMatrix`], and render canonical integer matrices as dense
//! `ndarray` arrays for inspection and the Python bridge.
//!
//! Conventions
//! -----------
//! - Rows are actual categories; columns are raw predicted scores.
//! - `-0.0` scores are normalized to `0.0` so both land in one column under
//!   the `f64::total_cmp` order.
use ndarray::Array2;

use crate::kappa::{errors::KappaResult, range::CategoryRange, validation::validate_triple};
use crate::sparse::{Matrix, RawMatrix};

/// ContingencyTriple — one observed `(actual, predicted)` co-occurrence.
///
/// Fields
/// ------
/// - `actual`: `i64` — true ordinal category.
/// - `predicted`: `f64` — raw model score; may be fractional or out of range.
/// - `count`: `f64` — observed (possibly weighted) count, `>= 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContingencyTriple {
    pub actual: i64,
    pub predicted: f64,
    pub count: f64,
}

impl ContingencyTriple {
    pub fn new(actual: i64, predicted: f64, count: f64) -> Self {
        ContingencyTriple { actual, predicted, count }
    }
}

/// Build a canonical raw contingency matrix from triples.
///
/// Parameters
/// ----------
/// - `triples`: `impl IntoIterator<Item = ContingencyTriple>`
///   Observations in any order; repeated `(actual, predicted)` pairs are
///   summed.
///
/// Returns
/// -------
/// `KappaResult<RawMatrix>`
///   Canonical matrix keyed `(actual as f64, predicted)`.
///
/// Errors
/// ------
/// - `KappaError::InvalidMatrix` for the first triple with a non-finite
///   score or a negative / non-finite count.
///
/// Notes
/// -----
/// - Zero-count triples are kept as zero-valued cells, so partitions with
///   no observations still contribute their (empty) columns.
pub fn raw_matrix_from_triples<I>(triples: I) -> KappaResult<RawMatrix>
where
    I: IntoIterator<Item = ContingencyTriple>,
{
    let mut cells: Vec<(f64, f64, f64)> = Vec::new();
    for triple in triples {
        validate_triple(&triple)?;
        cells.push((triple.actual as f64, triple.predicted + 0.0, triple.count));
    }
    Ok(RawMatrix::from_triples(cells))
}

/// Dense `rows × cols` rendering of a canonical integer matrix.
///
/// Cell `[i, j]` holds the value at `(rows.lo() + i, cols.lo() + j)`;
/// entries outside either range are not rendered.
pub fn to_dense(m: &Matrix, rows: CategoryRange, cols: CategoryRange) -> Array2<f64> {
    let shape = ((rows.width() + 1) as usize, (cols.width() + 1) as usize);
    let mut dense = Array2::<f64>::zeros(shape);
    for entry in m.iter() {
        let (row, col) = (entry.index[0], entry.index[1]);
        if rows.contains(row) && cols.contains(col) {
            dense[[(row - rows.lo()) as usize, (col - cols.lo()) as usize]] += entry.value;
        }
    }
    dense
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kappa::errors::KappaError;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // Triples are canonicalized: repeated cells summed, order by
    // (actual, predicted), zero counts retained.
    fn raw_matrix_from_triples_canonicalizes() {
        // Arrange
        let triples = vec![
            ContingencyTriple::new(1, 0.5, 2.0),
            ContingencyTriple::new(0, 1.25, 1.0),
            ContingencyTriple::new(1, 0.5, 3.0),
            ContingencyTriple::new(0, -0.0, 0.0),
        ];

        // Act
        let m = raw_matrix_from_triples(triples).unwrap();

        // Assert
        assert_eq!(m.len(), 3);
        assert_eq!(m.get(&[1.0, 0.5]), Some(5.0));
        assert_eq!(m.get(&[0.0, 0.0]), Some(0.0));
        assert_eq!(m.entries()[0].index, vec![0.0, 0.0]);
    }

    #[test]
    fn raw_matrix_from_triples_rejects_negative_count() {
        let result = raw_matrix_from_triples(vec![ContingencyTriple::new(0, 0.0, -2.0)]);

        assert!(matches!(result, Err(KappaError::InvalidMatrix { .. })));
    }

    #[test]
    fn to_dense_places_cells_by_offset() {
        let m = Matrix::from_triples(vec![(1, 1, 2.0), (1, 3, 1.0), (2, 2, 4.0), (9, 9, 1.0)]);
        let range = CategoryRange::new(1, 3).unwrap();

        let dense = to_dense(&m, range, range);

        assert_eq!(dense, array![[2.0, 0.0, 1.0], [0.0, 4.0, 0.0], [0.0, 0.0, 0.0]]);
    }
}
