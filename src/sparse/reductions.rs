//! sparse::reductions — derived views of sparse matrices and vectors.
//!
//! Every function here is a thin composition of [`SparseTensor::reduce`],
//! [`SparseTensor::drop_axes`] and [`combine`]; none of them touch entry
//! storage directly except for column filtering.
//!
//! Conventions:
//! - Matrices are arity-2 tensors indexed `(row, column)`.
//! - Row and column sums come back as arity-1 vectors keyed by the kept axis.
use crate::sparse::{
    errors::{SparseError, SparseResult},
    tensor::{Coordinate, SparseTensor, combine},
};

/// Mask that keeps the row position and ignores the column.
pub const IGNORE_COLUMN: [bool; 2] = [false, true];
/// Mask that keeps the column position and ignores the row.
pub const IGNORE_ROW: [bool; 2] = [true, false];

fn expect_matrix<C: Coordinate>(m: &SparseTensor<C>) -> SparseResult<()> {
    if m.arity() != 2 {
        return Err(SparseError::ArityMismatch { expected: 2, found: m.arity() });
    }
    Ok(())
}

/// Sum of each row, as a vector indexed by row.
pub fn row_sums<C: Coordinate>(m: &SparseTensor<C>) -> SparseResult<SparseTensor<C>> {
    expect_matrix(m)?;
    m.reduce(&IGNORE_COLUMN)?.drop_axes(&IGNORE_COLUMN)
}

/// Sum of each column, as a vector indexed by column.
pub fn column_sums<C: Coordinate>(m: &SparseTensor<C>) -> SparseResult<SparseTensor<C>> {
    expect_matrix(m)?;
    m.reduce(&IGNORE_ROW)?.drop_axes(&IGNORE_ROW)
}

/// Sum of every value in the tensor; `0.0` for an empty tensor.
pub fn total_sum<C: Coordinate>(t: &SparseTensor<C>) -> f64 {
    let everything = vec![true; t.arity()];
    t.reduce(&everything)
        .ok()
        .and_then(|grand| grand.entries().first().map(|e| e.value))
        .unwrap_or(0.0)
}

/// Entries of column `col`, projected to a vector indexed by row.
///
/// Returns an empty vector when the column is absent.
pub fn get_column<C: Coordinate>(m: &SparseTensor<C>, col: C) -> SparseResult<SparseTensor<C>> {
    expect_matrix(m)?;
    Ok(SparseTensor::from_pairs(
        m.iter()
            .filter(|e| e.index[1].cmp_coord(&col).is_eq())
            .map(|e| (e.index[0], e.value)),
    ))
}

/// Multiply every value by `alpha`.
pub fn scale<C: Coordinate>(t: &SparseTensor<C>, alpha: f64) -> SparseTensor<C> {
    t.map_values(|v| v * alpha)
}

/// Replace every column index with `col`, summing entries that collide.
pub fn relabel_column<C: Coordinate>(m: &SparseTensor<C>, col: C) -> SparseResult<SparseTensor<C>> {
    expect_matrix(m)?;
    m.map_index(|index| Ok(vec![index[0], col]))
}

/// Σₖ aₖ·bₖ over the keys present in either operand.
pub fn inner_product<C: Coordinate>(a: &SparseTensor<C>, b: &SparseTensor<C>) -> SparseResult<f64> {
    Ok(total_sum(&combine(|x, y| x * y, a, b)?))
}
