//! sparse — sorted `(index-tuple, value)` tensors and their reductions.
//!
//! Purpose
//! -------
//! Provide the sparse algebra every kappa and calibration routine in this
//! crate is expressed in: a canonical sparse tensor type, the group-and-sum
//! reduction, the sorted-merge binary combination, and the derived views
//! (row/column/total sums, column extraction, scaling, relabeling).
//!
//! Key behaviors
//! -------------
//! - [`SparseTensor`] keeps entries sorted by one total order over index
//!   tuples and merges repeated tuples by summation.
//! - [`SparseTensor::reduce`] groups by the non-ignored index positions;
//!   [`combine`] merges two canonical tensors with an injected operator.
//! - [`reductions`] builds the matrix views used by the kappa engine.
//!
//! Invariants & assumptions
//! ------------------------
//! - Operations never mutate their inputs; each returns a new tensor.
//! - Implicit zeros are never materialized unless a key is present in at
//!   least one operand.
//!
//! Conventions
//! -----------
//! - [`Matrix`] (`SparseTensor<i64>`) holds contingency, weight and
//!   expected-value matrices over integer categories.
//! - [`RawMatrix`] (`SparseTensor<f64>`) holds raw contingency tables whose
//!   predicted axis may be fractional or out of range.
//!
//! Downstream usage
//! ----------------
//! ```rust
//! use qwk_calibration::sparse::{Matrix, reductions::{row_sums, total_sum}};
//!
//! let m: Matrix = Matrix::from_triples(vec![(0, 0, 2.0), (0, 1, 1.0), (1, 1, 3.0)]);
//! let rows = row_sums(&m)?;
//! assert_eq!(total_sum(&rows), total_sum(&m));
//! # Ok::<(), qwk_calibration::sparse::SparseError>(())
//! ```

pub mod errors;
pub mod reductions;
pub mod tensor;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::errors::{SparseError, SparseResult};
pub use self::reductions::{
    column_sums, get_column, inner_product, relabel_column, row_sums, scale, total_sum,
};
pub use self::tensor::{Coordinate, SparseEntry, SparseTensor, cmp_index, combine};

/// Sparse matrix over integer category indices.
pub type Matrix = SparseTensor<i64>;

/// Sparse matrix whose coordinates are raw real-valued scores.
pub type RawMatrix = SparseTensor<f64>;
