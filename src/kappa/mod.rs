//! kappa — quadratically weighted kappa over sparse contingency tables.
//!
//! Purpose
//! -------
//! Compute the quadratically weighted kappa-complement between an ordinal
//! "actual category" axis and a "predicted category" axis, starting from
//! raw `(actual, predicted score, count)` observations.
//!
//! Key behaviors
//! -------------
//! - [`raw_matrix_from_triples`] validates boundary input and builds a
//!   canonical raw table; [`validate_raw_matrix`] checks tables built by
//!   other means.
//! - [`bound_matrix`] maps raw scores into the category range.
//! - [`weight_matrix`], [`expected_value_matrix`], [`frobenius_product`]
//!   and [`quadratically_weighted_kappa`] implement the statistic.
//!
//! Invariants & assumptions
//! ------------------------
//! - The reported quantity is the kappa-*complement* (`0` = perfect
//!   agreement, smaller is better); it is never converted to the
//!   conventional kappa.
//! - A single-category range reports a kappa-complement of `0`; a table
//!   with zero total mass fails with [`KappaError::EmptyDataset`].
//!
//! Conventions
//! -----------
//! - Rows (index position 0) are actual categories, columns (position 1)
//!   are predicted categories.
//! - All failures are reported through [`KappaResult`]; nothing in this
//!   subtree panics on user input.
//!
//! Testing notes
//! -------------
//! - Each module carries unit tests for its own branches; the end-to-end
//!   properties (mass conservation, perfect agreement, non-regression) are
//!   exercised in `tests/integration_qwk_pipeline.rs`.

pub mod bounding;
pub mod contingency;
pub mod errors;
pub mod qwk;
pub mod range;
pub mod validation;
pub mod weights;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::bounding::bound_matrix;
pub use self::contingency::{ContingencyTriple, raw_matrix_from_triples, to_dense};
pub use self::errors::{KappaError, KappaResult};
pub use self::qwk::{
    QwkOutcome, expected_value_matrix, frobenius_product, quadratically_weighted_kappa,
    quadratically_weighted_kappa_over,
};
pub use self::range::CategoryRange;
pub use self::validation::{validate_raw_matrix, validate_triple};
pub use self::weights::weight_matrix;
