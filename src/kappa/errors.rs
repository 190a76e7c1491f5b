//! kappa::errors — error types for the kappa engine and calibration.
//!
//! Purpose
//! -------
//! Provide [`KappaError`] and [`KappaResult`], the error surface shared by
//! weight/expected-value computation, matrix bounding, the offset optimizer
//! and the data-source boundary, together with a conversion to Python
//! exceptions for the PyO3 bindings.
//!
//! Key behaviors
//! -------------
//! - Attach domain-phrased `Display` messages to every variant.
//! - Wrap structural sparse failures (`SparseError`) and collaborator
//!   failures (`anyhow::Error`) so that `?` works across module boundaries.
//! - With `python-bindings`, map every variant to `PyValueError` keeping the
//!   Rust message.
//!
//! Invariants & assumptions
//! ------------------------
//! - `DegenerateRange` is raised only by `weight_matrix`; the kappa entry
//!   points special-case a single-category range to a kappa-complement of 0
//!   instead of propagating it.
//! - `EmptyDataset` is fatal: no expected-value matrix exists for a table
//!   without mass.
//!
//! Testing notes
//! -------------
//! - Unit tests check that messages embed their payloads and that the
//!   `From` conversions pick the expected variant.

#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

use crate::sparse::SparseError;

pub type KappaResult<T> = Result<T, KappaError>;

/// KappaError — failures of kappa computation and calibration.
///
/// Variants
/// --------
/// - `DegenerateRange { lo, hi }`
///   The category range has zero width, so the weight normalization
///   `(hi - lo)²` is zero.
/// - `EmptyDataset`
///   The contingency table carries no mass (`total_sum == 0`).
/// - `InvalidMatrix { detail }`
///   Negative or non-finite counts, non-finite scores, non-integral
///   category indices, `lo > hi`, or actual categories outside the
///   declared range.
/// - `Sparse(SparseError)`
///   Structural failure from the sparse core (arity or mask mismatch).
/// - `DataSource { text }`
///   A collaborator (`DataSource`) call failed and could not be degraded.
#[derive(Debug, Clone, PartialEq)]
pub enum KappaError {
    // ---- Range / mass ----
    DegenerateRange { lo: i64, hi: i64 },
    EmptyDataset,

    // ---- Input validation ----
    InvalidMatrix { detail: String },

    // ---- Passthrough ----
    Sparse(SparseError),
    DataSource { text: String },
}

impl KappaError {
    pub(crate) fn invalid(detail: impl Into<String>) -> Self {
        KappaError::InvalidMatrix { detail: detail.into() }
    }
}

impl From<SparseError> for KappaError {
    fn from(err: SparseError) -> Self {
        match err {
            SparseError::NonIntegralCoordinate { value } => KappaError::InvalidMatrix {
                detail: format!("category index {value} is not an integer"),
            },
            other => KappaError::Sparse(other),
        }
    }
}

impl From<anyhow::Error> for KappaError {
    fn from(err: anyhow::Error) -> Self {
        KappaError::DataSource { text: err.to_string() }
    }
}

impl std::error::Error for KappaError {}

impl std::fmt::Display for KappaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KappaError::DegenerateRange { lo, hi } => {
                write!(f, "Degenerate category range [{lo}, {hi}]: weights need hi > lo")
            }
            KappaError::EmptyDataset => {
                write!(f, "Contingency table has zero total mass")
            }
            KappaError::InvalidMatrix { detail } => {
                write!(f, "Invalid contingency matrix: {detail}")
            }
            KappaError::Sparse(err) => write!(f, "Sparse tensor error: {err}"),
            KappaError::DataSource { text } => write!(f, "Data source error: {text}"),
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<KappaError> for PyErr {
    fn from(err: KappaError) -> PyErr {
        PyValueError::new_err(format!("KappaError: {err}"))
    }
}
