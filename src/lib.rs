//! qwk_calibration — quadratically weighted kappa and per-column score
//! calibration with optional Python bindings.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that exposes
//! the kappa engine and the offset optimizer to Python via the
//! `_qwk_calibration` extension module.
//!
//! Key behaviors
//! -------------
//! - Re-export the core Rust modules (`sparse`, `kappa`, `calibration`,
//!   `data_source`) as the public crate surface.
//! - Define the `QWKOptimization` `#[pyclass]` and the `#[pymodule]`
//!   initializer for the `_qwk_calibration` Python extension.
//! - Register the `calibration` submodule in `sys.modules` so dotted imports
//!   work from Python.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work lives in the inner Rust modules; this file performs
//!   only FFI glue, input conversion, and error mapping.
//! - Contingency tables cross the boundary as three parallel columns
//!   (`actual`, `predicted`, `counts`) on the way in and as dense
//!   `float64` matrices indexed from the category range's lower bound on the
//!   way out.
//!
//! Conventions
//! -----------
//! - Kappa values are reported as the kappa-complement (`1 − κ`); lower is
//!   better and 0 means perfect agreement.
//! - Errors from core Rust code are propagated as [`kappa::KappaError`]
//!   internally and converted to `PyErr` values at the PyO3 boundary.
//!
//! Downstream usage
//! ----------------
//! - Native Rust code should depend on [`calibration::optimize_contingency_matrix`]
//!   or [`data_source::optimize_from_source`] and can ignore the PyO3 items
//!   guarded by the `python-bindings` feature.
//!
//! Testing notes
//! -------------
//! - Core behavior is covered by unit tests in the inner modules and by the
//!   end-to-end tests under `tests/`.

pub mod calibration;
pub mod data_source;
pub mod kappa;
pub mod sparse;
pub mod utils;

#[cfg(feature = "python-bindings")]
use numpy::{IntoPyArray, PyArray2};

#[cfg(feature = "python-bindings")]
use pyo3::{prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    calibration::{OptimizationOutcome, optimize_contingency_matrix},
    kappa::to_dense,
    sparse::Matrix,
    utils::{extract_optimize_options, extract_raw_matrix},
};

/// QWKOptimization — Python-facing wrapper for the offset optimizer.
///
/// Purpose
/// -------
/// Accept a contingency table as parallel columns from Python, run
/// [`optimize_contingency_matrix`] and expose the outcome as properties.
///
/// Parameters
/// ----------
/// Constructed from Python via
/// `QWKOptimization(actual, predicted, counts, enable_optimization=True, category_range=None)`:
/// - `actual`: array-like of `int64` true categories.
/// - `predicted`: array-like of `float64` predicted scores.
/// - `counts`: array-like of non-negative `float64` counts.
/// - `enable_optimization`: `bool`; defaults to `True`.
/// - `category_range`: `Option<(int, int)>`; defaults to the span of `actual`.
///
/// Notes
/// -----
/// - Per-column searches run on the rayon pool; the result does not depend on
///   scheduling.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "qwk_calibration.calibration")]
pub struct QWKOptimization {
    inner: OptimizationOutcome,
}

#[cfg(feature = "python-bindings")]
impl QWKOptimization {
    fn dense<'py>(&self, py: Python<'py>, m: &Matrix) -> Bound<'py, PyArray2<f64>> {
        let range = self.inner.range;
        to_dense(m, range, range).into_pyarray(py)
    }
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl QWKOptimization {
    #[new]
    #[pyo3(
        text_signature = "(actual, predicted, counts, /, enable_optimization=True, \
                          category_range=None)",
        signature = (actual, predicted, counts, enable_optimization = true, category_range = None)
    )]
    pub fn new<'py>(
        py: Python<'py>, actual: &Bound<'py, PyAny>, predicted: &Bound<'py, PyAny>,
        counts: &Bound<'py, PyAny>, enable_optimization: bool,
        category_range: Option<(i64, i64)>,
    ) -> PyResult<QWKOptimization> {
        let raw = extract_raw_matrix(py, actual, predicted, counts)?;
        let options = extract_optimize_options(enable_optimization, category_range)?;
        let inner = py.allow_threads(|| optimize_contingency_matrix(&raw, &options))?;
        Ok(QWKOptimization { inner })
    }

    /// Kappa-complement of the bounded input table.
    #[getter]
    pub fn kappac(&self) -> f64 {
        self.inner.kappac
    }

    /// Kappa-complement after applying the offsets, `None` when disabled.
    #[getter]
    pub fn adj_kappac(&self) -> Option<f64> {
        self.inner.adj_kappac
    }

    /// `(source_column, dest_column, offset, kappac)` per predicted column.
    #[getter]
    pub fn offsets(&self) -> Vec<(f64, i64, f64, f64)> {
        self.inner
            .offsets
            .iter()
            .map(|r| (r.source_column, r.dest_column, r.offset, r.kappa_complement))
            .collect()
    }

    /// `(lo, hi)` category range used for bounding and weights.
    #[getter]
    pub fn category_range(&self) -> (i64, i64) {
        (self.inner.range.lo(), self.inner.range.hi())
    }

    /// Bounded contingency table as a dense square matrix.
    #[getter]
    pub fn contingency<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray2<f64>> {
        self.dense(py, &self.inner.contingency)
    }

    /// Bounded table after offsets, `None` when optimization was disabled.
    #[getter]
    pub fn adj_contingency<'py>(&self, py: Python<'py>) -> Option<Bound<'py, PyArray2<f64>>> {
        self.inner.adj_contingency.as_ref().map(|m| self.dense(py, m))
    }
}

/// _qwk_calibration — PyO3 module initializer for the Python extension.
///
/// Key behaviors
/// -------------
/// - Create the `calibration` submodule holding [`QWKOptimization`].
/// - Register it in `sys.modules` as `qwk_calibration.calibration`.
///
/// Errors
/// ------
/// - `PyErr`
///   If creating the submodule or manipulating `sys.modules` fails.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _qwk_calibration<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let calibration_mod = PyModule::new(_py, "calibration")?;
    calibration(_py, m, &calibration_mod)?;

    // Manually add submodules into sys.modules to allow for dot notation.
    _py.import("sys")?
        .getattr("modules")?
        .set_item("qwk_calibration.calibration", calibration_mod)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn calibration<'py>(
    _py: Python, qwk_calibration: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_class::<QWKOptimization>()?;
    qwk_calibration.add_submodule(m)?;
    Ok(())
}
