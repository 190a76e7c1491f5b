#[cfg(feature = "python-bindings")]
use numpy::{
    IntoPyArray,    // Vec → PyArray
    PyArrayMethods, // .readonly()
    PyReadonlyArray1,
};

#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    calibration::OptimizeOptions,
    kappa::{ContingencyTriple, raw_matrix_from_triples},
    sparse::RawMatrix,
};

#[cfg(feature = "python-bindings")]
#[inline]
pub fn extract_f64_array<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>,
) -> PyResult<PyReadonlyArray1<'py, f64>> {
    if let Ok(arr_ro) = raw_data.extract::<PyReadonlyArray1<f64>>() {
        if arr_ro.as_slice().is_ok() {
            return Ok(arr_ro);
        }
    }

    if let Ok(obj) = raw_data.call_method("to_numpy", (false,), None) {
        if let Ok(series_ro) = obj.extract::<PyReadonlyArray1<f64>>() {
            if series_ro.as_slice().is_ok() {
                return Ok(series_ro);
            }
        }
    }

    let vec: Vec<f64> = raw_data.extract().map_err(|_| {
        pyo3::exceptions::PyTypeError::new_err(
            "expected a 1-D numpy.ndarray, pandas.Series, or sequence of float64",
        )
    })?;
    Ok(vec.into_pyarray(py).readonly())
}

/// Integer counterpart of [`extract_f64_array`] for category labels.
#[cfg(feature = "python-bindings")]
pub fn extract_i64_vec<'py>(raw_data: &Bound<'py, PyAny>) -> PyResult<Vec<i64>> {
    if let Ok(arr_ro) = raw_data.extract::<PyReadonlyArray1<i64>>() {
        if let Ok(slice) = arr_ro.as_slice() {
            return Ok(slice.to_vec());
        }
    }

    if let Ok(obj) = raw_data.call_method("to_numpy", (false,), None) {
        if let Ok(series_ro) = obj.extract::<PyReadonlyArray1<i64>>() {
            if let Ok(slice) = series_ro.as_slice() {
                return Ok(slice.to_vec());
            }
        }
    }

    raw_data.extract().map_err(|_| {
        pyo3::exceptions::PyTypeError::new_err(
            "expected a 1-D numpy.ndarray, pandas.Series, or sequence of int64",
        )
    })
}

/// Zip parallel `actual`/`predicted`/`counts` columns into a raw table.
#[cfg(feature = "python-bindings")]
pub fn extract_raw_matrix<'py>(
    py: Python<'py>, actual: &Bound<'py, PyAny>, predicted: &Bound<'py, PyAny>,
    counts: &Bound<'py, PyAny>,
) -> PyResult<RawMatrix> {
    let actual = extract_i64_vec(actual)?;
    let predicted_arr = extract_f64_array(py, predicted)?;
    let counts_arr = extract_f64_array(py, counts)?;
    let predicted = predicted_arr.as_slice().map_err(|_| {
        PyValueError::new_err("predicted must be a 1-D contiguous float64 array or sequence")
    })?;
    let counts = counts_arr.as_slice().map_err(|_| {
        PyValueError::new_err("counts must be a 1-D contiguous float64 array or sequence")
    })?;

    if actual.len() != predicted.len() || actual.len() != counts.len() {
        return Err(PyValueError::new_err(format!(
            "actual, predicted and counts must have equal lengths (got {}, {}, {})",
            actual.len(),
            predicted.len(),
            counts.len()
        )));
    }

    let triples = actual
        .iter()
        .zip(predicted.iter())
        .zip(counts.iter())
        .map(|((&a, &p), &c)| ContingencyTriple::new(a, p, c));
    Ok(raw_matrix_from_triples(triples)?)
}

#[cfg(feature = "python-bindings")]
pub fn extract_optimize_options(
    enable_optimization: bool, category_range: Option<(i64, i64)>,
) -> PyResult<OptimizeOptions> {
    Ok(OptimizeOptions::new(enable_optimization, category_range, true)?)
}
