// =============================================================================
// AMGD Python Bindings
// =============================================================================
//
// This module creates the bridge between Rust and Python using PyO3.
// It wraps the pure Rust code from `amgd-core` and exposes it as a Python
// extension module, `_amgd`.
//
// STRUCTURE:
// ----------
// - regressor_py: the `PoissonRegressor` class
// - datasets_py:  `generate_synthetic_poisson_data`
//
// Core errors map onto Python exceptions:
//   InvalidInput, Configuration -> ValueError
//   NotFitted                   -> RuntimeError
// Numerical instability is not an exception; it is raised as a
// RuntimeWarning after a fit.
//
// FOR MAINTAINERS:
// ----------------
// When adding new functionality:
// 1. Implement the logic in `amgd-core` first
// 2. Create a Python wrapper in the matching *_py.rs file
// 3. Add it to the module in the `_amgd` function at the bottom
//
// =============================================================================

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use amgd_core::AmgdError;

mod datasets_py;
mod regressor_py;

use datasets_py::generate_synthetic_poisson_data_py;
use regressor_py::PyPoissonRegressor;

/// Convert a core error into the matching Python exception.
pub(crate) fn to_py_err(err: AmgdError) -> PyErr {
    match err {
        AmgdError::NotFitted(_) => PyRuntimeError::new_err(err.to_string()),
        AmgdError::InvalidInput(_) | AmgdError::Configuration(_) => {
            PyValueError::new_err(err.to_string())
        }
    }
}

// =============================================================================
// Module Definition
// =============================================================================

#[pymodule]
fn _amgd(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyPoissonRegressor>()?;
    m.add_function(wrap_pyfunction!(generate_synthetic_poisson_data_py, m)?)?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    Ok(())
}
