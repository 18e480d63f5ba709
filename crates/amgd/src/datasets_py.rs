// =============================================================================
// Synthetic Data (Python Bindings)
// =============================================================================

use numpy::{IntoPyArray, PyArray1, PyArray2};
use pyo3::prelude::*;

use amgd_core::generate_synthetic_poisson_data;

use crate::to_py_err;

/// Generate a seeded sparse Poisson regression problem.
///
/// Returns (X, y, true_coef). The true intercept is -0.5.
#[pyfunction]
#[pyo3(name = "generate_synthetic_poisson_data")]
#[pyo3(signature = (n_samples=1000, n_features=50, n_informative=10, sparsity=0.8, random_state=42))]
pub fn generate_synthetic_poisson_data_py<'py>(
    py: Python<'py>,
    n_samples: usize,
    n_features: usize,
    n_informative: usize,
    sparsity: f64,
    random_state: u64,
) -> PyResult<(
    Bound<'py, PyArray2<f64>>,
    Bound<'py, PyArray1<f64>>,
    Bound<'py, PyArray1<f64>>,
)> {
    let data = generate_synthetic_poisson_data(
        n_samples,
        n_features,
        n_informative,
        sparsity,
        random_state,
    )
    .map_err(to_py_err)?;

    Ok((
        data.x.into_pyarray_bound(py),
        data.y.into_pyarray_bound(py),
        data.true_coef.into_pyarray_bound(py),
    ))
}
