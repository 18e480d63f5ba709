// =============================================================================
// PoissonRegressor (Python Bindings)
// =============================================================================
//
// A scikit-learn style wrapper: hyperparameters go to the constructor,
// `fit` returns the estimator, fitted attributes carry a trailing underscore.
// Array arguments may be any array-like (integer counts, lists); they are
// converted to contiguous float64 before crossing into Rust.
//
// =============================================================================

use ndarray::{Array1, Array2};
use numpy::{IntoPyArray, PyArray1, PyReadonlyArray1, PyReadonlyArray2};
use pyo3::exceptions::{PyRuntimeError, PyRuntimeWarning};
use pyo3::prelude::*;

use amgd_core::{PoissonRegressor, RegressorConfig, ThresholdDecay};

use crate::to_py_err;

/// Penalized Poisson regression fitted by AMGD, Adam, or Adagrad.
#[pyclass(name = "PoissonRegressor")]
pub struct PyPoissonRegressor {
    inner: PoissonRegressor,
}

impl PyPoissonRegressor {
    fn not_fitted() -> PyErr {
        PyRuntimeError::new_err("model is not fitted: call fit() first")
    }
}

/// `numpy.ascontiguousarray(obj, dtype="float64")`.
fn as_float64<'py>(obj: &Bound<'py, PyAny>) -> PyResult<Bound<'py, PyAny>> {
    PyModule::import_bound(obj.py(), "numpy")?.call_method1("ascontiguousarray", (obj, "float64"))
}

fn matrix_arg(obj: &Bound<'_, PyAny>) -> PyResult<Array2<f64>> {
    let x: PyReadonlyArray2<f64> = as_float64(obj)?.extract()?;
    Ok(x.as_array().to_owned())
}

fn vector_arg(obj: &Bound<'_, PyAny>) -> PyResult<Array1<f64>> {
    let y: PyReadonlyArray1<f64> = as_float64(obj)?.extract()?;
    Ok(y.as_array().to_owned())
}

#[pymethods]
impl PyPoissonRegressor {
    #[new]
    #[pyo3(signature = (
        optimizer="amgd",
        penalty="l1",
        lambda1=0.1,
        lambda2=0.0,
        learning_rate=0.01,
        max_iter=1000,
        tol=1e-6,
        warm_start=false,
        beta1=0.9,
        beta2=0.999,
        epsilon=1e-8,
        gradient_clip=5.0,
        eta_clip=20.0,
        threshold_decay="inverse_time",
        decay_rate=1e-4,
        threshold_floor=0.5,
        verbose=false
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        optimizer: &str,
        penalty: &str,
        lambda1: f64,
        lambda2: f64,
        learning_rate: f64,
        max_iter: usize,
        tol: f64,
        warm_start: bool,
        beta1: f64,
        beta2: f64,
        epsilon: f64,
        gradient_clip: f64,
        eta_clip: f64,
        threshold_decay: &str,
        decay_rate: f64,
        threshold_floor: f64,
        verbose: bool,
    ) -> PyResult<Self> {
        let config = RegressorConfig {
            optimizer: optimizer.parse().map_err(to_py_err)?,
            penalty: penalty.parse().map_err(to_py_err)?,
            lambda1,
            lambda2,
            learning_rate,
            beta_m: beta1,
            beta_v: beta2,
            epsilon,
            max_iter,
            tol,
            warm_start,
            gradient_clip,
            eta_clip,
            threshold_decay: ThresholdDecay::from_name(threshold_decay, decay_rate)
                .map_err(to_py_err)?,
            threshold_floor,
            verbose,
            ..Default::default()
        };
        config.validate().map_err(to_py_err)?;

        Ok(Self {
            inner: PoissonRegressor::new(config),
        })
    }

    /// Fit the model to X (n × p) and counts y (n). Returns self.
    ///
    /// Integer or list inputs are accepted and cast to float64.
    fn fit<'py>(
        mut slf: PyRefMut<'py, Self>,
        x: &Bound<'py, PyAny>,
        y: &Bound<'py, PyAny>,
    ) -> PyResult<PyRefMut<'py, Self>> {
        let py = slf.py();
        let x = matrix_arg(x)?;
        let y = vector_arg(y)?;

        slf.inner.fit(&x, &y).map_err(to_py_err)?;

        let fitted = slf.inner.fitted().map_err(to_py_err)?;
        for warning in &fitted.warnings {
            let category = py.get_type_bound::<PyRuntimeWarning>();
            PyErr::warn_bound(py, category.as_any(), &warning.to_string(), 1)?;
        }

        Ok(slf)
    }

    /// Predicted Poisson rates exp(Xβ + β₀).
    fn predict<'py>(
        &self,
        py: Python<'py>,
        x: &Bound<'py, PyAny>,
    ) -> PyResult<Bound<'py, PyArray1<f64>>> {
        let x = matrix_arg(x)?;
        let mu = self.inner.predict(&x).map_err(to_py_err)?;
        Ok(mu.into_pyarray_bound(py))
    }

    /// Deviance pseudo-R² on (X, y).
    fn score(&self, x: &Bound<'_, PyAny>, y: &Bound<'_, PyAny>) -> PyResult<f64> {
        let x = matrix_arg(x)?;
        let y = vector_arg(y)?;
        self.inner.score(&x, &y).map_err(to_py_err)
    }

    /// Fraction of coefficients with |β| ≤ threshold.
    #[pyo3(signature = (threshold=1e-6))]
    fn sparsity(&self, threshold: f64) -> PyResult<f64> {
        self.inner.sparsity(threshold).map_err(to_py_err)
    }

    #[getter]
    fn coef_<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray1<f64>>> {
        let coef = self.inner.coef().ok_or_else(Self::not_fitted)?;
        Ok(coef.clone().into_pyarray_bound(py))
    }

    #[getter]
    fn intercept_(&self) -> PyResult<f64> {
        self.inner.intercept().ok_or_else(Self::not_fitted)
    }

    #[getter]
    fn n_iter_(&self) -> usize {
        self.inner.n_iter()
    }

    #[getter]
    fn is_fitted_(&self) -> bool {
        self.inner.is_fitted()
    }

    #[getter]
    fn converged_(&self) -> PyResult<bool> {
        Ok(self.inner.fitted().map_err(to_py_err)?.converged)
    }

    /// Penalized objective after each applied step.
    #[getter]
    fn loss_history_(&self) -> PyResult<Vec<f64>> {
        Ok(self.inner.fitted().map_err(to_py_err)?.objective_history.clone())
    }

    #[getter]
    fn max_iter(&self) -> usize {
        self.inner.config().max_iter
    }

    #[setter]
    fn set_max_iter(&mut self, value: usize) {
        self.inner.config_mut().max_iter = value;
    }

    #[getter]
    fn warm_start(&self) -> bool {
        self.inner.config().warm_start
    }

    #[setter]
    fn set_warm_start(&mut self, value: bool) {
        self.inner.config_mut().warm_start = value;
    }

    fn __repr__(&self) -> String {
        let config = self.inner.config();
        format!(
            "PoissonRegressor(optimizer='{}', penalty='{}', lambda1={}, lambda2={}, max_iter={})",
            config.optimizer, config.penalty, config.lambda1, config.lambda2, config.max_iter
        )
    }
}
