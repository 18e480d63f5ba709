// =============================================================================
// Poisson Deviance
// =============================================================================
//
// The deviance compares a model to the saturated model (μᵢ = yᵢ):
//
//     D(y, μ) = 2 Σᵢ [ yᵢ·log(yᵢ/μᵢ) − (yᵢ − μᵢ) ]
//
// with the convention 0·log(0) = 0. It is ≥ 0 and equals 0 only at μ = y.
//
// PSEUDO-R²
// ---------
//     R² = 1 − D(y, μ̂) / D(y, ȳ)
//
// where D(y, ȳ) is the null deviance (intercept-only model, μᵢ = ȳ). It is
// 1 for a perfect fit, 0 for a model no better than the mean, and unbounded
// below for models worse than the mean.
//
// =============================================================================

use ndarray::Array1;

/// Smallest μ used inside log(y/μ); fitted rates are strictly positive,
/// this only guards hand-built inputs.
const MIN_MU: f64 = 1e-300;

/// Per-observation deviance contributions.
pub fn poisson_unit_deviance(y: &Array1<f64>, mu: &Array1<f64>) -> Array1<f64> {
    y.iter()
        .zip(mu.iter())
        .map(|(&yi, &mui)| {
            let mui = mui.max(MIN_MU);
            let log_term = if yi > 0.0 { yi * (yi / mui).ln() } else { 0.0 };
            2.0 * (log_term - (yi - mui))
        })
        .collect()
}

/// Total Poisson deviance D(y, μ).
pub fn poisson_deviance(y: &Array1<f64>, mu: &Array1<f64>) -> f64 {
    poisson_unit_deviance(y, mu).sum()
}

/// Deviance of the intercept-only model μᵢ = ȳ.
pub fn null_deviance(y: &Array1<f64>) -> f64 {
    let y_mean = y.mean().unwrap_or(0.0);
    let mu = Array1::from_elem(y.len(), y_mean);
    poisson_deviance(y, &mu)
}

/// Deviance-based pseudo-R², 1 − D(y, μ) / D(y, ȳ).
///
/// When every yᵢ is equal the null deviance is 0; the result is then 1 if
/// the model deviance is also 0 and 0 otherwise.
pub fn pseudo_r2(y: &Array1<f64>, mu: &Array1<f64>) -> f64 {
    let dev = poisson_deviance(y, mu);
    let dev_null = null_deviance(y);

    if dev_null <= f64::EPSILON {
        return if dev <= f64::EPSILON { 1.0 } else { 0.0 };
    }
    1.0 - dev / dev_null
}
