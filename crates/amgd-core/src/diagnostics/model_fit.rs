// =============================================================================
// Model Fit Statistics
// =============================================================================
//
// The fitting objective drops log(yᵢ!) because it does not depend on θ.
// For model comparison we want the real log-likelihood:
//
//     ℓ(μ) = Σᵢ [ yᵢ·log(μᵢ) − μᵢ − log Γ(yᵢ + 1) ]
//
// AIC = −2ℓ + 2k,  BIC = −2ℓ + k·log(n)
//
// For penalized fits k is the number of non-zero coefficients plus the
// intercept, the usual degrees-of-freedom estimate for the lasso.
//
// =============================================================================

use ndarray::Array1;
use statrs::function::gamma::ln_gamma;

/// Coefficients with |β| at or below this are counted as zero.
pub const DEFAULT_ZERO_THRESHOLD: f64 = 1e-6;

/// Log-likelihood and information criteria of a fitted model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InformationCriteria {
    pub log_likelihood: f64,
    /// Degrees of freedom k
    pub df: usize,
    pub aic: f64,
    pub bic: f64,
}

impl InformationCriteria {
    pub fn new(y: &Array1<f64>, mu: &Array1<f64>, df: usize) -> Self {
        let log_likelihood = log_likelihood_poisson(y, mu);
        Self {
            log_likelihood,
            df,
            aic: aic(log_likelihood, df),
            bic: bic(log_likelihood, df, y.len()),
        }
    }
}

/// Full Poisson log-likelihood, including the log(y!) term.
pub fn log_likelihood_poisson(y: &Array1<f64>, mu: &Array1<f64>) -> f64 {
    y.iter()
        .zip(mu.iter())
        .map(|(&yi, &mui)| {
            let log_mu = if mui > 0.0 { mui.ln() } else { f64::NEG_INFINITY };
            let term = if yi > 0.0 { yi * log_mu } else { 0.0 };
            term - mui - ln_gamma(yi + 1.0)
        })
        .sum()
}

/// Akaike Information Criterion.
pub fn aic(log_likelihood: f64, df: usize) -> f64 {
    -2.0 * log_likelihood + 2.0 * df as f64
}

/// Bayesian Information Criterion.
pub fn bic(log_likelihood: f64, df: usize, n_obs: usize) -> f64 {
    -2.0 * log_likelihood + (df as f64) * (n_obs as f64).ln()
}

/// Fraction of coefficients with |β| ≤ `threshold`.
pub fn sparsity(coef: &Array1<f64>, threshold: f64) -> f64 {
    if coef.is_empty() {
        return 0.0;
    }
    let zeros = coef.iter().filter(|b| b.abs() <= threshold).count();
    zeros as f64 / coef.len() as f64
}
