// =============================================================================
// Poisson Negative Log-Likelihood
// =============================================================================
//
// For count data yᵢ with log link, the model says
//
//     yᵢ ~ Poisson(μᵢ),   μᵢ = exp(ηᵢ),   ηᵢ = β₀ + xᵢ'β
//
// The negative log-likelihood, dropping log(yᵢ!) (constant in θ) and
// averaging over samples, is
//
//     L(θ) = (1/n) Σᵢ (μᵢ − yᵢ·ηᵢ)
//
// with gradient
//
//     ∂L/∂β₀ = (1/n) Σᵢ (μᵢ − yᵢ)
//     ∂L/∂β  = (1/n) Xᵀ(μ − y)
//
// Averaging keeps penalty strengths comparable across sample sizes; the
// minimizer is the same as for the plain sum.
//
// NUMERICAL SAFEGUARDS
// --------------------
// 1. η is clipped to [−eta_clip, eta_clip] before exp(). Without it a single
//    large xᵢ'β overflows μ to +inf and poisons every later step. For typical
//    inputs (|η| well inside the bound) clipping changes nothing.
// 2. The gradient is clipped component-wise to [−gradient_clip,
//    gradient_clip] before it reaches the optimizer. Rare huge gradients
//    (μ large early in training) would otherwise dominate the second-moment
//    accumulators of Adam/AMGD for hundreds of iterations.
//
// Both safeguards report how often they fired so that the estimator can warn
// when they fire too often.
//
// PARAMETER LAYOUT
// ----------------
// θ is a single vector of length p + 1: θ[0] = β₀ (intercept), θ[1..] = β.
//
// =============================================================================

use ndarray::{s, Array1};

use crate::design::Design;
use crate::error::{AmgdError, Result};

/// Counts must be within this distance of an integer.
const COUNT_TOLERANCE: f64 = 1e-8;

// =============================================================================
// Clipping Helpers
// =============================================================================

/// Clip one linear-predictor entry to `[-bound, bound]`.
///
/// NaN can only come from inf − inf on rows with extreme entries; it maps to
/// 0 (μ = 1) so that predictions stay finite.
#[inline]
pub fn clip_linear_predictor(eta: f64, bound: f64) -> f64 {
    if eta.is_nan() {
        0.0
    } else {
        eta.clamp(-bound, bound)
    }
}

/// Clip every component of `grad` to `[-threshold, threshold]` in place.
///
/// Returns the number of clipped components. Non-finite components are left
/// alone so that the optimizer's finiteness guard still sees them.
pub fn clip_gradient(grad: &mut Array1<f64>, threshold: f64) -> usize {
    let mut clipped = 0;
    grad.mapv_inplace(|g| {
        if g.is_finite() && g.abs() > threshold {
            clipped += 1;
            g.signum() * threshold
        } else {
            g
        }
    });
    clipped
}

// =============================================================================
// Validation
// =============================================================================

/// Check that X and y are usable for a Poisson fit.
pub fn validate_inputs(x: &dyn Design, y: &Array1<f64>) -> Result<()> {
    let n = y.len();

    if x.nrows() != n {
        return Err(AmgdError::InvalidInput(format!(
            "X has {} rows but y has {} elements",
            x.nrows(),
            n
        )));
    }

    if n == 0 {
        return Err(AmgdError::InvalidInput("y is empty".to_string()));
    }

    if x.ncols() == 0 {
        return Err(AmgdError::InvalidInput("X has no columns".to_string()));
    }

    validate_design(x)?;
    validate_counts(y)
}

/// Check that every stored entry of X is finite.
pub fn validate_design(x: &dyn Design) -> Result<()> {
    if let Some((i, j, v)) = x.first_non_finite() {
        return Err(AmgdError::InvalidInput(format!(
            "X contains a non-finite value {} at row {}, column {}",
            v, i, j
        )));
    }
    Ok(())
}

/// Check that y holds non-negative, integer-like counts.
pub fn validate_counts(y: &Array1<f64>) -> Result<()> {
    for (i, &yi) in y.iter().enumerate() {
        if !yi.is_finite() {
            return Err(AmgdError::InvalidInput(format!(
                "y contains a non-finite value {} at index {}",
                yi, i
            )));
        }
        if yi < 0.0 {
            return Err(AmgdError::InvalidInput(format!(
                "y must be non-negative counts, found {} at index {}",
                yi, i
            )));
        }
        if (yi - yi.round()).abs() > COUNT_TOLERANCE {
            return Err(AmgdError::InvalidInput(format!(
                "y must be integer counts, found {} at index {}",
                yi, i
            )));
        }
    }
    Ok(())
}

// =============================================================================
// Objective
// =============================================================================

/// One evaluation of the objective at θ.
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// L(θ), penalty not included
    pub value: f64,
    /// ∇L(θ) after component-wise clipping, length p + 1
    pub gradient: Array1<f64>,
    /// How many ηᵢ hit the clip bound
    pub eta_clipped: usize,
    /// How many gradient components hit the clip bound
    pub gradient_clipped: usize,
}

/// Poisson negative log-likelihood over a fixed (X, y).
pub struct PoissonObjective<'a> {
    x: &'a dyn Design,
    y: &'a Array1<f64>,
    eta_clip: f64,
    gradient_clip: f64,
}

impl<'a> PoissonObjective<'a> {
    /// Validate (X, y) and bind them to an objective.
    pub fn new(
        x: &'a dyn Design,
        y: &'a Array1<f64>,
        eta_clip: f64,
        gradient_clip: f64,
    ) -> Result<Self> {
        validate_inputs(x, y)?;
        Ok(Self {
            x,
            y,
            eta_clip,
            gradient_clip,
        })
    }

    pub fn n_samples(&self) -> usize {
        self.y.len()
    }

    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }

    /// Clipped linear predictor η = clip(Xβ + β₀) and the number of clipped
    /// entries.
    pub fn linear_predictor(&self, theta: &Array1<f64>) -> (Array1<f64>, usize) {
        linear_predictor(self.x, theta, self.eta_clip)
    }

    /// L(θ) only.
    pub fn value(&self, theta: &Array1<f64>) -> f64 {
        let (eta, _) = self.linear_predictor(theta);
        self.value_from_eta(&eta)
    }

    /// Unclipped gradient ∇L(θ).
    pub fn gradient(&self, theta: &Array1<f64>) -> Array1<f64> {
        let (eta, _) = self.linear_predictor(theta);
        self.gradient_from_eta(&eta)
    }

    /// Value, clipped gradient and safeguard counts in one pass over X.
    pub fn evaluate(&self, theta: &Array1<f64>) -> Evaluation {
        let (eta, eta_clipped) = self.linear_predictor(theta);
        let value = self.value_from_eta(&eta);
        let mut gradient = self.gradient_from_eta(&eta);
        let gradient_clipped = clip_gradient(&mut gradient, self.gradient_clip);

        Evaluation {
            value,
            gradient,
            eta_clipped,
            gradient_clipped,
        }
    }

    fn value_from_eta(&self, eta: &Array1<f64>) -> f64 {
        let n = self.n_samples() as f64;
        eta.iter()
            .zip(self.y.iter())
            .map(|(&e, &yi)| e.exp() - yi * e)
            .sum::<f64>()
            / n
    }

    fn gradient_from_eta(&self, eta: &Array1<f64>) -> Array1<f64> {
        let n = self.n_samples() as f64;
        let residual: Array1<f64> = eta
            .iter()
            .zip(self.y.iter())
            .map(|(&e, &yi)| e.exp() - yi)
            .collect();

        let mut grad = Array1::zeros(self.n_features() + 1);
        grad[0] = residual.sum() / n;
        let feature_grad = self.x.rmatvec(&residual) / n;
        grad.slice_mut(s![1..]).assign(&feature_grad);
        grad
    }
}

/// η = clip(Xβ + β₀) for θ = (β₀, β). Shared by the objective and `predict`.
pub fn linear_predictor(x: &dyn Design, theta: &Array1<f64>, bound: f64) -> (Array1<f64>, usize) {
    let intercept = theta[0];
    let beta = theta.slice(s![1..]).to_owned();
    let mut eta = x.matvec(&beta);

    let mut clipped = 0;
    eta.mapv_inplace(|e| {
        let raw = e + intercept;
        let c = clip_linear_predictor(raw, bound);
        if c != raw {
            clipped += 1;
        }
        c
    });
    (eta, clipped)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array2};

    fn toy() -> (Array2<f64>, Array1<f64>) {
        let x = array![[0.0, 1.0], [1.0, 0.5], [2.0, -0.5], [3.0, 0.0], [-1.0, 1.5]];
        let y = array![1.0, 2.0, 4.0, 7.0, 0.0];
        (x, y)
    }

    /// Unclipped reference: (1/n) Σ exp(ηᵢ) − yᵢηᵢ.
    fn naive_value(x: &Array2<f64>, y: &Array1<f64>, theta: &Array1<f64>) -> f64 {
        let n = y.len() as f64;
        (0..y.len())
            .map(|i| {
                let eta = theta[0] + x.row(i).dot(&theta.slice(s![1..]));
                eta.exp() - y[i] * eta
            })
            .sum::<f64>()
            / n
    }

    #[test]
    fn test_clipped_objective_matches_unclipped_for_typical_inputs() {
        let (x, y) = toy();
        let obj = PoissonObjective::new(&x, &y, 20.0, 5.0).unwrap();
        let theta = array![0.3, 0.4, -0.2];

        let eval = obj.evaluate(&theta);
        assert_eq!(eval.eta_clipped, 0);
        assert_abs_diff_eq!(eval.value, naive_value(&x, &y, &theta), epsilon = 1e-12);
    }

    #[test]
    fn test_gradient_matches_finite_differences() {
        let (x, y) = toy();
        let obj = PoissonObjective::new(&x, &y, 20.0, 1e6).unwrap();
        let theta = array![0.1, 0.2, -0.3];
        let grad = obj.gradient(&theta);

        let h = 1e-6;
        for k in 0..theta.len() {
            let mut plus = theta.clone();
            let mut minus = theta.clone();
            plus[k] += h;
            minus[k] -= h;
            let fd = (obj.value(&plus) - obj.value(&minus)) / (2.0 * h);
            assert_abs_diff_eq!(grad[k], fd, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_at_zero_gradient_is_mean_residual() {
        let (x, y) = toy();
        let obj = PoissonObjective::new(&x, &y, 20.0, 1e6).unwrap();
        let grad = obj.gradient(&Array1::zeros(3));
        // μ = 1 everywhere
        let expected_intercept = y.iter().map(|&yi| 1.0 - yi).sum::<f64>() / 5.0;
        assert_abs_diff_eq!(grad[0], expected_intercept, epsilon = 1e-12);
    }

    #[test]
    fn test_eta_clipping_keeps_objective_finite() {
        let x = array![[1000.0], [-1000.0]];
        let y = array![3.0, 0.0];
        let obj = PoissonObjective::new(&x, &y, 20.0, 5.0).unwrap();
        let eval = obj.evaluate(&array![0.0, 10.0]);

        assert_eq!(eval.eta_clipped, 2);
        assert!(eval.value.is_finite());
        assert!(eval.gradient.iter().all(|g| g.is_finite()));
        assert!(eval.gradient.iter().all(|g| g.abs() <= 5.0));
        assert!(eval.gradient_clipped > 0);
    }

    #[test]
    fn test_clip_gradient_counts_and_bounds() {
        let mut g = array![0.5, -10.0, 7.0, f64::NAN];
        let clipped = clip_gradient(&mut g, 2.0);
        assert_eq!(clipped, 2);
        assert_eq!(g[0], 0.5);
        assert_eq!(g[1], -2.0);
        assert_eq!(g[2], 2.0);
        assert!(g[3].is_nan());
    }

    #[test]
    fn test_clip_linear_predictor_handles_nan_and_inf() {
        assert_eq!(clip_linear_predictor(f64::NAN, 20.0), 0.0);
        assert_eq!(clip_linear_predictor(f64::INFINITY, 20.0), 20.0);
        assert_eq!(clip_linear_predictor(f64::NEG_INFINITY, 20.0), -20.0);
        assert_eq!(clip_linear_predictor(1.5, 20.0), 1.5);
    }

    #[test]
    fn test_rejects_invalid_counts() {
        let x = array![[1.0], [2.0]];
        for bad in [array![1.0, -1.0], array![1.0, 0.5], array![1.0, f64::NAN]] {
            assert!(matches!(
                PoissonObjective::new(&x, &bad, 20.0, 5.0),
                Err(AmgdError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn test_rejects_non_finite_design() {
        let x = array![[1.0], [f64::INFINITY]];
        let y = array![1.0, 2.0];
        assert!(matches!(
            PoissonObjective::new(&x, &y, 20.0, 5.0),
            Err(AmgdError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_rejects_row_mismatch_and_empty() {
        let x = array![[1.0], [2.0], [3.0]];
        let y = array![1.0, 2.0];
        assert!(validate_inputs(&x, &y).is_err());

        let x = Array2::<f64>::zeros((0, 2));
        let y = Array1::<f64>::zeros(0);
        assert!(validate_inputs(&x, &y).is_err());
    }
}
