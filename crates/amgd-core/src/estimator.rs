// =============================================================================
// PoissonRegressor
// =============================================================================
//
// The estimator ties everything together:
//
//     fit(X, y):
//         validate config and data            (nothing mutated on failure)
//         θ, optimizer ← fresh or warm state
//         repeat up to max_iter:
//             θ ← optimizer.step(θ, ∇L(θ), penalty)
//             P ← penalty the step applied (AMGD: decayed λ1)
//             F ← L(θ) + P(β),  F_prev ← L(θ_prev) + P(β_prev)
//             stop if optimizer.has_converged(F_prev, F, tol)
//         store coef, intercept, n_iter, history, warnings
//
// WARM START
// ----------
// After every fit the final θ and the optimizer (with its adaptive state)
// are kept in `warm`. The next fit takes them out again when `warm_start`
// is on and both the feature count and the optimizer kind still match;
// otherwise the stale state is dropped and a fresh one is built. The state
// is owned by this estimator instance only, so independent estimators can
// be fitted on different threads.
//
// NUMERICAL WARNINGS
// ------------------
// η clipping, gradient clipping and skipped steps never stop a fit. The
// estimator counts how often each fired; when a count exceeds
// `instability_warn_fraction` of the iterations it records a
// `NumericalInstabilityWarning` and logs it. A high rate usually means the
// learning rate is too large or the features are badly scaled.
//
// =============================================================================

use std::fmt;

use log::{debug, info, trace, warn};
use ndarray::{s, Array1};

use crate::config::{OptimizerKind, RegressorConfig};
use crate::design::Design;
use crate::diagnostics::{pseudo_r2, InformationCriteria, DEFAULT_ZERO_THRESHOLD};
use crate::error::{AmgdError, Result};
use crate::objective::{linear_predictor, validate_design, validate_inputs, Evaluation, PoissonObjective};
use crate::optim::{build_optimizer, Optimizer, StepOutcome};
use crate::penalty::Penalty;

// =============================================================================
// Numerical Instability Reporting
// =============================================================================

/// Which safeguard fired too often.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstabilityKind {
    /// η = Xβ + β₀ hit the clip bound
    LinearPredictorClipping,
    /// ∇L components hit the clip bound
    GradientClipping,
    /// Steps skipped because of a non-finite gradient
    SkippedSteps,
}

/// Non-fatal report that a numerical safeguard fired frequently during a fit.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericalInstabilityWarning {
    pub kind: InstabilityKind,
    /// Iterations in which the safeguard fired
    pub affected: usize,
    /// Iterations observed
    pub total: usize,
}

impl NumericalInstabilityWarning {
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.affected as f64 / self.total as f64
        }
    }
}

impl fmt::Display for NumericalInstabilityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self.kind {
            InstabilityKind::LinearPredictorClipping => "linear predictor clipping",
            InstabilityKind::GradientClipping => "gradient clipping",
            InstabilityKind::SkippedSteps => "skipped non-finite steps",
        };
        write!(
            f,
            "{} triggered in {}/{} iterations ({:.1}%); consider a smaller learning rate, \
             a stronger penalty, or rescaling the features",
            what,
            self.affected,
            self.total,
            100.0 * self.fraction()
        )
    }
}

/// How often each safeguard fired during a fit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SafeguardCounts {
    /// Objective evaluations observed
    pub evaluations: usize,
    /// Evaluations with at least one clipped η
    pub eta_clipped: usize,
    /// Evaluations with at least one clipped gradient component
    pub gradient_clipped: usize,
    /// Optimizer steps skipped
    pub skipped_steps: usize,
}

impl SafeguardCounts {
    fn record(&mut self, eval: &Evaluation) {
        self.evaluations += 1;
        if eval.eta_clipped > 0 {
            self.eta_clipped += 1;
        }
        if eval.gradient_clipped > 0 {
            self.gradient_clipped += 1;
        }
    }

    fn warnings(&self, n_iter: usize, threshold: f64) -> Vec<NumericalInstabilityWarning> {
        let candidates = [
            (InstabilityKind::LinearPredictorClipping, self.eta_clipped, self.evaluations),
            (InstabilityKind::GradientClipping, self.gradient_clipped, self.evaluations),
            (InstabilityKind::SkippedSteps, self.skipped_steps, n_iter),
        ];

        candidates
            .into_iter()
            .filter(|&(_, affected, total)| total > 0 && affected as f64 > threshold * total as f64)
            .map(|(kind, affected, total)| NumericalInstabilityWarning {
                kind,
                affected,
                total,
            })
            .collect()
    }
}

// =============================================================================
// Fitted State
// =============================================================================

/// Everything recorded by a successful `fit`.
#[derive(Debug, Clone)]
pub struct FittedModel {
    /// β, length p
    pub coef: Array1<f64>,
    /// β₀
    pub intercept: f64,
    /// Iterations run by the latest fit call
    pub n_iter: usize,
    /// Did the convergence test pass before max_iter?
    pub converged: bool,
    /// Final penalized objective L(θ) + P(β), with the L1 strength the
    /// optimizer applied last (AMGD's decayed λ_eff)
    pub objective: f64,
    /// Penalized objective at the start and after every applied step,
    /// measured like `objective`
    pub objective_history: Vec<f64>,
    pub safeguards: SafeguardCounts,
    pub warnings: Vec<NumericalInstabilityWarning>,
    pub optimizer: OptimizerKind,
    pub penalty: Penalty,
    /// η bound used during the fit, reused by predict
    pub eta_clip: f64,
}

impl FittedModel {
    pub fn n_features(&self) -> usize {
        self.coef.len()
    }

    /// θ = (β₀, β)
    pub fn theta(&self) -> Array1<f64> {
        let mut theta = Array1::zeros(self.coef.len() + 1);
        theta[0] = self.intercept;
        theta.slice_mut(s![1..]).assign(&self.coef);
        theta
    }

    /// Number of coefficients with |β| > `threshold`.
    pub fn n_nonzero(&self, threshold: f64) -> usize {
        self.coef.iter().filter(|b| b.abs() > threshold).count()
    }

    /// Fraction of coefficients with |β| ≤ `threshold`.
    pub fn sparsity(&self, threshold: f64) -> f64 {
        crate::diagnostics::sparsity(&self.coef, threshold)
    }
}

/// θ and optimizer carried from one fit to the next.
#[derive(Debug)]
struct WarmState {
    theta: Array1<f64>,
    optimizer: Box<dyn Optimizer>,
}

// =============================================================================
// Estimator
// =============================================================================

/// Penalized Poisson regression fitted by AMGD, Adam or Adagrad.
///
/// # Example
/// ```
/// use amgd_core::{PoissonRegressor, RegressorConfig, PenaltyKind};
/// use ndarray::array;
///
/// let x = array![[0.0, 1.0], [1.0, 0.0], [2.0, 1.0], [3.0, 0.0]];
/// let y = array![1.0, 2.0, 4.0, 9.0];
///
/// let mut model = PoissonRegressor::new(RegressorConfig {
///     penalty: PenaltyKind::None,
///     max_iter: 200,
///     ..Default::default()
/// });
/// model.fit(&x, &y).unwrap();
/// let mu = model.predict(&x).unwrap();
/// assert!(mu.iter().all(|m| m.is_finite() && *m >= 0.0));
/// ```
#[derive(Debug, Default)]
pub struct PoissonRegressor {
    config: RegressorConfig,
    fitted: Option<FittedModel>,
    warm: Option<WarmState>,
}

impl PoissonRegressor {
    pub fn new(config: RegressorConfig) -> Self {
        Self {
            config,
            fitted: None,
            warm: None,
        }
    }

    pub fn config(&self) -> &RegressorConfig {
        &self.config
    }

    /// Change hyperparameters between fits (e.g. raise `max_iter` before a
    /// warm-started refit). Validated on the next `fit`.
    pub fn config_mut(&mut self) -> &mut RegressorConfig {
        &mut self.config
    }

    // -------------------------------------------------------------------------
    // Fitted state
    // -------------------------------------------------------------------------

    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    /// The fitted state, or `NotFitted`.
    pub fn fitted(&self) -> Result<&FittedModel> {
        self.fitted.as_ref().ok_or_else(|| {
            AmgdError::NotFitted(
                "call fit() before using this PoissonRegressor".to_string(),
            )
        })
    }

    pub fn coef(&self) -> Option<&Array1<f64>> {
        self.fitted.as_ref().map(|f| &f.coef)
    }

    pub fn intercept(&self) -> Option<f64> {
        self.fitted.as_ref().map(|f| f.intercept)
    }

    /// Iterations run by the latest fit, 0 before the first fit.
    pub fn n_iter(&self) -> usize {
        self.fitted.as_ref().map_or(0, |f| f.n_iter)
    }

    /// Fraction of fitted coefficients with |β| ≤ `threshold`.
    pub fn sparsity(&self, threshold: f64) -> Result<f64> {
        Ok(self.fitted()?.sparsity(threshold))
    }

    // -------------------------------------------------------------------------
    // Fitting
    // -------------------------------------------------------------------------

    /// Fit the model to (X, y).
    ///
    /// # Errors
    /// * `Configuration` - invalid hyperparameters
    /// * `InvalidInput` - malformed X or y
    ///
    /// On error the previous fitted state (if any) is left untouched.
    pub fn fit(&mut self, x: &dyn Design, y: &Array1<f64>) -> Result<&mut Self> {
        // -------------------------------------------------------------------------
        // Step 0: Validate everything before touching state
        // -------------------------------------------------------------------------
        self.config.validate()?;
        let objective =
            PoissonObjective::new(x, y, self.config.eta_clip, self.config.gradient_clip)?;

        let config = self.config.clone();
        let n_params = x.ncols() + 1;
        let penalty = Penalty::from_kind(config.penalty, config.lambda1, config.lambda2);

        // -------------------------------------------------------------------------
        // Step 1: Starting point and optimizer (fresh or warm)
        // -------------------------------------------------------------------------
        let WarmState {
            mut theta,
            mut optimizer,
        } = self.starting_state(n_params);

        // -------------------------------------------------------------------------
        // Step 2: Iterate
        // -------------------------------------------------------------------------
        let mut safeguards = SafeguardCounts::default();
        let mut eval = objective.evaluate(&theta);
        safeguards.record(&eval);

        let mut current = eval.value + optimizer.effective_penalty(&penalty).value(&theta);
        let mut history = Vec::with_capacity(config.max_iter + 1);
        history.push(current);

        let mut converged = false;
        let mut n_iter = 0;

        for iteration in 1..=config.max_iter {
            n_iter = iteration;

            let previous_nll = eval.value;
            let previous_theta = match optimizer.step(&theta, &eval.gradient, &penalty) {
                StepOutcome::Updated(next) => std::mem::replace(&mut theta, next),
                StepOutcome::Skipped => {
                    safeguards.skipped_steps += 1;
                    debug!("iteration {}: non-finite gradient, step skipped", iteration);
                    continue;
                }
            };

            eval = objective.evaluate(&theta);
            safeguards.record(&eval);

            // Both iterates are measured against the penalty this step applied
            let applied = optimizer.effective_penalty(&penalty);
            let previous = previous_nll + applied.value(&previous_theta);
            let next = eval.value + applied.value(&theta);
            history.push(next);

            if config.verbose {
                info!(
                    "iteration {}: objective = {:.8}, nll = {:.8}",
                    iteration, next, eval.value
                );
            } else {
                trace!(
                    "iteration {}: objective = {:.8}, nll = {:.8}",
                    iteration, next, eval.value
                );
            }

            let done = optimizer.has_converged(previous, next, config.tol);
            current = next;
            if done {
                converged = true;
                break;
            }
        }

        // -------------------------------------------------------------------------
        // Step 3: Record results
        // -------------------------------------------------------------------------
        let warnings = safeguards.warnings(n_iter, config.instability_warn_fraction);
        for w in &warnings {
            warn!("NumericalInstabilityWarning: {}", w);
        }

        debug!(
            "{} fit with {} penalty finished: n_iter = {}, converged = {}, objective = {:.8}",
            config.optimizer, config.penalty, n_iter, converged, current
        );

        let fitted = FittedModel {
            coef: theta.slice(s![1..]).to_owned(),
            intercept: theta[0],
            n_iter,
            converged,
            objective: current,
            objective_history: history,
            safeguards,
            warnings,
            optimizer: config.optimizer,
            penalty,
            eta_clip: config.eta_clip,
        };

        self.warm = Some(WarmState { theta, optimizer });
        self.fitted = Some(fitted);
        Ok(self)
    }

    /// Take the warm state if it can be reused, otherwise build a fresh one.
    fn starting_state(&mut self, n_params: usize) -> WarmState {
        let params = self.config.optimizer_params();

        if let Some(mut state) = self.warm.take() {
            if self.config.warm_start {
                let same_shape =
                    state.theta.len() == n_params && state.optimizer.n_params() == n_params;
                let same_kind = state.optimizer.kind() == self.config.optimizer;

                if same_shape && same_kind {
                    debug!(
                        "warm start: reusing θ and {} state after {} steps",
                        state.optimizer.kind(),
                        state.optimizer.steps()
                    );
                    state.optimizer.set_params(params);
                    return state;
                }

                debug!(
                    "warm start: discarding state (n_params {} -> {}, optimizer {} -> {})",
                    state.theta.len(),
                    n_params,
                    state.optimizer.kind(),
                    self.config.optimizer
                );
            }
        }

        WarmState {
            theta: Array1::zeros(n_params),
            optimizer: build_optimizer(self.config.optimizer, params, n_params),
        }
    }

    // -------------------------------------------------------------------------
    // Prediction and scoring
    // -------------------------------------------------------------------------

    /// Clipped linear predictor η = clip(Xβ + β₀).
    pub fn predict_linear(&self, x: &dyn Design) -> Result<Array1<f64>> {
        let fitted = self.fitted()?;

        if x.ncols() != fitted.n_features() {
            return Err(AmgdError::InvalidInput(format!(
                "X has {} columns but the model was fitted with {}",
                x.ncols(),
                fitted.n_features()
            )));
        }
        validate_design(x)?;

        let (eta, _) = linear_predictor(x, &fitted.theta(), fitted.eta_clip);
        Ok(eta)
    }

    /// Predicted Poisson rates μ = exp(clip(Xβ + β₀)); finite and
    /// non-negative for every row.
    pub fn predict(&self, x: &dyn Design) -> Result<Array1<f64>> {
        Ok(self.predict_linear(x)?.mapv(f64::exp))
    }

    /// Deviance pseudo-R² on (X, y): 1 at a perfect fit, 0 for the mean
    /// model, unbounded below.
    pub fn score(&self, x: &dyn Design, y: &Array1<f64>) -> Result<f64> {
        self.fitted()?;
        validate_inputs(x, y)?;
        let mu = self.predict(x)?;
        Ok(pseudo_r2(y, &mu))
    }

    /// Log-likelihood, AIC and BIC on (X, y), with degrees of freedom
    /// = non-zero coefficients + intercept.
    pub fn information_criteria(&self, x: &dyn Design, y: &Array1<f64>) -> Result<InformationCriteria> {
        let fitted = self.fitted()?;
        validate_inputs(x, y)?;
        let mu = self.predict(x)?;
        let df = fitted.n_nonzero(DEFAULT_ZERO_THRESHOLD) + 1;
        Ok(InformationCriteria::new(y, &mu, df))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PenaltyKind, ThresholdDecay};
    use crate::design::CsrMatrix;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array2};

    fn toy() -> (Array2<f64>, Array1<f64>) {
        // roughly log(μ) = 0.5 + 0.3·x₁
        let x = array![[0.0, 1.0], [1.0, -1.0], [2.0, 0.5], [3.0, 0.0], [4.0, -0.5], [5.0, 1.0]];
        let y = array![2.0, 2.0, 3.0, 4.0, 5.0, 7.0];
        (x, y)
    }

    fn unpenalized(optimizer: OptimizerKind) -> RegressorConfig {
        RegressorConfig {
            optimizer,
            penalty: PenaltyKind::None,
            learning_rate: 0.05,
            max_iter: 3000,
            tol: 1e-10,
            ..Default::default()
        }
    }

    #[test]
    fn test_predict_before_fit_is_not_fitted() {
        let (x, y) = toy();
        let model = PoissonRegressor::default();
        assert!(!model.is_fitted());
        assert_eq!(model.n_iter(), 0);
        assert!(matches!(model.predict(&x), Err(AmgdError::NotFitted(_))));
        assert!(matches!(model.score(&x, &y), Err(AmgdError::NotFitted(_))));
    }

    #[test]
    fn test_fit_decreases_objective() {
        let (x, y) = toy();
        let mut model = PoissonRegressor::new(unpenalized(OptimizerKind::Adam));
        model.fit(&x, &y).unwrap();

        let fitted = model.fitted().unwrap();
        let first = fitted.objective_history[0];
        assert!(fitted.objective < first);
        assert_eq!(fitted.coef.len(), 2);
        assert!(fitted.n_iter <= 3000);
        assert!(fitted.warnings.is_empty());
    }

    #[test]
    fn test_unpenalized_fit_reproduces_mean_count() {
        // Score equation for the intercept: Σ μᵢ = Σ yᵢ at the MLE
        let (x, y) = toy();
        for kind in [OptimizerKind::Amgd, OptimizerKind::Adam] {
            let mut model = PoissonRegressor::new(unpenalized(kind));
            model.fit(&x, &y).unwrap();
            let mu = model.predict(&x).unwrap();
            assert_abs_diff_eq!(mu.sum(), y.sum(), epsilon = 0.25);
        }
    }

    #[test]
    fn test_row_mismatch_is_invalid_input_and_keeps_state() {
        let (x, y) = toy();
        let mut model = PoissonRegressor::new(unpenalized(OptimizerKind::Adam));
        model.fit(&x, &y).unwrap();
        let coef_before = model.coef().unwrap().clone();

        let short_y = array![1.0, 2.0];
        assert!(matches!(model.fit(&x, &short_y), Err(AmgdError::InvalidInput(_))));
        assert_eq!(model.coef().unwrap(), &coef_before);
    }

    #[test]
    fn test_bad_config_is_configuration_error() {
        let (x, y) = toy();
        let mut model = PoissonRegressor::new(RegressorConfig {
            lambda2: -1.0,
            ..Default::default()
        });
        assert!(matches!(model.fit(&x, &y), Err(AmgdError::Configuration(_))));
        assert!(!model.is_fitted());
    }

    #[test]
    fn test_predict_column_mismatch() {
        let (x, y) = toy();
        let mut model = PoissonRegressor::new(unpenalized(OptimizerKind::Adagrad));
        model.fit(&x, &y).unwrap();
        let wide = Array2::<f64>::zeros((2, 3));
        assert!(matches!(model.predict(&wide), Err(AmgdError::InvalidInput(_))));
    }

    #[test]
    fn test_predict_extreme_rows_stay_finite() {
        let (x, y) = toy();
        let mut model = PoissonRegressor::new(unpenalized(OptimizerKind::Adam));
        model.fit(&x, &y).unwrap();

        let extreme = array![[1e300, -1e300], [-1e300, 1e300], [1e6, 1e6], [0.0, 0.0]];
        let mu = model.predict(&extreme).unwrap();
        assert!(mu.iter().all(|m| m.is_finite() && *m >= 0.0));
    }

    #[test]
    fn test_sparse_and_dense_fits_agree() {
        let (x, y) = toy();
        let sparse = CsrMatrix::from_dense(&x);

        let mut dense_model = PoissonRegressor::new(unpenalized(OptimizerKind::Amgd));
        let mut sparse_model = PoissonRegressor::new(unpenalized(OptimizerKind::Amgd));
        dense_model.fit(&x, &y).unwrap();
        sparse_model.fit(&sparse, &y).unwrap();

        let a = dense_model.coef().unwrap();
        let b = sparse_model.coef().unwrap();
        for j in 0..2 {
            assert_abs_diff_eq!(a[j], b[j], epsilon = 1e-9);
        }
    }

    #[test]
    fn test_warm_start_reuses_optimizer_state() {
        let (x, y) = toy();
        let mut model = PoissonRegressor::new(RegressorConfig {
            warm_start: true,
            max_iter: 20,
            tol: 1e-12,
            ..unpenalized(OptimizerKind::Adam)
        });
        model.fit(&x, &y).unwrap();
        let first = model.fitted().unwrap().objective;

        model.fit(&x, &y).unwrap();
        let fitted = model.fitted().unwrap();
        // continued from the previous θ rather than from zero
        assert!(fitted.objective_history[0] <= first + 1e-12);
        assert!(fitted.objective <= first);
    }

    #[test]
    fn test_warm_start_resets_on_feature_change() {
        let (x, y) = toy();
        let mut model = PoissonRegressor::new(RegressorConfig {
            warm_start: true,
            max_iter: 10,
            ..unpenalized(OptimizerKind::Adam)
        });
        model.fit(&x, &y).unwrap();

        let narrow = x.slice(s![.., 0..1]).to_owned();
        model.fit(&narrow, &y).unwrap();
        assert_eq!(model.coef().unwrap().len(), 1);
        // restarted from θ = 0
        let fresh = PoissonObjective::new(&narrow, &y, 20.0, 5.0)
            .unwrap()
            .value(&Array1::zeros(2));
        assert_abs_diff_eq!(
            model.fitted().unwrap().objective_history[0],
            fresh,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_cold_start_ignores_previous_fit() {
        let (x, y) = toy();
        let mut model = PoissonRegressor::new(RegressorConfig {
            max_iter: 15,
            ..unpenalized(OptimizerKind::Amgd)
        });
        model.fit(&x, &y).unwrap();
        let first = model.coef().unwrap().clone();
        model.fit(&x, &y).unwrap();
        assert_eq!(model.coef().unwrap(), &first);
    }

    #[test]
    fn test_gradient_clipping_warning_is_recorded() {
        // Huge features force clipping on every evaluation
        let x = array![[50.0], [60.0], [70.0]];
        let y = array![0.0, 1.0, 0.0];
        let mut model = PoissonRegressor::new(RegressorConfig {
            penalty: PenaltyKind::None,
            max_iter: 20,
            gradient_clip: 0.1,
            threshold_decay: ThresholdDecay::Constant,
            ..Default::default()
        });
        model.fit(&x, &y).unwrap();

        let fitted = model.fitted().unwrap();
        assert!(fitted
            .warnings
            .iter()
            .any(|w| w.kind == InstabilityKind::GradientClipping));
        assert!(fitted.warnings.iter().all(|w| w.fraction() <= 1.0));
        let mu = model.predict(&x).unwrap();
        assert!(mu.iter().all(|m| m.is_finite()));
    }

    #[test]
    fn test_linear_predictor_clipping_warning_is_recorded() {
        // The data pull β upward while a tight η bound clips every row
        let x = array![[100.0], [-100.0], [100.0], [-100.0]];
        let y = array![5.0, 0.0, 5.0, 0.0];
        let mut model = PoissonRegressor::new(RegressorConfig {
            penalty: PenaltyKind::None,
            max_iter: 20,
            eta_clip: 0.5,
            ..Default::default()
        });
        model.fit(&x, &y).unwrap();

        let fitted = model.fitted().unwrap();
        assert!(fitted.safeguards.eta_clipped >= fitted.safeguards.evaluations - 1);
        let warning = fitted
            .warnings
            .iter()
            .find(|w| w.kind == InstabilityKind::LinearPredictorClipping)
            .unwrap();
        assert!(warning.fraction() > 0.9);

        let eta = model.predict_linear(&x).unwrap();
        assert!(eta.iter().all(|e| e.abs() <= 0.5));
    }

    #[test]
    fn test_overflowing_gradient_skips_every_step() {
        // Xᵀ(μ − y) overflows to +inf on the first column
        let x = array![[1e308, 1.0], [1e308, 0.0], [1e308, -1.0]];
        let y = array![0.0, 0.0, 0.0];
        let mut model = PoissonRegressor::new(RegressorConfig {
            penalty: PenaltyKind::None,
            max_iter: 10,
            ..Default::default()
        });
        model.fit(&x, &y).unwrap();

        let fitted = model.fitted().unwrap();
        assert_eq!(fitted.n_iter, 10);
        assert!(!fitted.converged);
        assert_eq!(fitted.safeguards.skipped_steps, 10);
        assert!(fitted.coef.iter().all(|&b| b == 0.0));
        assert_eq!(fitted.intercept, 0.0);

        let warning = fitted
            .warnings
            .iter()
            .find(|w| w.kind == InstabilityKind::SkippedSteps)
            .unwrap();
        assert_eq!((warning.affected, warning.total), (10, 10));
    }

    #[test]
    fn test_information_criteria() {
        let (x, y) = toy();
        let mut model = PoissonRegressor::new(unpenalized(OptimizerKind::Adam));
        model.fit(&x, &y).unwrap();
        let ic = model.information_criteria(&x, &y).unwrap();
        assert_eq!(ic.df, 3);
        assert!(ic.log_likelihood < 0.0);
        // BIC − AIC = df·(ln n − 2), negative for n = 6
        assert_abs_diff_eq!(ic.bic - ic.aic, 3.0 * ((6.0f64).ln() - 2.0), epsilon = 1e-9);
    }
}
