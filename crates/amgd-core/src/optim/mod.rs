// =============================================================================
// Optimizers
// =============================================================================
//
// Three first-order optimizers share one proximal-gradient pattern:
//
//     g  = ∇L(θ) + λ2·β                 (smooth penalty folded in)
//     r  = per-coordinate effective learning rate (optimizer specific)
//     θ' = θ − r ⊙ direction            (direction = g or bias-corrected m̂)
//     θ' = prox(θ', r, λ1)               (soft-threshold, exact zeros)
//
// They differ in how they build `r` and `direction`:
//
//   Adagrad: v accumulates g² forever, r = α / (√v + ε), direction = g.
//   Adam:    EMAs m, v with bias correction, r = α / (√v̂ + ε), direction = m̂.
//   AMGD:    Adam's moments, plus gradient clipping before the moment update
//            and an L1 threshold that decays with the step counter t.
//
// OWNERSHIP
// ---------
// Each optimizer owns its adaptive state (m, v, t). The estimator only holds
// a `Box<dyn Optimizer>` and never looks inside. Warm starting moves the box
// out of the estimator at the start of `fit` and back in at the end.
//
// SAFETY NET
// ----------
// If the incoming gradient has a non-finite entry the step is skipped and
// the state is left untouched; the estimator counts skipped steps and warns.
//
// =============================================================================

mod adagrad;
mod adam;
mod amgd;

pub use adagrad::Adagrad;
pub use adam::Adam;
pub use amgd::Amgd;

use std::fmt;

use ndarray::Array1;

use crate::config::{OptimizerKind, OptimizerParams};
use crate::penalty::Penalty;

/// Result of one optimizer step.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// New parameter vector θ'
    Updated(Array1<f64>),
    /// Gradient was not finite; θ and the optimizer state are unchanged
    Skipped,
}

/// Common interface of AMGD, Adam and Adagrad.
pub trait Optimizer: Send + fmt::Debug {
    fn kind(&self) -> OptimizerKind;

    /// Length of θ the adaptive state is sized for.
    fn n_params(&self) -> usize;

    /// Steps taken since the last reset (the bias-correction counter t).
    fn steps(&self) -> u64;

    /// Zero the adaptive state and size it for `n_params` parameters.
    fn reset(&mut self, n_params: usize);

    /// Replace the hyperparameters, keeping the adaptive state.
    fn set_params(&mut self, params: OptimizerParams);

    /// One proximal-gradient step from θ given the loss gradient ∇L(θ).
    fn step(&mut self, theta: &Array1<f64>, grad: &Array1<f64>, penalty: &Penalty) -> StepOutcome;

    /// The penalty the latest step actually applied. The estimator measures
    /// the penalized objective with it, so that the objective and the
    /// proximal step agree.
    fn effective_penalty(&self, penalty: &Penalty) -> Penalty {
        *penalty
    }

    /// Convergence test on the penalized objective of two consecutive
    /// iterates.
    fn has_converged(&self, previous: f64, current: f64, tol: f64) -> bool {
        relative_change(previous, current) < tol
    }
}

/// Build a fresh optimizer of the given kind for `n_params` parameters.
pub fn build_optimizer(
    kind: OptimizerKind,
    params: OptimizerParams,
    n_params: usize,
) -> Box<dyn Optimizer> {
    match kind {
        OptimizerKind::Amgd => Box::new(Amgd::new(params, n_params)),
        OptimizerKind::Adam => Box::new(Adam::new(params, n_params)),
        OptimizerKind::Adagrad => Box::new(Adagrad::new(params, n_params)),
    }
}

/// |previous − current| / max(|previous|, 1)
///
/// The floor keeps the test meaningful when the objective passes near zero,
/// which the log(y!)-free Poisson likelihood can do.
pub fn relative_change(previous: f64, current: f64) -> f64 {
    (previous - current).abs() / previous.abs().max(1.0)
}

// =============================================================================
// Shared Building Blocks
// =============================================================================

/// ∇L + smooth penalty gradient, or `None` if anything is non-finite.
pub(crate) fn penalized_gradient(
    theta: &Array1<f64>,
    grad: &Array1<f64>,
    penalty: &Penalty,
) -> Option<Array1<f64>> {
    if grad.len() != theta.len() || grad.iter().any(|g| !g.is_finite()) {
        return None;
    }
    let mut g = grad.clone();
    penalty.smooth_gradient(theta, &mut g);
    if g.iter().all(|v| v.is_finite()) {
        Some(g)
    } else {
        None
    }
}

/// Bias-corrected first and second moment accumulators (Adam, AMGD).
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct MomentState {
    pub m: Array1<f64>,
    pub v: Array1<f64>,
    pub t: u64,
}

impl MomentState {
    pub fn zeros(n_params: usize) -> Self {
        Self {
            m: Array1::zeros(n_params),
            v: Array1::zeros(n_params),
            t: 0,
        }
    }

    /// Advance t and fold g into m and v.
    pub fn update(&mut self, g: &Array1<f64>, beta_m: f64, beta_v: f64) {
        self.t += 1;
        self.m.zip_mut_with(g, |m, &gi| *m = beta_m * *m + (1.0 - beta_m) * gi);
        self.v.zip_mut_with(g, |v, &gi| *v = beta_v * *v + (1.0 - beta_v) * gi * gi);
    }

    /// (m̂, v̂) = (m / (1 − β_mᵗ), v / (1 − β_vᵗ))
    pub fn bias_corrected(&self, beta_m: f64, beta_v: f64) -> (Array1<f64>, Array1<f64>) {
        let t = self.t.min(i32::MAX as u64) as i32;
        let m_hat = &self.m / (1.0 - beta_m.powi(t));
        let v_hat = &self.v / (1.0 - beta_v.powi(t));
        (m_hat, v_hat)
    }
}

/// r = α / (√v + ε), component-wise.
pub(crate) fn effective_rate(v: &Array1<f64>, learning_rate: f64, epsilon: f64) -> Array1<f64> {
    v.mapv(|vi| learning_rate / (vi.sqrt() + epsilon))
}

/// θ − r ⊙ direction
pub(crate) fn descend(theta: &Array1<f64>, rate: &Array1<f64>, direction: &Array1<f64>) -> Array1<f64> {
    theta - &(rate * direction)
}

// =============================================================================
// Tests
// =============================================================================
