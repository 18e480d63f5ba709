// =============================================================================
// AMGD: Adaptive Momentum Gradient Descent
// =============================================================================
//
// AMGD keeps Adam's bias-corrected momentum and adaptive scale, and changes
// two things around them.
//
// 1. GRADIENT CLIPPING BEFORE THE MOMENT UPDATE
//    g (including the smooth penalty term) is clipped component-wise to
//    ±gradient_clip before it enters m and v. v has a long memory
//    (β_v ≈ 0.999); one huge early gradient would otherwise inflate √v̂ and
//    freeze that coordinate for hundreds of iterations.
//
// 2. DECAYING SOFT-THRESHOLD
//    The proximal step uses λ_eff(t) instead of a fixed λ1:
//
//        θ' = prox(θ − r ⊙ m̂, r, λ_eff(t)),   r = α / (√v̂ + ε)
//
//    with λ_eff from `ThresholdDecay` (default λ1 / (1 + 1e-4·t)), floored
//    at `threshold_floor · λ1` (default 0.5). Early on,
//    while m̂ is noisy, the threshold is at full strength and prunes
//    aggressively. As training settles the threshold relaxes, so a
//    coefficient that was zeroed early can re-enter if its gradient stays
//    consistently above the (lower) threshold.
//
//    The objective AMGD reports is measured with λ_eff, not λ1: the iterates
//    minimize L + λ_eff‖β‖₁, and measuring them against the full λ1 would
//    show the objective rising as the threshold relaxes.
//
// CONVERGENCE
// -----------
// A proximal step can pin coefficients at exactly zero while others are
// still moving, so parameter distance is a poor stopping signal. AMGD stops
// on the relative change of the penalized objective, and additionally
// requires that the support (which coefficients are non-zero) did not
// change in the latest step.
//
// =============================================================================

use ndarray::Array1;

use super::{
    descend, effective_rate, penalized_gradient, relative_change, MomentState, Optimizer,
    StepOutcome,
};
use crate::config::{OptimizerKind, OptimizerParams};
use crate::objective::clip_gradient;
use crate::penalty::Penalty;

/// Adaptive Momentum Gradient Descent.
#[derive(Debug, Clone)]
pub struct Amgd {
    params: OptimizerParams,
    state: MomentState,
    /// Non-zero pattern of β after the latest step
    support: Vec<bool>,
    support_changed: bool,
    /// Gradient components clipped since the last reset
    clipped_components: u64,
}

impl Amgd {
    pub fn new(params: OptimizerParams, n_params: usize) -> Self {
        Self {
            params,
            state: MomentState::zeros(n_params),
            support: vec![false; n_params.saturating_sub(1)],
            support_changed: true,
            clipped_components: 0,
        }
    }

    /// L1 strength used by the latest (or next) proximal step.
    pub fn effective_lambda(&self, lambda1: f64) -> f64 {
        self.params.decayed_lambda(lambda1, self.state.t.max(1))
    }

    /// Number of non-zero coefficients (intercept excluded) after the latest
    /// step.
    pub fn support_size(&self) -> usize {
        self.support.iter().filter(|&&nz| nz).count()
    }

    /// Did the latest step add or drop a coefficient?
    pub fn support_changed(&self) -> bool {
        self.support_changed
    }

    pub fn clipped_components(&self) -> u64 {
        self.clipped_components
    }

    fn record_support(&mut self, theta: &Array1<f64>) {
        let mut changed = self.support.len() + 1 != theta.len();
        if changed {
            self.support = vec![false; theta.len().saturating_sub(1)];
        }
        for (slot, &b) in self.support.iter_mut().zip(theta.iter().skip(1)) {
            let nz = b != 0.0;
            if *slot != nz {
                *slot = nz;
                changed = true;
            }
        }
        self.support_changed = changed;
    }
}

impl Optimizer for Amgd {
    fn kind(&self) -> OptimizerKind {
        OptimizerKind::Amgd
    }

    fn n_params(&self) -> usize {
        self.state.m.len()
    }

    fn steps(&self) -> u64 {
        self.state.t
    }

    fn reset(&mut self, n_params: usize) {
        self.state = MomentState::zeros(n_params);
        self.support = vec![false; n_params.saturating_sub(1)];
        self.support_changed = true;
        self.clipped_components = 0;
    }

    fn set_params(&mut self, params: OptimizerParams) {
        self.params = params;
    }

    fn step(&mut self, theta: &Array1<f64>, grad: &Array1<f64>, penalty: &Penalty) -> StepOutcome {
        let mut g = match penalized_gradient(theta, grad, penalty) {
            Some(g) => g,
            None => return StepOutcome::Skipped,
        };

        let OptimizerParams {
            learning_rate,
            beta_m,
            beta_v,
            epsilon,
            gradient_clip,
            ..
        } = self.params;

        self.clipped_components += clip_gradient(&mut g, gradient_clip) as u64;

        self.state.update(&g, beta_m, beta_v);
        let (m_hat, v_hat) = self.state.bias_corrected(beta_m, beta_v);

        let rate = effective_rate(&v_hat, learning_rate, epsilon);
        let mut next = descend(theta, &rate, &m_hat);

        let lambda_eff = self.params.decayed_lambda(penalty.lambda1(), self.state.t);
        penalty.prox(&mut next, &rate, lambda_eff);

        self.record_support(&next);
        StepOutcome::Updated(next)
    }

    fn effective_penalty(&self, penalty: &Penalty) -> Penalty {
        penalty.with_lambda1(self.effective_lambda(penalty.lambda1()))
    }

    fn has_converged(&self, previous: f64, current: f64, tol: f64) -> bool {
        !self.support_changed && relative_change(previous, current) < tol
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ThresholdDecay;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn params(decay: ThresholdDecay) -> OptimizerParams {
        OptimizerParams {
            learning_rate: 0.01,
            threshold_decay: decay,
            ..OptimizerParams::default()
        }
    }

    #[test]
    fn test_gradient_clipped_before_moment_update() {
        let mut opt = Amgd::new(
            OptimizerParams {
                gradient_clip: 1.0,
                ..OptimizerParams::default()
            },
            2,
        );
        let _ = opt.step(&array![0.0, 0.0], &array![1000.0, -0.5], &Penalty::None);

        assert_eq!(opt.clipped_components(), 1);
        // m = (1 − β_m)·clip(g)
        assert_abs_diff_eq!(opt.state.m[0], 0.1, epsilon = 1e-12);
        assert_abs_diff_eq!(opt.state.v[0], 0.001, epsilon = 1e-12);
    }

    #[test]
    fn test_decaying_threshold_readmits_coefficient() {
        // Constant gradient 0.3 on β₁ with λ1 = 0.5: a static threshold keeps
        // β₁ at zero forever. With fast decay λ_eff drops below 0.3 and β₁
        // re-enters the model.
        let penalty = Penalty::L1 { lambda1: 0.5 };
        let grad = array![0.0, -0.3];

        let mut fixed = Amgd::new(params(ThresholdDecay::Constant), 2);
        let mut decaying = Amgd::new(params(ThresholdDecay::InverseTime { rate: 0.05 }), 2);
        let mut theta_fixed = array![0.0, 0.0];
        let mut theta_decay = array![0.0, 0.0];

        for _ in 0..100 {
            if let StepOutcome::Updated(next) = fixed.step(&theta_fixed, &grad, &penalty) {
                theta_fixed = next;
            }
            if let StepOutcome::Updated(next) = decaying.step(&theta_decay, &grad, &penalty) {
                theta_decay = next;
            }
        }

        assert_eq!(theta_fixed[1], 0.0);
        assert!(theta_decay[1] > 0.0);
        assert_eq!(decaying.support_size(), 1);
        assert!(decaying.effective_lambda(0.5) < 0.3);
    }

    #[test]
    fn test_convergence_requires_stable_support() {
        let mut opt = Amgd::new(params(ThresholdDecay::Constant), 3);
        // fresh optimizer: support considered unsettled
        assert!(!opt.has_converged(1.0, 1.0, 1e-6));

        let theta = array![0.0, 0.0, 0.0];
        let grad = array![0.0, 1.0, 0.0];
        let StepOutcome::Updated(next) = opt.step(&theta, &grad, &Penalty::None) else {
            panic!("step should not be skipped");
        };
        // β₁ entered the support
        assert!(opt.support_changed());

        let _ = opt.step(&next, &grad, &Penalty::None);
        assert!(!opt.support_changed());
        assert!(opt.has_converged(1.0, 1.0 + 1e-9, 1e-6));
        assert!(!opt.has_converged(1.0, 1.1, 1e-6));
    }

    #[test]
    fn test_effective_penalty_tracks_decay_and_floor() {
        let mut opt = Amgd::new(
            OptimizerParams {
                threshold_decay: ThresholdDecay::InverseTime { rate: 0.5 },
                threshold_floor: 0.4,
                ..OptimizerParams::default()
            },
            2,
        );
        let penalty = Penalty::ElasticNet { lambda1: 1.0, lambda2: 0.2 };
        let mut theta = array![0.0, 0.0];

        // t = 1: 1 / (1 + 0.5)
        if let StepOutcome::Updated(next) = opt.step(&theta, &array![0.1, 0.1], &penalty) {
            theta = next;
        }
        assert_eq!(
            opt.effective_penalty(&penalty),
            Penalty::ElasticNet { lambda1: 1.0 / 1.5, lambda2: 0.2 }
        );

        for _ in 0..10 {
            if let StepOutcome::Updated(next) = opt.step(&theta, &array![0.1, 0.1], &penalty) {
                theta = next;
            }
        }
        // 1 / (1 + 5.5) is below the floor
        assert_abs_diff_eq!(opt.effective_penalty(&penalty).lambda1(), 0.4, epsilon = 1e-12);
        assert_eq!(opt.effective_penalty(&penalty).lambda2(), 0.2);
    }

    #[test]
    fn test_skipped_step_leaves_state() {
        let mut opt = Amgd::new(OptimizerParams::default(), 2);
        let outcome = opt.step(&array![0.0, 0.0], &array![f64::NAN, 0.0], &Penalty::None);
        assert_eq!(outcome, StepOutcome::Skipped);
        assert_eq!(opt.steps(), 0);
    }
}
