// =============================================================================
// Adam
// =============================================================================
//
//     m  ← β_m·m + (1 − β_m)·g
//     v  ← β_v·v + (1 − β_v)·g²
//     m̂  = m / (1 − β_mᵗ),  v̂ = v / (1 − β_vᵗ)
//     r  = α / (√v̂ + ε)
//     θ' = prox(θ − r ⊙ m̂, r, λ1)
//
// The L1 threshold r·λ1 is static in λ1. A coordinate at zero stays at zero
// exactly when |m̂ⱼ| ≤ λ1, which is the lasso optimality condition applied to
// the smoothed gradient.
//
// =============================================================================

use ndarray::Array1;

use super::{descend, effective_rate, penalized_gradient, MomentState, Optimizer, StepOutcome};
use crate::config::{OptimizerKind, OptimizerParams};
use crate::penalty::Penalty;

/// Adam with a proximal L1 step.
#[derive(Debug, Clone)]
pub struct Adam {
    params: OptimizerParams,
    state: MomentState,
}

impl Adam {
    pub fn new(params: OptimizerParams, n_params: usize) -> Self {
        Self {
            params,
            state: MomentState::zeros(n_params),
        }
    }

    /// First moment m (not bias corrected).
    pub fn first_moment(&self) -> &Array1<f64> {
        &self.state.m
    }

    /// Second moment v (not bias corrected).
    pub fn second_moment(&self) -> &Array1<f64> {
        &self.state.v
    }
}

impl Optimizer for Adam {
    fn kind(&self) -> OptimizerKind {
        OptimizerKind::Adam
    }

    fn n_params(&self) -> usize {
        self.state.m.len()
    }

    fn steps(&self) -> u64 {
        self.state.t
    }

    fn reset(&mut self, n_params: usize) {
        self.state = MomentState::zeros(n_params);
    }

    fn set_params(&mut self, params: OptimizerParams) {
        self.params = params;
    }

    fn step(&mut self, theta: &Array1<f64>, grad: &Array1<f64>, penalty: &Penalty) -> StepOutcome {
        let g = match penalized_gradient(theta, grad, penalty) {
            Some(g) => g,
            None => return StepOutcome::Skipped,
        };

        let OptimizerParams {
            learning_rate,
            beta_m,
            beta_v,
            epsilon,
            ..
        } = self.params;

        self.state.update(&g, beta_m, beta_v);
        let (m_hat, v_hat) = self.state.bias_corrected(beta_m, beta_v);

        let rate = effective_rate(&v_hat, learning_rate, epsilon);
        let mut next = descend(theta, &rate, &m_hat);
        penalty.prox(&mut next, &rate, penalty.lambda1());

        StepOutcome::Updated(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_first_step_is_signed_learning_rate() {
        let params = OptimizerParams {
            learning_rate: 0.05,
            ..OptimizerParams::default()
        };
        let mut opt = Adam::new(params, 3);
        let theta = array![1.0, 1.0, 1.0];
        let grad = array![10.0, -0.01, 3.0];

        let StepOutcome::Updated(next) = opt.step(&theta, &grad, &Penalty::None) else {
            panic!("step should not be skipped");
        };
        // m̂ = g and v̂ = g² after bias correction
        assert_abs_diff_eq!(next[0], 0.95, epsilon = 1e-6);
        assert_abs_diff_eq!(next[1], 1.05, epsilon = 1e-5);
        assert_abs_diff_eq!(next[2], 0.95, epsilon = 1e-6);
        assert_eq!(opt.steps(), 1);
    }

    #[test]
    fn test_minimizes_quadratic() {
        // f(θ) = ½‖θ − c‖², ∇f = θ − c
        let c = array![1.0, -2.0, 0.5];
        let mut opt = Adam::new(
            OptimizerParams {
                learning_rate: 0.05,
                ..OptimizerParams::default()
            },
            3,
        );
        let mut theta = Array1::zeros(3);
        for _ in 0..2000 {
            let grad = &theta - &c;
            if let StepOutcome::Updated(next) = opt.step(&theta, &grad, &Penalty::None) {
                theta = next;
            }
        }
        for j in 0..3 {
            assert_abs_diff_eq!(theta[j], c[j], epsilon = 1e-2);
        }
    }

    #[test]
    fn test_l1_zero_stays_zero_when_gradient_below_lambda() {
        let mut opt = Adam::new(OptimizerParams::default(), 2);
        let mut theta = array![0.0, 0.0];
        let penalty = Penalty::L1 { lambda1: 0.5 };
        for _ in 0..50 {
            let grad = array![0.0, 0.3];
            if let StepOutcome::Updated(next) = opt.step(&theta, &grad, &penalty) {
                theta = next;
            }
        }
        assert_eq!(theta[1], 0.0);
    }

    #[test]
    fn test_reset_clears_moments() {
        let mut opt = Adam::new(OptimizerParams::default(), 2);
        let _ = opt.step(&array![0.0, 0.0], &array![1.0, 1.0], &Penalty::None);
        assert!(opt.first_moment().iter().any(|&m| m != 0.0));

        opt.reset(3);
        assert_eq!(opt.n_params(), 3);
        assert_eq!(opt.steps(), 0);
        assert!(opt.second_moment().iter().all(|&v| v == 0.0));
    }
}
