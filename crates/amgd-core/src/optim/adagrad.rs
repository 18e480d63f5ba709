// =============================================================================
// Adagrad
// =============================================================================
//
//     v  ← v + g²
//     r  = α / (√v + ε)
//     θ' = prox(θ − r ⊙ g, r, λ1)
//
// v never decays, so the effective rate only shrinks. Coordinates with
// consistently large gradients slow down first.
//
// =============================================================================

use ndarray::Array1;

use super::{descend, effective_rate, penalized_gradient, Optimizer, StepOutcome};
use crate::config::{OptimizerKind, OptimizerParams};
use crate::penalty::Penalty;

#[derive(Debug, Clone)]
struct AdagradState {
    /// Running sum of squared gradients
    v: Array1<f64>,
    t: u64,
}

/// Adagrad with a proximal L1 step.
#[derive(Debug, Clone)]
pub struct Adagrad {
    params: OptimizerParams,
    state: AdagradState,
}

impl Adagrad {
    pub fn new(params: OptimizerParams, n_params: usize) -> Self {
        Self {
            params,
            state: AdagradState {
                v: Array1::zeros(n_params),
                t: 0,
            },
        }
    }

    /// Accumulated squared gradients.
    pub fn accumulator(&self) -> &Array1<f64> {
        &self.state.v
    }
}

impl Optimizer for Adagrad {
    fn kind(&self) -> OptimizerKind {
        OptimizerKind::Adagrad
    }

    fn n_params(&self) -> usize {
        self.state.v.len()
    }

    fn steps(&self) -> u64 {
        self.state.t
    }

    fn reset(&mut self, n_params: usize) {
        self.state = AdagradState {
            v: Array1::zeros(n_params),
            t: 0,
        };
    }

    fn set_params(&mut self, params: OptimizerParams) {
        self.params = params;
    }

    fn step(&mut self, theta: &Array1<f64>, grad: &Array1<f64>, penalty: &Penalty) -> StepOutcome {
        let g = match penalized_gradient(theta, grad, penalty) {
            Some(g) => g,
            None => return StepOutcome::Skipped,
        };

        self.state.t += 1;
        self.state.v.zip_mut_with(&g, |v, &gi| *v += gi * gi);

        let rate = effective_rate(&self.state.v, self.params.learning_rate, self.params.epsilon);
        let mut next = descend(theta, &rate, &g);
        penalty.prox(&mut next, &rate, penalty.lambda1());

        StepOutcome::Updated(next)
    }
}
