// =============================================================================
// Regularization Penalties
// =============================================================================
//
// The penalized objective is
//
//     F(θ) = L(θ) + P(β)
//
// where L is the Poisson negative log-likelihood and P one of
//
//     none:        0
//     l1:          λ1·‖β‖₁
//     l2:          λ2·‖β‖₂²
//     elasticnet:  λ1·‖β‖₁ + λ2·‖β‖₂²
//
// The intercept β₀ (θ[0]) is never penalized.
//
// SMOOTH AND NON-SMOOTH HALVES
// ----------------------------
// The L2 part is differentiable, so it is folded into the gradient
// (`smooth_gradient` adds λ2·β). The L1 part is not differentiable at zero,
// so it is resolved after the gradient step by its proximal operator, the
// soft-threshold:
//
//     prox(z, t) = sign(z) · max(|z| − t·λ1, 0)
//
// where t is the per-coordinate step size the optimizer just used. Every
// optimizer composes the two halves the same way: gradient (with smooth term)
// → adaptive step → prox. That is what produces exact zeros.
//
// =============================================================================

use ndarray::{s, Array1};

use crate::config::PenaltyKind;

/// A concrete penalty with its strengths.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Penalty {
    None,
    L1 { lambda1: f64 },
    L2 { lambda2: f64 },
    ElasticNet { lambda1: f64, lambda2: f64 },
}

impl Penalty {
    /// Build from a penalty kind; strengths the kind does not use are ignored.
    pub fn from_kind(kind: PenaltyKind, lambda1: f64, lambda2: f64) -> Self {
        match kind {
            PenaltyKind::None => Penalty::None,
            PenaltyKind::L1 => Penalty::L1 { lambda1 },
            PenaltyKind::L2 => Penalty::L2 { lambda2 },
            PenaltyKind::ElasticNet => Penalty::ElasticNet { lambda1, lambda2 },
        }
    }

    pub fn kind(&self) -> PenaltyKind {
        match self {
            Penalty::None => PenaltyKind::None,
            Penalty::L1 { .. } => PenaltyKind::L1,
            Penalty::L2 { .. } => PenaltyKind::L2,
            Penalty::ElasticNet { .. } => PenaltyKind::ElasticNet,
        }
    }

    /// Strength of the non-smooth (L1) part, 0 if there is none.
    pub fn lambda1(&self) -> f64 {
        match *self {
            Penalty::L1 { lambda1 } | Penalty::ElasticNet { lambda1, .. } => lambda1,
            Penalty::None | Penalty::L2 { .. } => 0.0,
        }
    }

    /// Strength of the smooth (L2) part, 0 if there is none.
    pub fn lambda2(&self) -> f64 {
        match *self {
            Penalty::L2 { lambda2 } | Penalty::ElasticNet { lambda2, .. } => lambda2,
            Penalty::None | Penalty::L1 { .. } => 0.0,
        }
    }

    /// The same penalty with its L1 strength replaced. Penalties without an
    /// L1 part are returned unchanged.
    pub fn with_lambda1(&self, lambda1: f64) -> Self {
        match *self {
            Penalty::L1 { .. } => Penalty::L1 { lambda1 },
            Penalty::ElasticNet { lambda2, .. } => Penalty::ElasticNet { lambda1, lambda2 },
            other => other,
        }
    }

    /// True if a proximal step can change θ.
    pub fn has_proximal_term(&self) -> bool {
        self.lambda1() > 0.0
    }

    /// P(β) for θ = (β₀, β).
    pub fn value(&self, theta: &Array1<f64>) -> f64 {
        let beta = theta.slice(s![1..]);
        let l1 = self.lambda1();
        let l2 = self.lambda2();

        let mut total = 0.0;
        if l1 > 0.0 {
            total += l1 * beta.iter().map(|b| b.abs()).sum::<f64>();
        }
        if l2 > 0.0 {
            total += l2 * beta.iter().map(|b| b * b).sum::<f64>();
        }
        total
    }

    /// Add the smooth part's gradient, λ2·β, to `grad` (intercept untouched).
    pub fn smooth_gradient(&self, theta: &Array1<f64>, grad: &mut Array1<f64>) {
        let l2 = self.lambda2();
        if l2 == 0.0 {
            return;
        }
        grad.slice_mut(s![1..])
            .zip_mut_with(&theta.slice(s![1..]), |g, &b| *g += l2 * b);
    }

    /// Soft-threshold θ in place with per-coordinate step sizes `step` and L1
    /// strength `lambda1`. The intercept is skipped.
    ///
    /// `lambda1` is passed explicitly so that AMGD can supply its decayed
    /// strength; the other optimizers pass `self.lambda1()`.
    pub fn prox(&self, theta: &mut Array1<f64>, step: &Array1<f64>, lambda1: f64) {
        if !self.has_proximal_term() || lambda1 <= 0.0 {
            return;
        }
        theta
            .slice_mut(s![1..])
            .zip_mut_with(&step.slice(s![1..]), |z, &t| *z = soft_threshold(*z, t * lambda1));
    }
}

/// sign(z) · max(|z| − threshold, 0)
#[inline]
pub fn soft_threshold(z: f64, threshold: f64) -> f64 {
    if z > threshold {
        z - threshold
    } else if z < -threshold {
        z + threshold
    } else {
        0.0
    }
}

// =============================================================================
// Tests
// =============================================================================
