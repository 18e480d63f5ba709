// =============================================================================
// Configuration
// =============================================================================
//
// All hyperparameters of a `PoissonRegressor` live in `RegressorConfig`.
// The struct has public fields and sensible defaults, so the usual pattern is:
//
//     let config = RegressorConfig {
//         penalty: PenaltyKind::L1,
//         lambda1: 0.1,
//         max_iter: 500,
//         ..Default::default()
//     };
//
// Nothing is checked at construction time. `validate()` runs at the start of
// every `fit` call, before any fitted state is touched, and reports problems
// as `AmgdError::Configuration`.
//
// OPTIMIZER AND PENALTY NAMES
// ---------------------------
// Both enums parse from strings (case-insensitive, common aliases accepted)
// so that the Python bindings can pass `optimizer="amgd"`, `penalty="l1"`.
//
// =============================================================================

use std::fmt;
use std::str::FromStr;

use crate::error::{AmgdError, Result};

// =============================================================================
// Optimizer and Penalty Kinds
// =============================================================================

/// Which gradient-based optimizer drives the fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptimizerKind {
    /// Adaptive Momentum Gradient Descent (momentum + decaying soft-threshold)
    Amgd,
    /// Adam with a proximal L1 step
    Adam,
    /// Adagrad with a proximal L1 step
    Adagrad,
}

impl OptimizerKind {
    pub fn name(&self) -> &'static str {
        match self {
            OptimizerKind::Amgd => "amgd",
            OptimizerKind::Adam => "adam",
            OptimizerKind::Adagrad => "adagrad",
        }
    }
}

impl fmt::Display for OptimizerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OptimizerKind {
    type Err = AmgdError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "amgd" => Ok(OptimizerKind::Amgd),
            "adam" => Ok(OptimizerKind::Adam),
            "adagrad" => Ok(OptimizerKind::Adagrad),
            _ => Err(AmgdError::Configuration(format!(
                "Unknown optimizer '{}'. Use 'amgd', 'adam', or 'adagrad'.",
                s
            ))),
        }
    }
}

/// Which regularization term is added to the negative log-likelihood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PenaltyKind {
    None,
    L1,
    L2,
    ElasticNet,
}

impl PenaltyKind {
    pub fn name(&self) -> &'static str {
        match self {
            PenaltyKind::None => "none",
            PenaltyKind::L1 => "l1",
            PenaltyKind::L2 => "l2",
            PenaltyKind::ElasticNet => "elasticnet",
        }
    }
}

impl fmt::Display for PenaltyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PenaltyKind {
    type Err = AmgdError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(PenaltyKind::None),
            "l1" | "lasso" => Ok(PenaltyKind::L1),
            "l2" | "ridge" => Ok(PenaltyKind::L2),
            "elasticnet" | "elastic_net" | "elastic-net" | "enet" => Ok(PenaltyKind::ElasticNet),
            _ => Err(AmgdError::Configuration(format!(
                "Unknown penalty '{}'. Use 'none', 'l1', 'l2', or 'elasticnet'.",
                s
            ))),
        }
    }
}

// =============================================================================
// AMGD Threshold Schedule
// =============================================================================

/// How AMGD scales the L1 threshold down as the step counter `t` grows.
///
/// A decaying threshold lets coefficients that were zeroed early re-enter the
/// model once the adaptive step size has settled. The default decay is slow;
/// a fast decay erodes sparsity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThresholdDecay {
    /// λ_eff = λ1 (no decay, static proximal gradient)
    Constant,
    /// λ_eff = λ1 / (1 + rate·t)
    InverseTime { rate: f64 },
    /// λ_eff = λ1 · exp(−rate·t)
    Exponential { rate: f64 },
}

impl ThresholdDecay {
    /// Build a schedule from its name (`constant`, `inverse_time`,
    /// `exponential`) and a rate. The rate is ignored for `constant`.
    pub fn from_name(name: &str, rate: f64) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "constant" | "none" => Ok(ThresholdDecay::Constant),
            "inverse_time" | "inverse-time" | "inverse" => Ok(ThresholdDecay::InverseTime { rate }),
            "exponential" | "exp" => Ok(ThresholdDecay::Exponential { rate }),
            _ => Err(AmgdError::Configuration(format!(
                "Unknown threshold decay '{}'. Use 'constant', 'inverse_time', or 'exponential'.",
                name
            ))),
        }
    }

    /// Effective L1 strength at step `t` (t starts at 1).
    pub fn effective_lambda(&self, lambda1: f64, t: u64) -> f64 {
        let t = t as f64;
        match *self {
            ThresholdDecay::Constant => lambda1,
            ThresholdDecay::InverseTime { rate } => lambda1 / (1.0 + rate * t),
            ThresholdDecay::Exponential { rate } => lambda1 * (-rate * t).exp(),
        }
    }

    fn validate(&self) -> Result<()> {
        let rate = match *self {
            ThresholdDecay::Constant => return Ok(()),
            ThresholdDecay::InverseTime { rate } | ThresholdDecay::Exponential { rate } => rate,
        };
        if !rate.is_finite() || rate < 0.0 {
            return Err(AmgdError::Configuration(format!(
                "threshold decay rate must be finite and >= 0, got {}",
                rate
            )));
        }
        Ok(())
    }
}

impl Default for ThresholdDecay {
    fn default() -> Self {
        ThresholdDecay::InverseTime { rate: 1e-4 }
    }
}

// =============================================================================
// Optimizer Hyperparameters
// =============================================================================

/// The subset of the configuration an optimizer needs for its update rule.
///
/// Optimizers keep a copy; on a warm-started fit the estimator pushes the
/// current values back in with `Optimizer::set_params` so that changed
/// hyperparameters take effect without discarding the adaptive state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptimizerParams {
    /// Base learning rate α
    pub learning_rate: f64,
    /// Momentum decay β_m (Adam, AMGD)
    pub beta_m: f64,
    /// Adaptive-scale decay β_v (Adam, AMGD)
    pub beta_v: f64,
    /// Added to √v before dividing
    pub epsilon: f64,
    /// Component-wise gradient bound applied by AMGD before the moment update
    pub gradient_clip: f64,
    /// AMGD threshold schedule
    pub threshold_decay: ThresholdDecay,
    /// Lower bound on λ_eff / λ1 for AMGD, in [0, 1]
    pub threshold_floor: f64,
}

impl OptimizerParams {
    /// L1 strength AMGD applies at step `t`: the decayed λ1, never below
    /// `threshold_floor · λ1`.
    pub fn decayed_lambda(&self, lambda1: f64, t: u64) -> f64 {
        self.threshold_decay
            .effective_lambda(lambda1, t)
            .max(self.threshold_floor * lambda1)
    }
}

impl Default for OptimizerParams {
    fn default() -> Self {
        RegressorConfig::default().optimizer_params()
    }
}

// =============================================================================
// Estimator Configuration
// =============================================================================

/// Hyperparameters of a `PoissonRegressor`.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressorConfig {
    /// Default: AMGD
    pub optimizer: OptimizerKind,

    /// Default: L1
    pub penalty: PenaltyKind,

    /// L1 strength (used by `l1` and `elasticnet`).
    /// Default: 0.1
    pub lambda1: f64,

    /// L2 strength (used by `l2` and `elasticnet`).
    /// Default: 0.0
    pub lambda2: f64,

    /// Base learning rate α.
    /// Default: 0.01
    pub learning_rate: f64,

    /// Momentum decay β_m, in [0, 1).
    /// Default: 0.9
    pub beta_m: f64,

    /// Adaptive-scale decay β_v, in [0, 1).
    /// Default: 0.999
    pub beta_v: f64,

    /// Numerical epsilon in the adaptive denominator.
    /// Default: 1e-8
    pub epsilon: f64,

    /// Maximum number of optimizer steps per `fit` call.
    /// Default: 1000
    pub max_iter: usize,

    /// Convergence tolerance on the relative change of the penalized
    /// objective between consecutive iterations.
    /// Default: 1e-6
    pub tol: f64,

    /// Reuse coefficients and optimizer state from the previous `fit`.
    /// Default: false
    pub warm_start: bool,

    /// Component-wise bound on the log-likelihood gradient.
    /// Default: 5.0
    pub gradient_clip: f64,

    /// Bound on the linear predictor before exponentiation: η ∈ [−b, b].
    /// exp(20) ≈ 4.85e8, comfortably finite.
    /// Default: 20.0
    pub eta_clip: f64,

    /// AMGD threshold schedule.
    /// Default: `InverseTime { rate: 1e-4 }`
    pub threshold_decay: ThresholdDecay,

    /// Fraction of λ1 below which the AMGD threshold never decays, in [0, 1].
    /// Once reached, AMGD minimizes a fixed penalized objective again.
    /// Default: 0.5
    pub threshold_floor: f64,

    /// Fraction of iterations with a triggered safeguard above which a
    /// `NumericalInstabilityWarning` is recorded.
    /// Default: 0.1
    pub instability_warn_fraction: f64,

    /// Log every iteration at info level instead of trace.
    /// Default: false
    pub verbose: bool,
}

impl Default for RegressorConfig {
    fn default() -> Self {
        Self {
            optimizer: OptimizerKind::Amgd,
            penalty: PenaltyKind::L1,
            lambda1: 0.1,
            lambda2: 0.0,
            learning_rate: 0.01,
            beta_m: 0.9,
            beta_v: 0.999,
            epsilon: 1e-8,
            max_iter: 1000,
            tol: 1e-6,
            warm_start: false,
            gradient_clip: 5.0,
            eta_clip: 20.0,
            threshold_decay: ThresholdDecay::default(),
            threshold_floor: 0.5,
            instability_warn_fraction: 0.1,
            verbose: false,
        }
    }
}

impl RegressorConfig {
    /// Check every hyperparameter. Called at the start of `fit`.
    pub fn validate(&self) -> Result<()> {
        non_negative("lambda1", self.lambda1)?;
        non_negative("lambda2", self.lambda2)?;
        positive("learning_rate", self.learning_rate)?;
        positive("epsilon", self.epsilon)?;
        positive("tol", self.tol)?;
        positive("gradient_clip", self.gradient_clip)?;
        positive("eta_clip", self.eta_clip)?;
        unit_interval("beta_m", self.beta_m)?;
        unit_interval("beta_v", self.beta_v)?;

        if self.max_iter == 0 {
            return Err(AmgdError::Configuration(
                "max_iter must be > 0".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.threshold_floor) {
            return Err(AmgdError::Configuration(format!(
                "threshold_floor must be in [0, 1], got {}",
                self.threshold_floor
            )));
        }

        if !(0.0..=1.0).contains(&self.instability_warn_fraction) {
            return Err(AmgdError::Configuration(format!(
                "instability_warn_fraction must be in [0, 1], got {}",
                self.instability_warn_fraction
            )));
        }

        self.threshold_decay.validate()
    }

    /// Extract the optimizer-facing hyperparameters.
    pub fn optimizer_params(&self) -> OptimizerParams {
        OptimizerParams {
            learning_rate: self.learning_rate,
            beta_m: self.beta_m,
            beta_v: self.beta_v,
            epsilon: self.epsilon,
            gradient_clip: self.gradient_clip,
            threshold_decay: self.threshold_decay,
            threshold_floor: self.threshold_floor,
        }
    }
}

fn non_negative(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(AmgdError::Configuration(format!(
            "{} must be finite and >= 0, got {}",
            name, value
        )));
    }
    Ok(())
}

fn positive(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(AmgdError::Configuration(format!(
            "{} must be finite and > 0, got {}",
            name, value
        )));
    }
    Ok(())
}

fn unit_interval(name: &str, value: f64) -> Result<()> {
    if !(0.0..1.0).contains(&value) {
        return Err(AmgdError::Configuration(format!(
            "{} must be in [0, 1), got {}",
            name, value
        )));
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
