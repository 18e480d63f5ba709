// =============================================================================
// AMGD Core Library
// =============================================================================
//
// Pure Rust penalized Poisson regression. No Python code involved; the
// `amgd` crate wraps this library for Python.
//
// STRUCTURE:
// ----------
//   - error:       Error type used throughout the library
//   - config:      Hyperparameters, optimizer and penalty names
//   - design:      Dense and CSR design matrices behind one trait
//   - objective:   Poisson negative log-likelihood with numerical safeguards
//   - penalty:     L1 / L2 / Elastic Net values, gradients and proximal steps
//   - optim:       AMGD, Adam and Adagrad update rules
//   - estimator:   PoissonRegressor (fit / predict / score / warm start)
//   - diagnostics: Deviance, pseudo-R², AIC/BIC, sparsity
//   - datasets:    Seeded synthetic sparse Poisson data
//
// FOR MAINTAINERS:
// ----------------
// When adding new functionality:
//   1. Add it to the appropriate module (or create a new one)
//   2. Write tests in that module
//   3. Re-export public items here
//   4. Update the Python bindings in the `amgd` crate
//
// =============================================================================

pub mod config;
pub mod datasets;
pub mod design;
pub mod diagnostics;
pub mod error;
pub mod estimator;
pub mod objective;
pub mod optim;
pub mod penalty;

pub use config::{OptimizerKind, OptimizerParams, PenaltyKind, RegressorConfig, ThresholdDecay};
pub use datasets::{generate_synthetic_poisson_data, SyntheticDataset};
pub use design::{CsrMatrix, Design};
pub use diagnostics::{pseudo_r2, InformationCriteria};
pub use error::{AmgdError, Result};
pub use estimator::{
    FittedModel, InstabilityKind, NumericalInstabilityWarning, PoissonRegressor, SafeguardCounts,
};
pub use objective::PoissonObjective;
pub use optim::{Adagrad, Adam, Amgd, Optimizer, StepOutcome};
pub use penalty::Penalty;
