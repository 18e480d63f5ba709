// =============================================================================
// Model Diagnostics
// =============================================================================
//
// Goodness-of-fit tools for fitted Poisson models:
//
// - DEVIANCE: Poisson deviance, null deviance, and the deviance-based
//   pseudo-R² used by `PoissonRegressor::score`
// - MODEL FIT: full log-likelihood (including log(y!)), AIC, BIC, sparsity
//
// All functions take plain arrays so they can be used on any (y, μ) pair,
// not only on the output of this crate's estimator.
//
// =============================================================================

mod deviance;
mod model_fit;

pub use deviance::{
    poisson_deviance,
    poisson_unit_deviance,
    null_deviance,
    pseudo_r2,
};

pub use model_fit::{
    log_likelihood_poisson,
    aic,
    bic,
    sparsity,
    InformationCriteria,
    DEFAULT_ZERO_THRESHOLD,
};
