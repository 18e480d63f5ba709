// =============================================================================
// Error Types
// =============================================================================
//
// Every fallible operation in the library returns `Result<T>`, which is an
// alias for `std::result::Result<T, AmgdError>`.
//
// There are three kinds of failure, and they are all fatal to the call that
// raised them:
//
//   - InvalidInput:  the data is wrong (shape, NaN, negative counts, ...)
//   - NotFitted:     predict/score called on a model that was never fitted
//   - Configuration: the hyperparameters are wrong (negative λ, unknown name)
//
// Numerical safeguards (clipping, skipped steps) are NOT errors. They are
// recovered locally and summarized as `NumericalInstabilityWarning`s on the
// fitted model (see `estimator.rs`).
//
// =============================================================================

use thiserror::Error;

/// Errors raised by the fitting library.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AmgdError {
    /// Malformed X or y: wrong shape, non-finite values, invalid counts,
    /// mismatched rows or columns.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// `predict` / `score` called before a successful `fit`.
    #[error("model is not fitted: {0}")]
    NotFitted(String),

    /// Invalid hyperparameter value or combination.
    #[error("invalid configuration: {0}")]
    Configuration(String),
}

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AmgdError>;
