// =============================================================================
// Synthetic Poisson Data
// =============================================================================
//
// A seeded generator for sparse Poisson regression problems with a known
// answer. Used by tests and benchmarks; the estimator never depends on it.
//
// THE GENERATIVE MODEL
// --------------------
//     xᵢⱼ ~ N(0, 1)
//     β   has k non-zero entries at random positions,
//         |βⱼ| ~ U(0.1, 0.4) with a random sign
//     β₀  = −0.5
//     yᵢ  ~ Poisson(exp(β₀ + xᵢ'β))
//
// k = min(n_informative, round((1 − sparsity)·p)), so `sparsity` is a floor
// on the fraction of true zeros.
//
// The small intercept and modest coefficients keep E[μ] below 1, which is
// typical of claim-frequency style data and keeps the problem well
// conditioned for first-order optimizers.
//
// =============================================================================

use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Poisson, StandardNormal};

use crate::error::{AmgdError, Result};

const TRUE_INTERCEPT: f64 = -0.5;
const COEF_MIN: f64 = 0.1;
const COEF_MAX: f64 = 0.4;

/// Generated data plus the truth it was drawn from.
#[derive(Debug, Clone)]
pub struct SyntheticDataset {
    /// n × p design matrix
    pub x: Array2<f64>,
    /// n counts
    pub y: Array1<f64>,
    /// True β, length p
    pub true_coef: Array1<f64>,
    /// True β₀
    pub true_intercept: f64,
}

/// Draw a sparse Poisson regression problem.
///
/// # Arguments
/// * `n_samples` - rows of X (> 0)
/// * `n_features` - columns of X (> 0)
/// * `n_informative` - upper bound on non-zero true coefficients (≤ n_features)
/// * `sparsity` - lower bound on the fraction of zero true coefficients, in [0, 1)
/// * `seed` - RNG seed; equal seeds give identical datasets
pub fn generate_synthetic_poisson_data(
    n_samples: usize,
    n_features: usize,
    n_informative: usize,
    sparsity: f64,
    seed: u64,
) -> Result<SyntheticDataset> {
    if n_samples == 0 || n_features == 0 {
        return Err(AmgdError::Configuration(format!(
            "n_samples and n_features must be > 0, got {} and {}",
            n_samples, n_features
        )));
    }
    if n_informative > n_features {
        return Err(AmgdError::Configuration(format!(
            "n_informative ({}) cannot exceed n_features ({})",
            n_informative, n_features
        )));
    }
    if !(0.0..1.0).contains(&sparsity) {
        return Err(AmgdError::Configuration(format!(
            "sparsity must be in [0, 1), got {}",
            sparsity
        )));
    }

    let mut rng = StdRng::seed_from_u64(seed);

    let max_nonzero = ((1.0 - sparsity) * n_features as f64).round() as usize;
    let k = n_informative.min(max_nonzero);

    let support = rand::seq::index::sample(&mut rng, n_features, k).into_vec();
    let mut true_coef: Array1<f64> = Array1::zeros(n_features);
    for j in support {
        let magnitude = rng.gen_range(COEF_MIN..=COEF_MAX);
        true_coef[j] = if rng.gen_bool(0.5) { magnitude } else { -magnitude };
    }

    let x: Array2<f64> = Array2::from_shape_fn((n_samples, n_features), |_| {
        StandardNormal.sample(&mut rng)
    });

    let eta = x.dot(&true_coef) + TRUE_INTERCEPT;
    let mut y: Array1<f64> = Array1::zeros(n_samples);
    for (yi, &e) in y.iter_mut().zip(eta.iter()) {
        let mu = e.exp().clamp(1e-10, 1e6);
        let dist = Poisson::new(mu).map_err(|err| {
            AmgdError::Configuration(format!("invalid Poisson rate {}: {}", mu, err))
        })?;
        let count: f64 = dist.sample(&mut rng);
        *yi = count;
    }

    Ok(SyntheticDataset {
        x,
        y,
        true_coef,
        true_intercept: TRUE_INTERCEPT,
    })
}
