// Exact binomial probability and expected-count comparison

use crate::error::{InferenceError, Result};
use serde::Serialize;
use statrs::distribution::{Binomial, Discrete};

/// `P(X = k)` for `X ~ Binomial(n, p)`
///
/// Degenerate probabilities are exact: `p = 0` puts all mass on `k = 0`,
/// `p = 1` on `k = n`.
pub fn binomial_pmf(n: u64, k: u64, p: f64) -> Result<f64> {
    check_probability(p)?;
    if k > n {
        return Err(InferenceError::InvalidParameter(format!(
            "successes ({k}) exceed trials ({n})"
        )));
    }

    let binomial = Binomial::new(p, n).map_err(|e| {
        InferenceError::InvalidParameter(format!("Binomial(n = {n}, p = {p}): {e}"))
    })?;
    Ok(binomial.pmf(k))
}

fn check_probability(p: f64) -> Result<f64> {
    if (0.0..=1.0).contains(&p) {
        Ok(p)
    } else {
        Err(InferenceError::InvalidParameter(format!("probability must be in [0, 1], got {p}")))
    }
}

/// Observed event count compared with its binomial expectation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpectedCountResult {
    pub trials: u64,
    pub probability: f64,
    pub observed: u64,
    /// `n·p`
    pub expected: f64,
    /// `√(n·p·(1−p))`
    pub std_dev: f64,
    /// Exact `P(X = observed)`
    pub probability_mass: f64,
    /// `(observed − expected) / std_dev`; absent when `std_dev` is zero
    pub z_score: Option<f64>,
}

/// Compare `observed` events in `trials` independent observations with the
/// count expected at per-observation probability `probability`
pub fn expected_count_test(
    trials: u64,
    probability: f64,
    observed: u64,
) -> Result<ExpectedCountResult> {
    let probability_mass = binomial_pmf(trials, observed, probability)?;

    let n = trials as f64;
    let expected = n * probability;
    let std_dev = (n * probability * (1.0 - probability)).sqrt();
    let z_score = (std_dev > 0.0).then(|| (observed as f64 - expected) / std_dev);

    Ok(ExpectedCountResult {
        trials,
        probability,
        observed,
        expected,
        std_dev,
        probability_mass,
        z_score,
    })
}
