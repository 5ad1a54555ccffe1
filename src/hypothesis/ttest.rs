// Student and Welch t-tests
//
// The statistic is computed from summaries, so callers can test published
// figures (mean, std, n) as well as raw samples.

use super::{check_alpha, Alternative, HypothesisTestResult};
use crate::error::{InferenceError, Result};
use crate::stats::{describe, Sample, SampleStatistics};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// p-value of a t statistic with `df` degrees of freedom
fn t_p_value(t: f64, df: f64, alternative: Alternative) -> Result<f64> {
    let dist = StudentsT::new(0.0, 1.0, df)
        .map_err(|e| InferenceError::InvalidParameter(format!("Student-t(df = {df}): {e}")))?;

    // Lower-tail evaluations only; the distribution is symmetric about 0
    let p = match alternative {
        Alternative::Less => dist.cdf(t),
        Alternative::Greater => dist.cdf(-t),
        Alternative::TwoSided => 2.0 * dist.cdf(-t.abs()),
    };
    Ok(p.min(1.0))
}

/// One-sample t-test of `H0: μ = mu0`
///
/// `t = (mean - mu0) / (std / √n)` with `n - 1` degrees of freedom.
///
/// # Errors
/// * `InsufficientSample` if `n < 2`
/// * `DegenerateSample` if `std` is zero
/// * `InvalidParameter` for non-finite inputs or alpha outside (0, 1)
pub fn one_sample_t_test(
    mean: f64,
    std_dev: f64,
    n: usize,
    mu0: f64,
    alternative: Alternative,
    alpha: f64,
) -> Result<HypothesisTestResult> {
    let alpha = check_alpha(alpha)?;
    if n < 2 {
        return Err(InferenceError::insufficient("one-sample t-test", 2, n));
    }
    if !mean.is_finite() || !mu0.is_finite() || !std_dev.is_finite() || std_dev < 0.0 {
        return Err(InferenceError::InvalidParameter(format!(
            "t-test needs finite inputs and a non-negative std \
             (mean = {mean}, std = {std_dev}, mu0 = {mu0})"
        )));
    }
    if std_dev == 0.0 {
        return Err(InferenceError::DegenerateSample(
            "one-sample t-test on a sample with zero standard deviation".to_string(),
        ));
    }

    let se = std_dev / (n as f64).sqrt();
    let t = (mean - mu0) / se;
    let df = (n - 1) as f64;
    let p_value = t_p_value(t, df, alternative)?;

    Ok(HypothesisTestResult::new(t, df, p_value, alternative, alpha))
}

/// [`one_sample_t_test`] on a computed summary
pub fn one_sample_t_test_from(
    summary: &SampleStatistics,
    mu0: f64,
    alternative: Alternative,
    alpha: f64,
) -> Result<HypothesisTestResult> {
    let std_dev = match summary.std_dev() {
        Ok(std_dev) => std_dev,
        // Proportion summaries carry a count but no spread
        Err(_) if summary.count() >= 2 => {
            return Err(InferenceError::InvalidParameter(format!(
                "t-test needs a standard deviation, but the summary of {} values has none",
                summary.count()
            )));
        }
        Err(e) => return Err(e),
    };
    one_sample_t_test(
        summary.mean(),
        std_dev,
        summary.count(),
        mu0,
        alternative,
        alpha,
    )
}

/// Welch's two-sample t-test of `H0: μ1 = μ2` (unequal variances)
///
/// ```text
/// t  = (m1 - m2) / √(s1²/n1 + s2²/n2)
/// df = (s1²/n1 + s2²/n2)² / [ (s1²/n1)²/(n1-1) + (s2²/n2)²/(n2-1) ]
/// ```
///
/// Both summaries need `n >= 2` and a non-zero variance; anything else is a
/// `DegenerateSample` error, never a skipped test.
pub fn welch_t_test(
    first: &SampleStatistics,
    second: &SampleStatistics,
    alternative: Alternative,
    alpha: f64,
) -> Result<HypothesisTestResult> {
    let alpha = check_alpha(alpha)?;

    let mut terms = [0.0_f64; 2];
    for (slot, (label, summary)) in terms
        .iter_mut()
        .zip([("first", first), ("second", second)])
    {
        let n = summary.count();
        if n < 2 {
            return Err(InferenceError::DegenerateSample(format!(
                "Welch t-test: {label} sample has {n} value(s), need at least 2"
            )));
        }
        let variance = summary.variance()?;
        if variance <= 0.0 {
            return Err(InferenceError::DegenerateSample(format!(
                "Welch t-test: {label} sample has zero variance"
            )));
        }
        *slot = variance / n as f64;
    }

    let [v1, v2] = terms;
    let n1 = first.count() as f64;
    let n2 = second.count() as f64;

    let t = (first.mean() - second.mean()) / (v1 + v2).sqrt();
    let df = (v1 + v2).powi(2) / (v1.powi(2) / (n1 - 1.0) + v2.powi(2) / (n2 - 1.0));
    let p_value = t_p_value(t, df, alternative)?;

    Ok(HypothesisTestResult::new(t, df, p_value, alternative, alpha))
}

/// [`welch_t_test`] on raw samples
pub fn welch_t_test_samples(
    first: &Sample,
    second: &Sample,
    alternative: Alternative,
    alpha: f64,
) -> Result<HypothesisTestResult> {
    let describe_group = |label: &str, sample: &Sample| {
        describe(sample).map_err(|_| {
            InferenceError::DegenerateSample(format!("Welch t-test: {label} sample is empty"))
        })
    };
    let first = describe_group("first", first)?;
    let second = describe_group("second", second)?;
    welch_t_test(&first, &second, alternative, alpha)
}
