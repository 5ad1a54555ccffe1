// Normality testing
//
// `NormalityTest` is the seam for whichever routine decides normality. The
// bundled implementation is Shapiro–Wilk using Royston's (1992, 1995)
// polynomial approximations for the coefficients and the p-value, valid for
// 3 <= n <= 5000. Larger samples must be subsampled first.

use super::check_alpha;
use crate::error::{InferenceError, Result};
use crate::stats::Sample;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};
use std::f64::consts::PI;

pub const MIN_NORMALITY_SAMPLE: usize = 3;
pub const MAX_NORMALITY_SAMPLE: usize = 5000;

/// Royston's corrections for the two largest coefficients, as polynomials in 1/sqrt(n)
const LAST_COEFFICIENT: [f64; 6] = [0.0, 0.221157, -0.147981, -2.071190, 4.434685, -2.706056];
const SECOND_LAST_COEFFICIENT: [f64; 6] =
    [0.0, 0.042981, -0.293762, -1.752461, 5.682633, -3.582633];

/// A test of `H0: the data are normally distributed`
pub trait NormalityTest {
    fn name(&self) -> &'static str;

    /// Test statistic and p-value for the given values
    fn evaluate(&self, values: &[f64]) -> Result<(f64, f64)>;
}

/// Outcome of a normality test at a caller-chosen alpha
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalityResult {
    pub test: &'static str,
    pub sample_size: usize,
    pub statistic: f64,
    pub p_value: f64,
    pub alpha: f64,
    /// `p_value >= alpha`: normality is not rejected
    pub looks_normal: bool,
}

/// Run `test` over `sample` and decide at `alpha`
pub fn normality_test(
    test: &dyn NormalityTest,
    sample: &Sample,
    alpha: f64,
) -> Result<NormalityResult> {
    let alpha = check_alpha(alpha)?;
    let (statistic, p_value) = test.evaluate(sample.values())?;
    tracing::debug!(
        "{}: n = {}, statistic = {statistic:.5}, p = {p_value:.5}",
        test.name(),
        sample.len()
    );
    Ok(NormalityResult {
        test: test.name(),
        sample_size: sample.len(),
        statistic,
        p_value,
        alpha,
        looks_normal: p_value >= alpha,
    })
}

/// Order-preserving random subsample of at most `max_size` values
///
/// The same seed always selects the same positions. Samples already within
/// the limit are returned unchanged.
pub fn subsample(sample: &Sample, max_size: usize, seed: u64) -> Sample {
    if sample.len() <= max_size {
        return sample.clone();
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let chosen = rand::seq::index::sample(&mut rng, sample.len(), max_size);
    let mut positions = chosen.into_vec();
    positions.sort_unstable();

    let values = sample.values();
    Sample::from_finite(positions.into_iter().map(|i| values[i]))
}

/// Shapiro–Wilk W test
#[derive(Debug, Clone, Copy, Default)]
pub struct ShapiroWilk;

impl NormalityTest for ShapiroWilk {
    fn name(&self) -> &'static str {
        "Shapiro-Wilk"
    }

    fn evaluate(&self, values: &[f64]) -> Result<(f64, f64)> {
        let n = values.len();
        if n < MIN_NORMALITY_SAMPLE {
            return Err(InferenceError::insufficient("Shapiro-Wilk test", MIN_NORMALITY_SAMPLE, n));
        }
        if n > MAX_NORMALITY_SAMPLE {
            return Err(InferenceError::InvalidParameter(format!(
                "Shapiro-Wilk supports at most {MAX_NORMALITY_SAMPLE} values, got {n}"
            )));
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        if sorted[n - 1] - sorted[0] <= 0.0 {
            return Err(InferenceError::DegenerateSample(
                "Shapiro-Wilk test on a sample with zero range".to_string(),
            ));
        }

        let normal = standard_normal()?;
        let coefficients = coefficients(n, &normal);

        let mean = sorted.iter().sum::<f64>() / n as f64;
        let ss: f64 = sorted.iter().map(|x| (x - mean).powi(2)).sum();
        let numerator: f64 = coefficients.iter().zip(&sorted).map(|(a, x)| a * x).sum();
        let w = (numerator.powi(2) / ss).min(1.0);

        Ok((w, p_value(w, n, &normal)))
    }
}

fn standard_normal() -> Result<Normal> {
    Normal::new(0.0, 1.0)
        .map_err(|e| InferenceError::InvalidParameter(format!("standard normal: {e}")))
}

/// Evaluate `c[0] + c[1]·x + c[2]·x² + ...`
fn poly(c: &[f64], x: f64) -> f64 {
    c.iter().rev().fold(0.0, |acc, &ci| acc * x + ci)
}

/// Antisymmetric weights `a_i` for the ordered sample
fn coefficients(n: usize, normal: &Normal) -> Vec<f64> {
    if n == 3 {
        let a = std::f64::consts::FRAC_1_SQRT_2;
        return vec![-a, 0.0, a];
    }

    let nf = n as f64;
    let m: Vec<f64> = (1..=n)
        .map(|i| normal.inverse_cdf((i as f64 - 0.375) / (nf + 0.25)))
        .collect();
    let mm: f64 = m.iter().map(|v| v * v).sum();
    let u = 1.0 / nf.sqrt();

    let an = m[n - 1] / mm.sqrt() + poly(&LAST_COEFFICIENT, u);

    let mut a = vec![0.0; n];
    if n > 5 {
        let an1 = m[n - 2] / mm.sqrt() + poly(&SECOND_LAST_COEFFICIENT, u);
        let phi = (mm - 2.0 * m[n - 1].powi(2) - 2.0 * m[n - 2].powi(2))
            / (1.0 - 2.0 * an.powi(2) - 2.0 * an1.powi(2));
        for (ai, mi) in a[2..n - 2].iter_mut().zip(&m[2..n - 2]) {
            *ai = mi / phi.sqrt();
        }
        a[0] = -an;
        a[1] = -an1;
        a[n - 2] = an1;
        a[n - 1] = an;
    } else {
        let phi = (mm - 2.0 * m[n - 1].powi(2)) / (1.0 - 2.0 * an.powi(2));
        for (ai, mi) in a[1..n - 1].iter_mut().zip(&m[1..n - 1]) {
            *ai = mi / phi.sqrt();
        }
        a[0] = -an;
        a[n - 1] = an;
    }
    a
}

/// Upper-tail p-value of W
fn p_value(w: f64, n: usize, normal: &Normal) -> f64 {
    if n == 3 {
        let p = 6.0 / PI * (w.sqrt().asin() - 0.75_f64.sqrt().asin());
        return p.clamp(0.0, 1.0);
    }
    if w >= 1.0 {
        return 1.0;
    }

    let nf = n as f64;
    let log_one_minus_w = (1.0 - w).ln();
    let z = if n <= 11 {
        let gamma = -2.273 + 0.459 * nf;
        if log_one_minus_w >= gamma {
            return 0.0;
        }
        let mu = poly(&[0.5440, -0.39978, 0.025054, -6.714e-4], nf);
        let sigma = poly(&[1.3822, -0.77857, 0.062767, -0.0020322], nf).exp();
        (-(gamma - log_one_minus_w).ln() - mu) / sigma
    } else {
        let ln_n = nf.ln();
        let mu = poly(&[-1.5861, -0.31082, -0.083751, 0.0038915], ln_n);
        let sigma = poly(&[-0.4803, -0.082676, 0.0030302], ln_n).exp();
        (log_one_minus_w - mu) / sigma
    };

    normal.cdf(-z).clamp(0.0, 1.0)
}
