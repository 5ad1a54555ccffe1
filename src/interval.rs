//! Two-sided confidence intervals
//!
//! All three methods produce `estimate ± critical_value × standard_error`.
//! The method and confidence level are always explicit; nothing here picks a
//! method for the caller.

use crate::error::{check_open_unit, InferenceError, Result};
use crate::stats::SampleStatistics;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal, StudentsT};

/// Where the normal method's standard deviation comes from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SigmaSource {
    /// Known population standard deviation
    Known(f64),
    /// The summary's sample standard deviation
    Sample,
}

/// How the Wald method treats its point estimate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProportionUsage {
    /// `p̂` must be a true proportion in [0, 1]
    #[default]
    Strict,
    /// `p̂` is a ratio of two sample means; the [0, 1] check is skipped and
    /// bounds are reported unclamped
    NonStandardRatio,
}

/// Interval method with its method-specific inputs
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IntervalMethod {
    Normal { sigma: SigmaSource },
    StudentT,
    WaldProportion { usage: ProportionUsage },
}

impl IntervalMethod {
    pub fn kind(&self) -> IntervalKind {
        match self {
            IntervalMethod::Normal { .. } => IntervalKind::Normal,
            IntervalMethod::StudentT => IntervalKind::StudentT,
            IntervalMethod::WaldProportion { .. } => IntervalKind::WaldProportion,
        }
    }
}

/// Method tag carried by a computed interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum IntervalKind {
    Normal,
    StudentT,
    WaldProportion,
}

/// Symmetric two-sided confidence interval
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfidenceInterval {
    pub estimate: f64,
    pub lower: f64,
    pub upper: f64,
    pub confidence_level: f64,
    pub method: IntervalKind,
}

impl ConfidenceInterval {
    fn symmetric(estimate: f64, margin: f64, confidence_level: f64, method: IntervalKind) -> Self {
        Self {
            estimate,
            lower: estimate - margin,
            upper: estimate + margin,
            confidence_level,
            method,
        }
    }

    /// Half-width of the interval
    pub fn margin(&self) -> f64 {
        (self.upper - self.lower) / 2.0
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }
}

/// Standard normal quantile at `1 - alpha/2`
pub fn normal_critical_value(confidence_level: f64) -> Result<f64> {
    let level = check_open_unit("confidence level", confidence_level)?;
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| InferenceError::InvalidParameter(format!("standard normal: {e}")))?;
    Ok(normal.inverse_cdf(1.0 - (1.0 - level) / 2.0))
}

/// Student-t quantile at `1 - alpha/2` with `df` degrees of freedom
pub fn student_t_critical_value(confidence_level: f64, df: f64) -> Result<f64> {
    let level = check_open_unit("confidence level", confidence_level)?;
    if !df.is_finite() || df <= 0.0 {
        return Err(InferenceError::InvalidParameter(format!(
            "degrees of freedom must be positive, got {df}"
        )));
    }
    let t = StudentsT::new(0.0, 1.0, df)
        .map_err(|e| InferenceError::InvalidParameter(format!("Student-t(df = {df}): {e}")))?;
    Ok(t.inverse_cdf(1.0 - (1.0 - level) / 2.0))
}

/// Confidence interval for the summary's mean (or proportion)
///
/// * `Normal` - z critical value, `σ/√n`; any `n >= 1` with a known σ
/// * `StudentT` - t critical value with `n - 1` df, `s/√n`; `n >= 2`
/// * `WaldProportion` - z critical value, `√(p̂(1-p̂)/n)` with `p̂` the
///   summary mean
pub fn estimate(
    method: &IntervalMethod,
    summary: &SampleStatistics,
    confidence_level: f64,
) -> Result<ConfidenceInterval> {
    let n = summary.count();
    if n == 0 {
        return Err(InferenceError::insufficient("confidence interval", 1, 0));
    }
    let point = summary.mean();

    let margin = match *method {
        IntervalMethod::Normal { sigma } => {
            let sigma = match sigma {
                SigmaSource::Known(value) => {
                    if !value.is_finite() || value < 0.0 {
                        return Err(InferenceError::InvalidParameter(format!(
                            "known standard deviation must be finite and non-negative, got {value}"
                        )));
                    }
                    value
                }
                SigmaSource::Sample => summary.std_dev()?,
            };
            normal_critical_value(confidence_level)? * sigma / (n as f64).sqrt()
        }
        IntervalMethod::StudentT => {
            if n < 2 {
                return Err(InferenceError::insufficient("Student-t interval", 2, n));
            }
            let se = summary.standard_error()?;
            student_t_critical_value(confidence_level, (n - 1) as f64)? * se
        }
        IntervalMethod::WaldProportion { usage } => {
            if usage == ProportionUsage::Strict && !(0.0..=1.0).contains(&point) {
                return Err(InferenceError::InvalidParameter(format!(
                    "proportion estimate must be in [0, 1], got {point}"
                )));
            }
            let radicand = point * (1.0 - point) / n as f64;
            if radicand < 0.0 {
                return Err(InferenceError::NumericDomain(format!(
                    "p̂(1 - p̂) is negative for p̂ = {point}"
                )));
            }
            if usage == ProportionUsage::NonStandardRatio {
                tracing::debug!("Wald interval on a ratio of means (p̂ = {point:.5}, n = {n})");
            }
            normal_critical_value(confidence_level)? * radicand.sqrt()
        }
    };

    Ok(ConfidenceInterval::symmetric(point, margin, confidence_level, method.kind()))
}
