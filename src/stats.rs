//! Descriptive statistics over numeric samples
//!
//! Variance always uses the unbiased `n - 1` divisor. A summary of a single
//! value has a mean but no variance; asking for one is an error rather than
//! a NaN.

use crate::error::{InferenceError, Result};
use serde::Serialize;

/// Finite ordered sequence of real numbers extracted from one column
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Sample {
    values: Vec<f64>,
}

impl Sample {
    /// Build a sample, rejecting NaN and infinite values
    pub fn new(values: Vec<f64>) -> Result<Self> {
        if let Some(position) = values.iter().position(|v| !v.is_finite()) {
            return Err(InferenceError::InvalidParameter(format!(
                "sample value at position {} is not finite ({})",
                position, values[position]
            )));
        }
        Ok(Self { values })
    }

    /// Build a sample from the finite values only, skipping NaN and infinities
    pub fn from_finite<I: IntoIterator<Item = f64>>(values: I) -> Self {
        Self {
            values: values.into_iter().filter(|v| v.is_finite()).collect(),
        }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn min(&self) -> Option<f64> {
        self.values.iter().copied().reduce(f64::min)
    }

    pub fn max(&self) -> Option<f64> {
        self.values.iter().copied().reduce(f64::max)
    }

    /// Share of values strictly below `reference`
    pub fn fraction_below(&self, reference: f64) -> Result<f64> {
        self.fraction_where(|v| v < reference)
    }

    /// Share of values strictly above `reference`
    pub fn fraction_above(&self, reference: f64) -> Result<f64> {
        self.fraction_where(|v| v > reference)
    }

    fn fraction_where(&self, predicate: impl Fn(f64) -> bool) -> Result<f64> {
        if self.values.is_empty() {
            return Err(InferenceError::insufficient("fraction", 1, 0));
        }
        let hits = self.values.iter().filter(|&&v| predicate(v)).count();
        Ok(hits as f64 / self.values.len() as f64)
    }
}

impl From<Sample> for Vec<f64> {
    fn from(sample: Sample) -> Self {
        sample.values
    }
}

/// Count, mean and (for n >= 2) unbiased variance of a sample
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleStatistics {
    count: usize,
    mean: f64,
    variance: Option<f64>,
    std_dev: Option<f64>,
}

impl SampleStatistics {
    /// Summary stated directly from its moments (e.g. published figures)
    pub fn from_moments(count: usize, mean: f64, std_dev: f64) -> Result<Self> {
        if count == 0 {
            return Err(InferenceError::insufficient("summary", 1, 0));
        }
        if !mean.is_finite() {
            return Err(InferenceError::InvalidParameter(format!(
                "mean must be finite, got {mean}"
            )));
        }
        if !std_dev.is_finite() || std_dev < 0.0 {
            return Err(InferenceError::InvalidParameter(format!(
                "standard deviation must be finite and non-negative, got {std_dev}"
            )));
        }
        Ok(Self {
            count,
            mean,
            variance: Some(std_dev * std_dev),
            std_dev: Some(std_dev),
        })
    }

    /// Proportion estimate `p_hat` over `count` trials, for Wald intervals
    ///
    /// `p_hat` is not range-checked here; the interval method decides.
    pub fn proportion(p_hat: f64, count: usize) -> Result<Self> {
        if count == 0 {
            return Err(InferenceError::insufficient("proportion", 1, 0));
        }
        if !p_hat.is_finite() {
            return Err(InferenceError::InvalidParameter(format!(
                "proportion estimate must be finite, got {p_hat}"
            )));
        }
        Ok(Self {
            count,
            mean: p_hat,
            variance: None,
            std_dev: None,
        })
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Unbiased sample variance (divisor n - 1)
    pub fn variance(&self) -> Result<f64> {
        self.variance
            .ok_or_else(|| InferenceError::insufficient("variance", 2, self.count))
    }

    /// Sample standard deviation (divisor n - 1)
    pub fn std_dev(&self) -> Result<f64> {
        self.std_dev
            .ok_or_else(|| InferenceError::insufficient("standard deviation", 2, self.count))
    }

    /// Standard error of the mean, `s / sqrt(n)`
    pub fn standard_error(&self) -> Result<f64> {
        Ok(self.std_dev()? / (self.count as f64).sqrt())
    }
}

/// Summarise a sample
///
/// Fails with `InsufficientSample` for an empty sample. Samples of one value
/// get a mean but no variance.
pub fn describe(sample: &Sample) -> Result<SampleStatistics> {
    let n = sample.len();
    if n == 0 {
        return Err(InferenceError::insufficient("mean", 1, 0));
    }

    let mean = sample.values.iter().sum::<f64>() / n as f64;

    let variance = (n >= 2).then(|| {
        let sum_sq: f64 = sample.values.iter().map(|v| (v - mean).powi(2)).sum();
        sum_sq / (n - 1) as f64
    });

    Ok(SampleStatistics {
        count: n,
        mean,
        variance,
        std_dev: variance.map(f64::sqrt),
    })
}

/// Everything a rendering collaborator needs to draw a histogram
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramSpec {
    pub label: String,
    pub bins: usize,
    /// (min, max) of the values, absent for an empty sample
    pub range: Option<(f64, f64)>,
    pub values: Sample,
}

impl HistogramSpec {
    pub fn new(label: impl Into<String>, bins: usize, values: Sample) -> Result<Self> {
        if bins == 0 {
            return Err(InferenceError::InvalidParameter(
                "histogram needs at least one bin".to_string(),
            ));
        }
        let range = values.min().zip(values.max());
        Ok(Self {
            label: label.into(),
            bins,
            range,
            values,
        })
    }
}
