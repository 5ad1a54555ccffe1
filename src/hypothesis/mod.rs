// Hypothesis testing over sample summaries
//
// - One-sample Student t-test against a hypothesised mean
// - Welch's unequal-variance two-sample t-test (Welch–Satterthwaite df)
// - Shapiro–Wilk normality test behind the `NormalityTest` seam
// - Exact binomial probability / expected-count test
//
// p-values come from statrs distributions. Every routine takes its
// significance level from the caller; none is hard-coded.

mod binomial;
mod normality;
mod ttest;

pub use binomial::{binomial_pmf, expected_count_test, ExpectedCountResult};
pub use normality::{
    normality_test, subsample, NormalityResult, NormalityTest, ShapiroWilk,
    MAX_NORMALITY_SAMPLE, MIN_NORMALITY_SAMPLE,
};
pub use ttest::{one_sample_t_test, one_sample_t_test_from, welch_t_test, welch_t_test_samples};

use crate::error::{check_open_unit, Result};
use serde::{Deserialize, Serialize};

/// Direction of the alternative hypothesis
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Alternative {
    #[default]
    TwoSided,
    /// True mean is less than the hypothesised value
    Less,
    /// True mean is greater than the hypothesised value
    Greater,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Decision {
    RejectNull,
    FailToReject,
}

impl Decision {
    /// Reject iff `p_value < alpha`
    pub fn from_p_value(p_value: f64, alpha: f64) -> Self {
        if p_value < alpha {
            Decision::RejectNull
        } else {
            Decision::FailToReject
        }
    }

    pub fn is_reject(self) -> bool {
        self == Decision::RejectNull
    }
}

/// Outcome of a t-test
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HypothesisTestResult {
    pub statistic: f64,
    pub degrees_of_freedom: f64,
    /// Always within [0, 1]
    pub p_value: f64,
    pub alternative: Alternative,
    pub alpha: f64,
    pub decision: Decision,
}

impl HypothesisTestResult {
    fn new(
        statistic: f64,
        degrees_of_freedom: f64,
        p_value: f64,
        alternative: Alternative,
        alpha: f64,
    ) -> Self {
        let p_value = p_value.clamp(0.0, 1.0);
        Self {
            statistic,
            degrees_of_freedom,
            p_value,
            alternative,
            alpha,
            decision: Decision::from_p_value(p_value, alpha),
        }
    }
}

/// Validate a significance level
pub(crate) fn check_alpha(alpha: f64) -> Result<f64> {
    check_open_unit("alpha", alpha)
}
