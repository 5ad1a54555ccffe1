//! Parametrised "similar to a reference body" analysis
//!
//! One [`AnalysisPipeline`] value describes what used to be a hand-copied
//! block per quantity: select the rows whose `column` lies within
//! `tolerance` of `reference`, summarise them against their base, attach a
//! confidence interval and a histogram description.

use crate::error::{InferenceError, Result};
use crate::filter::{filter, FilterPredicate, FilterSpec};
use crate::interval::{estimate, ConfidenceInterval, IntervalMethod, ProportionUsage, SigmaSource};
use crate::stats::{describe, HistogramSpec, SampleStatistics};
use crate::table::Table;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Which interval an analysis reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IntervalChoice {
    /// Wald interval on `matched mean / base mean` with `n` = base rows.
    /// Not a true proportion; reported unclamped.
    #[default]
    RatioProportion,
    /// z interval on the matched mean using the matched sample std
    MeanNormal,
    /// Student-t interval on the matched mean
    MeanStudentT,
}

impl IntervalChoice {
    fn method(self) -> IntervalMethod {
        match self {
            IntervalChoice::RatioProportion => IntervalMethod::WaldProportion {
                usage: ProportionUsage::NonStandardRatio,
            },
            IntervalChoice::MeanNormal => IntervalMethod::Normal {
                sigma: SigmaSource::Sample,
            },
            IntervalChoice::MeanStudentT => IntervalMethod::StudentT,
        }
    }
}

/// Analysis of one quantity against a reference value
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisPipeline {
    pub name: String,
    /// Numeric column under study
    pub column: String,
    pub reference: f64,
    pub tolerance: f64,
    pub confidence_level: f64,
    pub interval: IntervalChoice,
    pub bins: usize,
    /// Axis label for the histogram
    pub label: String,
    /// Own completeness filter over the raw table; `None` uses the population
    pub filter: Option<FilterSpec>,
}

/// Immutable result of one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub name: String,
    pub column: String,
    pub reference: f64,
    pub tolerance: f64,
    /// Rows the analysis started from
    pub base_rows: usize,
    /// Rows within tolerance of the reference
    pub matched_rows: usize,
    /// `matched_rows / base_rows`
    pub matched_share: f64,
    pub matched: SampleStatistics,
    pub base: SampleStatistics,
    /// Share of base values strictly below the reference
    pub fraction_below: f64,
    /// Share of base values strictly above the reference
    pub fraction_above: f64,
    /// `matched.mean / base.mean`
    pub mean_ratio: f64,
    pub interval: ConfidenceInterval,
    pub histogram: HistogramSpec,
}

impl AnalysisPipeline {
    /// Pipeline with a 95% ratio interval, 20 bins and no own filter
    pub fn new(
        name: impl Into<String>,
        column: impl Into<String>,
        reference: f64,
        tolerance: f64,
    ) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            column: column.into(),
            reference,
            tolerance,
            confidence_level: 0.95,
            interval: IntervalChoice::default(),
            bins: 20,
            filter: None,
        }
    }

    pub fn with_interval(mut self, interval: IntervalChoice) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_filter(mut self, filter: FilterSpec) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Run over `population`, or over `raw` narrowed by the pipeline's own
    /// filter when it has one
    pub fn run(&self, raw: &Table, population: &Table) -> Result<AnalysisReport> {
        let base: Cow<'_, Table> = match &self.filter {
            Some(spec) => Cow::Owned(filter(raw, spec)?),
            None => Cow::Borrowed(population),
        };
        let base_rows = base.row_count();
        if base_rows == 0 {
            return Err(InferenceError::insufficient("analysis base table", 1, 0));
        }

        let window = FilterSpec::all().and(FilterPredicate::within(
            self.column.as_str(),
            self.reference,
            self.tolerance,
        ));
        let matched_table = filter(&base, &window)?;
        let matched_rows = matched_table.row_count();

        let matched_sample = matched_table.sample(&self.column)?;
        let base_sample = base.sample(&self.column)?;
        let matched = describe(&matched_sample)?;
        let base_stats = describe(&base_sample)?;

        tracing::debug!(
            "{}: {matched_rows} of {base_rows} rows within {} of {}",
            self.name,
            self.tolerance,
            self.reference
        );

        if base_stats.mean() == 0.0 {
            return Err(InferenceError::NumericDomain(format!(
                "mean of '{}' over the base table is zero",
                self.column
            )));
        }
        let mean_ratio = matched.mean() / base_stats.mean();

        let interval_input = match self.interval {
            IntervalChoice::RatioProportion => {
                tracing::warn!(
                    "{}: Wald interval on a ratio of means ({mean_ratio:.5}), not a proportion",
                    self.name
                );
                SampleStatistics::proportion(mean_ratio, base_rows)?
            }
            IntervalChoice::MeanNormal | IntervalChoice::MeanStudentT => matched.clone(),
        };
        let interval = estimate(
            &self.interval.method(),
            &interval_input,
            self.confidence_level,
        )?;

        Ok(AnalysisReport {
            name: self.name.clone(),
            column: self.column.clone(),
            reference: self.reference,
            tolerance: self.tolerance,
            base_rows,
            matched_rows,
            matched_share: matched_rows as f64 / base_rows as f64,
            fraction_below: base_sample.fraction_below(self.reference)?,
            fraction_above: base_sample.fraction_above(self.reference)?,
            mean_ratio,
            matched,
            base: base_stats,
            interval,
            histogram: HistogramSpec::new(self.label.as_str(), self.bins, matched_sample)?,
        })
    }
}
