//! Study runner
//!
//! Filters the population once, then runs every configured analysis on its
//! own scoped thread over the shared, immutable tables. A failing analysis
//! is recorded as [`Outcome::Failed`] and never stops the others.

use crate::comparison::ComparisonReport;
use crate::config::StudyConfig;
use crate::error::InferenceError;
use crate::filter::filter;
use crate::orbital::OrbitalReport;
use crate::pipeline::{AnalysisPipeline, AnalysisReport};
use crate::table::Table;
use anyhow::Result;
use serde::Serialize;

/// Why a single analysis produced no report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Failure {
    pub name: String,
    pub error: String,
}

/// Result of one analysis within a study
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum Outcome<T> {
    Completed(T),
    Failed(Failure),
}

impl<T> Outcome<T> {
    fn from_result(name: &str, result: std::result::Result<T, InferenceError>) -> Self {
        match result {
            Ok(report) => Outcome::Completed(report),
            Err(e) => {
                tracing::warn!("analysis '{name}' failed: {e}");
                Outcome::Failed(Failure {
                    name: name.to_string(),
                    error: e.to_string(),
                })
            }
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed(_))
    }

    pub fn report(&self) -> Option<&T> {
        match self {
            Outcome::Completed(report) => Some(report),
            Outcome::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            Outcome::Completed(_) => None,
            Outcome::Failed(failure) => Some(failure),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudyReport {
    /// Rows in the loaded table
    pub rows: usize,
    /// Rows passing the population filter, absent if the filter failed
    pub population_rows: Option<usize>,
    pub analyses: Vec<Outcome<AnalysisReport>>,
    pub orbital: Option<Outcome<OrbitalReport>>,
    pub comparisons: Vec<Outcome<ComparisonReport>>,
}

impl StudyReport {
    pub fn failed_count(&self) -> usize {
        let analyses = self.analyses.iter().filter(|o| !o.is_completed()).count();
        let orbital = self.orbital.iter().filter(|o| !o.is_completed()).count();
        let comparisons = self
            .comparisons
            .iter()
            .filter(|o| !o.is_completed())
            .count();
        analyses + orbital + comparisons
    }

    pub fn analysis(&self, name: &str) -> Option<&Outcome<AnalysisReport>> {
        self.analyses.iter().find(|outcome| match outcome {
            Outcome::Completed(report) => report.name == name,
            Outcome::Failed(failure) => failure.name == name,
        })
    }
}

/// Run every analysis configured in `config` over `raw`
///
/// Errors only for an invalid configuration; analysis failures are
/// reported per analysis.
pub fn run_study(raw: &Table, config: &StudyConfig) -> Result<StudyReport> {
    config.validate()?;
    let pipelines = config.pipelines()?;
    let orbital = config.orbital_analysis()?;
    let comparisons = config.group_comparisons();

    let population = filter(raw, &config.population_filter()?);
    match &population {
        Ok(table) => tracing::info!(
            "population: {} of {} rows",
            table.row_count(),
            raw.row_count()
        ),
        Err(e) => tracing::warn!("population filter failed: {e}"),
    }

    let analyses = run_parallel(&pipelines, raw, &population);

    let orbital = orbital.map(|analysis| Outcome::from_result("orbital", analysis.run(raw)));

    let comparisons = comparisons
        .iter()
        .map(|comparison| Outcome::from_result(&comparison.name, comparison.run(raw)))
        .collect();

    Ok(StudyReport {
        rows: raw.row_count(),
        population_rows: population.as_ref().ok().map(Table::row_count),
        analyses,
        orbital,
        comparisons,
    })
}

/// One scoped thread per pipeline; results keep the configured order
fn run_parallel(
    pipelines: &[AnalysisPipeline],
    raw: &Table,
    population: &std::result::Result<Table, InferenceError>,
) -> Vec<Outcome<AnalysisReport>> {
    let scoped = crossbeam::thread::scope(|scope| {
        let handles: Vec<_> = pipelines
            .iter()
            .map(|pipeline| scope.spawn(move |_| run_pipeline(pipeline, raw, population)))
            .collect();

        handles
            .into_iter()
            .zip(pipelines)
            .map(|(handle, pipeline)| {
                handle.join().unwrap_or_else(|_| {
                    tracing::warn!("analysis '{}' panicked", pipeline.name);
                    Outcome::Failed(Failure {
                        name: pipeline.name.clone(),
                        error: "analysis thread panicked".to_string(),
                    })
                })
            })
            .collect::<Vec<_>>()
    });

    // Every handle is joined above, so the scope itself cannot report a panic
    scoped.unwrap_or_default()
}

fn run_pipeline(
    pipeline: &AnalysisPipeline,
    raw: &Table,
    population: &std::result::Result<Table, InferenceError>,
) -> Outcome<AnalysisReport> {
    let result = match population {
        Ok(table) => pipeline.run(raw, table),
        // An analysis with its own filter never reads the population
        Err(_) if pipeline.filter.is_some() => pipeline.run(raw, &Table::default()),
        Err(e) => Err(e.clone()),
    };
    Outcome::from_result(&pipeline.name, result)
}
