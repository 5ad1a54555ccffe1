// Study configuration
//
// A study is described in TOML: the population filter, one [[analysis]]
// table per quantity, an optional [orbital] table and any number of
// [[comparison]] tables. Shared settings (confidence level, alpha, seed)
// live at the top level and apply to every analysis unless overridden.

use crate::comparison::GroupComparison;
use crate::error::check_open_unit;
use crate::filter::FilterSpec;
use crate::hypothesis::Alternative;
use crate::orbital::{completeness_filter, OrbitalAnalysis};
use crate::pipeline::{AnalysisPipeline, IntervalChoice};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../analyses-default.toml");

fn default_confidence_level() -> f64 {
    0.95
}

fn default_alpha() -> f64 {
    0.05
}

fn default_seed() -> u64 {
    42
}

fn default_bins() -> usize {
    20
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StudyConfig {
    /// Filter expression selecting the population; empty keeps every row
    #[serde(default)]
    pub population: String,

    #[serde(default = "default_confidence_level")]
    pub confidence_level: f64,

    /// Significance level for every hypothesis test
    #[serde(default = "default_alpha")]
    pub alpha: f64,

    /// Seed for any random subsampling
    #[serde(default = "default_seed")]
    pub seed: u64,

    #[serde(default, rename = "analysis")]
    pub analyses: Vec<AnalysisConfig>,

    #[serde(default)]
    pub orbital: Option<OrbitalConfig>,

    #[serde(default, rename = "comparison")]
    pub comparisons: Vec<ComparisonConfig>,
}

/// One `[[analysis]]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisConfig {
    pub name: String,
    pub column: String,
    pub reference: f64,
    pub tolerance: f64,
    #[serde(default)]
    pub interval: IntervalChoice,
    #[serde(default = "default_bins")]
    pub bins: usize,
    /// Histogram label, defaults to the analysis name
    #[serde(default)]
    pub label: Option<String>,
    /// Own filter over the raw table instead of the population
    #[serde(default)]
    pub filter: Option<String>,
    /// Overrides the study-wide confidence level
    #[serde(default)]
    pub confidence_level: Option<f64>,
}

/// `[orbital]` table; omitted keys take the `OrbitalAnalysis` defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OrbitalConfig {
    /// Defaults to every expected column populated
    pub filter: Option<String>,
    pub hypothesised_axis_au: f64,
    pub alternative: Alternative,
    pub observations: u64,
    pub observed_transits: u64,
    pub bins: usize,
}

impl Default for OrbitalConfig {
    fn default() -> Self {
        let defaults = OrbitalAnalysis::default();
        Self {
            filter: None,
            hypothesised_axis_au: defaults.hypothesised_axis_au,
            alternative: defaults.alternative,
            observations: defaults.observations,
            observed_transits: defaults.observed_transits,
            bins: defaults.bins,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComparisonConfig {
    pub name: String,
    pub column: String,
    pub group_column: String,
    pub first_group: String,
    pub second_group: String,
    #[serde(default)]
    pub alternative: Alternative,
}

impl StudyConfig {
    /// Load a study from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read study config: {}", path.as_ref().display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid study config: {}", path.as_ref().display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse study TOML")?;
        config.validate()?;
        Ok(config)
    }

    /// The embedded Kepler exoplanet study
    pub fn default_kepler() -> Result<Self> {
        Self::from_toml_str(DEFAULT_TOML).context("Failed to parse embedded analyses-default.toml")
    }

    /// Check every setting and filter expression up front
    pub fn validate(&self) -> Result<()> {
        check_open_unit("confidence_level", self.confidence_level).context("study settings")?;
        check_open_unit("alpha", self.alpha).context("study settings")?;
        parse_filter(&self.population).context("population filter")?;

        let mut names = HashSet::new();
        for analysis in &self.analyses {
            if analysis.name.trim().is_empty() {
                anyhow::bail!("analysis on column '{}' has an empty name", analysis.column);
            }
            if !names.insert(analysis.name.as_str()) {
                anyhow::bail!("duplicate analysis name '{}'", analysis.name);
            }
            if !analysis.reference.is_finite() {
                anyhow::bail!("analysis '{}': reference must be finite", analysis.name);
            }
            if !analysis.tolerance.is_finite() || analysis.tolerance < 0.0 {
                anyhow::bail!(
                    "analysis '{}': tolerance must be finite and >= 0, got {}",
                    analysis.name,
                    analysis.tolerance
                );
            }
            if analysis.bins == 0 {
                anyhow::bail!("analysis '{}': bins must be >= 1", analysis.name);
            }
            if let Some(level) = analysis.confidence_level {
                check_open_unit("confidence_level", level)
                    .with_context(|| format!("analysis '{}'", analysis.name))?;
            }
            if let Some(expr) = &analysis.filter {
                parse_filter(expr).with_context(|| format!("analysis '{}' filter", analysis.name))?;
            }
        }

        if let Some(orbital) = &self.orbital {
            if !orbital.hypothesised_axis_au.is_finite() {
                anyhow::bail!("orbital: hypothesised_axis_au must be finite");
            }
            if orbital.observed_transits > orbital.observations {
                anyhow::bail!(
                    "orbital: observed_transits ({}) exceeds observations ({})",
                    orbital.observed_transits,
                    orbital.observations
                );
            }
            if orbital.bins == 0 {
                anyhow::bail!("orbital: bins must be >= 1");
            }
            if let Some(expr) = &orbital.filter {
                parse_filter(expr).context("orbital filter")?;
            }
        }

        for comparison in &self.comparisons {
            if comparison.first_group == comparison.second_group {
                anyhow::bail!(
                    "comparison '{}' compares group '{}' with itself",
                    comparison.name,
                    comparison.first_group
                );
            }
        }

        Ok(())
    }

    /// Keep only the named analyses, in the order given
    pub fn select_analyses(&mut self, names: &[String]) -> Result<()> {
        let mut selected = Vec::with_capacity(names.len());
        for name in names {
            let analysis = self
                .analyses
                .iter()
                .find(|a| &a.name == name)
                .with_context(|| {
                    let known: Vec<&str> = self.analyses.iter().map(|a| a.name.as_str()).collect();
                    format!(
                        "Unknown analysis '{name}'. Known analyses: {}",
                        known.join(", ")
                    )
                })?;
            selected.push(analysis.clone());
        }
        self.analyses = selected;
        Ok(())
    }

    pub fn population_filter(&self) -> Result<FilterSpec> {
        parse_filter(&self.population).context("population filter")
    }

    pub fn pipelines(&self) -> Result<Vec<AnalysisPipeline>> {
        self.analyses
            .iter()
            .map(|analysis| analysis.to_pipeline(self))
            .collect()
    }

    pub fn orbital_analysis(&self) -> Result<Option<OrbitalAnalysis>> {
        self.orbital
            .as_ref()
            .map(|orbital| orbital.to_analysis(self))
            .transpose()
    }

    pub fn group_comparisons(&self) -> Vec<GroupComparison> {
        self.comparisons
            .iter()
            .map(|comparison| GroupComparison {
                name: comparison.name.clone(),
                column: comparison.column.clone(),
                group_column: comparison.group_column.clone(),
                first_group: comparison.first_group.clone(),
                second_group: comparison.second_group.clone(),
                alternative: comparison.alternative,
                alpha: self.alpha,
                seed: self.seed,
            })
            .collect()
    }
}

impl AnalysisConfig {
    fn to_pipeline(&self, study: &StudyConfig) -> Result<AnalysisPipeline> {
        let filter = self
            .filter
            .as_deref()
            .map(parse_filter)
            .transpose()
            .with_context(|| format!("analysis '{}' filter", self.name))?;

        Ok(AnalysisPipeline {
            name: self.name.clone(),
            column: self.column.clone(),
            reference: self.reference,
            tolerance: self.tolerance,
            confidence_level: self.confidence_level.unwrap_or(study.confidence_level),
            interval: self.interval,
            bins: self.bins,
            label: self.label.clone().unwrap_or_else(|| self.name.clone()),
            filter,
        })
    }
}

impl OrbitalConfig {
    fn to_analysis(&self, study: &StudyConfig) -> Result<OrbitalAnalysis> {
        let filter = match &self.filter {
            Some(expr) => parse_filter(expr).context("orbital filter")?,
            None => completeness_filter(),
        };
        Ok(OrbitalAnalysis {
            filter,
            confidence_level: study.confidence_level,
            alpha: study.alpha,
            hypothesised_axis_au: self.hypothesised_axis_au,
            alternative: self.alternative,
            observations: self.observations,
            observed_transits: self.observed_transits,
            seed: study.seed,
            bins: self.bins,
        })
    }
}

fn parse_filter(expr: &str) -> Result<FilterSpec> {
    FilterSpec::from_expr(expr).with_context(|| format!("Invalid filter expression '{expr}'"))
}
